//! Barcode and QR symbol regeneration.
//!
//! Uses the qrcode crate for QR matrices and the barcoders crate for 1D
//! symbologies, rasterized to small PNG images the host can display in
//! place of the element.

use std::io::Cursor;

use barcoders::sym::code39::Code39;
use barcoders::sym::code128::Code128;
use barcoders::sym::ean13::{EAN13, UPCA};
use barcoders::sym::tf::TF;
use image::{DynamicImage, GrayImage, Luma};
use qrcode::{Color, EcLevel, QrCode};

use crate::ImprintError;
use crate::template::{QrErrorLevel, RenderedSymbol, Symbology};

const WHITE: Luma<u8> = Luma([255]);
const BLACK: Luma<u8> = Luma([0]);

/// Pixels per QR module.
const QR_MODULE_PX: u32 = 4;
/// Quiet zone around the QR symbol, in modules (spec minimum).
const QR_QUIET_MODULES: u32 = 4;

/// Pixels per 1D barcode module.
const BAR_MODULE_PX: u32 = 2;
/// Bar height in pixels.
const BAR_HEIGHT_PX: u32 = 80;
/// Quiet zone on each side of a 1D symbol, in modules.
const BAR_QUIET_MODULES: u32 = 10;

/// Render a QR code for the given payload.
pub fn render_qr(data: &str, level: QrErrorLevel) -> Result<RenderedSymbol, ImprintError> {
    let ec = match level {
        QrErrorLevel::L => EcLevel::L,
        QrErrorLevel::M => EcLevel::M,
        QrErrorLevel::Q => EcLevel::Q,
        QrErrorLevel::H => EcLevel::H,
    };

    let code = QrCode::with_error_correction_level(data.as_bytes(), ec)
        .map_err(|e| ImprintError::Symbol(format!("QR encode failed: {}", e)))?;

    let modules = code.width() as u32;
    let colors = code.to_colors();
    let size = (modules + 2 * QR_QUIET_MODULES) * QR_MODULE_PX;

    let mut img = GrayImage::from_pixel(size, size, WHITE);
    for (i, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let mx = (i as u32 % modules + QR_QUIET_MODULES) * QR_MODULE_PX;
        let my = (i as u32 / modules + QR_QUIET_MODULES) * QR_MODULE_PX;
        for dy in 0..QR_MODULE_PX {
            for dx in 0..QR_MODULE_PX {
                img.put_pixel(mx + dx, my + dy, BLACK);
            }
        }
    }

    encode_png(img)
}

/// Render a 1D barcode for the given payload.
pub fn render_barcode(data: &str, symbology: Symbology) -> Result<RenderedSymbol, ImprintError> {
    let modules = encode_modules(data, symbology)?;
    if modules.is_empty() {
        return Err(ImprintError::Symbol(format!(
            "{:?} produced an empty encoding",
            symbology
        )));
    }

    let width = (modules.len() as u32 + 2 * BAR_QUIET_MODULES) * BAR_MODULE_PX;
    let mut img = GrayImage::from_pixel(width, BAR_HEIGHT_PX, WHITE);

    for (i, module) in modules.iter().enumerate() {
        if *module != 1 {
            continue;
        }
        let x0 = (i as u32 + BAR_QUIET_MODULES) * BAR_MODULE_PX;
        for dx in 0..BAR_MODULE_PX {
            for y in 0..BAR_HEIGHT_PX {
                img.put_pixel(x0 + dx, y, BLACK);
            }
        }
    }

    encode_png(img)
}

/// Encode payload to a module sequence (1 = bar, 0 = space).
fn encode_modules(data: &str, symbology: Symbology) -> Result<Vec<u8>, ImprintError> {
    let err = |e: barcoders::error::Error| {
        ImprintError::Symbol(format!("{:?} encode failed: {}", symbology, e))
    };
    match symbology {
        Symbology::Code39 => Ok(Code39::new(data).map_err(err)?.encode()),
        Symbology::Code128 => {
            // Code128 requires a character-set prefix; Set B covers the
            // widest range of printable characters.
            let prefixed = format!("\u{0181}{}", data);
            Ok(Code128::new(&prefixed).map_err(err)?.encode())
        }
        Symbology::Ean13 => Ok(EAN13::new(data).map_err(err)?.encode()),
        Symbology::UpcA => Ok(UPCA::new(data).map_err(err)?.encode()),
        Symbology::Itf => Ok(TF::interleaved(data).map_err(err)?.encode()),
    }
}

fn encode_png(img: GrayImage) -> Result<RenderedSymbol, ImprintError> {
    let (width, height) = img.dimensions();
    let mut png = Vec::new();
    DynamicImage::ImageLuma8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .map_err(|e| ImprintError::Image(format!("PNG encode failed: {}", e)))?;
    Ok(RenderedSymbol { png, width, height })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qr_renders_square_png() {
        let symbol = render_qr("http://x/1", QrErrorLevel::M).unwrap();
        assert!(!symbol.png.is_empty());
        assert_eq!(symbol.width, symbol.height);
        // PNG magic bytes
        assert_eq!(&symbol.png[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_qr_payload_changes_output() {
        let a = render_qr("http://x/1", QrErrorLevel::M).unwrap();
        let b = render_qr("http://x/2", QrErrorLevel::M).unwrap();
        assert_ne!(a.png, b.png);
    }

    #[test]
    fn test_code128_renders() {
        let symbol = render_barcode("ABC-123", Symbology::Code128).unwrap();
        assert!(!symbol.png.is_empty());
        assert_eq!(symbol.height, BAR_HEIGHT_PX);
    }

    #[test]
    fn test_code39_renders() {
        let symbol = render_barcode("HELLO", Symbology::Code39).unwrap();
        assert!(symbol.width > 0);
    }

    #[test]
    fn test_ean13_rejects_bad_payload() {
        // EAN-13 needs 12 digits; letters must fail, not panic
        assert!(render_barcode("not-digits", Symbology::Ean13).is_err());
    }

    #[test]
    fn test_ean13_accepts_digits() {
        assert!(render_barcode("978020137962", Symbology::Ean13).is_ok());
    }

    #[test]
    fn test_itf_renders() {
        assert!(render_barcode("1234", Symbology::Itf).is_ok());
    }
}
