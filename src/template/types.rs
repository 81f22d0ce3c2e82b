//! Element struct types for the template data model.
//!
//! All types derive `Serialize + Deserialize` so the same types work for
//! both Rust API construction and the JSON contract with the editing host.
//!
//! The kind-specific structs carry only the fields relevant to their kind;
//! the shared geometry lives in [`Frame`] on the wrapping `Element`.

use serde::{Deserialize, Serialize};

fn default_opacity() -> f32 {
    1.0
}

fn default_font_size() -> f32 {
    12.0
}

fn default_line_height() -> f32 {
    1.2
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Shared element geometry: position, size, rotation, opacity, z-order.
///
/// Coordinates and sizes are in the page's physical units (the core never
/// interprets the unit — points, millimeters, pixels all work as long as
/// page and elements agree).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Rotation in degrees, clockwise.
    #[serde(default)]
    pub rotation: f32,
    /// Opacity (0.0 = transparent, 1.0 = fully opaque).
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    /// Stacking order; higher values render on top.
    #[serde(default)]
    pub z: i32,
}

impl Default for Frame {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            opacity: 1.0,
            z: 0,
        }
    }
}

impl Frame {
    pub fn at(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
            ..Default::default()
        }
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Text alignment inside the element box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Typographic style for text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    #[serde(default)]
    pub font_family: Option<String>,
    /// Font size in the page's physical units.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
    /// Line height as a multiple of the font size.
    #[serde(default = "default_line_height")]
    pub line_height: f32,
    #[serde(default)]
    pub align: TextAlign,
    /// CSS-style color string ("#rrggbb"). `None` = host default.
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: None,
            font_size: 12.0,
            line_height: 1.2,
            align: TextAlign::Left,
            color: None,
            bold: false,
        }
    }
}

/// Text element. `content` holds `{{token}}` placeholders and static
/// literals; on a template it never holds resolved record data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TextElement {
    pub content: String,
    #[serde(default)]
    pub style: TextStyle,
}

impl TextElement {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

// ============================================================================
// IMAGE
// ============================================================================

/// Crop rectangle as fractions of the source image (0.0–1.0).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Crop {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Image element.
///
/// `binding` names the record field whose value is matched against the
/// asset pool at resolution time. `source` is what the host displays:
/// on a template it is either a static URL the user placed directly or
/// empty; on a resolved scene it is the matched asset URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ImageElement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop: Option<Crop>,
}

impl ImageElement {
    /// An image bound to a record field (source filled in at resolve time).
    pub fn bound(field: impl Into<String>) -> Self {
        Self {
            binding: Some(field.into()),
            ..Default::default()
        }
    }
}

// ============================================================================
// BARCODE / QR
// ============================================================================

/// Where a barcode/QR element gets its encoded payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source_type", content = "value", rename_all = "snake_case")]
pub enum DataSource {
    /// Literal payload; never token-substituted.
    Static(String),
    /// Record field binding, resolved with the fuzzy matching rules.
    Field(String),
}

impl Default for DataSource {
    fn default() -> Self {
        DataSource::Static(String::new())
    }
}

/// 1D barcode symbology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Symbology {
    Code39,
    #[default]
    Code128,
    Ean13,
    UpcA,
    Itf,
}

/// QR error correction level: L, M (default), Q, H.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QrErrorLevel {
    L,
    #[default]
    M,
    Q,
    H,
}

/// A regenerated symbol raster (PNG bytes).
///
/// Populated only on resolved scenes — templates always carry `None` in
/// their `rendered` slots so the reusable document stays data-free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedSymbol {
    pub png: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// 1D barcode element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct BarcodeElement {
    #[serde(default)]
    pub symbology: Symbology,
    #[serde(default)]
    pub source: DataSource,
    /// Regenerated symbol image (resolved scenes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered: Option<RenderedSymbol>,
}

impl BarcodeElement {
    pub fn field(symbology: Symbology, field: impl Into<String>) -> Self {
        Self {
            symbology,
            source: DataSource::Field(field.into()),
            rendered: None,
        }
    }
}

/// QR code element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct QrElement {
    #[serde(default)]
    pub source: DataSource,
    #[serde(default)]
    pub error_level: QrErrorLevel,
    /// Regenerated symbol image (resolved scenes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rendered: Option<RenderedSymbol>,
}

impl QrElement {
    pub fn field(field: impl Into<String>) -> Self {
        Self {
            source: DataSource::Field(field.into()),
            ..Default::default()
        }
    }

    pub fn fixed(data: impl Into<String>) -> Self {
        Self {
            source: DataSource::Static(data.into()),
            ..Default::default()
        }
    }
}

// ============================================================================
// SEQUENCE
// ============================================================================

/// Sequence-number element: `prefix + pad(start + record_index) + suffix`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SequenceElement {
    #[serde(default)]
    pub start: u64,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub suffix: String,
    /// Zero-padding width for the numeric part. 0 = no padding.
    #[serde(default)]
    pub padding: usize,
    /// Computed display value (resolved scenes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,
}

impl SequenceElement {
    /// Format the sequence value for a record at the given ordinal position.
    pub fn format(&self, record_index: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            self.start + record_index,
            self.suffix,
            width = self.padding
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequence_format_padded() {
        let seq = SequenceElement {
            start: 100,
            prefix: "INV-".into(),
            padding: 4,
            ..Default::default()
        };
        assert_eq!(seq.format(7), "INV-0107");
    }

    #[test]
    fn test_sequence_format_no_padding() {
        let seq = SequenceElement {
            start: 1,
            suffix: "/2026".into(),
            ..Default::default()
        };
        assert_eq!(seq.format(0), "1/2026");
    }

    #[test]
    fn test_sequence_wider_than_padding() {
        // Numbers wider than the padding are never truncated
        let seq = SequenceElement {
            start: 99998,
            padding: 3,
            ..Default::default()
        };
        assert_eq!(seq.format(1), "99999");
    }

    #[test]
    fn test_data_source_json() {
        let src: DataSource =
            serde_json::from_str(r#"{"source_type": "field", "value": "Email"}"#).unwrap();
        assert_eq!(src, DataSource::Field("Email".into()));
    }

    #[test]
    fn test_rendered_slot_not_serialized_when_empty() {
        let qr = QrElement::fixed("x");
        let json = serde_json::to_string(&qr).unwrap();
        assert!(!json.contains("rendered"));
    }
}
