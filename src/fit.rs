//! Text-fit estimation: the largest font size at which a block of text
//! fits a target box.
//!
//! With a real glyph measurer (ab_glyph over a loaded font) the solver
//! binary-searches the size range. Without one it falls back to a
//! closed-form estimate from an assumed average character width — crude,
//! but monotone and good enough to pick a tier-capped starting size.

use ab_glyph::{Font, FontArc, ScaleFont};

use crate::ImprintError;

/// Glyph measurement primitive. The solver only needs line widths and a
/// line-height factor; anything that can provide those will do.
pub trait TextMeasurer {
    /// Rendered width of a single line at the given font size, in the same
    /// units as the font size.
    fn line_width(&self, line: &str, font_size: f32) -> f32;

    /// Line height as a multiple of the font size.
    fn line_height_factor(&self) -> f32 {
        1.2
    }
}

/// Real glyph measurement backed by ab_glyph.
pub struct GlyphMeasurer {
    font: FontArc,
}

impl GlyphMeasurer {
    pub fn new(font: FontArc) -> Self {
        Self { font }
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, ImprintError> {
        let font = FontArc::try_from_vec(data.to_vec())
            .map_err(|e| ImprintError::InvalidInput(format!("Failed to load font: {}", e)))?;
        Ok(Self { font })
    }
}

impl TextMeasurer for GlyphMeasurer {
    fn line_width(&self, line: &str, font_size: f32) -> f32 {
        let scaled = self.font.as_scaled(font_size);
        line.chars()
            .map(|c| scaled.h_advance(self.font.glyph_id(c)))
            .sum()
    }

    fn line_height_factor(&self) -> f32 {
        // Derive from font metrics at a reference size
        let scaled = self.font.as_scaled(100.0);
        (scaled.ascent() - scaled.descent() + scaled.line_gap()) / 100.0
    }
}

/// Solver constraints and fallback assumptions.
#[derive(Debug, Clone, Copy)]
pub struct FitConstraints {
    pub min_size: f32,
    pub max_size: f32,
    /// Assumed average glyph width as a fraction of the font size
    /// (closed-form fallback only).
    pub avg_char_width: f32,
    /// Line height factor (closed-form fallback only; measurers supply
    /// their own).
    pub line_height: f32,
}

impl Default for FitConstraints {
    fn default() -> Self {
        Self {
            min_size: 4.0,
            max_size: 96.0,
            avg_char_width: 0.55,
            line_height: 1.2,
        }
    }
}

/// Largest font size in `[min_size, max_size]` at which every line of
/// `text` fits `box_width` and all lines together fit `box_height`.
///
/// Returns `max_size` immediately for empty/whitespace-only text.
pub fn fit_font_size(
    text: &str,
    box_width: f32,
    box_height: f32,
    constraints: &FitConstraints,
    measurer: Option<&dyn TextMeasurer>,
) -> f32 {
    if text.trim().is_empty() {
        return constraints.max_size;
    }

    let lines: Vec<&str> = text.lines().collect();
    match measurer {
        Some(m) => solve_measured(&lines, box_width, box_height, constraints, m),
        None => solve_closed_form(&lines, box_width, box_height, constraints),
    }
}

fn solve_measured(
    lines: &[&str],
    box_width: f32,
    box_height: f32,
    c: &FitConstraints,
    measurer: &dyn TextMeasurer,
) -> f32 {
    let line_height = measurer.line_height_factor();
    let fits = |size: f32| -> bool {
        let widest = lines
            .iter()
            .map(|line| measurer.line_width(line, size))
            .fold(0.0f32, f32::max);
        widest <= box_width && lines.len() as f32 * size * line_height <= box_height
    };

    if fits(c.max_size) {
        return c.max_size;
    }
    if !fits(c.min_size) {
        return c.min_size;
    }

    // Invariant: lo fits, hi does not
    let mut lo = c.min_size;
    let mut hi = c.max_size;
    for _ in 0..24 {
        let mid = (lo + hi) / 2.0;
        if fits(mid) {
            lo = mid;
        } else {
            hi = mid;
        }
    }
    lo
}

/// Closed-form estimate: width-limited by the longest line's character
/// count times the assumed average width, height-limited by line count.
fn solve_closed_form(lines: &[&str], box_width: f32, box_height: f32, c: &FitConstraints) -> f32 {
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(1).max(1);
    let by_width = box_width / (longest as f32 * c.avg_char_width);
    let by_height = box_height / (lines.len() as f32 * c.line_height);
    by_width.min(by_height).clamp(c.min_size, c.max_size)
}
