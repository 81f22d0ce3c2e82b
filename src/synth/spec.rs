//! LayoutSpec: the declarative layout recommendation consumed by the
//! synthesizer, plus the clamping that protects against implausible values.
//!
//! Specs arrive from an external suggestion service and are treated as
//! read-only and untrusted: every fractional region is clamped before use,
//! and a region that clamps away entirely makes the synthesizer fall back
//! to its built-in geometry for that region. A malformed spec is never a
//! hard failure.

use serde::{Deserialize, Serialize};

use crate::template::TextAlign;

fn default_true() -> bool {
    true
}

/// A rectangle in fractional page coordinates (0.0–1.0 on both axes).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Region {
    /// Clamp into the unit square. Returns `None` when nothing sensible
    /// remains (non-finite or non-positive extent).
    pub fn clamped(&self) -> Option<Region> {
        if ![self.x, self.y, self.width, self.height]
            .iter()
            .all(|v| v.is_finite())
        {
            return None;
        }
        let x = self.x.clamp(0.0, 1.0);
        let y = self.y.clamp(0.0, 1.0);
        let width = self.width.min(1.0 - x);
        let height = self.height.min(1.0 - y);
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Region {
            x,
            y,
            width,
            height,
        })
    }

    /// Convert to physical page units.
    pub fn to_physical(&self, page_width: f32, page_height: f32) -> (f32, f32, f32, f32) {
        (
            self.x * page_width,
            self.y * page_height,
            self.width * page_width,
            self.height * page_height,
        )
    }
}

/// Typographic aggressiveness: how large auto-fit text may grow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScaleTier {
    Fill,
    Large,
    #[default]
    Medium,
    Restrained,
    Small,
}

impl ScaleTier {
    fn index(self) -> usize {
        match self {
            ScaleTier::Fill => 0,
            ScaleTier::Large => 1,
            ScaleTier::Medium => 2,
            ScaleTier::Restrained => 3,
            ScaleTier::Small => 4,
        }
    }

    /// Maximum solved font size, as a fraction of page height.
    pub fn cap_frac(self, config: &SynthConfig) -> f32 {
        config.tier_cap_fracs[self.index()]
    }

    /// Multiplier applied after solving, shrinking toward quieter tiers.
    pub fn multiplier(self, config: &SynthConfig) -> f32 {
        config.tier_multipliers[self.index()]
    }

    /// One step quieter. `Small` stays `Small`.
    pub fn demote(self) -> ScaleTier {
        match self {
            ScaleTier::Fill => ScaleTier::Large,
            ScaleTier::Large => ScaleTier::Medium,
            ScaleTier::Medium => ScaleTier::Restrained,
            ScaleTier::Restrained | ScaleTier::Small => ScaleTier::Small,
        }
    }
}

/// Externally produced layout description. Never mutated here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSpec {
    /// Where text goes, in fractional page coordinates.
    pub text_region: Region,
    /// Optional image band.
    #[serde(default)]
    pub image_region: Option<Region>,
    /// Target aspect ratio (width / height) for images in the band.
    #[serde(default)]
    pub image_aspect: Option<f32>,
    /// One newline-joined block (true) vs one element per field (false).
    #[serde(default = "default_true")]
    pub combine_text: bool,
    #[serde(default)]
    pub scale_tier: ScaleTier,
    #[serde(default)]
    pub align: TextAlign,
}

/// Heuristic constants for synthesis. Tuned empirically; kept as
/// configuration rather than buried in the geometry code.
#[derive(Debug, Clone)]
pub struct SynthConfig {
    /// Page margin as a fraction of the smaller page dimension.
    pub margin_frac: f32,
    /// Text block width fraction when image fields share the page.
    pub text_width_with_images: f32,
    /// Spec text regions narrower than this fraction of page width, with no
    /// image fields present, are treated as implausible…
    pub full_text_min_frac: f32,
    /// …and widened to this fraction.
    pub full_text_widen_frac: f32,
    /// Combine text fields into one block at this many fields or more.
    pub combine_threshold: usize,
    /// Vertical gap between stacked text boxes, as a fraction of page height.
    pub stack_gap_frac: f32,
    /// Vertical gap between stacked images, as a fraction of page height.
    pub image_gap_frac: f32,
    /// Aspect ratio for image fields without a square-ish name hint (3:2).
    pub default_image_aspect: f32,
    /// At this many text fields, demote the scale tier one step.
    pub many_fields_threshold: usize,
    /// Text regions narrower than this fraction alongside an image region
    /// read as badge-like layouts; demote the tier one step.
    pub badge_text_width_frac: f32,
    /// Per-tier font size caps, as fractions of page height
    /// (fill, large, medium, restrained, small).
    pub tier_cap_fracs: [f32; 5],
    /// Per-tier post-solve multipliers.
    pub tier_multipliers: [f32; 5],
    pub min_font_size: f32,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            margin_frac: 0.05,
            text_width_with_images: 0.60,
            full_text_min_frac: 0.85,
            full_text_widen_frac: 0.90,
            combine_threshold: 3,
            stack_gap_frac: 0.02,
            image_gap_frac: 0.02,
            default_image_aspect: 1.5,
            many_fields_threshold: 5,
            badge_text_width_frac: 0.5,
            tier_cap_fracs: [0.30, 0.18, 0.12, 0.08, 0.05],
            tier_multipliers: [1.0, 0.92, 0.85, 0.75, 0.65],
            min_font_size: 4.0,
        }
    }
}

/// Clamp a spec's text region and apply the implausibility rule: with no
/// image fields on the page, a narrow text region is widened to most of
/// the page width.
pub fn clamp_text_region(
    spec: &LayoutSpec,
    has_image_fields: bool,
    config: &SynthConfig,
) -> Option<Region> {
    let mut region = spec.text_region.clamped()?;
    if !has_image_fields && region.width < config.full_text_min_frac {
        let width = config.full_text_widen_frac;
        region.x = (1.0 - width) / 2.0;
        region.width = width;
    }
    Some(region)
}

/// Bias the requested tier toward quieter typography: many fields or a
/// badge-like layout (small text region beside an image band) each demote
/// one step, so a single field never visually dominates.
pub fn effective_tier(
    requested: ScaleTier,
    text_field_count: usize,
    badge_like: bool,
    config: &SynthConfig,
) -> ScaleTier {
    let mut tier = requested;
    if text_field_count >= config.many_fields_threshold {
        tier = tier.demote();
    }
    if badge_like {
        tier = tier.demote();
    }
    tier
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(region: Region) -> LayoutSpec {
        LayoutSpec {
            text_region: region,
            image_region: None,
            image_aspect: None,
            combine_text: true,
            scale_tier: ScaleTier::Medium,
            align: TextAlign::Left,
        }
    }

    #[test]
    fn test_region_clamp_in_range() {
        let r = Region {
            x: 0.1,
            y: 0.1,
            width: 0.8,
            height: 0.5,
        };
        assert_eq!(r.clamped(), Some(r));
    }

    #[test]
    fn test_region_clamp_overflow() {
        let r = Region {
            x: 0.5,
            y: -0.2,
            width: 0.9,
            height: 2.0,
        }
        .clamped()
        .unwrap();
        assert_eq!(r.x, 0.5);
        assert_eq!(r.y, 0.0);
        assert!((r.width - 0.5).abs() < 1e-6);
        assert!((r.height - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_region_clamp_degenerate() {
        assert_eq!(
            Region {
                x: 1.0,
                y: 0.0,
                width: 0.5,
                height: 0.5
            }
            .clamped(),
            None
        );
        assert_eq!(
            Region {
                x: 0.0,
                y: 0.0,
                width: f32::NAN,
                height: 0.5
            }
            .clamped(),
            None
        );
        assert_eq!(
            Region {
                x: 0.0,
                y: 0.0,
                width: -0.2,
                height: 0.5
            }
            .clamped(),
            None
        );
    }

    #[test]
    fn test_narrow_text_region_widened_without_images() {
        let config = SynthConfig::default();
        let s = spec(Region {
            x: 0.3,
            y: 0.1,
            width: 0.3,
            height: 0.8,
        });
        let widened = clamp_text_region(&s, false, &config).unwrap();
        assert!((widened.width - config.full_text_widen_frac).abs() < 1e-6);

        // With image fields, narrow regions are deliberate
        let kept = clamp_text_region(&s, true, &config).unwrap();
        assert!((kept.width - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_tier_demotion() {
        assert_eq!(ScaleTier::Fill.demote(), ScaleTier::Large);
        assert_eq!(ScaleTier::Small.demote(), ScaleTier::Small);
    }

    #[test]
    fn test_effective_tier_biasing() {
        let config = SynthConfig::default();
        assert_eq!(
            effective_tier(ScaleTier::Large, 2, false, &config),
            ScaleTier::Large
        );
        assert_eq!(
            effective_tier(ScaleTier::Large, 6, false, &config),
            ScaleTier::Medium
        );
        assert_eq!(
            effective_tier(ScaleTier::Large, 6, true, &config),
            ScaleTier::Restrained
        );
    }

    #[test]
    fn test_tier_caps_decrease() {
        let config = SynthConfig::default();
        let caps = config.tier_cap_fracs;
        assert!(caps.windows(2).all(|w| w[0] > w[1]));
    }

    #[test]
    fn test_layout_spec_json() {
        let json = r#"{
            "text_region": {"x": 0.05, "y": 0.1, "width": 0.5, "height": 0.8},
            "image_region": {"x": 0.6, "y": 0.1, "width": 0.35, "height": 0.8},
            "scale_tier": "restrained",
            "combine_text": false
        }"#;
        let spec: LayoutSpec = serde_json::from_str(json).unwrap();
        assert_eq!(spec.scale_tier, ScaleTier::Restrained);
        assert!(!spec.combine_text);
        assert!(spec.image_region.is_some());
        assert_eq!(spec.align, TextAlign::Left);
    }
}
