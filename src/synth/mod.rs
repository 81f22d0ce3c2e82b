//! Automatic layout synthesis: turn a layout recommendation (or nothing)
//! into a concrete template with positioned elements and scale-to-fill
//! typography.
//!
//! Synthesis runs once, when a dataset is loaded and no template exists
//! yet. Text content is always emitted in token form — the sample record
//! only drives font-size computation, never the stored content — so the
//! result participates in resolve/merge cycles like any hand-built
//! template.

pub mod spec;

pub use spec::{LayoutSpec, Region, ScaleTier, SynthConfig};

use tracing::debug;

use crate::assets::looks_like_image_reference;
use crate::fit::{fit_font_size, FitConstraints, TextMeasurer};
use crate::resolve::tokens;
use crate::template::{
    Element, ElementKind, Frame, ImageElement, Record, Template, TextAlign, TextElement, TextStyle,
};

/// Field-name fragments that mark a field as image-bearing.
const IMAGE_NAME_HINTS: &[&str] = &[
    "photo", "image", "img", "logo", "avatar", "icon", "picture", "headshot", "thumbnail",
];

/// Name fragments that suggest a square asset (1:1 instead of 3:2).
const SQUARE_NAME_HINTS: &[&str] = &["logo", "avatar", "icon", "headshot", "profile"];

/// Split dataset fields into text fields and detected image fields,
/// preserving order. A field is an image field when its name carries an
/// image-ish hint or its sample value looks like an image reference.
pub fn detect_image_fields(fields: &[String], sample: &Record) -> (Vec<String>, Vec<String>) {
    let mut text_fields = Vec::new();
    let mut image_fields = Vec::new();
    for field in fields {
        if is_image_field(field, sample) {
            image_fields.push(field.clone());
        } else {
            text_fields.push(field.clone());
        }
    }
    (text_fields, image_fields)
}

fn is_image_field(field: &str, sample: &Record) -> bool {
    let normalized = tokens::normalize_field_name(field);
    if IMAGE_NAME_HINTS.iter().any(|hint| normalized.contains(hint)) {
        return true;
    }
    tokens::resolve_field(sample, field).is_some_and(looks_like_image_reference)
}

fn inferred_aspect(field: &str, config: &SynthConfig) -> f32 {
    let normalized = tokens::normalize_field_name(field);
    if SQUARE_NAME_HINTS.iter().any(|hint| normalized.contains(hint)) {
        1.0
    } else {
        config.default_image_aspect
    }
}

/// Concrete synthesis plan: regions in physical units.
struct Plan {
    text: (f32, f32, f32, f32),
    image: Option<(f32, f32, f32, f32)>,
    image_aspect: Option<f32>,
    combine: bool,
    tier: ScaleTier,
    align: TextAlign,
}

/// Synthesize a single-page template for the given fields.
///
/// With a [`LayoutSpec`] its regions are clamped and applied
/// verbatim; without one (the suggestion service failed, timed out, or
/// returned garbage) a deterministic built-in layout takes over. Either
/// way the sample record drives only font sizing.
pub fn synthesize_layout(
    layout_spec: Option<&LayoutSpec>,
    fields: &[String],
    sample: &Record,
    page_width: f32,
    page_height: f32,
    config: &SynthConfig,
    measurer: Option<&dyn TextMeasurer>,
) -> Template {
    let (text_fields, image_fields) = detect_image_fields(fields, sample);

    let plan = match layout_spec {
        Some(spec) => plan_from_spec(
            spec,
            &text_fields,
            &image_fields,
            page_width,
            page_height,
            config,
        ),
        None => {
            debug!("no layout spec; using built-in fallback layout");
            fallback_plan(&text_fields, &image_fields, page_width, page_height, config)
        }
    };

    let mut template = Template::single_page(page_width, page_height);
    let mut z = 0;

    for element in text_elements(&plan, &text_fields, sample, page_height, config, measurer) {
        let mut element = element;
        element.frame.z = z;
        z += 1;
        template.push(element);
    }
    for element in image_elements(&plan, &image_fields, page_height, config) {
        let mut element = element;
        element.frame.z = z;
        z += 1;
        template.push(element);
    }

    template
}

fn fallback_plan(
    text_fields: &[String],
    image_fields: &[String],
    page_width: f32,
    page_height: f32,
    config: &SynthConfig,
) -> Plan {
    let margin = config.margin_frac * page_width.min(page_height);
    let (text, image) = if image_fields.is_empty() {
        (
            (
                margin,
                margin,
                page_width - 2.0 * margin,
                page_height - 2.0 * margin,
            ),
            None,
        )
    } else {
        // Text on the left, image band on the right
        let split = config.text_width_with_images * page_width;
        (
            (margin, margin, split - 1.5 * margin, page_height - 2.0 * margin),
            Some((
                split + 0.5 * margin,
                margin,
                page_width - margin - (split + 0.5 * margin),
                page_height - 2.0 * margin,
            )),
        )
    };

    Plan {
        text,
        image,
        image_aspect: None,
        combine: text_fields.len() >= config.combine_threshold,
        tier: effective_tier_for(ScaleTier::default(), text_fields, false, config),
        align: TextAlign::Left,
    }
}

fn plan_from_spec(
    layout_spec: &LayoutSpec,
    text_fields: &[String],
    image_fields: &[String],
    page_width: f32,
    page_height: f32,
    config: &SynthConfig,
) -> Plan {
    let fallback = fallback_plan(text_fields, image_fields, page_width, page_height, config);

    let text_region = spec::clamp_text_region(layout_spec, !image_fields.is_empty(), config);
    let text = match text_region {
        Some(region) => region.to_physical(page_width, page_height),
        None => {
            debug!("layout spec text region implausible; using fallback geometry");
            fallback.text
        }
    };

    let image = if image_fields.is_empty() {
        None
    } else {
        match layout_spec.image_region.and_then(|r| r.clamped()) {
            Some(region) => Some(region.to_physical(page_width, page_height)),
            None => fallback.image,
        }
    };

    let badge_like = image.is_some()
        && text_region.is_some_and(|r| r.width < config.badge_text_width_frac);

    Plan {
        text,
        image,
        image_aspect: layout_spec
            .image_aspect
            .filter(|a| a.is_finite() && *a > 0.0),
        combine: layout_spec.combine_text,
        tier: effective_tier_for(layout_spec.scale_tier, text_fields, badge_like, config),
        align: layout_spec.align,
    }
}

fn effective_tier_for(
    requested: ScaleTier,
    text_fields: &[String],
    badge_like: bool,
    config: &SynthConfig,
) -> ScaleTier {
    spec::effective_tier(requested, text_fields.len(), badge_like, config)
}

/// The sample value used to drive font sizing for one field. Falls back to
/// the field name itself so sizing stays reasonable on sparse samples.
fn sample_value<'a>(field: &'a str, sample: &'a Record) -> &'a str {
    tokens::resolve_field(sample, field).unwrap_or(field)
}

fn token_for(field: &str) -> String {
    format!("{{{{{}}}}}", field)
}

fn solved_style(
    sample_text: &str,
    box_width: f32,
    box_height: f32,
    plan: &Plan,
    page_height: f32,
    config: &SynthConfig,
    measurer: Option<&dyn TextMeasurer>,
) -> TextStyle {
    let cap = plan.tier.cap_frac(config) * page_height;
    let constraints = FitConstraints {
        min_size: config.min_font_size,
        max_size: cap.max(config.min_font_size),
        ..FitConstraints::default()
    };
    let solved = fit_font_size(sample_text, box_width, box_height, &constraints, measurer);
    let font_size = (solved * plan.tier.multiplier(config)).max(config.min_font_size);

    TextStyle {
        font_size,
        align: plan.align,
        ..TextStyle::default()
    }
}

fn text_elements(
    plan: &Plan,
    text_fields: &[String],
    sample: &Record,
    page_height: f32,
    config: &SynthConfig,
    measurer: Option<&dyn TextMeasurer>,
) -> Vec<Element> {
    if text_fields.is_empty() {
        return Vec::new();
    }
    let (x, y, width, height) = plan.text;

    if plan.combine {
        // One block, one font size, solved against the combined sample
        let content: Vec<String> = text_fields.iter().map(|f| token_for(f)).collect();
        let sample_text: Vec<&str> = text_fields.iter().map(|f| sample_value(f, sample)).collect();
        let style = solved_style(
            &sample_text.join("\n"),
            width,
            height,
            plan,
            page_height,
            config,
            measurer,
        );
        return vec![Element::new(
            Frame::at(x, y, width, height),
            ElementKind::Text(TextElement {
                content: content.join("\n"),
                style,
            }),
        )];
    }

    // Stacked: one element per field, each solved against its own box
    let count = text_fields.len();
    let gap = config.stack_gap_frac * page_height;
    let box_height = ((height - gap * (count as f32 - 1.0)) / count as f32).max(1.0);

    text_fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let box_y = y + i as f32 * (box_height + gap);
            let style = solved_style(
                sample_value(field, sample),
                width,
                box_height,
                plan,
                page_height,
                config,
                measurer,
            );
            Element::new(
                Frame::at(x, box_y, width, box_height),
                ElementKind::Text(TextElement {
                    content: token_for(field),
                    style,
                }),
            )
        })
        .collect()
}

fn image_elements(
    plan: &Plan,
    image_fields: &[String],
    page_height: f32,
    config: &SynthConfig,
) -> Vec<Element> {
    let Some((x, y, width, height)) = plan.image else {
        return Vec::new();
    };
    if image_fields.is_empty() {
        return Vec::new();
    }

    let count = image_fields.len();
    let gap = config.image_gap_frac * page_height;
    let slot_height = ((height - gap * (count as f32 - 1.0)) / count as f32).max(1.0);

    image_fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let aspect = plan
                .image_aspect
                .unwrap_or_else(|| inferred_aspect(field, config));
            // Fit the aspect box into the slot, centered
            let (w, h) = if slot_height * aspect <= width {
                (slot_height * aspect, slot_height)
            } else {
                (width, width / aspect)
            };
            let slot_y = y + i as f32 * (slot_height + gap);
            let frame = Frame::at(
                x + (width - w) / 2.0,
                slot_y + (slot_height - h) / 2.0,
                w,
                h,
            );
            Element::new(frame, ElementKind::Image(ImageElement::bound(field.clone())))
        })
        .collect()
}
