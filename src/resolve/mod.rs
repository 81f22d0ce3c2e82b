//! Scene resolution: template × record → display-ready scene.
//!
//! `resolve_scene` deep-copies the template and substitutes every variable
//! binding for one record: text tokens, sequence numbers, barcode/QR
//! payloads (with symbol regeneration), and image bindings matched against
//! the asset pool. The template itself is never mutated — that is what
//! keeps it reusable for the next record.
//!
//! Failure policy: a single malformed element never aborts the scene. Each
//! element resolves independently; on error it keeps its prior state and
//! the failure is logged.

pub mod symbol;
pub mod tokens;

use tracing::{error, warn};

use crate::assets::{self, AssetPool, ImageCache};
use crate::template::{
    DataSource, Element, ElementKind, Record, ResolvedScene, Template,
};
use crate::ImprintError;

/// Resolve one record against a template, producing the scene the host
/// displays for that record.
///
/// `record_index` is the record's ordinal position in its batch and feeds
/// only sequence-number elements. The cache is optional; when present,
/// matched asset URLs are touched so navigation keeps them warm — lookup
/// never blocks, and a cache miss simply leaves the direct URL in place.
pub fn resolve_scene(
    template: &Template,
    record: &Record,
    record_index: usize,
    pool: &AssetPool,
    cache: Option<&ImageCache>,
) -> ResolvedScene {
    let mut scene = template.clone();
    for page in &mut scene.pages {
        for element in &mut page.elements {
            if let Err(e) = resolve_element(element, record, record_index, pool, cache) {
                error!(
                    id = %element.id,
                    error = %e,
                    "element resolution failed; keeping prior state"
                );
            }
        }
    }
    scene
}

/// Resolve a whole batch for export: one scene per record, record index =
/// array position. Per-record element failures degrade exactly as in
/// [`resolve_scene`]; a bad record never aborts the remaining records.
pub fn resolve_batch(
    template: &Template,
    records: &[Record],
    pool: &AssetPool,
    cache: Option<&ImageCache>,
) -> Vec<ResolvedScene> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| resolve_scene(template, record, index, pool, cache))
        .collect()
}

fn resolve_element(
    element: &mut Element,
    record: &Record,
    record_index: usize,
    pool: &AssetPool,
    cache: Option<&ImageCache>,
) -> Result<(), ImprintError> {
    match &mut element.kind {
        ElementKind::Text(text) => {
            text.content = tokens::substitute_tokens(&text.content, record);
            Ok(())
        }
        ElementKind::Sequence(seq) => {
            seq.resolved = Some(seq.format(record_index as u64));
            Ok(())
        }
        ElementKind::Barcode(barcode) => {
            let Some(data) = payload(&barcode.source, record) else {
                return Ok(()); // unresolved binding: keep prior rendered symbol
            };
            barcode.rendered = Some(symbol::render_barcode(&data, barcode.symbology)?);
            Ok(())
        }
        ElementKind::Qr(qr) => {
            let Some(data) = payload(&qr.source, record) else {
                return Ok(());
            };
            qr.rendered = Some(symbol::render_qr(&data, qr.error_level)?);
            Ok(())
        }
        ElementKind::Image(image) => {
            let Some(binding) = image.binding.clone() else {
                return Ok(()); // static image, nothing to resolve
            };
            let field = tokens::binding_field_name(&binding);
            let Some(value) = tokens::resolve_field(record, field) else {
                return Ok(()); // diagnostic already emitted; keep prior source
            };
            if let Some(url) = pool.match_value(value) {
                if let Some(cache) = cache {
                    cache.touch(url);
                }
                image.source = Some(url.to_string());
            } else if assets::looks_like_image_reference(value) {
                // Last resort: the field value is itself a usable reference
                image.source = Some(value.trim().to_string());
            } else {
                warn!(field, value, "no pool asset matches image binding");
                image.source = None;
            }
            Ok(())
        }
    }
}

/// Compute a barcode/QR payload from its data source.
///
/// `Static` values pass through untouched. `Field` bindings resolve with
/// the fuzzy rules, then any literal tokens *inside* the resolved value
/// are substituted too. Returns `None` when a field binding resolves to
/// nothing, so the element keeps its prior symbol.
fn payload(source: &DataSource, record: &Record) -> Option<String> {
    match source {
        DataSource::Static(value) => Some(value.clone()),
        DataSource::Field(name) => {
            let field = tokens::binding_field_name(name);
            let value = tokens::resolve_field(record, field)?;
            Some(tokens::substitute_tokens(value, record))
        }
    }
}
