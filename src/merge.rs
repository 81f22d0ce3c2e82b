//! Layout merge ("un-resolve"): fold edits made on a resolved scene back
//! into the canonical template.
//!
//! While a scene is displayed, the user may move, resize, restyle, add, or
//! delete elements — but they are looking at *substituted* content. The
//! merge carries the layout/style edits into the template while keeping the
//! template's tokens and bindings, so the next record resolves with the new
//! layout and the right data.
//!
//! This is the only path through which new element identifiers enter a
//! template.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::template::{Element, ElementKind, Page, ResolvedScene, Template};

/// Merge an edited scene into its base template, producing the new
/// canonical template.
///
/// Per base element still present in the scene (matched by id): geometry
/// (position, size, rotation, opacity, z) is copied; text elements copy
/// typographic style but keep the template's tokenized content; image
/// elements copy crop only, keeping binding and source. Base elements whose
/// id no longer appears in the scene were deleted by the user and are
/// dropped. Scene elements with unknown ids are user insertions and are
/// appended as-is (their content carries no token by construction).
///
/// Callers navigating records must await this merge before resolving the
/// next record's scene, or in-progress edits are silently lost.
///
/// Merging an unedited resolution of a template back into itself
/// reproduces that template.
pub fn merge_scene(scene: &ResolvedScene, base: &Template) -> Template {
    let mut merged = Template {
        pages: Vec::with_capacity(base.pages.len()),
    };

    for (page_index, base_page) in base.pages.iter().enumerate() {
        let Some(scene_page) = scene.pages.get(page_index) else {
            // The host never removes pages mid-edit; keep the base page.
            merged.pages.push(base_page.clone());
            continue;
        };
        merged.pages.push(merge_page(scene_page, base_page));
    }

    merged
}

fn merge_page(scene_page: &Page, base_page: &Page) -> Page {
    let scene_by_id: HashMap<&str, &Element> = scene_page
        .elements
        .iter()
        .map(|el| (el.id.as_str(), el))
        .collect();
    let base_ids: HashSet<&str> = base_page.elements.iter().map(|el| el.id.as_str()).collect();

    let mut page = Page {
        width: base_page.width,
        height: base_page.height,
        // Background edits are scene edits like any other
        background: scene_page.background.clone(),
        elements: Vec::with_capacity(base_page.elements.len()),
    };

    for base_el in &base_page.elements {
        match scene_by_id.get(base_el.id.as_str()) {
            Some(scene_el) => page.elements.push(merge_element(base_el, scene_el)),
            None => {
                // Deleted by the user. A host that regenerated the id lands
                // here too and gets a delete + re-add below.
                debug!(id = %base_el.id, "element removed during merge");
            }
        }
    }

    // User insertions, in scene order
    for scene_el in &scene_page.elements {
        if !base_ids.contains(scene_el.id.as_str()) {
            let mut el = scene_el.clone();
            el.clear_resolved();
            page.elements.push(el);
        }
    }

    page
}

/// One reconciled element: the base's variable bindings with the scene's
/// layout edits.
fn merge_element(base: &Element, scene: &Element) -> Element {
    let mut out = base.clone();
    out.frame = scene.frame;

    match (&mut out.kind, &scene.kind) {
        (ElementKind::Text(text), ElementKind::Text(edited)) => {
            // Style yes, content no — the template keeps its token
            text.style = edited.style.clone();
        }
        (ElementKind::Image(image), ElementKind::Image(edited)) => {
            // Crop yes, source/binding no — the resolved source is
            // record-specific
            image.crop = edited.crop;
        }
        // barcode/qr/sequence carry only config the user edits through the
        // template directly; a scene's regenerated symbol never lands here.
        // A kind mismatch (host rewrote the element wholesale under the
        // same id) keeps the base's binding, same as geometry-only kinds.
        _ => {}
    }

    out
}
