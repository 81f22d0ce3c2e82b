//! # Unified Template Model
//!
//! A single type hierarchy that is both the Rust API and the JSON contract
//! with the editing host. `Template` is constructible in Rust and
//! (de)serializable from the host's page/element payloads.
//!
//! A template is the *canonical* document: text content holds `{{token}}`
//! placeholders, barcode/QR elements hold data-source descriptors, image
//! elements hold field bindings. Resolution ([`crate::resolve`]) produces a
//! [`ResolvedScene`] — a deep copy with every token substituted — and merge
//! ([`crate::merge`]) folds layout edits made on a scene back into the
//! template without baking in record data.

pub mod types;

pub use types::*;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One flat data record: field name → value.
pub type Record = HashMap<String, String>;

/// An ephemeral, per-record rendering of a [`Template`].
///
/// Structurally identical to a template — the host reads and displays it the
/// same way — but derived, never the source of truth. Text content is
/// substituted, `rendered`/`resolved` slots are populated, and image sources
/// point at matched assets. Discard after use; edits made while a scene is
/// displayed only become durable through [`crate::merge::merge_scene`].
pub type ResolvedScene = Template;

/// The kind-discriminated element union.
///
/// The `#[serde(tag = "kind")]` attribute gives host JSON like
/// `{"kind": "text", "content": "{{Name}}", ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ElementKind {
    Text(TextElement),
    Image(ImageElement),
    Barcode(BarcodeElement),
    Qr(QrElement),
    Sequence(SequenceElement),
}

/// A positioned element on a page.
///
/// `id` is template-scoped and stable: it survives every resolve/merge
/// round-trip and is the key the merge uses to reconcile host edits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: String,
    #[serde(flatten)]
    pub frame: Frame,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    /// Create an element with a freshly generated stable identifier.
    pub fn new(frame: Frame, kind: ElementKind) -> Self {
        Self {
            id: new_element_id(),
            frame,
            kind,
        }
    }

    pub fn text(frame: Frame, content: impl Into<String>) -> Self {
        Self::new(frame, ElementKind::Text(TextElement::new(content)))
    }

    /// True when the host should render this element as a bitmap: plain
    /// images always, barcode/QR once their symbol has been regenerated.
    pub fn renders_as_image(&self) -> bool {
        match &self.kind {
            ElementKind::Image(_) => true,
            ElementKind::Barcode(b) => b.rendered.is_some(),
            ElementKind::Qr(q) => q.rendered.is_some(),
            ElementKind::Text(_) | ElementKind::Sequence(_) => false,
        }
    }

    /// Drop resolution artifacts (regenerated symbols, computed sequence
    /// values) so the element is template-clean.
    pub fn clear_resolved(&mut self) {
        match &mut self.kind {
            ElementKind::Barcode(b) => b.rendered = None,
            ElementKind::Qr(q) => q.rendered = None,
            ElementKind::Sequence(s) => s.resolved = None,
            ElementKind::Text(_) | ElementKind::Image(_) => {}
        }
    }
}

/// Generate a fresh template-scoped element identifier.
pub fn new_element_id() -> String {
    Uuid::new_v4().to_string()
}

/// One page: physical size, optional background, ordered elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub width: f32,
    pub height: f32,
    /// Background fill (color string or asset URL). `None` = host default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<String>,
    #[serde(default)]
    pub elements: Vec<Element>,
}

impl Page {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            background: None,
            elements: Vec::new(),
        }
    }
}

/// The canonical, token-preserving document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Template {
    #[serde(default)]
    pub pages: Vec<Page>,
}

impl Template {
    /// Create a single-page template of the given physical size.
    pub fn single_page(width: f32, height: f32) -> Self {
        Self {
            pages: vec![Page::new(width, height)],
        }
    }

    /// Add an element to the first page (creating it is the caller's job).
    pub fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.first_mut() {
            page.elements.push(element);
        }
    }

    /// Iterate all elements across all pages.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.pages.iter().flat_map(|p| p.elements.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_element_json_tagging() {
        let el = Element::text(Frame::at(10.0, 20.0, 100.0, 30.0), "{{Name}}");
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["content"], "{{Name}}");
        assert_eq!(json["x"], 10.0);

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }

    #[test]
    fn test_template_json_roundtrip() {
        let mut template = Template::single_page(210.0, 297.0);
        template.push(Element::text(Frame::at(0.0, 0.0, 50.0, 10.0), "{{City}}"));
        template.push(Element::new(
            Frame::at(0.0, 20.0, 40.0, 40.0),
            ElementKind::Qr(QrElement::field("ProfileUrl")),
        ));

        let json = serde_json::to_string(&template).unwrap();
        let back: Template = serde_json::from_str(&json).unwrap();
        assert_eq!(back, template);
    }

    #[test]
    fn test_host_payload_shape() {
        // The shape the editing host reads back after user edits
        let json = r#"{
            "pages": [{
                "width": 210.0, "height": 297.0,
                "elements": [
                    {"id": "e1", "kind": "text", "x": 5.0, "y": 5.0,
                     "width": 90.0, "height": 12.0, "content": "{{Name}}"},
                    {"id": "e2", "kind": "barcode", "x": 5.0, "y": 30.0,
                     "width": 60.0, "height": 20.0, "symbology": "code128",
                     "source": {"source_type": "field", "value": "Sku"}}
                ]
            }]
        }"#;
        let template: Template = serde_json::from_str(json).unwrap();
        assert_eq!(template.elements().count(), 2);
        assert!(matches!(
            &template.pages[0].elements[1].kind,
            ElementKind::Barcode(b) if b.symbology == Symbology::Code128
        ));
    }

    #[test]
    fn test_new_ids_are_unique() {
        let a = new_element_id();
        let b = new_element_id();
        assert_ne!(a, b);
    }
}
