//! # imprint
//!
//! Core engine for variable data printing: take a layout template with
//! `{{token}}` placeholders and a dataset of records, and produce one
//! fully resolved scene per record.
//!
//! ## What it does
//!
//! - **Token resolution** with fuzzy field matching (exact, case-insensitive,
//!   normalized, substring), failing open on unknown tokens
//! - **Scene resolution**: substitute text, regenerate barcode/QR symbols,
//!   compute sequence numbers, and match image bindings against an asset
//!   pool — per record, without ever mutating the template
//! - **Layout merge**: fold geometry/style edits made on a resolved scene
//!   back into the canonical template, keeping tokens and bindings intact
//! - **Image matching & caching**: normalized asset-name matching plus an
//!   LRU byte cache with async prefetch around the current record
//! - **Text-fit estimation** and **layout synthesis** for bootstrapping a
//!   template from a bare dataset
//!
//! ## Example
//!
//! ```
//! use imprint::{
//!     resolve_scene, AssetPool, Element, ElementKind, Frame, QrElement, Record, Template,
//! };
//!
//! let mut template = Template::single_page(210.0, 297.0);
//! template.push(Element::text(Frame::at(10.0, 10.0, 100.0, 15.0), "{{Name}}"));
//! template.push(Element::new(
//!     Frame::at(10.0, 30.0, 40.0, 40.0),
//!     ElementKind::Qr(QrElement::field("ProfileUrl")),
//! ));
//!
//! let record: Record = [
//!     ("Name".to_string(), "Ann".to_string()),
//!     ("ProfileUrl".to_string(), "http://example.com/1".to_string()),
//! ]
//! .into();
//!
//! let scene = resolve_scene(&template, &record, 0, &AssetPool::new(), None);
//! match &scene.pages[0].elements[0].kind {
//!     ElementKind::Text(t) => assert_eq!(t.content, "Ann"),
//!     _ => unreachable!(),
//! }
//! ```

pub mod assets;
pub mod error;
pub mod fit;
pub mod merge;
pub mod resolve;
pub mod synth;
pub mod template;

pub use assets::{AssetPool, ImageCache};
pub use error::ImprintError;
pub use fit::{fit_font_size, FitConstraints, GlyphMeasurer, TextMeasurer};
pub use merge::merge_scene;
pub use resolve::{resolve_batch, resolve_scene};
pub use synth::{synthesize_layout, LayoutSpec, ScaleTier, SynthConfig};
pub use template::{
    BarcodeElement, Crop, DataSource, Element, ElementKind, Frame, ImageElement, Page, QrElement,
    QrErrorLevel, Record, RenderedSymbol, ResolvedScene, SequenceElement, Symbology, Template,
    TextAlign, TextElement, TextStyle,
};
