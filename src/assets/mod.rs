//! Asset pool and identifier matching.
//!
//! Record values rarely name assets exactly — they arrive as bare names,
//! file names, full paths, or URLs. Matching normalizes both sides down to
//! a bare, extensionless, case-folded name and compares for equality.

pub mod cache;

pub use cache::{CachedAsset, ImageCache};

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Image file extensions stripped during normalization and recognized when
/// deciding whether a record value looks like an image reference.
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "svg", "bmp", "tif", "tiff"];

/// Mapping of logical asset name → retrievable URL.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetPool {
    assets: HashMap<String, String>,
}

impl AssetPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, url: impl Into<String>) {
        self.assets.insert(name.into(), url.into());
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// All retrievable URLs in the pool.
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.assets.values().map(String::as_str)
    }

    /// Find the pool entry whose normalized name equals the normalized
    /// record value. Returns the entry's URL.
    pub fn match_value(&self, value: &str) -> Option<&str> {
        let needle = normalize_asset_name(value);
        if needle.is_empty() {
            return None;
        }
        self.assets
            .iter()
            .find(|(name, _)| normalize_asset_name(name) == needle)
            .map(|(_, url)| url.as_str())
    }
}

impl FromIterator<(String, String)> for AssetPool {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            assets: iter.into_iter().collect(),
        }
    }
}

/// Normalize an asset identifier: strip path prefixes (either separator
/// convention), strip query/fragment suffixes, strip a known image
/// extension, and case-fold.
pub fn normalize_asset_name(raw: &str) -> String {
    let name = raw.trim();
    let name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let name = name.split(['?', '#']).next().unwrap_or(name);

    let lowered = name.to_lowercase();
    for ext in IMAGE_EXTENSIONS {
        if let Some(stem) = lowered.strip_suffix(ext).and_then(|s| s.strip_suffix('.')) {
            return stem.to_string();
        }
    }
    lowered
}

/// Heuristic: does this record value itself look like a retrievable image
/// reference (usable as a direct source when no pool entry matches)?
pub fn looks_like_image_reference(value: &str) -> bool {
    let v = value.trim();
    if v.starts_with("http://") || v.starts_with("https://") || v.starts_with("data:image/") {
        return true;
    }
    let path = v.split(['?', '#']).next().unwrap_or(v).to_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .any(|ext| path.strip_suffix(ext).is_some_and(|s| s.ends_with('.')))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_path_and_extension() {
        assert_eq!(normalize_asset_name("assets/logos/Acme.png"), "acme");
        assert_eq!(normalize_asset_name(r"C:\photos\Acme.JPG"), "acme");
        assert_eq!(normalize_asset_name("Acme"), "acme");
    }

    #[test]
    fn test_normalize_strips_query() {
        assert_eq!(
            normalize_asset_name("https://cdn.example.com/img/Acme.png?v=3"),
            "acme"
        );
    }

    #[test]
    fn test_normalize_keeps_unknown_extension() {
        assert_eq!(normalize_asset_name("report.pdf"), "report.pdf");
    }

    #[test]
    fn test_match_value() {
        let mut pool = AssetPool::new();
        pool.insert("Acme Logo.png", "https://cdn.example.com/acme.png");

        assert_eq!(
            pool.match_value("acme logo"),
            Some("https://cdn.example.com/acme.png")
        );
        assert_eq!(
            pool.match_value("photos/ACME LOGO.jpg"),
            Some("https://cdn.example.com/acme.png")
        );
        assert_eq!(pool.match_value("other"), None);
        assert_eq!(pool.match_value(""), None);
    }

    #[test]
    fn test_looks_like_image_reference() {
        assert!(looks_like_image_reference("https://x/photo"));
        assert!(looks_like_image_reference("photo.jpeg"));
        assert!(looks_like_image_reference("img/pic.PNG?w=100"));
        assert!(looks_like_image_reference("data:image/png;base64,AAAA"));
        assert!(!looks_like_image_reference("Ann"));
        assert!(!looks_like_image_reference("report.pdf"));
    }
}
