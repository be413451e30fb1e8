//! Deep merge of two configuration documents.

use super::Document;

/// Merge `overlay` on top of `base`, returning a new document.
///
/// Neither input is modified. The rules are:
///
/// - A `null` overlay is treated as an empty mapping.
/// - Mapping over mapping: start from a copy of `base`; keys present in both
///   are merged recursively, keys only in `overlay` are copied in, keys only
///   in `base` are kept unchanged.
/// - Anything else (sequence base, scalar base, or mismatched types): the
///   overlay replaces the base subtree wholesale. Sequences are never merged
///   element-wise.
///
/// # Examples
///
/// ```rust
/// use golangcix::core::{merge, normalize};
///
/// let base = normalize(b"run: {timeout: 5m, tests: true}").unwrap();
/// let local = normalize(b"run: {timeout: 2m}").unwrap();
/// let merged = merge(&base, &local);
/// assert_eq!(merged, normalize(b"run: {timeout: 2m, tests: true}").unwrap());
/// ```
pub fn merge(base: &Document, overlay: &Document) -> Document {
    if overlay.is_null() {
        return merge(base, &Document::empty_mapping());
    }

    match (base, overlay) {
        (Document::Mapping(base_map), Document::Mapping(overlay_map)) => {
            let mut result = base_map.clone();
            for (key, value) in overlay_map {
                let merged = match result.get(key) {
                    Some(existing) => merge(existing, value),
                    None => value.clone(),
                };
                result.insert(key.clone(), merged);
            }
            Document::Mapping(result)
        }
        _ => overlay.clone(),
    }
}
