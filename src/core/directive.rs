//! Remote configuration directive embedded in comment lines.

use crate::error::{ConfigError, Result};
use regex::Regex;
use reqwest::Url;
use std::sync::LazyLock;

/// Marker naming the remote base configuration inside a comment.
pub const REMOTE_DIRECTIVE: &str = "GOLANGCI_LINT_REMOTE_CONFIG";

static DIRECTIVE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i){REMOTE_DIRECTIVE}:\s*(\S+)"))
        .unwrap_or_else(|e| unreachable!("directive pattern is valid: {e}"))
});

/// Find the first remote configuration URL declared in a comment line.
///
/// Only lines starting with `#` or `//` (after trimming) are considered.
/// The first matching line wins, even if its URL turns out to be invalid.
///
/// # Errors
///
/// Returns [`ConfigError::NoUrlFound`] if no comment carries the directive or
/// the URL after it cannot be normalized.
///
/// # Examples
///
/// ```rust
/// use golangcix::core::extract_remote_url;
///
/// let data = b"# GOLANGCI_LINT_REMOTE_CONFIG: https://example.com/base.yml\nrun: {}\n";
/// let url = extract_remote_url(data).unwrap();
/// assert_eq!(url.as_str(), "https://example.com/base.yml");
/// ```
pub fn extract_remote_url(data: &[u8]) -> Result<Url> {
    let text = String::from_utf8_lossy(data);

    let token = text
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('#') || line.starts_with("//"))
        .find_map(|line| {
            DIRECTIVE_PATTERN
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
        })
        .ok_or(ConfigError::NoUrlFound)?;

    normalize_url(&token).inspect_err(|e| {
        tracing::debug!(token = %token, error = %e, "Ignoring invalid remote configuration URL");
    })
}

/// Normalize a remote URL so equivalent spellings share one cache entry.
///
/// Scheme and host are lowercased, default ports and fragments are removed,
/// and query segments are sorted by key without being re-encoded. Only
/// `http` and `https` are accepted.
///
/// # Errors
///
/// Returns [`ConfigError::NoUrlFound`] if the token is not an absolute
/// http(s) URL or contains control characters.
pub fn normalize_url(raw: &str) -> Result<Url> {
    if raw.is_empty() || raw.chars().any(char::is_control) {
        return Err(ConfigError::NoUrlFound);
    }

    let mut url = Url::parse(raw).map_err(|_| ConfigError::NoUrlFound)?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ConfigError::NoUrlFound);
    }

    url.set_fragment(None);

    let sorted = url.query().map(|query| {
        let mut segments: Vec<&str> = query.split('&').filter(|s| !s.is_empty()).collect();
        segments.sort_by(|a, b| query_key(a).cmp(query_key(b)));
        segments.join("&")
    });
    url.set_query(sorted.as_deref().filter(|q| !q.is_empty()));

    Ok(url)
}

/// Key part of a raw `key=value` query segment.
fn query_key(segment: &str) -> &str {
    segment.split_once('=').map_or(segment, |(key, _)| key)
}
