//! Resolution of manifest asset paths.

use backdrop_error::{EntryError, EntryErrorKind};
use url::Url;

/// Resolve a manifest asset path against the asset base URL.
///
/// Absolute URLs pass through unchanged; relative paths are joined onto `base`.
///
/// # Examples
///
/// ```
/// use backdrop_core::resolve_asset_url;
/// use url::Url;
///
/// let base = Url::parse("https://assets.example.com/themes/").unwrap();
/// let url = resolve_asset_url(&base, "img-001", "thumbs/img-001.webp").unwrap();
/// assert_eq!(url.as_str(), "https://assets.example.com/themes/thumbs/img-001.webp");
/// ```
pub fn resolve_asset_url(base: &Url, id: &str, path: &str) -> Result<Url, EntryError> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(EntryError::new(EntryErrorKind::UnresolvableUrl {
            id: id.to_string(),
            url: path.to_string(),
        }));
    }

    base.join(trimmed).map_err(|e| {
        tracing::debug!(id, path, error = %e, "Failed to resolve asset url");
        EntryError::new(EntryErrorKind::UnresolvableUrl {
            id: id.to_string(),
            url: path.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_urls_are_kept() {
        let base = Url::parse("https://assets.example.com/").unwrap();
        let url = resolve_asset_url(&base, "a", "https://cdn.example.org/a.mp4").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.org/a.mp4");
    }

    #[test]
    fn root_relative_paths_replace_base_path() {
        let base = Url::parse("https://assets.example.com/themes/").unwrap();
        let url = resolve_asset_url(&base, "a", "/media/a.jpg").unwrap();
        assert_eq!(url.as_str(), "https://assets.example.com/media/a.jpg");
    }

    #[test]
    fn blank_paths_are_rejected() {
        let base = Url::parse("https://assets.example.com/").unwrap();
        let err = resolve_asset_url(&base, "a", "   ").unwrap_err();
        assert!(matches!(err.kind, EntryErrorKind::UnresolvableUrl { .. }));
    }
}
