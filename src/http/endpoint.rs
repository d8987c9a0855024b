//! Resolution of request paths against the configured base URL.

use url::Url;

use super::error::{Error, Result};

/// Returns true if `path` already carries an `http` or `https` scheme.
pub fn is_absolute(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}

/// Joins `base_url` and `path` with exactly one slash between them.
///
/// Query strings in `path` are kept as-is.
pub fn join(base_url: &str, path: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let path = path.strip_prefix('/').unwrap_or(path);
    format!("{}/{}", base, path)
}

/// Produces the absolute URL for a request path.
pub fn resolve(base_url: &str, path: &str) -> Result<Url> {
    let target = if is_absolute(path) {
        path.to_string()
    } else {
        join(base_url, path)
    };

    Url::parse(&target)
        .map_err(|e| Error::InvalidRequest(format!("invalid URL \"{}\": {}", target, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_leading_slash_path() {
        let url = resolve("https://host/api", "/campaigns").unwrap();
        assert_eq!(url.as_str(), "https://host/api/campaigns");
    }

    #[test]
    fn test_resolve_trailing_slash_base() {
        let url = resolve("https://host/api/", "campaigns").unwrap();
        assert_eq!(url.as_str(), "https://host/api/campaigns");
    }

    #[test]
    fn test_resolve_both_slashes() {
        let url = resolve("https://host/api/", "/campaigns").unwrap();
        assert_eq!(url.as_str(), "https://host/api/campaigns");
    }

    #[test]
    fn test_resolve_neither_slash() {
        let url = resolve("https://host/api", "campaigns").unwrap();
        assert_eq!(url.as_str(), "https://host/api/campaigns");
    }

    #[test]
    fn test_resolve_root_base() {
        let url = resolve("http://localhost:9000", "/api/lists").unwrap();
        assert_eq!(url.as_str(), "http://localhost:9000/api/lists");
    }

    #[test]
    fn test_resolve_keeps_query() {
        let url = resolve("https://host", "/api/lists?page=2&per_page=10").unwrap();
        assert_eq!(url.as_str(), "https://host/api/lists?page=2&per_page=10");
        assert_eq!(url.query(), Some("page=2&per_page=10"));
    }

    #[test]
    fn test_resolve_absolute_path_unchanged() {
        let url = resolve("https://host/api", "https://other.example.com/x?y=1").unwrap();
        assert_eq!(url.as_str(), "https://other.example.com/x?y=1");

        let url = resolve("https://host/api", "http://plain.example.com/").unwrap();
        assert_eq!(url.as_str(), "http://plain.example.com/");
    }

    #[test]
    fn test_resolve_only_strips_one_leading_slash() {
        assert_eq!(join("https://host", "//x"), "https://host//x");
    }

    #[test]
    fn test_resolve_invalid_absolute_url() {
        let err = resolve("https://host", "http://").unwrap_err();
        assert!(matches!(err, Error::InvalidRequest(_)));
    }

    #[test]
    fn test_is_absolute() {
        assert!(is_absolute("http://a"));
        assert!(is_absolute("https://a"));
        assert!(!is_absolute("/api/lists"));
        assert!(!is_absolute("api/lists"));
        assert!(!is_absolute("ftp://a"));
    }
}
