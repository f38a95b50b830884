//! Logical resource key derivation.
//!
//! A logical key is a URL path relative to the worker origin, as it appears
//! in the resource manifest. The origin root maps to the sentinel `/`.

/// Sentinel key for the origin root (the entry document).
pub const ROOT_KEY: &str = "/";

/// Query suffix used for cache busting; everything from it on is ignored.
pub const VERSION_QUERY: &str = "?v=";

/// Derive the logical key of a cached request URL.
///
/// Returns `None` for URLs outside `origin`.
pub fn content_key(origin: &str, url: &str) -> Option<String> {
    let rest = strip_origin(origin, url)?;
    let rest = rest.strip_prefix('/').unwrap_or(rest);
    if rest.is_empty() {
        Some(ROOT_KEY.to_string())
    } else {
        Some(rest.to_string())
    }
}

/// Derive the logical key of an incoming request URL.
///
/// Like [`content_key`], but drops a `?v=` cache-busting suffix and treats
/// the bare origin and fragment-only paths as the root.
pub fn request_key(origin: &str, url: &str) -> Option<String> {
    let rest = strip_origin(origin, url)?;
    if rest.is_empty() || rest.starts_with("/#") {
        return Some(ROOT_KEY.to_string());
    }

    let rest = rest.strip_prefix('/').unwrap_or(rest);
    let rest = match rest.find(VERSION_QUERY) {
        Some(idx) => &rest[..idx],
        None => rest,
    };

    if rest.is_empty() {
        Some(ROOT_KEY.to_string())
    } else {
        Some(rest.to_string())
    }
}

/// Whether a key is the root sentinel.
pub fn is_root(key: &str) -> bool {
    key == ROOT_KEY
}

fn strip_origin<'a>(origin: &str, url: &'a str) -> Option<&'a str> {
    let origin = origin.trim_end_matches('/');
    let rest = url.strip_prefix(origin)?;
    // "https://example.com.evil" must not pass as "https://example.com"
    if rest.is_empty() || rest.starts_with('/') {
        Some(rest)
    } else {
        None
    }
}
