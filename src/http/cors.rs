//! Fixed response header injection.
//!
//! Every response leaving the server, success or error, carries the same four
//! headers: a wildcard CORS grant for local cross-port development and a
//! Cache-Control policy that disables caching entirely. Injection is a
//! decorator over a finished response, so it can be tested without touching
//! the filesystem.

use hyper::header::{HeaderName, HeaderValue};
use hyper::Response;

/// The header set stamped onto every response.
///
/// Names are lowercase so they qualify for `HeaderName::from_static`.
pub const INJECTED_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    ("access-control-allow-methods", "GET, POST, OPTIONS"),
    ("access-control-allow-headers", "*"),
    ("cache-control", "no-cache, no-store, must-revalidate"),
];

/// Stamp the fixed header set onto a response.
///
/// Uses `insert`, so a same-named header from a response builder is replaced
/// rather than duplicated. The cache-disabling policy always wins.
pub fn apply<B>(mut response: Response<B>) -> Response<B> {
    let headers = response.headers_mut();
    for (name, value) in INJECTED_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;

    #[test]
    fn test_all_headers_injected() {
        let response = apply(Response::new(Full::new(Bytes::new())));
        let headers = response.headers();
        assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
        assert_eq!(
            headers.get("Access-Control-Allow-Methods").unwrap(),
            "GET, POST, OPTIONS"
        );
        assert_eq!(headers.get("Access-Control-Allow-Headers").unwrap(), "*");
        assert_eq!(
            headers.get("Cache-Control").unwrap(),
            "no-cache, no-store, must-revalidate"
        );
    }

    #[test]
    fn test_existing_cache_control_is_replaced() {
        let response = Response::builder()
            .header("Cache-Control", "public, max-age=3600")
            .body(Full::new(Bytes::new()))
            .unwrap();

        let response = apply(response);
        let values: Vec<_> = response.headers().get_all("Cache-Control").iter().collect();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0], "no-cache, no-store, must-revalidate");
    }

    #[test]
    fn test_content_headers_untouched() {
        let response = Response::builder()
            .status(404)
            .header("Content-Type", "text/plain")
            .body(Full::new(Bytes::from("404 Not Found")))
            .unwrap();

        let response = apply(response);
        assert_eq!(response.status(), 404);
        assert_eq!(response.headers().get("Content-Type").unwrap(), "text/plain");
    }
}
