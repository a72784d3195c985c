//! CORS header set
//!
//! The proxy exists so that a page opened from anywhere can call the fund
//! APIs, so the same permissive set goes on every response.

use hyper::header::{HeaderMap, HeaderName, HeaderValue};
use hyper::http::response::Builder;

/// Header names are lowercase, as `HeaderName::from_static` requires
pub const CORS_HEADERS: [(&str, &str); 4] = [
    ("access-control-allow-origin", "*"),
    (
        "access-control-allow-methods",
        "GET, POST, PUT, DELETE, OPTIONS",
    ),
    (
        "access-control-allow-headers",
        "Content-Type, Authorization, X-Requested-With",
    ),
    ("access-control-allow-credentials", "true"),
];

/// Add the CORS headers to a response builder
pub fn with_cors(builder: Builder) -> Builder {
    CORS_HEADERS
        .iter()
        .fold(builder, |b, (name, value)| b.header(*name, *value))
}

/// Add CORS headers the map does not already carry
///
/// Used on relayed upstream responses, where the upstream's own value wins.
pub fn fill_missing(headers: &mut HeaderMap) {
    for (name, value) in CORS_HEADERS {
        headers
            .entry(HeaderName::from_static(name))
            .or_insert_with(|| HeaderValue::from_static(value));
    }
}
