//! Browser fingerprint sent to the fund-data upstreams
//!
//! The upstream APIs reject requests that do not look like they come from a
//! desktop browser, so every proxied request carries exactly this header set
//! instead of the client's own headers.

use hyper::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, REFERER,
    USER_AGENT,
};

use crate::config::UpstreamConfig;
use crate::logger;

/// Build the fixed upstream header set from configuration
pub fn browser_headers(upstream: &UpstreamConfig) -> HeaderMap {
    let entries: [(HeaderName, &str); 5] = [
        (USER_AGENT, &upstream.user_agent),
        (REFERER, &upstream.referer),
        (ACCEPT, "*/*"),
        (ACCEPT_LANGUAGE, &upstream.accept_language),
        (CACHE_CONTROL, "no-cache"),
    ];

    let mut headers = HeaderMap::with_capacity(entries.len());
    for (name, value) in entries {
        match HeaderValue::from_str(value) {
            Ok(v) => {
                headers.insert(name, v);
            }
            Err(e) => {
                logger::log_warning(&format!("Skipping invalid upstream header {name}: {e}"));
            }
        }
    }
    headers
}
