// Application state module
// Everything a request handler needs, built once at startup and never mutated

use hyper::HeaderMap;
use reqwest::redirect;

use super::types::Config;
use crate::proxy::headers;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Shared upstream client (connection pool)
    pub client: reqwest::Client,
    /// Fixed header set sent upstream in place of the client's headers
    pub upstream_headers: HeaderMap,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, reqwest::Error> {
        let upstream_headers = headers::browser_headers(&config.upstream);

        // Transparent relay: redirects go back to the caller untouched.
        // Upstreams are dialed directly, HTTP(S)_PROXY is ignored.
        let client = reqwest::Client::builder()
            .redirect(redirect::Policy::none())
            .no_proxy()
            .build()?;

        Ok(Self {
            config,
            client,
            upstream_headers,
        })
    }
}
