//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: classifies each request and
//! dispatches to the preflight reply, the upstream proxy, or static files.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use chrono::Local;
use hyper::body::{Body, Bytes};
use hyper::{Method, Request, Response, Version};

use crate::config::AppState;
use crate::handler::static_files;
use crate::http::{self, BoxError, ResponseBody};
use crate::logger::{self, AccessLogEntry};
use crate::proxy::{self, ProxyTarget};

/// What a request resolves to, in dispatch priority order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// `OPTIONS` on any path
    Preflight,
    /// Valid fund API path
    Proxy(ProxyTarget),
    /// Everything else, including malformed API paths
    Static,
}

impl Route {
    const fn name(&self) -> &'static str {
        match self {
            Self::Preflight => "preflight",
            Self::Proxy(target) => target.name(),
            Self::Static => "static",
        }
    }
}

/// Classify a request by method, path and query string
pub fn classify(method: &Method, path: &str, query: Option<&str>, extended_routes: bool) -> Route {
    if *method == Method::OPTIONS {
        return Route::Preflight;
    }

    ProxyTarget::match_route(path, query, extended_routes).map_or(Route::Static, Route::Proxy)
}

/// Request details kept for the access log after the request is consumed
struct RequestContext {
    remote_addr: SocketAddr,
    method: Method,
    path: String,
    query: Option<String>,
    version: Version,
    referer: Option<String>,
    user_agent: Option<String>,
    started: Instant,
}

impl RequestContext {
    fn capture<B>(req: &Request<B>, remote_addr: SocketAddr) -> Self {
        let header = |name: &str| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            remote_addr,
            method: req.method().clone(),
            path: req.uri().path().to_string(),
            query: req.uri().query().map(ToString::to_string),
            version: req.version(),
            referer: header("referer"),
            user_agent: header("user-agent"),
            started: Instant::now(),
        }
    }

    fn into_entry(self, route: &'static str, response: &Response<ResponseBody>) -> AccessLogEntry {
        AccessLogEntry {
            remote_addr: self.remote_addr,
            time: Local::now(),
            method: self.method.to_string(),
            path: self.path,
            query: self.query,
            http_version: version_str(self.version).to_string(),
            route,
            status: response.status().as_u16(),
            body_bytes: response.body().size_hint().exact(),
            referer: self.referer,
            user_agent: self.user_agent,
            elapsed: self.started.elapsed(),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<ResponseBody>, Infallible>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send,
{
    logger::log_request(req.method(), req.uri());

    let route = classify(
        req.method(),
        req.uri().path(),
        req.uri().query(),
        state.config.upstream.extended_routes,
    );
    let ctx = state
        .config
        .logging
        .access_log
        .then(|| RequestContext::capture(&req, remote_addr));

    let route_name = route.name();
    let response = match route {
        Route::Preflight => http::build_options_response(),
        Route::Proxy(target) => proxy::forward(req, &target, &state).await,
        Route::Static => {
            let path = req.uri().path().to_string();
            static_files::serve(&path, &state.config.static_files).await
        }
    };

    if let Some(ctx) = ctx {
        let entry = ctx.into_entry(route_name, &response);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

const fn version_str(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}
