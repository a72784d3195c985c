//! HTTP response building module
//!
//! Provides builders for the handful of responses the server produces
//! itself. Relayed upstream responses are assembled in `proxy::forwarder`.

use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;
use hyper::{Response, StatusCode};
use serde_json::json;

use super::cors::with_cors;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Body type shared by buffered and streamed responses
pub type ResponseBody = UnsyncBoxBody<Bytes, BoxError>;

/// Fixed `error` field of the proxy failure body
pub const PROXY_ERROR_MESSAGE: &str = "Proxy request failed";

/// Buffered body
pub fn full(data: impl Into<Bytes>) -> ResponseBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty() -> ResponseBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// Build OPTIONS response (preflight request)
pub fn build_options_response() -> Response<ResponseBody> {
    with_cors(Response::builder().status(StatusCode::OK))
        .body(empty())
        .unwrap_or_else(|e| {
            log_build_error("OPTIONS", &e);
            Response::new(empty())
        })
}

/// Build 404 Not Found response
pub fn build_404_response() -> Response<ResponseBody> {
    with_cors(Response::builder().status(StatusCode::NOT_FOUND))
        .header("Content-Type", "text/plain")
        .body(full("File not found"))
        .unwrap_or_else(|e| {
            log_build_error("404", &e);
            Response::new(full("File not found"))
        })
}

/// Build 200 response carrying a whole file
pub fn build_file_response(data: Vec<u8>, content_type: &str) -> Response<ResponseBody> {
    let content_length = data.len();

    with_cors(Response::builder().status(StatusCode::OK))
        .header("Content-Type", content_type)
        .header("Content-Length", content_length)
        .body(full(data))
        .unwrap_or_else(|e| {
            log_build_error("200", &e);
            Response::new(empty())
        })
}

/// Build 500 response for an upstream that could not be reached
pub fn build_proxy_error_response(message: &str) -> Response<ResponseBody> {
    let body = json!({
        "error": PROXY_ERROR_MESSAGE,
        "message": message,
    })
    .to_string();

    with_cors(Response::builder().status(StatusCode::INTERNAL_SERVER_ERROR))
        .header("Content-Type", "application/json; charset=utf-8")
        .body(full(body))
        .unwrap_or_else(|e| {
            log_build_error("500", &e);
            let mut response = Response::new(empty());
            *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
            response
        })
}

/// Log response build error
fn log_build_error(status: &str, error: &hyper::http::Error) {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
}
