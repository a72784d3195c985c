//! Upstream request forwarding
//!
//! Relays one client request to one upstream URL. The client's method and
//! body go through untouched, its headers are replaced by the fixed browser
//! set, and the upstream response is streamed back frame by frame.

use futures_util::{future, Stream, TryStreamExt};
use http_body_util::{BodyExt, BodyStream, StreamBody};
use hyper::body::{Body, Bytes, Frame};
use hyper::{Request, Response};

use super::error::ProxyError;
use super::target::ProxyTarget;
use crate::config::AppState;
use crate::http::{self, cors, BoxError, ResponseBody};
use crate::logger;

/// Connection-scoped headers that must not be relayed; hyper re-frames the body
const HOP_BY_HOP: [&str; 5] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "upgrade",
];

/// Forward a request to `target` and return the response to send the client
///
/// Never fails: an upstream that cannot be reached becomes a `500` with a
/// JSON error body. Failures after the response head is returned only end
/// the body stream early.
pub async fn forward<B>(
    req: Request<B>,
    target: &ProxyTarget,
    state: &AppState,
) -> Response<ResponseBody>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send,
{
    match send_upstream(req, target, state).await {
        Ok(upstream) => relay(upstream),
        Err(e) => {
            let message = e.message();
            logger::log_proxy_failure(target.name(), &message);
            http::build_proxy_error_response(&message)
        }
    }
}

async fn send_upstream<B>(
    req: Request<B>,
    target: &ProxyTarget,
    state: &AppState,
) -> Result<reqwest::Response, ProxyError>
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError> + Send,
{
    let url = target.url(&state.config.upstream)?;
    logger::log_proxy_forward(target.name(), &url);

    let (parts, body) = req.into_parts();
    let mut builder = state
        .client
        .request(parts.method, url)
        .headers(state.upstream_headers.clone());

    // An empty body stays empty instead of turning into a chunked upload
    if !body.is_end_stream() {
        builder = builder.body(reqwest::Body::wrap_stream(request_stream(body)));
    }

    Ok(builder.send().await?)
}

/// Data frames of the client body; trailers are dropped
fn request_stream<B>(body: B) -> impl Stream<Item = Result<Bytes, B::Error>> + Send + 'static
where
    B: Body<Data = Bytes> + Send + 'static,
    B::Error: Send,
{
    BodyStream::new(body).try_filter_map(|frame| future::ready(Ok(frame.into_data().ok())))
}

/// Turn the upstream response into the client response
fn relay(upstream: reqwest::Response) -> Response<ResponseBody> {
    let status = upstream.status();
    let mut headers = upstream.headers().clone();
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    cors::fill_missing(&mut headers);

    let url = upstream.url().clone();
    logger::log_proxy_response(status.as_u16(), &url);

    let frames = upstream
        .bytes_stream()
        .map_ok(Frame::data)
        .map_err(move |e| {
            logger::log_stream_aborted(&url, &e);
            BoxError::from(e)
        });

    let mut response = Response::new(StreamBody::new(frames).boxed_unsync());
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
