//! Shared utilities for the integration tests.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use fund_proxy::config::{AppState, Config};
use fund_proxy::server;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A proxy instance running on an ephemeral port.
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }

    /// Trigger shutdown and wait for the accept loop to finish draining.
    #[allow(dead_code)]
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        tokio::time::timeout(Duration::from_secs(5), &mut self.handle)
            .await
            .expect("server did not stop in time")
            .unwrap();
    }
}

/// Start the proxy with defaults overlaid by `toml`.
pub async fn start_proxy(toml: &str) -> TestServer {
    let config = Config::from_toml_str(toml).unwrap();
    let state = Arc::new(AppState::new(config).unwrap());
    let listener = server::bind("127.0.0.1:0".parse().unwrap(), 128).unwrap();
    let addr = listener.local_addr().unwrap();

    let (tx, rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        server::serve(listener, state, async {
            let _ = rx.await;
        })
        .await;
    });

    TestServer {
        addr,
        shutdown: Some(tx),
        handle,
    }
}

/// Start a mock upstream that answers every request with its own request
/// as a `text/plain` body: the head, a blank line, then the decoded body.
///
/// The response also carries `X-Mock: echo` and an upstream-chosen
/// `Access-Control-Allow-Origin` so header relaying can be observed.
#[allow(dead_code)]
pub async fn start_echo_backend() -> SocketAddr {
    serve_backend(|mut socket| async move {
        let (head, body) = read_request(&mut socket).await;
        let mut echoed = format!("{head}\r\n\r\n").into_bytes();
        echoed.extend_from_slice(&body);

        let mut response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nX-Mock: echo\r\nAccess-Control-Allow-Origin: http://upstream.test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            echoed.len()
        )
        .into_bytes();
        response.extend_from_slice(&echoed);

        let _ = socket.write_all(&response).await;
        let _ = socket.shutdown().await;
    })
    .await
}

/// Start a mock upstream that sends `first`, holds the connection for
/// `pause`, then sends `second`.
#[allow(dead_code)]
pub async fn start_slow_backend(first: &'static str, pause: Duration, second: &'static str) -> SocketAddr {
    serve_backend(move |mut socket| async move {
        read_request(&mut socket).await;
        let head = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
            first.len() + second.len()
        );
        let _ = socket.write_all(head.as_bytes()).await;
        let _ = socket.write_all(first.as_bytes()).await;
        let _ = socket.flush().await;
        tokio::time::sleep(pause).await;
        let _ = socket.write_all(second.as_bytes()).await;
        let _ = socket.shutdown().await;
    })
    .await
}

/// Start a mock upstream that declares `declared` body bytes, sends only
/// `sent`, then closes.
#[allow(dead_code)]
pub async fn start_truncating_backend(declared: usize, sent: &'static str) -> SocketAddr {
    serve_backend(move |mut socket| async move {
        read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {declared}\r\nConnection: close\r\n\r\n{sent}"
        );
        let _ = socket.write_all(response.as_bytes()).await;
        let _ = socket.shutdown().await;
    })
    .await
}

async fn serve_backend<F, Fut>(handler: F) -> SocketAddr
where
    F: Fn(TcpStream) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((socket, _)) => {
                    tokio::spawn(handler(socket));
                }
                Err(_) => break,
            }
        }
    });

    addr
}

/// Read one request: the head (without the blank line) and the body,
/// decoded from either `Content-Length` or chunked framing.
async fn read_request(socket: &mut TcpStream) -> (String, Vec<u8>) {
    let mut buf = Vec::new();
    let head_end = loop {
        if let Some(end) = find(&buf, b"\r\n\r\n") {
            break end;
        }
        if !fill(socket, &mut buf).await {
            return (String::from_utf8_lossy(&buf).into_owned(), Vec::new());
        }
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let mut rest = buf.split_off(head_end + 4);
    let lower = head.to_ascii_lowercase();

    let body = if lower.contains("transfer-encoding: chunked") {
        read_chunked(socket, rest).await
    } else if let Some(len) = content_length(&lower) {
        while rest.len() < len && fill(socket, &mut rest).await {}
        rest.truncate(len);
        rest
    } else {
        Vec::new()
    };

    (head, body)
}

async fn read_chunked(socket: &mut TcpStream, mut buf: Vec<u8>) -> Vec<u8> {
    let mut body = Vec::new();
    loop {
        let line_end = loop {
            if let Some(end) = find(&buf, b"\r\n") {
                break end;
            }
            if !fill(socket, &mut buf).await {
                return body;
            }
        };
        let size = chunk_size(&buf[..line_end]);
        buf.drain(..line_end + 2);
        if size == 0 {
            return body;
        }

        while buf.len() < size + 2 {
            if !fill(socket, &mut buf).await {
                body.extend_from_slice(&buf);
                return body;
            }
        }
        body.extend_from_slice(&buf[..size]);
        buf.drain(..size + 2);
    }
}

fn chunk_size(line: &[u8]) -> usize {
    let line = String::from_utf8_lossy(line);
    let hex = line.split(';').next().unwrap_or_default().trim();
    usize::from_str_radix(hex, 16).unwrap_or(0)
}

fn content_length(lower_head: &str) -> Option<usize> {
    lower_head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Append whatever the socket has next; `false` on EOF or error.
async fn fill(socket: &mut TcpStream, buf: &mut Vec<u8>) -> bool {
    let mut chunk = [0u8; 1024];
    match socket.read(&mut chunk).await {
        Ok(0) | Err(_) => false,
        Ok(n) => {
            buf.extend_from_slice(&chunk[..n]);
            true
        }
    }
}

/// A client that ignores proxy environment variables.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder().no_proxy().build().unwrap()
}
