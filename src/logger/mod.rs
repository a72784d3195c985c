//! Logger module
//!
//! Provides logging utilities for the proxy server including:
//! - Subscriber setup (stdout or file, filter from config or `RUST_LOG`)
//! - Server lifecycle logging
//! - Request and access logging
//! - Proxy and error logging

mod format;

pub use format::AccessLogEntry;

use std::fs::{File, OpenOptions};
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;

use hyper::{Method, Uri};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::config::{Config, LoggingConfig};

/// Install the global tracing subscriber
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> io::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let result = match config.log_file.as_deref() {
        Some(path) => builder
            .with_ansi(false)
            .with_writer(Mutex::new(open_log_file(path)?))
            .try_init(),
        None => builder.try_init(),
    };

    result.map_err(io::Error::other)
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("======================================");
    tracing::info!("Fund proxy server started");
    tracing::info!("Listening on: http://{addr}");
    tracing::info!("Document root: {}", config.static_files.root);
    if let Some(workers) = config.server.workers {
        tracing::info!("Worker threads: {workers}");
    }
    if let Some(ref path) = config.logging.log_file {
        tracing::info!("Log file: {path}");
    }
    tracing::info!("Usage:");
    tracing::info!("  Calculator page : http://{addr}/");
    tracing::info!("  Fund estimate   : http://{addr}/api/fund/000001");
    tracing::info!("  Fund history    : http://{addr}/api/fund/history/000001?days=120");
    if config.upstream.extended_routes {
        tracing::info!("  Fund profile    : http://{addr}/api/detail/000001");
        tracing::info!("  Fund search     : http://{addr}/api/search?key=keyword");
    }
    tracing::info!("Press Ctrl+C to stop");
    tracing::info!("======================================");
}

pub fn log_port_in_use(addr: &SocketAddr) {
    tracing::error!("Port {} is already in use ({addr})", addr.port());
    tracing::error!("Stop the other process or change server.port in the configuration");
}

pub fn log_shutdown_started() {
    tracing::info!("Shutdown signal received, no longer accepting connections");
}

pub fn log_shutdown_complete(clean: bool) {
    if clean {
        tracing::info!("All connections closed, server stopped");
    } else {
        tracing::warn!("Grace period elapsed with connections still open, server stopped");
    }
}

pub fn log_request(method: &Method, uri: &Uri) {
    tracing::info!("{method} {uri}");
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: "access", "{}", entry.format(format));
}

pub fn log_proxy_forward(route: &str, url: &Url) {
    tracing::debug!(
        route,
        scheme = url.scheme(),
        host = url.host_str().unwrap_or_default(),
        port = url.port_or_known_default(),
        "Forwarding to {url}"
    );
}

pub fn log_proxy_response(status: u16, url: &Url) {
    tracing::debug!(status, "Upstream responded: {url}");
}

pub fn log_proxy_failure(route: &str, message: &str) {
    tracing::error!(route, "Proxy request failed: {message}");
}

pub fn log_stream_aborted(url: &Url, err: &reqwest::Error) {
    tracing::warn!("Upstream stream from {url} ended early: {err}");
}

pub fn log_connection_error(err: &hyper::Error) {
    // a client closing mid-response shows up here
    tracing::warn!("Failed to serve connection: {err}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}
