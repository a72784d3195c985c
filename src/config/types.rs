// Configuration types module
// Defines all configuration-related data structures

use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub static_files: StaticFilesConfig,
    pub upstream: UpstreamConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub workers: Option<usize>,
    /// Listen backlog passed to `listen(2)`
    pub backlog: i32,
}

/// Logging configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined, common, json, or custom pattern)
    pub access_log_format: String,
    /// Log file path (optional, stdout if not set)
    #[serde(default)]
    pub log_file: Option<String>,
}

/// Performance configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive: bool,
    /// Seconds a client may take to send request headers
    pub header_read_timeout: u64,
    /// Seconds to wait for in-flight connections on shutdown, 0 for no limit
    pub shutdown_grace_period: u64,
}

/// Static file serving configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StaticFilesConfig {
    /// Document root
    pub root: String,
    /// File served for `/`
    pub default_document: String,
}

/// Upstream endpoints and the browser fingerprint sent to them
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct UpstreamConfig {
    pub snapshot_endpoint: String,
    pub history_endpoint: String,
    pub detail_endpoint: String,
    pub search_endpoint: String,
    /// Enables `/api/detail/{code}` and `/api/search`
    pub extended_routes: bool,
    pub user_agent: String,
    pub referer: String,
    pub accept_language: String,
}
