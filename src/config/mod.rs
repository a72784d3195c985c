// Configuration module entry point
// Loads layered configuration and holds the shared application state

mod state;
mod types;

use std::net::SocketAddr;

pub use config::ConfigError;
pub use state::AppState;
pub use types::{
    Config, LoggingConfig, PerformanceConfig, ServerConfig, StaticFilesConfig, UpstreamConfig,
};

/// Config file looked up when no path is given on the command line
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Environment variable prefix, e.g. `FUND_PROXY_SERVER__PORT=9000`
const ENV_PREFIX: &str = "FUND_PROXY";

type Builder = config::ConfigBuilder<config::builder::DefaultState>;

impl Config {
    /// Load configuration from specified file path (extension optional)
    ///
    /// Sources are layered: built-in defaults, then the file if present,
    /// then `FUND_PROXY_*` environment variables.
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }

    /// Load defaults overlaid with an inline TOML document
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        Self::defaults()?
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()
    }

    fn defaults() -> Result<Builder, ConfigError> {
        config::Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 9988)?
            .set_default("server.backlog", 128)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "combined")?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.header_read_timeout", 30)?
            .set_default("performance.shutdown_grace_period", 30)?
            .set_default("static_files.root", ".")?
            .set_default("static_files.default_document", "fund_calculator.html")?
            .set_default(
                "upstream.snapshot_endpoint",
                "https://fundgz.1234567.com.cn/js",
            )?
            .set_default(
                "upstream.history_endpoint",
                "https://fundmobapi.eastmoney.com/FundMNewApi/FundMNHisNetList",
            )?
            .set_default(
                "upstream.detail_endpoint",
                "http://api.fund.eastmoney.com/f10/jbgk",
            )?
            .set_default(
                "upstream.search_endpoint",
                "http://fundsuggest.eastmoney.com/FundSearch/api/FundSearchAPI.ashx",
            )?
            .set_default("upstream.extended_routes", true)?
            .set_default(
                "upstream.user_agent",
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
            )?
            .set_default("upstream.referer", "http://fund.eastmoney.com/")?
            .set_default("upstream.accept_language", "zh-CN,zh;q=0.9,en;q=0.8")
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
