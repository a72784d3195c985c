use std::process::ExitCode;

use fund_proxy::config::{self, Config};
use fund_proxy::logger;
use fund_proxy::server::{self, ServerError};

fn main() -> ExitCode {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| config::DEFAULT_CONFIG_PATH.to_string());

    // The logger is configured from the file, so load errors go to stderr
    let cfg = match Config::load_from(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration from '{config_path}': {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logger::init(&cfg.logging) {
        eprintln!("Failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cfg) {
        Ok(()) => ExitCode::SUCCESS,
        Err(ServerError::AddrInUse(addr)) => {
            logger::log_port_in_use(&addr);
            ExitCode::FAILURE
        }
        Err(e) => {
            logger::log_error(&format!("Server error: {e}"));
            ExitCode::FAILURE
        }
    }
}

fn run(cfg: Config) -> Result<(), ServerError> {
    // Create the Tokio runtime, sized by server.workers when set
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = cfg.server.workers.filter(|&n| n > 0) {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(server::run(cfg))
}
