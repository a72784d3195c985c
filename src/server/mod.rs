//! Server module
//!
//! Listener creation, the accept loop, per-connection serving and
//! shutdown signal handling.

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the module is exposed as server_loop
#[path = "loop.rs"]
pub mod server_loop;

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{AppState, Config};
use crate::logger;

pub use listener::create_listener;
pub use server_loop::start_server_loop;

/// Fatal startup and runtime failures
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("address {0} is already in use")]
    AddrInUse(SocketAddr),

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("invalid server address: {0}")]
    InvalidAddress(String),

    #[error("failed to build upstream client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("runtime error: {0}")]
    Runtime(#[from] io::Error),
}

/// Bind, serve until SIGINT/SIGTERM, then drain
pub async fn run(config: Config) -> Result<(), ServerError> {
    let addr = config
        .get_socket_addr()
        .map_err(ServerError::InvalidAddress)?;
    let listener = bind(addr, config.server.backlog)?;
    let state = Arc::new(AppState::new(config)?);

    let local_addr = listener.local_addr()?;
    logger::log_server_start(&local_addr, &state.config);

    serve(listener, state, signal::shutdown_signal()).await;
    Ok(())
}

/// Create the listener, reporting a taken port as `AddrInUse`
pub fn bind(addr: SocketAddr, backlog: i32) -> Result<TcpListener, ServerError> {
    create_listener(addr, backlog).map_err(|source| {
        if source.kind() == io::ErrorKind::AddrInUse {
            ServerError::AddrInUse(addr)
        } else {
            ServerError::Bind { addr, source }
        }
    })
}

/// Serve an already bound listener until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    start_server_loop(listener, state, shutdown).await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bind_conflict_maps_to_addr_in_use() {
        let first = bind("127.0.0.1:0".parse().unwrap(), 16).unwrap();
        let addr = first.local_addr().unwrap();

        match bind(addr, 16) {
            Err(ServerError::AddrInUse(reported)) => assert_eq!(reported, addr),
            other => panic!("expected AddrInUse, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_host_is_reported() {
        let mut config = Config::from_toml_str("").unwrap();
        config.server.host = "not a host".to_string();

        let err = run(config).await.unwrap_err();
        assert!(matches!(err, ServerError::InvalidAddress(_)));
    }
}
