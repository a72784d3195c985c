// Server loop module
// Accepts connections until shutdown, then drains in-flight connections

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;

use super::connection::serve_connection;
use crate::config::AppState;
use crate::logger;

/// Run the accept loop until `shutdown` resolves.
///
/// After shutdown the listener is closed first, then open connections get
/// `performance.shutdown_grace_period` seconds to finish (0 means no limit).
pub async fn start_server_loop<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F)
where
    F: Future<Output = ()>,
{
    let graceful = GracefulShutdown::new();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        serve_connection(stream, peer_addr, &state, &graceful);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            () = &mut shutdown => {
                logger::log_shutdown_started();
                break;
            }
        }
    }

    drop(listener);

    let clean = drain(graceful, state.config.performance.shutdown_grace_period).await;
    logger::log_shutdown_complete(clean);
}

/// Wait for watched connections to finish, at most `grace_secs` seconds
///
/// A grace period of 0 waits without a limit. Returns `false` if the limit
/// cut connections off.
async fn drain(graceful: GracefulShutdown, grace_secs: u64) -> bool {
    if grace_secs == 0 {
        graceful.shutdown().await;
        return true;
    }

    tokio::time::timeout(Duration::from_secs(grace_secs), graceful.shutdown())
        .await
        .is_ok()
}
