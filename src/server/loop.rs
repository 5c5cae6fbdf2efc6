// Accept loop
// Accepts connections until the shutdown notification fires, then releases
// the listening socket and drains in-flight connections.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::SignalHandler;
use crate::config::ServerConfig;
use crate::logger;

const DRAIN_POLL_INTERVAL: Duration = Duration::from_millis(50);
const DRAIN_DEADLINE: Duration = Duration::from_secs(5);

/// Run the accept loop until shutdown is requested.
///
/// Each accepted connection is handled in its own task; accept errors are
/// logged and never stop the loop. On shutdown the listener is dropped first
/// (releasing the port), then active connections are given `DRAIN_DEADLINE`
/// to finish.
pub async fn run(
    listener: TcpListener,
    config: Arc<ServerConfig>,
    signals: Arc<SignalHandler>,
    active_connections: Arc<AtomicUsize>,
) {
    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, _peer_addr)) => {
                        accept_connection(stream, &config, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            _ = signals.shutdown.notified() => {
                break;
            }
        }
    }

    // Stop accepting and release the port before waiting on in-flight work,
    // so a subsequent process can rebind immediately.
    drop(listener);
    drain_connections(&active_connections).await;
}

async fn drain_connections(active_connections: &AtomicUsize) {
    let deadline = tokio::time::Instant::now() + DRAIN_DEADLINE;

    while active_connections.load(Ordering::SeqCst) > 0 {
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutdown drain timed out with {} connection(s) still open",
                active_connections.load(Ordering::SeqCst)
            ));
            break;
        }
        tokio::time::sleep(DRAIN_POLL_INTERVAL).await;
    }
}
