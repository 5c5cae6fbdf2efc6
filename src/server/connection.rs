// Connection handling
// Serves one accepted TCP connection per spawned task.

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::net::TcpStream;

use crate::config::ServerConfig;
use crate::handler;
use crate::logger;

/// Register an accepted connection and hand it to a serving task.
pub fn accept_connection(
    stream: TcpStream,
    config: &Arc<ServerConfig>,
    conn_counter: &Arc<AtomicUsize>,
) {
    conn_counter.fetch_add(1, Ordering::SeqCst);
    handle_connection(stream, Arc::clone(config), Arc::clone(conn_counter));
}

/// Serve a single connection in a spawned task, decrementing the active
/// connection counter when it closes. Requests share nothing but the
/// read-only configuration.
fn handle_connection(
    stream: TcpStream,
    config: Arc<ServerConfig>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        let io = TokioIo::new(stream);

        let conn = http1::Builder::new().serve_connection(
            io,
            service_fn(move |req| {
                let config = Arc::clone(&config);
                async move { handler::handle_request(req, config).await }
            }),
        );

        if let Err(err) = conn.await {
            logger::log_connection_error(&err);
        }

        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}
