// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM both trigger graceful shutdown. The signal is
// surfaced as a Notify the accept loop selects on, so shutdown ordering
// (stop accept -> drain -> close) stays explicit and testable.

use crate::logger;
use std::sync::Arc;
use tokio::sync::Notify;

/// Shutdown notification shared between the signal task and the accept loop.
pub struct SignalHandler {
    pub shutdown: Arc<Notify>,
}

impl SignalHandler {
    pub fn new() -> Self {
        Self {
            shutdown: Arc::new(Notify::new()),
        }
    }
}

impl Default for SignalHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Start the signal listener task (Unix).
#[cfg(unix)]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    use tokio::signal::unix::{signal, SignalKind};

    tokio::spawn(async move {
        let mut sigterm =
            signal(SignalKind::terminate()).expect("Failed to register SIGTERM handler");
        let mut sigint =
            signal(SignalKind::interrupt()).expect("Failed to register SIGINT handler");

        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }

        logger::log_shutdown_requested();
        // notify_one stores a permit, so a signal arriving while the accept
        // loop is busy handling a connection is not lost.
        handler.shutdown.notify_one();
    });
}

/// Fallback for non-Unix platforms - only handles Ctrl+C.
#[cfg(not(unix))]
pub fn start_signal_handler(handler: Arc<SignalHandler>) {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            logger::log_shutdown_requested();
            handler.shutdown.notify_one();
        }
    });
}
