// Server module entry point
// Listener setup, accept loop, connection handling and shutdown signals.

pub mod connection;
pub mod listener;
pub mod signal;

// `loop` is a keyword, so the accept-loop module lives in loop.rs under a
// different module name.
#[path = "loop.rs"]
pub mod server_loop;

pub use listener::create_listener;
pub use server_loop::run;
pub use signal::{start_signal_handler, SignalHandler};
