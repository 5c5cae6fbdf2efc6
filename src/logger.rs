//! Operator-facing logging helpers.
//!
//! Informational messages go to stdout, warnings and errors to stderr with a
//! local timestamp. There is no per-request access log.

use crate::config::ServerConfig;
use chrono::Local;
use std::net::SocketAddr;

fn write_info(message: &str) {
    println!("{message}");
}

fn write_error(message: &str) {
    eprintln!("[{}] {message}", Local::now().format("%Y-%m-%d %H:%M:%S"));
}

pub fn log_server_start(addr: &SocketAddr, config: &ServerConfig) {
    write_info("======================================");
    write_info(&format!("Serving {}", config.root.display()));
    write_info(&format!("Listening on: http://{addr}"));
    write_info("Press Ctrl+C to quit");
    write_info("======================================\n");
}

pub fn log_shutdown_requested() {
    write_info("\nStopping server...");
}

pub fn log_shutdown() {
    write_info("Server stopped");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}
