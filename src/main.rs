use clap::Parser;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

use localserve::config::{Cli, ServerConfig};
use localserve::logger;
use localserve::server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let cfg = ServerConfig::from_cli(&cli)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.socket_addr()?;

    // Bind before anything else: an occupied port or bad address is fatal
    // and must fail the process before serving begins.
    let listener = match server::create_listener(addr) {
        Ok(l) => l,
        Err(e) => {
            logger::log_error(&format!("Failed to bind {addr}: {e}"));
            return Err(e.into());
        }
    };

    let cfg = Arc::new(cfg);
    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals));

    let active_connections = Arc::new(AtomicUsize::new(0));

    logger::log_server_start(&addr, &cfg);

    server::run(listener, cfg, signals, active_connections).await;

    logger::log_shutdown();
    Ok(())
}
