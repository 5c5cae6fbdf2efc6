//! Command-line configuration.
//!
//! The entire configuration surface is two flags; everything else (the served
//! root in particular) is derived from the environment at startup.

use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Serve the directory containing this binary over HTTP for local previews.
#[derive(Parser, Debug, Clone)]
#[command(name = "localserve", version, about)]
pub struct Cli {
    /// TCP port to listen on
    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Host to bind; use 127.0.0.1 to restrict access to this machine
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: String,
}

/// Immutable server configuration, built once at startup and shared read-only
/// for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_host: String,
    pub port: u16,
    /// Canonicalized directory whose contents are served.
    pub root: PathBuf,
}

impl ServerConfig {
    /// Build the configuration from parsed CLI flags.
    ///
    /// The served root is always the directory containing the running
    /// executable; no alternate root is exposed.
    pub fn from_cli(cli: &Cli) -> Result<Self, Box<dyn std::error::Error>> {
        let exe = std::env::current_exe()?;
        let root = exe
            .parent()
            .ok_or("executable has no parent directory")?
            .canonicalize()?;

        Ok(Self {
            bind_host: cli.bind.clone(),
            port: cli.port,
            root,
        })
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.bind_host, self.port)
            .parse()
            .map_err(|e| format!("Invalid bind address '{}': {e}", self.bind_host))
    }
}
