//! Minimal local static file server.
//!
//! Serves the directory containing the running executable over HTTP/1.1 for
//! local development previews. GET and HEAD only, with index file resolution
//! and generated directory listings.

pub mod config;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
