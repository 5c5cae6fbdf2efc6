//! Request handling: method validation and static file dispatch.

pub mod static_files;

use crate::config::ServerConfig;
use crate::http;
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::sync::Arc;

/// Request context carried through static file serving.
pub struct RequestContext<'a> {
    /// Raw (still percent-encoded) URL path.
    pub path: &'a str,
    pub is_head: bool,
}

/// Main entry point for HTTP request handling.
///
/// Per-request failures are turned into 404/500 responses and never surface
/// as errors, so one bad request cannot take down the connection task.
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    config: Arc<ServerConfig>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let method = req.method();
    let path = req.uri().path();
    let is_head = *method == Method::HEAD;

    if !matches!(*method, Method::GET | Method::HEAD) {
        logger::log_warning(&format!("Unsupported method: {method}"));
        return Ok(http::build_501_response(method));
    }

    let ctx = RequestContext { path, is_head };
    Ok(static_files::serve(&ctx, &config).await)
}
