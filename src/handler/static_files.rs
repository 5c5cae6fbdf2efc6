//! Static file serving.
//!
//! Resolves URL paths against the served root, with index file support and
//! generated directory listings for directories without one.

use super::RequestContext;
use crate::config::ServerConfig;
use crate::http::{self, mime};
use crate::logger;
use http_body_util::Full;
use hyper::body::Bytes;
use hyper::Response;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Index files tried, in order, when a directory is requested.
const INDEX_FILES: [&str; 2] = ["index.html", "index.htm"];

/// Result of mapping a URL path onto the filesystem.
#[derive(Debug, PartialEq, Eq)]
pub enum Resolved {
    File(PathBuf),
    Directory(PathBuf),
    NotFound,
}

/// Serve a GET/HEAD request from the configured root.
pub async fn serve(ctx: &RequestContext<'_>, config: &ServerConfig) -> Response<Full<Bytes>> {
    let Some(decoded) = decode_path(ctx.path) else {
        return http::build_404_response();
    };

    match resolve(&config.root, &decoded) {
        Resolved::File(file_path) => serve_file(ctx, &file_path).await,
        Resolved::Directory(dir) => {
            // Directory URLs are canonical with a trailing slash, so that
            // relative links inside a listing or index page resolve.
            if !ctx.path.ends_with('/') {
                return http::build_redirect_response(&format!("{}/", ctx.path));
            }

            for index in INDEX_FILES {
                let candidate = dir.join(index);
                if candidate.is_file() {
                    return serve_file(ctx, &candidate).await;
                }
            }

            serve_listing(ctx, &dir, &decoded).await
        }
        Resolved::NotFound => http::build_404_response(),
    }
}

/// Map a decoded URL path onto the filesystem under `root`.
///
/// `root` must already be canonicalized. Anything that does not exist, or
/// that resolves outside `root` (traversal via `..` or symlinks), is
/// `NotFound`.
pub fn resolve(root: &Path, decoded_path: &str) -> Resolved {
    let candidate = root.join(decoded_path.trim_start_matches('/'));

    // Missing files are common (404), no need to log here.
    let Ok(canonical) = candidate.canonicalize() else {
        return Resolved::NotFound;
    };

    if !canonical.starts_with(root) {
        logger::log_warning(&format!(
            "Path traversal attempt blocked: {} -> {}",
            decoded_path,
            canonical.display()
        ));
        return Resolved::NotFound;
    }

    if canonical.is_dir() {
        Resolved::Directory(canonical)
    } else {
        Resolved::File(canonical)
    }
}

async fn serve_file(ctx: &RequestContext<'_>, file_path: &Path) -> Response<Full<Bytes>> {
    match fs::read(file_path).await {
        Ok(content) => {
            let content_type =
                mime::content_type_for(file_path.extension().and_then(|e| e.to_str()));
            http::build_file_response(Bytes::from(content), content_type, ctx.is_head)
        }
        Err(e) => {
            logger::log_error(&format!(
                "Failed to read file '{}': {}",
                file_path.display(),
                e
            ));
            http::build_500_response()
        }
    }
}

/// Generate an HTML listing for a directory without an index file.
async fn serve_listing(
    ctx: &RequestContext<'_>,
    dir: &Path,
    display_path: &str,
) -> Response<Full<Bytes>> {
    let Some(entries) = list_entries(dir).await else {
        // Matches the behavior for unreadable paths elsewhere: the client
        // sees 404, the operator sees the reason.
        return http::build_404_response();
    };

    http::build_html_response(render_listing(display_path, &entries), ctx.is_head)
}

/// Collect directory entry names, directories suffixed with `/`, sorted.
async fn list_entries(dir: &Path) -> Option<Vec<String>> {
    let mut read_dir = match fs::read_dir(dir).await {
        Ok(rd) => rd,
        Err(e) => {
            logger::log_error(&format!(
                "Failed to list directory '{}': {}",
                dir.display(),
                e
            ));
            return None;
        }
    };

    let mut entries = Vec::new();
    loop {
        match read_dir.next_entry().await {
            Ok(Some(entry)) => {
                let mut name = entry.file_name().to_string_lossy().into_owned();
                if entry.file_type().await.is_ok_and(|t| t.is_dir()) {
                    name.push('/');
                }
                entries.push(name);
            }
            Ok(None) => break,
            // A partial listing would misrepresent the directory; fail the
            // whole response instead.
            Err(e) => {
                logger::log_error(&format!(
                    "Failed to list directory '{}': {}",
                    dir.display(),
                    e
                ));
                return None;
            }
        }
    }

    entries.sort();
    Some(entries)
}

fn render_listing(display_path: &str, entries: &[String]) -> String {
    let title = format!("Directory listing for {}", html_escape(display_path));

    let mut html = String::new();
    html.push_str("<!DOCTYPE HTML>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));
    for name in entries {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            encode_href(name),
            html_escape(name)
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

/// Percent-decode a URL path. Returns `None` for malformed escapes or byte
/// sequences that are not valid UTF-8.
pub fn decode_path(path: &str) -> Option<String> {
    let bytes = path.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hi = hex_value(*bytes.get(i + 1)?)?;
            let lo = hex_value(*bytes.get(i + 2)?)?;
            out.push((hi << 4) | lo);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }

    String::from_utf8(out).ok()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Percent-encode a listing link target, keeping unreserved characters and
/// the trailing slash of directory entries.
fn encode_href(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for byte in name.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' | b'/' => {
                out.push(byte as char);
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
