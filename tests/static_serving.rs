//! Integration tests driving a live in-process server over loopback.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use localserve::config::ServerConfig;
use localserve::server::{self, SignalHandler};

struct TestServer {
    addr: SocketAddr,
    signals: Arc<SignalHandler>,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

/// Start the accept loop on an ephemeral loopback port serving `root`.
fn start_server(root: &Path) -> TestServer {
    let config = Arc::new(ServerConfig {
        bind_host: "127.0.0.1".to_string(),
        port: 0,
        root: root.canonicalize().unwrap(),
    });

    let listener = server::create_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let signals = Arc::new(SignalHandler::new());
    let active_connections = Arc::new(AtomicUsize::new(0));

    let handle = tokio::spawn(server::run(
        listener,
        config,
        Arc::clone(&signals),
        active_connections,
    ));

    TestServer {
        addr,
        signals,
        handle,
    }
}

/// Send a raw HTTP/1.1 request, bypassing client-side path normalization.
async fn raw_request(addr: SocketAddr, target: &str) -> String {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    let request = format!("GET {target} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    String::from_utf8_lossy(&response).into_owned()
}

#[tokio::test]
async fn serves_exact_file_bytes_with_inferred_content_type() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("index.html"), "<h1>hi</h1>").unwrap();
    let server = start_server(root.path());

    let resp = reqwest::get(server.url("/index.html")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));
    assert_eq!(resp.text().await.unwrap(), "<h1>hi</h1>");
}

#[tokio::test]
async fn directory_with_index_file_serves_it() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("index.html"), "<h1>hi</h1>").unwrap();
    let server = start_server(root.path());

    let resp = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "<h1>hi</h1>");
}

#[tokio::test]
async fn directory_without_index_returns_generated_listing() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("alpha.txt"), "a").unwrap();
    std::fs::create_dir(root.path().join("nested")).unwrap();
    let server = start_server(root.path());

    let resp = reqwest::get(server.url("/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"));

    let body = resp.text().await.unwrap();
    assert!(body.contains("alpha.txt"));
    assert!(body.contains("nested/"));
}

#[tokio::test]
async fn missing_file_is_404() {
    let root = tempfile::tempdir().unwrap();
    let server = start_server(root.path());

    let resp = reqwest::get(server.url("/nope.html")).await.unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn traversal_outside_root_is_404() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("index.html"), "ok").unwrap();
    let server = start_server(root.path());

    let response = raw_request(server.addr, "/../../etc/passwd").await;
    assert!(response.starts_with("HTTP/1.1 404"));
    assert!(!response.contains("root:"));
}

#[tokio::test]
async fn percent_encoded_names_resolve() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("a b.txt"), "spaced").unwrap();
    let server = start_server(root.path());

    let resp = reqwest::get(server.url("/a%20b.txt")).await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "spaced");
}

#[tokio::test]
async fn unsupported_method_gets_501() {
    let root = tempfile::tempdir().unwrap();
    let server = start_server(root.path());

    let client = reqwest::Client::new();
    let resp = client.post(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 501);
}

#[tokio::test]
async fn head_returns_headers_with_empty_body() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("page.txt"), "hello").unwrap();
    let server = start_server(root.path());

    let client = reqwest::Client::new();
    let resp = client.head(server.url("/page.txt")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.headers()["content-length"], "5");
    assert_eq!(resp.text().await.unwrap(), "");
}

#[tokio::test]
async fn directory_without_trailing_slash_redirects() {
    let root = tempfile::tempdir().unwrap();
    std::fs::create_dir(root.path().join("docs")).unwrap();
    std::fs::write(root.path().join("docs/readme.txt"), "d").unwrap();
    let server = start_server(root.path());

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let resp = client.get(server.url("/docs")).send().await.unwrap();
    assert_eq!(resp.status(), 301);
    assert_eq!(resp.headers()["location"], "/docs/");
}

#[tokio::test]
async fn inflight_request_completes_before_shutdown_finishes() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("slow.txt"), "still here").unwrap();
    let server = start_server(root.path());

    // Open a connection and send only the request line, so the connection is
    // registered but the request is still in flight when shutdown fires.
    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"GET /slow.txt HTTP/1.1\r\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.signals.shutdown.notify_one();
    tokio::time::sleep(Duration::from_millis(100)).await;

    // The accept loop must still be draining the open connection.
    assert!(!server.handle.is_finished());

    // Complete the request after shutdown was requested; the response must
    // still arrive.
    stream
        .write_all(b"Host: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut response = Vec::new();
    stream.read_to_end(&mut response).await.unwrap();
    let response = String::from_utf8_lossy(&response);
    assert!(response.starts_with("HTTP/1.1 200"));
    assert!(response.ends_with("still here"));

    tokio::time::timeout(Duration::from_secs(10), server.handle)
        .await
        .expect("accept loop did not stop after drain")
        .unwrap();
}

#[tokio::test]
async fn shutdown_stops_accepting_and_releases_the_port() {
    let root = tempfile::tempdir().unwrap();
    std::fs::write(root.path().join("index.html"), "ok").unwrap();
    let server = start_server(root.path());

    // Prove the loop is serving, then close the client so its keep-alive
    // connection does not hold up the drain.
    let client = reqwest::Client::new();
    let resp = client.get(server.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
    drop(client);
    tokio::time::sleep(Duration::from_millis(100)).await;

    server.signals.shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(10), server.handle)
        .await
        .expect("accept loop did not stop after shutdown")
        .unwrap();

    // The port must be immediately rebindable.
    let rebound = server::create_listener(server.addr).unwrap();
    drop(rebound);
}
