//! End-to-end tests.
//!
//! Each test boots the server on an ephemeral port over a temporary root and
//! drives it with a real HTTP client.

use std::net::SocketAddr;
use std::path::Path;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Duration;

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::{Method, Request, Response};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;
use tempfile::TempDir;
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use devserve::config::{
    AppState, Config, FilesConfig, LoggingConfig, PerformanceConfig, ServerConfig,
};
use devserve::server;

type TestClient = Client<HttpConnector, Full<Bytes>>;

struct TestServer {
    addr: SocketAddr,
    shutdown: Arc<Notify>,
    handle: JoinHandle<()>,
}

fn test_config(root: &Path) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            root: root.display().to_string(),
            workers: None,
        },
        logging: LoggingConfig {
            level: "info".to_string(),
            access_log: false,
            access_log_format: "combined".to_string(),
            access_log_file: None,
            error_log_file: None,
        },
        performance: PerformanceConfig {
            keep_alive_timeout: 75,
            read_timeout: 30,
            write_timeout: 30,
            max_connections: None,
        },
        files: FilesConfig::default(),
    }
}

/// Bind an ephemeral port and run the accept loop in a background task.
fn spawn_server(root: &Path) -> TestServer {
    let cfg = test_config(root);
    let state = Arc::new(AppState::new(&cfg).unwrap());
    let listener = server::bind_listener("127.0.0.1:0".parse().unwrap()).unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Arc::new(Notify::new());

    let loop_shutdown = Arc::clone(&shutdown);
    let handle = tokio::spawn(async move {
        server::start_server_loop(
            listener,
            state,
            Arc::new(AtomicUsize::new(0)),
            loop_shutdown,
        )
        .await;
    });

    TestServer {
        addr,
        shutdown,
        handle,
    }
}

/// Root fixture from the reference scenario: an index page, a script, and a
/// directory with no index file.
fn populate_fixture(root: &Path) {
    std::fs::write(root.join("index.html"), "<h1>hi</h1>").unwrap();
    std::fs::write(root.join("app.js"), "console.log(1)").unwrap();
    std::fs::write(root.join("module.mjs"), "export default 1;").unwrap();
    std::fs::write(root.join("hello world.txt"), "spaced out").unwrap();
    std::fs::create_dir(root.join("assets")).unwrap();
    std::fs::write(root.join("assets").join("data.txt"), "plain data").unwrap();
}

fn client() -> TestClient {
    Client::builder(TokioExecutor::new()).build_http()
}

async fn send(client: &TestClient, method: Method, addr: SocketAddr, path: &str) -> Response<Incoming> {
    let req = Request::builder()
        .method(method)
        .uri(format!("http://{addr}{path}"))
        .body(Full::new(Bytes::new()))
        .unwrap();
    client.request(req).await.unwrap()
}

async fn body_bytes(response: Response<Incoming>) -> Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn assert_injected_headers(response: &Response<Incoming>) {
    let headers = response.headers();
    assert_eq!(headers.get("Access-Control-Allow-Origin").unwrap(), "*");
    assert_eq!(
        headers.get("Access-Control-Allow-Methods").unwrap(),
        "GET, POST, OPTIONS"
    );
    assert_eq!(headers.get("Access-Control-Allow-Headers").unwrap(), "*");
    assert_eq!(
        headers.get("Cache-Control").unwrap(),
        "no-cache, no-store, must-revalidate"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn serves_exact_file_bytes() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    let response = send(&client, Method::GET, srv.addr, "/index.html").await;
    assert_eq!(response.status(), 200);
    assert_injected_headers(&response);
    assert_eq!(&body_bytes(response).await[..], b"<h1>hi</h1>");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn script_files_get_javascript_mime() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    let response = send(&client, Method::GET, srv.addr, "/app.js").await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "application/javascript"
    );
    assert_eq!(&body_bytes(response).await[..], b"console.log(1)");

    let response = send(&client, Method::GET, srv.addr, "/module.mjs").await;
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "application/javascript"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn options_returns_empty_200_anywhere() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    for path in ["/anything", "/index.html", "/no/such/path"] {
        let response = send(&client, Method::OPTIONS, srv.addr, path).await;
        assert_eq!(response.status(), 200);
        assert_injected_headers(&response);
        assert!(body_bytes(response).await.is_empty());
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_path_is_404_with_headers() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    let response = send(&client, Method::GET, srv.addr, "/missing.txt").await;
    assert_eq!(response.status(), 404);
    assert_injected_headers(&response);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn root_resolves_index_file() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    let response = send(&client, Method::GET, srv.addr, "/").await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "text/html; charset=utf-8"
    );
    assert_eq!(&body_bytes(response).await[..], b"<h1>hi</h1>");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn directory_redirects_to_slash_then_lists() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    let response = send(&client, Method::GET, srv.addr, "/assets").await;
    assert_eq!(response.status(), 301);
    assert_eq!(response.headers().get("Location").unwrap(), "/assets/");
    assert_injected_headers(&response);

    let response = send(&client, Method::GET, srv.addr, "/assets/").await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers().get("Content-Type").unwrap(),
        "text/html; charset=utf-8"
    );
    let html = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(html.contains("data.txt"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn post_is_method_not_allowed() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    let response = send(&client, Method::POST, srv.addr, "/").await;
    assert_eq!(response.status(), 405);
    assert_eq!(
        response.headers().get("Allow").unwrap(),
        "GET, HEAD, OPTIONS"
    );
    assert_injected_headers(&response);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn head_carries_length_but_no_body() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    let response = send(&client, Method::HEAD, srv.addr, "/index.html").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers().get("Content-Length").unwrap(), "11");
    assert_injected_headers(&response);
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn percent_encoded_paths_resolve() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());
    let client = client();

    let response = send(&client, Method::GET, srv.addr, "/hello%20world.txt").await;
    assert_eq!(response.status(), 200);
    assert_eq!(&body_bytes(response).await[..], b"spaced out");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn traversal_cannot_escape_root() {
    let outer = TempDir::new().unwrap();
    std::fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
    let webroot = outer.path().join("webroot");
    std::fs::create_dir(&webroot).unwrap();
    std::fs::write(webroot.join("ok.txt"), "fine").unwrap();

    let srv = spawn_server(&webroot);
    let client = client();

    let response = send(&client, Method::GET, srv.addr, "/%2e%2e/secret.txt").await;
    assert_eq!(response.status(), 404);

    // The plain file next to it still serves
    let response = send(&client, Method::GET, srv.addr, "/ok.txt").await;
    assert_eq!(response.status(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn shutdown_signal_stops_accept_loop() {
    let root = TempDir::new().unwrap();
    populate_fixture(root.path());
    let srv = spawn_server(root.path());

    srv.shutdown.notify_one();
    tokio::time::timeout(Duration::from_secs(5), srv.handle)
        .await
        .expect("accept loop did not stop")
        .unwrap();
}
