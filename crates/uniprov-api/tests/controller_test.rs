#![allow(clippy::unwrap_used)]
// Integration tests for `Session` and `Controller` using wiremock.

use std::time::Duration;

use base64::prelude::*;
use secrecy::SecretString;
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use uniprov_api::{Controller, Error, MacAddress, Session, TransportConfig};

const STALL_LIMIT: Duration = Duration::from_secs(5);

// ── Helpers ─────────────────────────────────────────────────────────

fn session_for(server: &MockServer, site: Option<&str>) -> Session {
    let base_url = Url::parse(&server.uri()).unwrap();
    Session::new(
        base_url,
        "admin",
        site.map(String::from),
        &TransportConfig::default(),
    )
    .unwrap()
}

async fn setup(site: Option<&str>) -> (MockServer, Controller) {
    let server = MockServer::start().await;
    let controller = Controller::new(session_for(&server, site));
    (server, controller)
}

fn password() -> SecretString {
    "hunter2".to_string().into()
}

fn token_cookie(csrf: &str) -> String {
    let payload = BASE64_URL_SAFE_NO_PAD.encode(json!({ "CSRFToken": csrf }).to_string());
    format!("TOKEN=eyJhbGciOiJIUzI1NiJ9.{payload}.c2lnbmF0dXJl; Path=/; HttpOnly")
}

/// Mount a successful login that hands out a `TOKEN` cookie, then log in.
async fn login(server: &MockServer, controller: &mut Controller) {
    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "admin", "password": "hunter2"})))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("set-cookie", token_cookie("abc123").as_str())
                .set_body_json(json!({})),
        )
        .expect(1)
        .mount(server)
        .await;

    controller.login(&password()).await.unwrap();
}

fn two_devices() -> serde_json::Value {
    json!({
        "Data": [
            {
                "Name": "switch",
                "IP": "192.168.1.2",
                "MAC": "AA:BB:CC:00:00:01",
                "network_table": []
            },
            {
                "Name": "gateway",
                "IP": "192.168.1.1",
                "MAC": "aa:bb:cc:00:00:02",
                "network_table": [
                    {"Name": "wan", "IP": "10.0.0.5", "MAC": "aa:bb:cc:00:00:03"}
                ]
            }
        ]
    })
}

// ── Authentication ──────────────────────────────────────────────────

#[tokio::test]
async fn login_success_authenticates_session() {
    let (server, mut controller) = setup(Some("default")).await;
    assert!(!controller.session().is_authenticated());

    login(&server, &mut controller).await;

    assert!(controller.session().is_authenticated());
    assert_eq!(controller.session().csrf_token().as_deref(), Some("abc123"));
}

#[tokio::test]
async fn login_failure_reports_controller_message() {
    let (server, mut controller) = setup(Some("default")).await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(json!({"Errors": ["Invalid username or password"]})),
        )
        .mount(&server)
        .await;

    let result = controller.login(&password()).await;

    match result {
        Err(Error::Authentication { ref message }) => {
            assert_eq!(message, "error from controller: Invalid username or password");
        }
        other => panic!("expected Authentication error, got: {other:?}"),
    }
    assert!(!controller.session().is_authenticated());
}

#[tokio::test]
async fn operations_require_login() {
    let (server, controller) = setup(Some("default")).await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"Data": []})))
        .expect(0)
        .mount(&server)
        .await;

    assert!(matches!(
        controller.list_sites().await,
        Err(Error::NotAuthenticated)
    ));
    assert!(matches!(
        controller.list_devices().await,
        Err(Error::NotAuthenticated)
    ));
}

// ── Sites ───────────────────────────────────────────────────────────

#[tokio::test]
async fn list_sites_without_site_selected() {
    let (server, mut controller) = setup(None).await;
    login(&server, &mut controller).await;

    Mock::given(method("GET"))
        .and(path("/proxy/network/api/stat/sites"))
        .and(header("x-csrf-token", "abc123"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Data": [
                {"Name": "default", "Desc": "Default"},
                {"Name": "x7f3k2", "Desc": "Lab"}
            ]
        })))
        .mount(&server)
        .await;

    let sites = controller.list_sites().await.unwrap();

    assert_eq!(sites.len(), 2);
    assert_eq!(sites[0].name, "default");
    assert_eq!(sites[1].description, "Lab");
}

#[tokio::test]
async fn listings_are_repeatable() {
    let (server, mut controller) = setup(Some("default")).await;
    login(&server, &mut controller).await;

    Mock::given(method("GET"))
        .and(path("/proxy/network/api/stat/sites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"name": "default", "desc": "Default"}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/proxy/network/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_devices()))
        .mount(&server)
        .await;

    assert_eq!(
        controller.list_sites().await.unwrap(),
        controller.list_sites().await.unwrap()
    );
    assert_eq!(
        controller.list_devices().await.unwrap(),
        controller.list_devices().await.unwrap()
    );
}

// ── Devices ─────────────────────────────────────────────────────────

#[tokio::test]
async fn list_devices_parses_extra_ports() {
    let (server, mut controller) = setup(Some("default")).await;
    login(&server, &mut controller).await;

    Mock::given(method("GET"))
        .and(path("/proxy/network/api/s/default/stat/device"))
        .and(header("x-csrf-token", "abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(two_devices()))
        .mount(&server)
        .await;

    let devices = controller.list_devices().await.unwrap();

    assert_eq!(devices.len(), 2);
    assert_eq!(devices[0].name(), "switch");
    assert_eq!(devices[0].primary.mac.to_string(), "aa:bb:cc:00:00:01");
    assert!(devices[0].extra_ports.is_empty());
    assert_eq!(devices[1].extra_ports[0].name, "wan");
    assert_eq!(devices[1].extra_ports[0].ip.to_string(), "10.0.0.5");
}

#[tokio::test]
async fn list_devices_fails_on_any_bad_entry() {
    let (server, mut controller) = setup(Some("default")).await;
    login(&server, &mut controller).await;

    Mock::given(method("GET"))
        .and(path("/proxy/network/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Data": [
                {"Name": "good", "IP": "192.168.1.2", "MAC": "aa:bb:cc:00:00:01"},
                {"Name": "offline-ap", "IP": "", "MAC": "aa:bb:cc:00:00:09"}
            ]
        })))
        .mount(&server)
        .await;

    match controller.list_devices().await {
        Err(Error::InvalidAddress { message }) => {
            assert!(message.contains("offline-ap"), "got: {message}");
        }
        other => panic!("expected InvalidAddress, got: {other:?}"),
    }
}

#[tokio::test]
async fn list_devices_requires_site() {
    let (server, mut controller) = setup(None).await;
    login(&server, &mut controller).await;

    assert!(matches!(
        controller.list_devices().await,
        Err(Error::MissingSite)
    ));
}

#[tokio::test]
async fn list_devices_rejects_garbage_body() {
    let (server, mut controller) = setup(Some("default")).await;
    login(&server, &mut controller).await;

    Mock::given(method("GET"))
        .and(path("/proxy/network/api/s/default/stat/device"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;

    assert!(matches!(
        controller.list_devices().await,
        Err(Error::Deserialization { .. })
    ));
}

#[tokio::test]
async fn force_provision_posts_command() {
    let (server, mut controller) = setup(Some("default")).await;
    login(&server, &mut controller).await;

    Mock::given(method("POST"))
        .and(path("/proxy/network/api/s/default/cmd/devmgr"))
        .and(header("x-csrf-token", "abc123"))
        .and(body_json(json!({
            "mac": "aa:bb:cc:00:00:02",
            "cmd": "force-provision"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ignored"))
        .expect(1)
        .mount(&server)
        .await;

    let mac: MacAddress = "AA-BB-CC-00-00-02".parse().unwrap();
    controller.force_provision(mac).await.unwrap();
}

// ── Errors ──────────────────────────────────────────────────────────

#[tokio::test]
async fn controller_error_is_decoded() {
    let (server, mut controller) = setup(Some("nosuchsite")).await;
    login(&server, &mut controller).await;

    Mock::given(method("GET"))
        .and(path("/proxy/network/api/s/nosuchsite/stat/device"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"Errors": ["site not found"]})),
        )
        .mount(&server)
        .await;

    match controller.list_devices().await {
        Err(Error::Controller { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "error from controller: site not found");
        }
        other => panic!("expected Controller error, got: {other:?}"),
    }
}

#[tokio::test]
async fn oversized_error_body_falls_back_to_status() {
    let (server, mut controller) = setup(Some("default")).await;
    login(&server, &mut controller).await;

    let long = "x".repeat(5000);
    Mock::given(method("GET"))
        .and(path("/proxy/network/api/stat/sites"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"Errors": [long]})),
        )
        .mount(&server)
        .await;

    match controller.list_sites().await {
        Err(Error::Controller { message, .. }) => {
            assert_eq!(message, "500 Internal Server Error");
        }
        other => panic!("expected Controller error, got: {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_session_aborts_requests() {
    let server = MockServer::start().await;
    let cancel = CancellationToken::new();
    let session = session_for(&server, Some("default")).with_cancellation(cancel.clone());
    let mut controller = Controller::new(session);

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    cancel.cancel();
    let result = controller.login(&password()).await;

    assert!(matches!(result, Err(Error::Cancelled)), "got: {result:?}");
    assert!(!controller.session().is_authenticated());
}

// ── Stalled bodies ──────────────────────────────────────────────────
//
// wiremock delays whole responses, so these run against a bare TCP
// server that sends headers and a partial body, then goes quiet.

/// Answer the login normally; answer anything else with `status_line`
/// and a body that never completes.
async fn stalling_server(status_line: &'static str) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve_stalling(stream, status_line));
        }
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

async fn serve_stalling(mut stream: TcpStream, status_line: &'static str) {
    let mut buf = Vec::new();
    while let Some(head) = read_request(&mut stream, &mut buf).await {
        if head.starts_with("POST /api/auth/login ") {
            let reply = "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\n\
                         content-length: 2\r\n\r\n{}";
            if stream.write_all(reply.as_bytes()).await.is_err() {
                return;
            }
        } else {
            let reply = format!(
                "HTTP/1.1 {status_line}\r\ncontent-type: application/json\r\n\
                 content-length: 100\r\n\r\n{{\"Data\":["
            );
            let _ = stream.write_all(reply.as_bytes()).await;
            std::future::pending::<()>().await;
        }
    }
}

/// Consume one request (head and body) from `buf`/`stream`; returns the head.
async fn read_request(stream: &mut TcpStream, buf: &mut Vec<u8>) -> Option<String> {
    let mut chunk = [0u8; 1024];
    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let body_len = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + body_len {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
    }
    buf.drain(..head_end + body_len);
    Some(head)
}

async fn stalled_controller(
    status_line: &'static str,
    transport: &TransportConfig,
    cancel: &CancellationToken,
) -> Controller {
    let base_url = stalling_server(status_line).await;
    let session = Session::new(base_url, "admin", None, transport)
        .unwrap()
        .with_cancellation(cancel.clone());
    let mut controller = Controller::new(session);
    controller.login(&password()).await.unwrap();
    controller
}

fn cancel_after(cancel: &CancellationToken, delay: Duration) {
    let cancel = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        cancel.cancel();
    });
}

#[tokio::test]
async fn cancel_interrupts_stalled_body() {
    let cancel = CancellationToken::new();
    let controller =
        stalled_controller("200 OK", &TransportConfig::default(), &cancel).await;

    cancel_after(&cancel, Duration::from_millis(200));
    let result = tokio::time::timeout(STALL_LIMIT, controller.list_sites())
        .await
        .expect("list_sites should return once cancelled");

    assert!(matches!(result, Err(Error::Cancelled)), "got: {result:?}");
}

#[tokio::test]
async fn cancel_interrupts_stalled_error_body() {
    let cancel = CancellationToken::new();
    let controller = stalled_controller(
        "500 Internal Server Error",
        &TransportConfig::default(),
        &cancel,
    )
    .await;

    cancel_after(&cancel, Duration::from_millis(200));
    let result = tokio::time::timeout(STALL_LIMIT, controller.list_sites())
        .await
        .expect("list_sites should return once cancelled");

    assert!(matches!(result, Err(Error::Cancelled)), "got: {result:?}");
}

#[tokio::test]
async fn stalled_body_reports_configured_timeout() {
    let transport = TransportConfig {
        timeout: Duration::from_secs(1),
        ..TransportConfig::default()
    };
    let controller =
        stalled_controller("200 OK", &transport, &CancellationToken::new()).await;

    let result = tokio::time::timeout(STALL_LIMIT, controller.list_sites())
        .await
        .expect("list_sites should give up at the request timeout");

    assert!(
        matches!(result, Err(Error::Timeout { timeout_secs: 1 })),
        "got: {result:?}"
    );
}
