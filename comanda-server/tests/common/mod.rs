//! Shared fixtures for the integration tests
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use comanda_printer::{PrintError, PrintResult, Printer};
use comanda_server::db::DbService;
use comanda_server::{Config, ServerState};
use http_body_util::BodyExt;
use serde_json::Value;
use tokio::io::AsyncReadExt;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceExt;

pub const TOKEN: &str = "turno-noche";

/// Config pointing at a raw socket printer
pub fn config(printer_host: &str, printer_port: u16) -> Config {
    let port = printer_port.to_string();
    let vars: HashMap<&str, &str> = HashMap::from([
        ("DATABASE_URL", "sqlite::memory:"),
        ("PRINTER_HOST", printer_host),
        ("PRINTER_PORT", port.as_str()),
        ("PRINT_TIMEOUT_MS", "1000"),
        ("API_TOKEN", TOKEN),
    ]);
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

/// State with an in-memory store and the given printer
pub async fn state_with(printer: Arc<dyn Printer>) -> ServerState {
    let db = DbService::in_memory().await.unwrap();
    ServerState::new(config("127.0.0.1", 9100), db, printer)
}

/// State whose printer is the real network adapter for `config`
pub async fn state_for(config: Config) -> ServerState {
    let db = DbService::in_memory().await.unwrap();
    let printer = config.printer.connect(config.print_timeout).unwrap();
    ServerState::new(config, db, printer)
}

/// Records every job; queued failures are returned before recording
#[derive(Debug, Default)]
pub struct RecordingPrinter {
    jobs: Mutex<Vec<Vec<u8>>>,
    failures: Mutex<VecDeque<PrintError>>,
    attempts: Mutex<usize>,
}

impl RecordingPrinter {
    pub fn fail_next(&self, err: PrintError) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn jobs(&self) -> Vec<Vec<u8>> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Printer for RecordingPrinter {
    async fn print(&self, data: &[u8]) -> PrintResult<()> {
        *self.attempts.lock().unwrap() += 1;
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.jobs.lock().unwrap().push(data.to_vec());
        Ok(())
    }

    async fn is_online(&self) -> bool {
        true
    }

    fn destination(&self) -> String {
        "recording:test".to_string()
    }
}

/// Fake raw socket printer: every connection's bytes arrive as one job
pub async fn fake_socket_printer() -> (u16, mpsc::UnboundedReceiver<Vec<u8>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            tokio::spawn(async move {
                let mut buf = Vec::new();
                if socket.read_to_end(&mut buf).await.is_ok() {
                    let _ = tx.send(buf);
                }
            });
        }
    });
    (port, rx)
}

/// A local port with nothing listening on it
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap().port()
}

/// Poll until `check` holds or two seconds pass
pub async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

pub fn json_request(method: &str, uri: &str, body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}
