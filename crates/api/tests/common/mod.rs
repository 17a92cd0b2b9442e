#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use http_body_util::BodyExt;
use hub_core::badge::BadgePayload;
use hub_core::types::JobId;
use hub_printer::{
    LabelRenderer, LpPrinter, PrintDispatcher, PrintError, Printer, RenderError, RenderedLabel,
};
use hub_worker::{PrintQueue, PrintWorker, QueueReceiver};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;

use hub_api::config::{AgentConfig, ServerConfig};
use hub_api::router::build_app_router;
use hub_api::state::AppState;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:3000".to_string()],
        request_timeout_secs: 30,
        agent: AgentConfig {
            printer_name: None,
            chromium_path: None,
            work_dir: std::env::temp_dir().join("print-agent-tests"),
            queue_capacity: 16,
            max_attempts: 3,
            render_timeout: Duration::from_secs(5),
            print_timeout: Duration::from_secs(5),
            job_retention: Duration::from_secs(3600),
        },
    }
}

/// Renderer that writes a stand-in PDF without launching a browser.
pub struct StubRenderer {
    pub dir: PathBuf,
}

#[async_trait]
impl LabelRenderer for StubRenderer {
    async fn render(
        &self,
        job_id: JobId,
        _payload: &BadgePayload,
    ) -> Result<RenderedLabel, RenderError> {
        let path = self.dir.join(format!("{job_id}.pdf"));
        tokio::fs::write(&path, b"%PDF-1.4 stub").await?;
        Ok(RenderedLabel { path })
    }
}

/// Printer that accepts every document.
pub struct AcceptingPrinter;

#[async_trait]
impl Printer for AcceptingPrinter {
    async fn print(&self, _document: &Path) -> Result<(), PrintError> {
        Ok(())
    }
}

/// A running app: router plus the worker behind it.
pub struct TestApp {
    pub router: Router,
    pub queue: Arc<PrintQueue>,
    pub dir: tempfile::TempDir,
    cancel: CancellationToken,
    /// Held when no worker runs, so the queue stays open.
    _receiver: Option<QueueReceiver>,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Build the full application router with a worker backed by stub
/// rendering and the given printer.
pub fn build_test_app(printer: Arc<dyn Printer>) -> TestApp {
    let config = test_config();
    let (queue, receiver) = PrintQueue::new(config.agent.queue_capacity);
    let dir = tempfile::tempdir().unwrap();

    let renderer = Arc::new(StubRenderer {
        dir: dir.path().to_path_buf(),
    });
    let dispatcher = Arc::new(PrintDispatcher::new(printer, config.agent.max_attempts));
    let cancel = CancellationToken::new();
    let worker = PrintWorker::new(Arc::clone(&queue), renderer, dispatcher);
    tokio::spawn(worker.run(receiver, cancel.clone()));

    let state = AppState {
        config: Arc::new(config.clone()),
        queue: Arc::clone(&queue),
    };

    TestApp {
        router: build_app_router(state, &config),
        queue,
        dir,
        cancel,
        _receiver: None,
    }
}

/// App whose printer is unconfigured, as on a laptop without `PRINT_PRINTER_NAME`.
pub fn build_unconfigured_app() -> TestApp {
    build_test_app(Arc::new(LpPrinter::new(None, Duration::from_secs(5))))
}

/// App with no worker attached: submitted jobs stay queued.
pub fn build_app_without_worker(capacity: usize) -> TestApp {
    let mut config = test_config();
    config.agent.queue_capacity = capacity;
    let (queue, receiver) = PrintQueue::new(capacity);

    let state = AppState {
        config: Arc::new(config.clone()),
        queue: Arc::clone(&queue),
    };

    TestApp {
        router: build_app_router(state, &config),
        queue,
        dir: tempfile::tempdir().unwrap(),
        cancel: CancellationToken::new(),
        _receiver: Some(receiver),
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: &TestApp, uri: &str) -> Response {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &TestApp, uri: &str, body: serde_json::Value) -> Response {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Poll `GET /jobs/{id}` until the job is printed or failed.
pub async fn wait_for_terminal(app: &TestApp, job_id: &str) -> serde_json::Value {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let response = get(app, &format!("/jobs/{job_id}")).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        if json["status"] == "printed" || json["status"] == "failed" {
            return json;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "job {job_id} did not finish: {json}"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
