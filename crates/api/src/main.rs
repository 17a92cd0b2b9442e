//! `print-agent` -- check-in badge printing service.
//!
//! Runs on the check-in laptop next to the label printer. Accepts badge
//! print requests over HTTP, renders each badge to PDF with headless
//! Chromium and sends it to the printer named by `PRINT_PRINTER_NAME`,
//! strictly one job at a time.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hub_api::config::ServerConfig;
use hub_api::router::build_app_router;
use hub_api::state::AppState;
use hub_printer::{ChromiumRenderer, LabelRenderer, LpPrinter, PrintDispatcher, RendererConfig};
use hub_worker::{retention, PrintQueue, PrintWorker};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "hub_api=debug,hub_worker=debug,hub_printer=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");

    let agent = &config.agent;
    match agent.printer_name.as_deref() {
        Some(printer) => tracing::info!(printer, "Printing enabled"),
        None => tracing::warn!("PRINT_PRINTER_NAME is not set; every print job will fail"),
    }

    // --- Print pipeline ---
    let renderer = Arc::new(ChromiumRenderer::new(RendererConfig {
        executable: agent.chromium_path.clone(),
        work_dir: agent.work_dir.clone(),
        timeout: agent.render_timeout,
    }));
    let printer = Arc::new(LpPrinter::new(
        agent.printer_name.clone(),
        agent.print_timeout,
    ));
    let dispatcher = Arc::new(PrintDispatcher::new(printer, agent.max_attempts));

    let (queue, receiver) = PrintQueue::new(agent.queue_capacity);
    let worker_cancel = CancellationToken::new();

    let worker = PrintWorker::new(
        Arc::clone(&queue),
        Arc::clone(&renderer) as Arc<dyn LabelRenderer>,
        dispatcher,
    );
    let worker_handle = tokio::spawn(worker.run(receiver, worker_cancel.clone()));

    let retention_handle = tokio::spawn(retention::run(
        Arc::clone(&queue),
        agent.job_retention,
        worker_cancel.clone(),
    ));

    tracing::info!(
        capacity = agent.queue_capacity,
        work_dir = %agent.work_dir.display(),
        "Print queue started"
    );

    // --- App state ---
    let state = AppState {
        config: Arc::new(config.clone()),
        queue,
    };

    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The worker finishes the job in hand before it observes cancellation.
    worker_cancel.cancel();
    let _ = tokio::time::timeout(Duration::from_secs(60), worker_handle).await;
    let _ = tokio::time::timeout(Duration::from_secs(5), retention_handle).await;
    tracing::info!("Print worker stopped");

    renderer.shutdown().await;

    tracing::info!("Graceful shutdown complete");
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
