use std::sync::Arc;

use hub_worker::PrintQueue;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything inside is behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// The badge print queue. Handlers submit and read; the worker drains.
    pub queue: Arc<PrintQueue>,
}
