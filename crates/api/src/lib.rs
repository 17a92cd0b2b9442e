//! Check-in print agent HTTP front.
//!
//! Exposes config, state, error handling, and routes so integration tests
//! and the `print-agent` binary share the same building blocks.

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod routes;
pub mod state;
