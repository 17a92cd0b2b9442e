//! Domain types for the check-in print agent.
//!
//! Pure logic only: request validation, job lifecycle types, and the
//! badge label template. Nothing in this crate performs I/O.

pub mod badge;
pub mod error;
pub mod job;
pub mod label;
pub mod types;
