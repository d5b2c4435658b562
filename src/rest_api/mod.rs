//! REST API module for external integrations
//!
//! Provides a read-only HTTP API for querying Validators and the
//! objects the operator created for them.

mod dto;
mod handlers;
mod server;

pub use server::run_server;
