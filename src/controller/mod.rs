//! Controller module for Validator reconciliation
//!
//! This module contains the main controller loop, reconciliation logic,
//! and the builders for the objects a Validator owns.

#[cfg(feature = "metrics")]
pub mod metrics;
#[cfg(any(test, feature = "test-util"))]
pub mod mock_store;
mod reconciler;
#[cfg(test)]
mod reconciler_test;
pub mod resources;
pub mod store;

#[cfg(any(test, feature = "test-util"))]
pub use mock_store::{InMemoryStore, StoreCall};
pub use reconciler::{reconcile_validator, run_controller, ControllerState, ReconcileOutcome};
pub use store::{KubeStore, ManagedResource, ObjectKey, ObjectStore};
