//! Terra-Operator: Kubernetes Operator for Terra validator nodes
//!
//! This crate provides a Kubernetes operator that turns a `Validator` resource
//! into the `TerradNode` running it and, for public validators, the `Service`
//! exposing its ports.

pub mod controller;
pub mod crd;
pub mod error;
pub mod telemetry;

#[cfg(feature = "rest-api")]
pub mod rest_api;

pub use crate::error::{Error, Result};
