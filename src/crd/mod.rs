//! Custom Resource Definitions for the Terra operator
//!
//! This module defines the Kubernetes CRDs for managing Terra validators.

mod terrad_node;
mod types;
mod validator;


pub use terrad_node::{TerradNode, TerradNodeSpec};
pub use types::*;
pub use validator::{Validator, ValidatorSpec};
