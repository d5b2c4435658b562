//! Data Transfer Objects for the REST API
//!
//! These types are used for API responses.

use kube::ResourceExt;
use serde::Serialize;

use crate::crd::Validator;

/// Response for listing validators
#[derive(Debug, Serialize)]
pub struct ValidatorListResponse {
    pub items: Vec<ValidatorSummary>,
    pub total: usize,
}

/// Summary of a Validator for list views
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorSummary {
    pub name: String,
    pub namespace: String,
    pub chain_id: String,
    pub moniker: String,
    pub is_public: bool,
}

impl From<&Validator> for ValidatorSummary {
    fn from(v: &Validator) -> Self {
        Self {
            name: v.name_any(),
            namespace: v.namespace().unwrap_or_default(),
            chain_id: v.spec.chain_id.clone(),
            moniker: v.spec.name.clone(),
            is_public: v.spec.is_public,
        }
    }
}

/// Response for a single validator
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorDetailResponse {
    #[serde(flatten)]
    pub summary: ValidatorSummary,
    pub node_image: String,
    pub from_key_name: String,
    pub initial_self_bond_amount: String,
    pub initial_commission_rate: String,
    pub maximum_commission: String,
    pub commission_change_rate: String,
    pub minimum_self_bond_amount: String,
    pub children: ChildrenStatus,
    pub created_at: Option<String>,
}

/// Which owned objects currently exist
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChildrenStatus {
    pub terrad_node: bool,
    pub service: bool,
}

impl ValidatorDetailResponse {
    pub fn new(v: &Validator, children: ChildrenStatus) -> Self {
        Self {
            summary: ValidatorSummary::from(v),
            node_image: v.spec.node_image.clone(),
            from_key_name: v.spec.from_key_name.clone(),
            initial_self_bond_amount: v.spec.initial_self_bond_amount.clone(),
            initial_commission_rate: v.spec.initial_commission_rate.clone(),
            maximum_commission: v.spec.maximum_commission.clone(),
            commission_change_rate: v.spec.commission_change_rate.clone(),
            minimum_self_bond_amount: v.spec.minimum_self_bond_amount.clone(),
            children,
            created_at: v
                .metadata
                .creation_timestamp
                .as_ref()
                .map(|t| t.0.to_rfc3339()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: message.to_string(),
        }
    }
}
