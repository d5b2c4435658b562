//! HTTP handlers for the REST API

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use k8s_openapi::api::core::v1::Service;
use kube::api::{Api, ListParams};
use tracing::{error, instrument};

use crate::controller::{ControllerState, ObjectKey, ObjectStore};
use crate::crd::{TerradNode, Validator};
use crate::error::{Error, Result};

use super::dto::{
    ChildrenStatus, ErrorResponse, HealthResponse, ValidatorDetailResponse,
    ValidatorListResponse, ValidatorSummary,
};

type ApiError = (StatusCode, Json<ErrorResponse>);

/// Health check endpoint
#[instrument]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// List Validators in the watched scope
#[instrument(skip(state))]
pub async fn list_validators(
    State(state): State<Arc<ControllerState>>,
) -> std::result::Result<Json<ValidatorListResponse>, ApiError> {
    let api: Api<Validator> = state.scoped_api();

    match api.list(&ListParams::default()).await {
        Ok(validators) => {
            let items: Vec<ValidatorSummary> =
                validators.items.iter().map(ValidatorSummary::from).collect();
            let total = items.len();
            Ok(Json(ValidatorListResponse { items, total }))
        }
        Err(e) => {
            error!("Failed to list validators: {:?}", e);
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("list_failed", &e.to_string())),
            ))
        }
    }
}

/// Get a specific Validator together with the state of its children
#[instrument(skip(state), fields(name = %name, namespace = %namespace))]
pub async fn get_validator(
    State(state): State<Arc<ControllerState>>,
    Path((namespace, name)): Path<(String, String)>,
) -> std::result::Result<Json<ValidatorDetailResponse>, ApiError> {
    let key = ObjectKey::new(&namespace, &name);

    let found: Option<Validator> = state.store.get(&key).await.map_err(|e| {
        error!("Failed to get validator {}: {:?}", key, e);
        lookup_failed(&e)
    })?;

    let Some(validator) = found else {
        return Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new(
                "not_found",
                &format!("Validator {} not found", key),
            )),
        ));
    };

    let children = children_status(&state.store, &key).await.map_err(|e| {
        error!("Failed to look up children of {}: {:?}", key, e);
        lookup_failed(&e)
    })?;

    Ok(Json(ValidatorDetailResponse::new(&validator, children)))
}

/// Which children of the Validator at `key` exist
///
/// Children share the Validator's namespaced name.
pub(crate) async fn children_status<S: ObjectStore>(
    store: &S,
    key: &ObjectKey,
) -> Result<ChildrenStatus> {
    let node: Option<TerradNode> = store.get(key).await?;
    let service: Option<Service> = store.get(key).await?;

    Ok(ChildrenStatus {
        terrad_node: node.is_some(),
        service: service.is_some(),
    })
}

fn lookup_failed(e: &Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("get_failed", &e.to_string())),
    )
}
