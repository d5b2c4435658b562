//! Main reconciler for Validator resources
//!
//! Implements the controller pattern using kube-rs runtime.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use k8s_openapi::api::core::v1::Service;
use kube::{
    api::{Api, ListParams},
    client::Client,
    runtime::{
        controller::{self, Action, Controller},
        watcher::Config,
    },
    ResourceExt,
};
use tracing::{debug, error, info, instrument};

use crate::crd::{TerradNode, Validator};
use crate::error::{Error, Result};

use super::resources;
use super::store::{KubeStore, ObjectKey, ObjectStore};

#[cfg(feature = "metrics")]
use super::metrics;

/// Requeue delay after an API error
const RETRY_DELAY: Duration = Duration::from_secs(15);

/// Requeue delay after an error that needs the Validator to change first
const SLOW_RETRY_DELAY: Duration = Duration::from_secs(60);

/// Shared state for the controller
pub struct ControllerState {
    pub client: Client,
    pub store: KubeStore,
    /// Namespace to watch; all namespaces when unset
    pub namespace: Option<String>,
}

impl ControllerState {
    pub fn new(client: Client, namespace: Option<String>) -> Self {
        Self {
            store: KubeStore::new(client.clone()),
            client,
            namespace,
        }
    }

    /// Api handle for `K` in the watched scope
    pub fn scoped_api<K>(&self) -> Api<K>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope, DynamicType = ()>
            + Clone
            + serde::de::DeserializeOwned
            + std::fmt::Debug,
    {
        match &self.namespace {
            Some(ns) => Api::namespaced(self.client.clone(), ns),
            None => Api::all(self.client.clone()),
        }
    }
}

/// What a reconcile pass did
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The Validator no longer exists; its children are garbage collected
    ValidatorGone,
    /// The TerradNode was missing and has been created
    TerradNodeCreated,
    /// The Service of a public Validator was missing and has been created
    ServiceCreated,
    /// Every child that should exist already exists
    UpToDate,
}

/// Main entry point to start the controller
pub async fn run_controller(state: Arc<ControllerState>) -> Result<()> {
    let validators: Api<Validator> = state.scoped_api();

    info!(
        "Starting Validator controller (scope: {})",
        state.namespace.as_deref().unwrap_or("cluster-wide")
    );

    // Verify CRD exists
    match validators.list(&ListParams::default().limit(1)).await {
        Ok(_) => info!("Validator CRD is available"),
        Err(e) => {
            error!(
                "Validator CRD not found. Please install the CRD first: {:?}",
                e
            );
            return Err(Error::ConfigError("Validator CRD not installed".to_string()));
        }
    }

    Controller::new(validators, Config::default())
        // Children are mapped back to the Validator through their controller owner reference
        .owns::<TerradNode>(state.scoped_api(), Config::default())
        .owns::<Service>(state.scoped_api(), Config::default())
        .shutdown_on_signal()
        .run(reconcile, error_policy, state)
        .for_each(|res| async move {
            match res {
                Ok((obj, _action)) => debug!("Reconciled: {}", obj),
                // Child events can arrive after their Validator was deleted
                Err(controller::Error::ObjectNotFound(obj)) => {
                    debug!("Validator {} no longer exists", obj)
                }
                Err(e) => error!("Reconcile error: {:?}", e),
            }
        })
        .await;

    info!("Validator controller stopped");
    Ok(())
}

/// The reconciliation function handed to the kube-rs controller
///
/// This function is called whenever:
/// - A Validator is created, updated, or deleted
/// - An owned resource (TerradNode, Service) changes
/// - A requeue after an error expires
async fn reconcile(obj: Arc<Validator>, ctx: Arc<ControllerState>) -> Result<Action> {
    let key = ObjectKey::of(obj.as_ref());

    #[cfg(feature = "metrics")]
    let started = std::time::Instant::now();

    let result = reconcile_validator(&ctx.store, &key).await;

    #[cfg(feature = "metrics")]
    {
        metrics::observe_reconcile_duration_seconds(started.elapsed().as_secs_f64());
        match &result {
            Ok(outcome) => metrics::inc_reconcile_outcome(outcome),
            Err(e) => metrics::inc_reconcile_error(e.kind()),
        }
    }

    result.map(|_| Action::await_change())
}

/// Converge the children of the Validator named by `key`
///
/// The Validator is fetched fresh through `store`. At most one child is created per
/// pass: a new TerradNode ends the pass, and the Service is handled on the reconcile
/// its creation event triggers.
#[instrument(skip_all, fields(namespace = %key.namespace, name = %key.name))]
pub async fn reconcile_validator<S: ObjectStore>(
    store: &S,
    key: &ObjectKey,
) -> Result<ReconcileOutcome> {
    info!("Reconciling Validator {}", key);

    let found: Option<Validator> = store.get(key).await?;
    let Some(validator) = found else {
        // Owned objects are garbage collected through their owner references
        debug!("Validator {} not found, nothing to do", key);
        return Ok(ReconcileOutcome::ValidatorGone);
    };

    let mut terrad = resources::build_terrad_node(&validator);
    resources::set_controller_reference(&validator, &mut terrad)?;

    let terrad_key = ObjectKey::of(&terrad);
    let existing_terrad: Option<TerradNode> = store.get(&terrad_key).await?;
    if existing_terrad.is_none() {
        info!("Creating a new TerradNode {}", terrad_key);
        store.create(&terrad).await?;

        #[cfg(feature = "metrics")]
        metrics::inc_child_created("TerradNode");

        return Ok(ReconcileOutcome::TerradNodeCreated);
    }

    if !validator.spec.is_public {
        return Ok(ReconcileOutcome::UpToDate);
    }

    let mut service = resources::build_service(&validator);
    resources::set_controller_reference(&validator, &mut service)?;

    let service_key = ObjectKey::of(&service);
    let existing_service: Option<Service> = store.get(&service_key).await?;
    if existing_service.is_none() {
        info!("Creating a new Service {}", service_key);
        store.create(&service).await?;

        #[cfg(feature = "metrics")]
        metrics::inc_child_created("Service");

        return Ok(ReconcileOutcome::ServiceCreated);
    }

    Ok(ReconcileOutcome::UpToDate)
}

/// Error policy determines how to handle reconciliation errors
fn error_policy(validator: Arc<Validator>, error: &Error, _ctx: Arc<ControllerState>) -> Action {
    error!(
        "Reconciliation error for {}: {:?}",
        validator.name_any(),
        error
    );

    Action::requeue(requeue_delay(error))
}

/// Backoff before retrying after `error`
pub(crate) fn requeue_delay(error: &Error) -> Duration {
    if error.is_retriable() {
        RETRY_DELAY
    } else {
        SLOW_RETRY_DELAY
    }
}
