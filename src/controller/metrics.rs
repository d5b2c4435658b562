//! Prometheus metrics for the Terra operator

use std::sync::atomic::AtomicU64;

use once_cell::sync::Lazy;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{exponential_buckets, Histogram};
use prometheus_client::registry::Registry;

use super::reconciler::ReconcileOutcome;

/// Labels for reconcile outcomes
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    pub outcome: String,
}

/// Labels for reconcile errors
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ErrorLabels {
    pub kind: String,
}

/// Labels for child objects created by the operator
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ChildLabels {
    pub kind: String,
}

/// Histogram tracking reconcile duration (seconds)
pub static RECONCILE_DURATION_SECONDS: Lazy<Histogram> =
    // 1ms .. ~32s across 16 buckets.
    Lazy::new(|| Histogram::new(exponential_buckets(0.001, 2.0, 16)));

/// Counter tracking successful reconciles by outcome
pub static RECONCILE_OUTCOMES_TOTAL: Lazy<Family<OutcomeLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Counter tracking reconcile errors
pub static RECONCILE_ERRORS_TOTAL: Lazy<Family<ErrorLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Counter tracking child objects created
pub static CHILDREN_CREATED_TOTAL: Lazy<Family<ChildLabels, Counter<u64, AtomicU64>>> =
    Lazy::new(Family::default);

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let mut registry = Registry::default();
    registry.register(
        "terra_validator_reconcile_duration_seconds",
        "Duration of Validator reconcile passes",
        RECONCILE_DURATION_SECONDS.clone(),
    );
    registry.register(
        "terra_validator_reconcile_outcomes",
        "Successful Validator reconcile passes by outcome",
        RECONCILE_OUTCOMES_TOTAL.clone(),
    );
    registry.register(
        "terra_validator_reconcile_errors",
        "Failed Validator reconcile passes by error kind",
        RECONCILE_ERRORS_TOTAL.clone(),
    );
    registry.register(
        "terra_validator_children_created",
        "Child objects created for Validators by kind",
        CHILDREN_CREATED_TOTAL.clone(),
    );
    registry
});

/// Observe a reconcile duration in seconds.
pub fn observe_reconcile_duration_seconds(seconds: f64) {
    RECONCILE_DURATION_SECONDS.observe(seconds);
}

/// Increment the counter for a successful reconcile.
pub fn inc_reconcile_outcome(outcome: &ReconcileOutcome) {
    let labels = OutcomeLabels {
        outcome: outcome_label(outcome).to_string(),
    };
    RECONCILE_OUTCOMES_TOTAL.get_or_create(&labels).inc();
}

/// Increment the reconcile error counter.
pub fn inc_reconcile_error(kind: &str) {
    let labels = ErrorLabels {
        kind: kind.to_string(),
    };
    RECONCILE_ERRORS_TOTAL.get_or_create(&labels).inc();
}

/// Increment the child creation counter.
pub fn inc_child_created(kind: &str) {
    let labels = ChildLabels {
        kind: kind.to_string(),
    };
    CHILDREN_CREATED_TOTAL.get_or_create(&labels).inc();
}

fn outcome_label(outcome: &ReconcileOutcome) -> &'static str {
    match outcome {
        ReconcileOutcome::ValidatorGone => "validator_gone",
        ReconcileOutcome::TerradNodeCreated => "terrad_node_created",
        ReconcileOutcome::ServiceCreated => "service_created",
        ReconcileOutcome::UpToDate => "up_to_date",
    }
}
