//! Tests for the reconciler module
//!
//! These tests verify the core reconciliation logic including:
//! - Child creation from a fresh state
//! - Idempotency once converged
//! - Public and private Validators
//! - Error propagation for retries

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use k8s_openapi::api::core::v1::{Service, Volume};
    use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
    use kube::api::ObjectMeta;
    use tokio_test::{assert_err, assert_ok};

    use super::super::reconciler::*;
    use crate::controller::mock_store::{InMemoryStore, StoreCall};
    use crate::controller::resources::{build_service, build_terrad_node};
    use crate::controller::store::ObjectKey;
    use crate::crd::{TerradNode, Validator, ValidatorSpec};
    use crate::error::Error;

    /// Helper to create a test Validator
    fn create_test_validator(name: &str, namespace: &str, is_public: bool) -> Validator {
        Validator {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                uid: Some(format!("test-uid-{}", name)),
                ..Default::default()
            },
            spec: ValidatorSpec {
                chain_id: "test-1".to_string(),
                name: "val1".to_string(),
                from_key_name: "k".to_string(),
                initial_self_bond_amount: "100uluna".to_string(),
                initial_commission_rate: "0.1".to_string(),
                maximum_commission: "0.2".to_string(),
                commission_change_rate: "0.01".to_string(),
                minimum_self_bond_amount: "1uluna".to_string(),
                node_image: "terramoney/core-node:v0.5.20".to_string(),
                data_volume: Volume {
                    name: "terrad-data".to_string(),
                    ..Default::default()
                },
                is_public,
            },
        }
    }

    fn store_with(validator: &Validator) -> InMemoryStore {
        let store = InMemoryStore::new();
        store.insert(validator);
        store
    }

    // -----------------------------------------------------------------------
    // Missing Validator
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_missing_validator_is_a_no_op() {
        let store = InMemoryStore::new();
        let key = ObjectKey::new("terra", "gone");

        let outcome = assert_ok!(reconcile_validator(&store, &key).await);

        assert_eq!(outcome, ReconcileOutcome::ValidatorGone);
        assert_eq!(
            store.calls(),
            vec![StoreCall::Get {
                kind: "Validator".to_string(),
                key,
            }]
        );
    }

    // -----------------------------------------------------------------------
    // TerradNode creation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_creates_terrad_node_first() {
        let validator = create_test_validator("val-a", "terra", true);
        let store = store_with(&validator);
        let key = ObjectKey::of(&validator);

        let outcome = assert_ok!(reconcile_validator(&store, &key).await);

        assert_eq!(outcome, ReconcileOutcome::TerradNodeCreated);
        assert_eq!(store.created_kinds(), vec!["TerradNode".to_string()]);
        // The Service waits for the next pass even for public Validators
        assert!(!store.touched("Service"));
    }

    #[tokio::test]
    async fn test_created_terrad_node_is_owned_by_validator() {
        let validator = create_test_validator("val-a", "terra", false);
        let store = store_with(&validator);
        let key = ObjectKey::of(&validator);

        assert_ok!(reconcile_validator(&store, &key).await);

        let node: TerradNode = store.object(&key).unwrap();
        let owners = node.metadata.owner_references.unwrap();
        assert_eq!(owners.len(), 1);
        assert_eq!(owners[0].kind, "Validator");
        assert_eq!(owners[0].name, "val-a");
        assert_eq!(owners[0].uid, "test-uid-val-a");
        assert_eq!(owners[0].controller, Some(true));
        assert_eq!(owners[0].block_owner_deletion, Some(true));
        assert!(node.spec.is_full_node);
        assert_eq!(node.spec.post_start_command.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Service creation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_public_validator_gets_service_on_second_pass() {
        let validator = create_test_validator("val-b", "terra", true);
        let store = store_with(&validator);
        let key = ObjectKey::of(&validator);

        assert_ok!(reconcile_validator(&store, &key).await);
        store.clear_calls();

        let outcome = assert_ok!(reconcile_validator(&store, &key).await);

        assert_eq!(outcome, ReconcileOutcome::ServiceCreated);
        assert_eq!(store.created_kinds(), vec!["Service".to_string()]);

        let service: Service = store.object(&key).unwrap();
        let spec = service.spec.unwrap();
        let ports: Vec<(String, i32, Option<IntOrString>)> = spec
            .ports
            .unwrap()
            .into_iter()
            .map(|p| (p.name.unwrap_or_default(), p.port, p.target_port))
            .collect();
        assert_eq!(
            ports,
            vec![
                ("p2p".to_string(), 26656, Some(IntOrString::String("p2p".to_string()))),
                ("rpc".to_string(), 26657, Some(IntOrString::String("rpc".to_string()))),
                ("lcd".to_string(), 1317, Some(IntOrString::String("lcd".to_string()))),
                (
                    "prometheus".to_string(),
                    26660,
                    Some(IntOrString::String("prometheus".to_string()))
                ),
            ]
        );
        assert_eq!(
            spec.selector
                .unwrap()
                .get("app")
                .map(String::as_str),
            Some("val-b")
        );
        let owners = service.metadata.owner_references.unwrap();
        assert_eq!(owners[0].uid, "test-uid-val-b");
    }

    #[tokio::test]
    async fn test_private_validator_never_gets_service() {
        let validator = create_test_validator("val-c", "terra", false);
        let store = store_with(&validator);
        let key = ObjectKey::of(&validator);

        assert_ok!(reconcile_validator(&store, &key).await);
        store.clear_calls();

        let outcome = assert_ok!(reconcile_validator(&store, &key).await);

        assert_eq!(outcome, ReconcileOutcome::UpToDate);
        assert!(store.created_kinds().is_empty());
        assert!(!store.touched("Service"));
    }

    #[tokio::test]
    async fn test_private_validator_leaves_existing_service_alone() {
        let validator = create_test_validator("val-d", "terra", false);
        let store = store_with(&validator);
        store.insert(&build_terrad_node(&validator));
        store.insert(&build_service(&validator));
        let key = ObjectKey::of(&validator);

        let outcome = assert_ok!(reconcile_validator(&store, &key).await);

        assert_eq!(outcome, ReconcileOutcome::UpToDate);
        assert!(store.created_kinds().is_empty());
        assert!(store.object::<Service>(&key).is_some());
    }

    // -----------------------------------------------------------------------
    // Idempotency
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_converged_validator_creates_nothing() {
        let validator = create_test_validator("val-e", "terra", true);
        let store = store_with(&validator);
        let key = ObjectKey::of(&validator);

        assert_ok!(reconcile_validator(&store, &key).await);
        assert_ok!(reconcile_validator(&store, &key).await);
        store.clear_calls();

        let outcome = assert_ok!(reconcile_validator(&store, &key).await);
        assert_eq!(outcome, ReconcileOutcome::UpToDate);
        let outcome = assert_ok!(reconcile_validator(&store, &key).await);
        assert_eq!(outcome, ReconcileOutcome::UpToDate);

        assert!(store.created_kinds().is_empty());
    }

    #[tokio::test]
    async fn test_existing_terrad_node_is_not_updated() {
        let validator = create_test_validator("val-f", "terra", false);
        let store = store_with(&validator);
        let mut stale = build_terrad_node(&validator);
        stale.spec.node_image = "terramoney/core-node:old".to_string();
        store.insert(&stale);
        let key = ObjectKey::of(&validator);

        let outcome = assert_ok!(reconcile_validator(&store, &key).await);

        assert_eq!(outcome, ReconcileOutcome::UpToDate);
        let node: TerradNode = store.object(&key).unwrap();
        assert_eq!(node.spec.node_image, "terramoney/core-node:old");
    }

    // -----------------------------------------------------------------------
    // Errors
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn test_validator_fetch_error_propagates() {
        let validator = create_test_validator("val-g", "terra", true);
        let store = store_with(&validator);
        store.fail_get("Validator", 500);
        let key = ObjectKey::of(&validator);

        let err = assert_err!(reconcile_validator(&store, &key).await);

        assert!(err.is_retriable());
        assert!(!err.is_not_found());
        assert!(store.created_kinds().is_empty());
    }

    #[tokio::test]
    async fn test_terrad_node_lookup_error_propagates() {
        let validator = create_test_validator("val-h", "terra", true);
        let store = store_with(&validator);
        store.fail_get("TerradNode", 503);
        let key = ObjectKey::of(&validator);

        assert_err!(reconcile_validator(&store, &key).await);
        assert!(store.created_kinds().is_empty());
    }

    #[tokio::test]
    async fn test_terrad_node_create_error_propagates() {
        let validator = create_test_validator("val-i", "terra", true);
        let store = store_with(&validator);
        store.fail_create("TerradNode", 409);
        let key = ObjectKey::of(&validator);

        let err = assert_err!(reconcile_validator(&store, &key).await);

        assert!(matches!(err, Error::KubeError(_)));
        assert!(store.object::<TerradNode>(&key).is_none());
    }

    #[tokio::test]
    async fn test_service_create_error_propagates() {
        let validator = create_test_validator("val-j", "terra", true);
        let store = store_with(&validator);
        store.insert(&build_terrad_node(&validator));
        store.fail_create("Service", 500);
        let key = ObjectKey::of(&validator);

        assert_err!(reconcile_validator(&store, &key).await);
        assert_eq!(store.created_kinds(), vec!["Service".to_string()]);
    }

    #[tokio::test]
    async fn test_service_lookup_error_propagates() {
        let validator = create_test_validator("val-l", "terra", true);
        let store = store_with(&validator);
        store.insert(&build_terrad_node(&validator));
        store.fail_get("Service", 500);
        let key = ObjectKey::of(&validator);

        let err = assert_err!(reconcile_validator(&store, &key).await);

        assert!(err.is_retriable());
        assert!(store.touched("Service"));
        assert!(store.created_kinds().is_empty());
        assert!(store.object::<Service>(&key).is_none());
    }

    #[tokio::test]
    async fn test_validator_without_uid_cannot_own_children() {
        let mut validator = create_test_validator("val-k", "terra", true);
        validator.metadata.uid = None;
        let store = store_with(&validator);
        let key = ObjectKey::of(&validator);

        let err = assert_err!(reconcile_validator(&store, &key).await);

        assert!(matches!(err, Error::OwnerReferenceError(_)));
        assert!(!err.is_retriable());
        assert!(!store.touched("TerradNode"));
    }

    #[test]
    fn test_requeue_delay_depends_on_error() {
        let owner_err = Error::OwnerReferenceError("no uid".to_string());
        let api_err = Error::KubeError(kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "conflict".to_string(),
            reason: "Conflict".to_string(),
            code: 409,
        }));

        assert_eq!(requeue_delay(&api_err), Duration::from_secs(15));
        assert_eq!(requeue_delay(&owner_err), Duration::from_secs(60));
    }
}
