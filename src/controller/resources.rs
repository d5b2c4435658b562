//! Kubernetes resource builders for Validator
//!
//! This module maps a Validator to the child objects it owns: the TerradNode that
//! runs the node and, for public validators, the Service exposing its ports.
//! Builders are pure; owner references are attached separately so a Validator
//! without a uid fails at a single, well-defined point.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::{Service, ServicePort, ServiceSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::{Resource, ResourceExt};

use crate::crd::{NodePort, TerradNode, TerradNodeSpec, Validator, ValidatorSpec};
use crate::error::{Error, Result};

/// Label key selecting a validator's pods
pub const APP_LABEL: &str = "app";

/// Labels shared by every child of a Validator, also used as the Service selector
pub fn app_labels(validator: &Validator) -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert(APP_LABEL.to_string(), validator.name_any());
    labels
}

/// Create the controller OwnerReference for garbage collection
pub fn owner_reference(validator: &Validator) -> Result<OwnerReference> {
    validator
        .controller_owner_ref(&())
        .map(|owner| OwnerReference {
            block_owner_deletion: Some(true),
            ..owner
        })
        .ok_or_else(|| {
            Error::OwnerReferenceError(format!(
                "Validator {} has no uid; cannot own child objects",
                validator.name_any()
            ))
        })
}

/// Make `validator` the controller owner of `child`
pub fn set_controller_reference<K: Resource>(validator: &Validator, child: &mut K) -> Result<()> {
    let owner = owner_reference(validator)?;
    let refs = child.meta_mut().owner_references.get_or_insert_with(Vec::new);

    if let Some(existing) = refs
        .iter()
        .find(|r| r.controller == Some(true) && r.uid != owner.uid)
    {
        return Err(Error::OwnerReferenceError(format!(
            "object is already controlled by {} {}",
            existing.kind, existing.name
        )));
    }

    refs.retain(|r| r.uid != owner.uid);
    refs.push(owner);
    Ok(())
}

fn child_metadata(validator: &Validator) -> ObjectMeta {
    ObjectMeta {
        name: Some(validator.name_any()),
        namespace: validator.namespace(),
        labels: Some(app_labels(validator)),
        ..Default::default()
    }
}

// ============================================================================
// TerradNode
// ============================================================================

/// Render the shell command that registers the validator on chain
///
/// Values are substituted verbatim; the node runs this string through a shell.
pub fn post_start_command(spec: &ValidatorSpec) -> String {
    format!(
        "terrad tx staking create-validator \
         --pubkey=$(terrad tendermint show-validator) \
         --chain-id={} \
         --moniker=\"{}\" \
         --from={} \
         --amount={} \
         --commission-rate=\"{}\" \
         --commission-max-rate=\"{}\" \
         --commission-max-change-rate=\"{}\" \
         --min-self-delegation=\"{}\" \
         --gas auto \
         --node tcp://127.0.0.1:26647",
        spec.chain_id,
        spec.name,
        spec.from_key_name,
        spec.initial_self_bond_amount,
        spec.initial_commission_rate,
        spec.maximum_commission,
        spec.commission_change_rate,
        spec.minimum_self_bond_amount,
    )
}

/// Build the desired TerradNode for a Validator
pub fn build_terrad_node(validator: &Validator) -> TerradNode {
    TerradNode {
        metadata: child_metadata(validator),
        spec: TerradNodeSpec {
            node_image: validator.spec.node_image.clone(),
            is_full_node: true,
            data_volume: validator.spec.data_volume.clone(),
            post_start_command: vec![post_start_command(&validator.spec)],
        },
    }
}

// ============================================================================
// Service
// ============================================================================

/// Build the desired Service exposing a public Validator's ports
pub fn build_service(validator: &Validator) -> Service {
    let ports = NodePort::ALL
        .iter()
        .map(|port| ServicePort {
            name: Some(port.name().to_string()),
            port: port.number(),
            target_port: Some(IntOrString::String(port.name().to_string())),
            ..Default::default()
        })
        .collect();

    Service {
        metadata: child_metadata(validator),
        spec: Some(ServiceSpec {
            ports: Some(ports),
            selector: Some(app_labels(validator)),
            ..Default::default()
        }),
        status: None,
    }
}
