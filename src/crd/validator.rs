//! Validator Custom Resource Definition
//!
//! The Validator CRD describes a Terra validator: the staking parameters used to
//! register it on chain, the node image and data volume it runs with, and whether
//! its ports are exposed through a Service.

use k8s_openapi::api::core::v1::Volume;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The Validator CRD represents a managed Terra validator node.
///
/// # Example
///
/// ```yaml
/// apiVersion: terra.rebels.network/v1alpha1
/// kind: Validator
/// metadata:
///   name: my-validator
///   namespace: terra
/// spec:
///   chainId: columbus-5
///   name: my-moniker
///   fromKeyName: validator
///   initialSelfBondAmount: 1000000uluna
///   initialCommissionRate: "0.10"
///   maximumCommission: "0.20"
///   commissionChangeRate: "0.01"
///   minimumSelfBondAmount: "1"
///   nodeImage: terramoney/core-node:v0.5.20
///   dataVolume:
///     name: terrad-data
///     persistentVolumeClaim:
///       claimName: terrad-data
///   isPublic: true
/// ```
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "terra.rebels.network",
    version = "v1alpha1",
    kind = "Validator",
    namespaced,
    shortname = "val",
    printcolumn = r#"{"name":"Chain","type":"string","jsonPath":".spec.chainId"}"#,
    printcolumn = r#"{"name":"Moniker","type":"string","jsonPath":".spec.name"}"#,
    printcolumn = r#"{"name":"Public","type":"boolean","jsonPath":".spec.isPublic"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct ValidatorSpec {
    /// Chain the validator joins (e.g., "columbus-5")
    pub chain_id: String,

    /// Validator moniker shown on chain
    pub name: String,

    /// Name of the keyring entry that signs the create-validator transaction
    pub from_key_name: String,

    /// Amount bonded on creation (e.g., "1000000uluna")
    pub initial_self_bond_amount: String,

    /// Initial commission rate (e.g., "0.10")
    pub initial_commission_rate: String,

    /// Maximum commission rate the validator may ever charge
    pub maximum_commission: String,

    /// Maximum daily change of the commission rate
    pub commission_change_rate: String,

    /// Minimum self delegation the validator must keep
    pub minimum_self_bond_amount: String,

    /// Container image running terrad
    pub node_image: String,

    /// Volume holding the node's chain data
    #[schemars(schema_with = "super::types::free_form_object")]
    pub data_volume: Volume,

    /// Expose the node's p2p, rpc, lcd and prometheus ports through a Service
    #[serde(default)]
    pub is_public: bool,
}
