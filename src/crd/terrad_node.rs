//! TerradNode Custom Resource Definition
//!
//! A TerradNode is the workload resource for a single `terrad` process. It is
//! reconciled by the node controller; the Validator controller only creates it.

use k8s_openapi::api::core::v1::Volume;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The TerradNode CRD represents a running terrad node.
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema)]
#[kube(
    group = "terra.rebels.network",
    version = "v1alpha1",
    kind = "TerradNode",
    namespaced,
    shortname = "tn",
    printcolumn = r#"{"name":"Image","type":"string","jsonPath":".spec.nodeImage"}"#,
    printcolumn = r#"{"name":"FullNode","type":"boolean","jsonPath":".spec.isFullNode"}"#,
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct TerradNodeSpec {
    /// Container image running terrad
    pub node_image: String,

    /// Run as a full node
    #[serde(default)]
    pub is_full_node: bool,

    /// Volume holding the node's chain data
    #[schemars(schema_with = "super::types::free_form_object")]
    pub data_volume: Volume,

    /// Commands executed in the node container once it has started
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub post_start_command: Vec<String>,
}
