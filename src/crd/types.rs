//! Shared types for Terra node specifications
//!
//! These types are used across the CRD definitions and controller logic.

use schemars::gen::SchemaGenerator;
use schemars::schema::{InstanceType, Schema, SchemaObject};

/// Ports a terrad node listens on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodePort {
    /// Tendermint peer-to-peer gossip
    P2p,
    /// Tendermint RPC
    Rpc,
    /// Light client daemon (REST)
    Lcd,
    /// Tendermint Prometheus exporter
    Prometheus,
}

impl NodePort {
    /// Every port exposed for a public validator, in Service order
    pub const ALL: [NodePort; 4] = [
        NodePort::P2p,
        NodePort::Rpc,
        NodePort::Lcd,
        NodePort::Prometheus,
    ];

    /// Port name, shared by the Service port and the container port it targets
    pub fn name(&self) -> &'static str {
        match self {
            NodePort::P2p => "p2p",
            NodePort::Rpc => "rpc",
            NodePort::Lcd => "lcd",
            NodePort::Prometheus => "prometheus",
        }
    }

    /// Port number
    pub fn number(&self) -> i32 {
        match self {
            NodePort::P2p => 26656,
            NodePort::Rpc => 26657,
            NodePort::Lcd => 1317,
            NodePort::Prometheus => 26660,
        }
    }
}

impl std::fmt::Display for NodePort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.name(), self.number())
    }
}

/// Schema for embedded core types (such as `Volume`) that have no JSON schema
///
/// The API server requires a structural schema, so the field is an object whose
/// contents are kept unvalidated.
pub fn free_form_object(_gen: &mut SchemaGenerator) -> Schema {
    let mut schema = SchemaObject {
        instance_type: Some(InstanceType::Object.into()),
        ..Default::default()
    };
    schema.extensions.insert(
        "x-kubernetes-preserve-unknown-fields".to_string(),
        serde_json::Value::Bool(true),
    );
    Schema::Object(schema)
}
