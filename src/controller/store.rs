//! Object store abstraction used by the reconciler
//!
//! The reconciler only needs two calls against the cluster: fetch a namespaced
//! object by name, and create one. `ObjectStore` captures exactly that so the
//! convergence logic can run against the API server or an in-memory double.

use std::fmt::Debug;

use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, PostParams};
use kube::{Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::{Error, Result};

/// Namespaced API kinds the store can read and write
pub trait ManagedResource:
    Resource<DynamicType = (), Scope = NamespaceResourceScope>
    + Clone
    + Debug
    + DeserializeOwned
    + Serialize
    + Send
    + Sync
    + 'static
{
}

impl<K> ManagedResource for K where
    K: Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + Debug
        + DeserializeOwned
        + Serialize
        + Send
        + Sync
        + 'static
{
}

/// Namespaced name of an object
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    /// Key of an existing object, falling back to the "default" namespace
    pub fn of<K: Resource>(obj: &K) -> Self {
        Self {
            namespace: obj.namespace().unwrap_or_else(|| "default".to_string()),
            name: obj.name_any(),
        }
    }
}

impl std::fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Trait for the cluster operations the reconciler performs
///
/// All async methods must be `Send` to work with Tokio's work-stealing runtime.
#[async_trait::async_trait]
pub trait ObjectStore: Send + Sync {
    /// Fetch an object; `Ok(None)` when it does not exist
    async fn get<K: ManagedResource>(&self, key: &ObjectKey) -> Result<Option<K>>;

    /// Create an object in its own namespace
    async fn create<K: ManagedResource>(&self, obj: &K) -> Result<()>;
}

/// `ObjectStore` backed by the Kubernetes API server
#[derive(Clone)]
pub struct KubeStore {
    client: Client,
}

impl KubeStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ObjectStore for KubeStore {
    async fn get<K: ManagedResource>(&self, key: &ObjectKey) -> Result<Option<K>> {
        let api: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);

        match api.get(&key.name).await {
            Ok(obj) => Ok(Some(obj)),
            Err(kube::Error::Api(e)) if e.code == 404 => {
                debug!("{} {} not found", K::kind(&()), key);
                Ok(None)
            }
            Err(e) => Err(Error::KubeError(e)),
        }
    }

    async fn create<K: ManagedResource>(&self, obj: &K) -> Result<()> {
        let key = ObjectKey::of(obj);
        let api: Api<K> = Api::namespaced(self.client.clone(), &key.namespace);

        api.create(&PostParams::default(), obj).await?;
        Ok(())
    }
}
