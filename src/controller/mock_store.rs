//! In-memory `ObjectStore` for unit testing
//!
//! Stores objects as JSON keyed by kind and namespaced name, records every call
//! the reconciler makes, and can be told to fail specific calls so error paths
//! can be exercised without a cluster.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use kube::core::ErrorResponse;

use super::store::{ManagedResource, ObjectKey, ObjectStore};
use crate::error::{Error, Result};

/// A call made against the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreCall {
    Get { kind: String, key: ObjectKey },
    Create { kind: String, key: ObjectKey },
}

/// Mock object store for testing
#[derive(Clone, Default)]
pub struct InMemoryStore {
    objects: Arc<Mutex<HashMap<(String, ObjectKey), serde_json::Value>>>,
    calls: Arc<Mutex<Vec<StoreCall>>>,
    get_failures: Arc<Mutex<HashMap<String, u16>>>,
    create_failures: Arc<Mutex<HashMap<String, u16>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object to the store without recording a call (for test setup)
    pub fn insert<K: ManagedResource>(&self, obj: &K) {
        let entry = (K::kind(&()).to_string(), ObjectKey::of(obj));
        let value = serde_json::to_value(obj).unwrap();
        self.objects.lock().unwrap().insert(entry, value);
    }

    /// Read back a stored object
    pub fn object<K: ManagedResource>(&self, key: &ObjectKey) -> Option<K> {
        let entry = (K::kind(&()).to_string(), key.clone());
        self.objects
            .lock()
            .unwrap()
            .get(&entry)
            .map(|value| serde_json::from_value(value.clone()).unwrap())
    }

    /// Make every `get` of `kind` fail with the given HTTP status code
    pub fn fail_get(&self, kind: &str, code: u16) {
        self.get_failures
            .lock()
            .unwrap()
            .insert(kind.to_string(), code);
    }

    /// Make every `create` of `kind` fail with the given HTTP status code
    pub fn fail_create(&self, kind: &str, code: u16) {
        self.create_failures
            .lock()
            .unwrap()
            .insert(kind.to_string(), code);
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Kinds passed to `create`, in order
    pub fn created_kinds(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                StoreCall::Create { kind, .. } => Some(kind),
                StoreCall::Get { .. } => None,
            })
            .collect()
    }

    /// Whether any call touched `kind`
    pub fn touched(&self, kind: &str) -> bool {
        self.calls().iter().any(|call| match call {
            StoreCall::Get { kind: k, .. } | StoreCall::Create { kind: k, .. } => k == kind,
        })
    }

    /// Forget recorded calls, keeping stored objects
    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn injected(failures: &Mutex<HashMap<String, u16>>, kind: &str) -> Option<Error> {
        failures.lock().unwrap().get(kind).map(|code| {
            Error::KubeError(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: format!("injected failure for {}", kind),
                reason: "InternalError".to_string(),
                code: *code,
            }))
        })
    }
}

#[async_trait::async_trait]
impl ObjectStore for InMemoryStore {
    async fn get<K: ManagedResource>(&self, key: &ObjectKey) -> Result<Option<K>> {
        let kind = K::kind(&()).to_string();
        self.calls.lock().unwrap().push(StoreCall::Get {
            kind: kind.clone(),
            key: key.clone(),
        });

        if let Some(err) = Self::injected(&self.get_failures, &kind) {
            return Err(err);
        }

        let value = self.objects.lock().unwrap().get(&(kind, key.clone())).cloned();
        match value {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    async fn create<K: ManagedResource>(&self, obj: &K) -> Result<()> {
        let kind = K::kind(&()).to_string();
        let key = ObjectKey::of(obj);
        self.calls.lock().unwrap().push(StoreCall::Create {
            kind: kind.clone(),
            key: key.clone(),
        });

        if let Some(err) = Self::injected(&self.create_failures, &kind) {
            return Err(err);
        }

        let mut objects = self.objects.lock().unwrap();
        if objects.contains_key(&(kind.clone(), key.clone())) {
            return Err(Error::KubeError(kube::Error::Api(ErrorResponse {
                status: "Failure".to_string(),
                message: format!("{} {} already exists", kind, key),
                reason: "AlreadyExists".to_string(),
                code: 409,
            })));
        }
        objects.insert((kind, key), serde_json::to_value(obj)?);
        Ok(())
    }
}
