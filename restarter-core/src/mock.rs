//! Mock pod API implementation for testing

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use tokio::sync::RwLock;

use crate::api::PodApi;

/// Mock pod API for testing
pub struct MockPodApi {
    pods: Vec<Pod>,
    /// Error message returned by `list_pods`, if set
    list_error: Option<String>,
    /// Pod names whose deletion fails
    failing_deletes: HashSet<String>,
    /// Names passed to `delete_pod`, in call order
    deleted: RwLock<Vec<String>>,
    /// Number of `disconnect` calls
    pub disconnects: AtomicU32,
}

impl MockPodApi {
    /// Create a mock serving the given pods
    pub fn new(pods: Vec<Pod>) -> Self {
        Self {
            pods,
            list_error: None,
            failing_deletes: HashSet::new(),
            deleted: RwLock::new(Vec::new()),
            disconnects: AtomicU32::new(0),
        }
    }

    /// Create a mock whose `list_pods` always fails with `message`
    pub fn failing(message: &str) -> Self {
        Self {
            list_error: Some(message.to_string()),
            ..Self::new(Vec::new())
        }
    }

    /// Make deletion of the named pod fail
    pub fn fail_delete(mut self, name: &str) -> Self {
        self.failing_deletes.insert(name.to_string());
        self
    }

    /// Names passed to `delete_pod` so far, in call order
    pub async fn deleted(&self) -> Vec<String> {
        self.deleted.read().await.clone()
    }

    /// Number of `disconnect` calls so far
    pub fn disconnect_count(&self) -> u32 {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PodApi for MockPodApi {
    async fn list_pods(&self, _namespace: &str, _label_selector: &str) -> Result<Vec<Pod>> {
        match &self.list_error {
            Some(message) => Err(anyhow!("{message}")),
            None => Ok(self.pods.clone()),
        }
    }

    async fn delete_pod(&self, _namespace: &str, name: &str) -> Result<()> {
        self.deleted.write().await.push(name.to_string());
        if self.failing_deletes.contains(name) {
            return Err(anyhow!("deletion of {name} failed"));
        }
        Ok(())
    }

    async fn disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
    }
}
