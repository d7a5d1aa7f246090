//! Cluster pod API boundary
//!
//! The capability the scan cycle consumes: list pods, delete a pod, and
//! release any cached connection. One production implementation lives in
//! `restarter-k8s`; tests use [`crate::mock::MockPodApi`].

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;

/// Access to pods in a cluster
#[async_trait]
pub trait PodApi: Send + Sync {
    /// List all pods in `namespace` matching `label_selector`.
    ///
    /// An error means the fetch failed as a whole; no partial results are
    /// returned.
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>>;

    /// Delete a single pod. Each call is independent; an error affects only
    /// this pod.
    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()>;

    /// Release any lazily-cached connection. Idempotent; safe to call even if
    /// no connection was ever established.
    async fn disconnect(&self);
}
