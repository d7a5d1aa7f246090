//! Kubernetes client wrapper
//!
//! Implements [`PodApi`] on top of the `kube` client. The connection is
//! established lazily on first use and released by `disconnect` at the end of
//! every scan cycle, forcing re-authentication on the next cycle so long-lived
//! credentials never go stale.

use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, ListParams};
use kube::Client;
use tokio::sync::Mutex;
use tracing::{debug, info};

use restarter_core::PodApi;

/// Kubernetes-backed pod API
///
/// Used by a single scanner at a time; cycles never overlap, so the mutex only
/// guards the handle against the lazy-connect/disconnect pair.
pub struct K8sClient {
    client: Mutex<Option<Client>>,
}

impl K8sClient {
    /// Create a client; no connection is made until first use
    pub fn new() -> Self {
        Self {
            client: Mutex::new(None),
        }
    }

    /// Get the cached client, connecting on first use.
    ///
    /// `Client::try_default` uses the in-cluster config when available and
    /// falls back to the local kubeconfig. A connection failure here aborts
    /// the calling cycle.
    async fn client(&self) -> Result<Client> {
        let mut guard = self.client.lock().await;
        match guard.as_ref() {
            Some(client) => Ok(client.clone()),
            None => {
                let client = Client::try_default()
                    .await
                    .context("failed to connect to cluster")?;
                info!("Connected to Kubernetes API server");
                *guard = Some(client.clone());
                Ok(client)
            }
        }
    }
}

impl Default for K8sClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PodApi for K8sClient {
    async fn list_pods(&self, namespace: &str, label_selector: &str) -> Result<Vec<Pod>> {
        let pods: Api<Pod> = Api::namespaced(self.client().await?, namespace);
        let params = ListParams::default().labels(label_selector);

        let list = pods.list(&params).await.with_context(|| {
            format!("failed to list pods in {namespace} matching {label_selector}")
        })?;

        Ok(list.items)
    }

    async fn delete_pod(&self, namespace: &str, name: &str) -> Result<()> {
        let pods: Api<Pod> = Api::namespaced(self.client().await?, namespace);

        pods.delete(name, &DeleteParams::default())
            .await
            .with_context(|| format!("failed to delete pod {namespace}/{name}"))?;

        Ok(())
    }

    async fn disconnect(&self) {
        let mut guard = self.client.lock().await;
        if guard.take().is_some() {
            debug!("Cluster connection released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Listing and deleting require a running cluster; only the connection
    // handle lifecycle is testable here.

    #[tokio::test]
    async fn test_disconnect_without_connection() {
        let client = K8sClient::new();

        // Idempotent and safe when no connection was ever established
        client.disconnect().await;
        client.disconnect().await;

        assert!(client.client.lock().await.is_none());
    }
}
