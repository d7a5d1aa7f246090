//! Scan cycle and repeating scheduler
//!
//! One cycle fetches the candidate pod set, filters it down to the pods
//! reporting `Ready=False`, and deletes those so the owning controller
//! recreates them. Cycles are strictly sequential; the scheduler repeats them
//! on a fixed interval until a shutdown signal arrives.

use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use k8s_openapi::api::core::v1::Pod;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use crate::api::PodApi;
use crate::metrics::MetricsRegistry;
use crate::readiness::{classify, Readiness};

/// Result of one scan cycle
///
/// Derived per cycle and never persisted; each cycle is independent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScanOutcome {
    /// Pods targeted for deletion, in fetch order
    pub candidates: Vec<String>,
    /// Number of candidates successfully deleted
    pub deleted: u64,
    /// Number of candidates whose deletion failed
    pub failed: u64,
}

/// Scans a namespace and deletes pods that are not ready
pub struct Scanner<C: PodApi> {
    client: Arc<C>,
    namespace: String,
    label_selector: String,
    metrics: Arc<MetricsRegistry>,
}

impl<C: PodApi + 'static> Scanner<C> {
    /// Create a new scanner
    pub fn new(
        client: Arc<C>,
        namespace: String,
        label_selector: String,
        metrics: Arc<MetricsRegistry>,
    ) -> Self {
        Self {
            client,
            namespace,
            label_selector,
            metrics,
        }
    }

    /// Run scan cycles on a fixed interval until shutdown is signaled.
    ///
    /// The first cycle runs immediately. A cycle that fails to list pods is
    /// logged and the loop waits for the next tick; only the shutdown signal
    /// stops the scheduler. A cycle already in flight is never interrupted.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        info!(
            namespace = %self.namespace,
            selector = %self.label_selector,
            interval = ?interval,
            "Starting scanner"
        );

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Consume the immediate first tick; the first scan below takes its place
        ticker.tick().await;

        loop {
            match self.scan_once().await {
                Ok(outcome) if outcome.candidates.is_empty() => {
                    debug!("Scan complete, nothing to delete");
                }
                Ok(outcome) => {
                    info!(
                        candidates = outcome.candidates.len(),
                        deleted = outcome.deleted,
                        failed = outcome.failed,
                        "Scan complete"
                    );
                }
                Err(e) => {
                    error!(error = %e, "Scan failed");
                }
            }

            tokio::select! {
                _ = ticker.tick() => {}
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        info!("Shutdown signal received, stopping scanner");
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Run a single scan cycle.
    ///
    /// Returns an error only when the pod-list fetch failed; individual
    /// deletion failures are counted in the outcome and never fail the cycle.
    /// The client connection is released at the end of every cycle, fetch
    /// error or not.
    pub async fn scan_once(&self) -> Result<ScanOutcome> {
        self.metrics.inc_scans();
        let start = Instant::now();

        let result = self.reap().await;

        self.client.disconnect().await;
        self.metrics.observe_scan_duration(start.elapsed().as_secs_f64());
        if result.is_err() {
            self.metrics.inc_scan_errors();
        }
        result
    }

    /// Fetch, classify, and delete the not-ready subset
    async fn reap(&self) -> Result<ScanOutcome> {
        let pods = self
            .client
            .list_pods(&self.namespace, &self.label_selector)
            .await
            .with_context(|| {
                format!(
                    "failed to list pods in {} matching {}",
                    self.namespace, self.label_selector
                )
            })?;

        debug!(count = pods.len(), "Fetched pods");

        let mut outcome = ScanOutcome {
            candidates: self.not_ready(&pods),
            ..Default::default()
        };

        for name in &outcome.candidates {
            match self.client.delete_pod(&self.namespace, name).await {
                Ok(()) => {
                    info!(pod = %name, "Pod deleted");
                    outcome.deleted += 1;
                    self.metrics.inc_pods_deleted(&self.namespace);
                }
                Err(e) => {
                    warn!(pod = %name, error = %e, "Failed to delete pod");
                    outcome.failed += 1;
                    self.metrics.inc_delete_errors(&self.namespace);
                }
            }
        }

        Ok(outcome)
    }

    /// Names of the pods reporting `Ready=False`, preserving fetch order
    fn not_ready(&self, pods: &[Pod]) -> Vec<String> {
        let mut candidates = Vec::new();

        for pod in pods {
            let name = pod.metadata.name.as_deref().unwrap_or("unknown");

            match classify(pod) {
                Readiness::Ready => debug!(pod = name, "Pod is ready"),
                Readiness::NotReady => {
                    debug!(pod = name, "Pod not ready");
                    candidates.push(name.to_string());
                }
                Readiness::Indeterminate => {
                    debug!(pod = name, "Pod doesn't appear to be running")
                }
            }
        }

        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockPodApi;
    use k8s_openapi::api::core::v1::{PodCondition, PodStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn pod(name: &str, ready: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some("media".to_string()),
                ..Default::default()
            },
            status: Some(PodStatus {
                conditions: ready.map(|status| {
                    vec![PodCondition {
                        type_: "Ready".to_string(),
                        status: status.to_string(),
                        ..Default::default()
                    }]
                }),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn scanner(api: Arc<MockPodApi>) -> Scanner<MockPodApi> {
        Scanner::new(
            api,
            "media".to_string(),
            "app=foo".to_string(),
            Arc::new(MetricsRegistry::new()),
        )
    }

    #[tokio::test]
    async fn test_scan_once_deletes_only_not_ready() {
        let api = Arc::new(MockPodApi::new(vec![
            pod("foo-1", Some("True")),
            pod("foo-2", Some("False")),
            pod("foo-3", None),
        ]));

        let outcome = scanner(api.clone()).scan_once().await.unwrap();

        assert_eq!(outcome.candidates, vec!["foo-2"]);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.failed, 0);
        assert_eq!(api.deleted().await, vec!["foo-2"]);
        assert_eq!(api.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_scan_once_empty() {
        let api = Arc::new(MockPodApi::new(Vec::new()));

        let outcome = scanner(api.clone()).scan_once().await.unwrap();

        assert!(outcome.candidates.is_empty());
        assert!(api.deleted().await.is_empty());
        assert_eq!(api.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_scan_once_ignores_unknown_status() {
        let api = Arc::new(MockPodApi::new(vec![
            pod("foo-1", Some("Unknown")),
            pod("foo-2", Some("")),
        ]));

        let outcome = scanner(api.clone()).scan_once().await.unwrap();

        assert!(outcome.candidates.is_empty());
        assert!(api.deleted().await.is_empty());
    }

    #[tokio::test]
    async fn test_scan_once_fetch_failure() {
        let api = Arc::new(MockPodApi::failing("unreachable"));

        let err = scanner(api.clone()).scan_once().await.unwrap_err();

        assert!(format!("{err:#}").contains("unreachable"));
        assert!(api.deleted().await.is_empty());
        // Teardown happens even when the fetch failed
        assert_eq!(api.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_scan_once_delete_failure_is_not_fatal() {
        let api = Arc::new(
            MockPodApi::new(vec![
                pod("foo-bad", Some("False")),
                pod("foo-worse", Some("False")),
            ])
            .fail_delete("foo-bad"),
        );

        let outcome = scanner(api.clone()).scan_once().await.unwrap();

        // foo-bad's failure doesn't prevent the attempt on foo-worse
        assert_eq!(api.deleted().await, vec!["foo-bad", "foo-worse"]);
        assert_eq!(outcome.candidates, vec!["foo-bad", "foo-worse"]);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.failed, 1);
        assert_eq!(api.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_scan_once_preserves_fetch_order() {
        let api = Arc::new(MockPodApi::new(vec![
            pod("foo-3", Some("False")),
            pod("foo-1", Some("False")),
            pod("foo-2", Some("True")),
            pod("foo-4", Some("False")),
        ]));

        let outcome = scanner(api.clone()).scan_once().await.unwrap();

        assert_eq!(outcome.candidates, vec!["foo-3", "foo-1", "foo-4"]);
        assert_eq!(api.deleted().await, vec!["foo-3", "foo-1", "foo-4"]);
    }

    #[tokio::test]
    async fn test_disconnect_once_per_cycle() {
        let api = Arc::new(MockPodApi::new(vec![pod("foo-1", Some("False"))]));
        let scanner = scanner(api.clone());

        scanner.scan_once().await.unwrap();
        scanner.scan_once().await.unwrap();

        assert_eq!(api.disconnect_count(), 2);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let api = Arc::new(MockPodApi::new(Vec::new()));
        let scanner = scanner(api.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle =
            tokio::spawn(async move { scanner.run(Duration::from_secs(3600), shutdown_rx).await });

        // Let the immediate first cycle finish, then signal shutdown
        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scanner did not stop on shutdown")
            .unwrap()
            .unwrap();

        assert_eq!(api.disconnect_count(), 1);
    }

    #[tokio::test]
    async fn test_run_continues_after_fetch_failure() {
        let api = Arc::new(MockPodApi::failing("unreachable"));
        let scanner = scanner(api.clone());
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle =
            tokio::spawn(async move { scanner.run(Duration::from_millis(10), shutdown_rx).await });

        // Several failing cycles must elapse without the scheduler stopping
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());

        shutdown_tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scanner did not stop on shutdown")
            .unwrap()
            .unwrap();

        assert!(api.disconnect_count() > 1);
    }
}
