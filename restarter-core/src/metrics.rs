//! Prometheus metrics for the pod restarter

use once_cell::sync::Lazy;
use prometheus::{
    opts, register_histogram, register_int_counter, register_int_counter_vec, Histogram,
    IntCounter, IntCounterVec,
};

/// Total scan cycles started
static SCANS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "restarter_scans_total",
        "Total number of scan cycles"
    ))
    .expect("Failed to create scans metric")
});

/// Scan cycles that failed to fetch the pod list
static SCAN_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(opts!(
        "restarter_scan_errors_total",
        "Total number of scan cycles that failed to list pods"
    ))
    .expect("Failed to create scan_errors metric")
});

/// Pods deleted, by namespace
static PODS_DELETED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!("restarter_pods_deleted_total", "Total number of pods deleted"),
        &["namespace"]
    )
    .expect("Failed to create pods_deleted metric")
});

/// Pod deletions that failed, by namespace
static DELETE_ERRORS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        opts!(
            "restarter_pod_delete_errors_total",
            "Total number of pod deletions that failed"
        ),
        &["namespace"]
    )
    .expect("Failed to create delete_errors metric")
});

/// Scan cycle duration histogram
static SCAN_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "restarter_scan_duration_seconds",
        "Duration of scan cycles",
        vec![0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .expect("Failed to create scan_duration metric")
});

/// Metrics registry wrapper
pub struct MetricsRegistry;

impl MetricsRegistry {
    /// Create a new metrics registry
    pub fn new() -> Self {
        // Force initialization of lazy statics
        let _ = &*SCANS;
        let _ = &*SCAN_ERRORS;
        let _ = &*PODS_DELETED;
        let _ = &*DELETE_ERRORS;
        let _ = &*SCAN_DURATION;
        Self
    }

    /// Count a started scan cycle
    pub fn inc_scans(&self) {
        SCANS.inc();
    }

    /// Count a scan cycle whose pod-list fetch failed
    pub fn inc_scan_errors(&self) {
        SCAN_ERRORS.inc();
    }

    /// Count a deleted pod
    pub fn inc_pods_deleted(&self, namespace: &str) {
        PODS_DELETED.with_label_values(&[namespace]).inc();
    }

    /// Count a failed pod deletion
    pub fn inc_delete_errors(&self, namespace: &str) {
        DELETE_ERRORS.with_label_values(&[namespace]).inc();
    }

    /// Record scan cycle duration
    pub fn observe_scan_duration(&self, duration_secs: f64) {
        SCAN_DURATION.observe(duration_secs);
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
