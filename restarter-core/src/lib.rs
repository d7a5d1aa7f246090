//! Pod Restarter Core Library
//!
//! Core scan/reap logic for the pod restarter: readiness classification,
//! the scan cycle, and the repeating scheduler. The cluster itself is reached
//! through the [`PodApi`] trait so the logic stays testable without a cluster.

pub mod api;
pub mod metrics;
pub mod mock;
pub mod readiness;
pub mod scanner;

// Re-export common types
pub use api::PodApi;
pub use metrics::MetricsRegistry;
pub use readiness::{classify, Readiness};
pub use scanner::{ScanOutcome, Scanner};
