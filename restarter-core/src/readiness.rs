//! Pod readiness classification
//!
//! Pure classification of a pod's `Ready` condition. Only pods that report an
//! explicit `Ready=False` are deletion candidates; a pod with no `Ready`
//! condition at all (still starting, terminating) is left alone.

use k8s_openapi::api::core::v1::Pod;

/// Verdict on a pod's `Ready` condition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    /// `Ready` condition present with status `True`
    Ready,
    /// `Ready` condition present with status `False`
    NotReady,
    /// No `Ready` condition, or a status other than `True`/`False`
    Indeterminate,
}

/// Classify a pod by its `Ready` condition.
///
/// The first condition of type `Ready` governs; condition types are expected
/// unique, but if duplicates exist the first occurrence wins.
pub fn classify(pod: &Pod) -> Readiness {
    let conditions = pod
        .status
        .as_ref()
        .and_then(|s| s.conditions.as_deref())
        .unwrap_or_default();

    match conditions.iter().find(|c| c.type_ == "Ready") {
        Some(c) if c.status == "True" => Readiness::Ready,
        Some(c) if c.status == "False" => Readiness::NotReady,
        _ => Readiness::Indeterminate,
    }
}
