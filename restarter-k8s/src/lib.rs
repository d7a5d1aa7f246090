//! Pod Restarter Kubernetes Integration
//!
//! Provides the production [`restarter_core::PodApi`] implementation backed by
//! the Kubernetes API.

pub mod client;

pub use client::K8sClient;
