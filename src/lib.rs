//! lokigen - Loki deployment manifest generator
//!
//! Renders an ArgoCD `Application` that installs the Grafana Loki Helm chart
//! on AKS, wired to Azure Blob Storage through workload identity, plus an
//! optional Azure CLI provisioning script.

pub mod build_info;
pub mod cli;
pub mod config;
pub mod error;
pub mod manifest;
pub mod output;
pub mod provision;
pub mod utils;

// Re-export commonly used types
pub use error::{LokigenError, Result};
