//! Manifest generation module
//!
//! This module turns a deployment request into an ArgoCD `Application`
//! wrapping the Loki Helm chart: request validation, the static sizing
//! table, the typed manifest tree and its YAML encoding.

pub mod generator;
pub mod models;
pub mod profile;
pub mod request;
pub mod values;

pub use generator::{
    generate, generate_at, render, render_at, serialize, Artifact, GeneratedArtifacts, GeneratorOptions,
};
pub use models::DeploymentManifest;
pub use profile::{resolve_profile, ResourceProfile};
pub use request::{validate, DeploymentMode, DeploymentRequest, ValidatedRequest};
