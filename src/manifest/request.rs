//! Deployment request model and validation
//!
//! A `DeploymentRequest` is assembled from CLI flags, environment variables,
//! the settings file or interactive prompts. `validate` turns it into a
//! `ValidatedRequest` with every default applied, or fails before anything
//! is rendered.

use crate::error::{LokigenError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

pub const DEFAULT_RESOURCE_GROUP: &str = "rg-loki";
pub const DEFAULT_OUTPUT_PATH: &str = "loki-application.yaml";

/// Loki deployment topology
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DeploymentMode {
    #[default]
    SingleBinary,
    Distributed,
}

impl DeploymentMode {
    pub const ALL: [DeploymentMode; 2] = [DeploymentMode::SingleBinary, DeploymentMode::Distributed];

    /// Value the Loki chart expects for `deploymentMode`
    pub fn as_chart_value(&self) -> &'static str {
        match self {
            DeploymentMode::SingleBinary => "SingleBinary",
            DeploymentMode::Distributed => "Distributed",
        }
    }
}

impl fmt::Display for DeploymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_chart_value())
    }
}

impl FromStr for DeploymentMode {
    type Err = LokigenError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "single" | "singlebinary" | "single-binary" => Ok(DeploymentMode::SingleBinary),
            "distributed" | "dist" => Ok(DeploymentMode::Distributed),
            _ => Err(LokigenError::invalid_mode(s)),
        }
    }
}

/// Raw deployment parameters, possibly incomplete
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeploymentRequest {
    pub storage_account: Option<String>,
    pub client_id: Option<String>,
    pub subscription_id: Option<String>,
    pub resource_group: Option<String>,
    pub mode: Option<String>,
    pub output_path: Option<PathBuf>,
}

/// Fully populated deployment parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    pub storage_account: String,
    pub client_id: String,
    pub subscription_id: Option<String>,
    pub resource_group: String,
    /// False when `resource_group` fell back to the default
    pub resource_group_supplied: bool,
    pub mode: DeploymentMode,
    pub output_path: PathBuf,
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Check required fields and apply defaults.
///
/// Required fields are checked in order (storage account, then client id),
/// so the first missing one is reported.
pub fn validate(request: &DeploymentRequest) -> Result<ValidatedRequest> {
    let storage_account =
        present(&request.storage_account).ok_or_else(|| LokigenError::missing_field("storageAccount"))?;
    let client_id = present(&request.client_id).ok_or_else(|| LokigenError::missing_field("clientId"))?;

    let mode = match present(&request.mode) {
        Some(raw) => raw.parse::<DeploymentMode>()?,
        None => DeploymentMode::default(),
    };

    let supplied_group = present(&request.resource_group);
    let resource_group_supplied = supplied_group.is_some();
    let resource_group = supplied_group.unwrap_or_else(|| DEFAULT_RESOURCE_GROUP.to_string());

    let output_path = request
        .output_path
        .clone()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_PATH));

    debug!(
        storage_account = %storage_account,
        mode = %mode,
        resource_group = %resource_group,
        resource_group_supplied,
        "Deployment request validated"
    );

    Ok(ValidatedRequest {
        storage_account,
        client_id,
        subscription_id: present(&request.subscription_id),
        resource_group,
        resource_group_supplied,
        mode,
        output_path,
    })
}
