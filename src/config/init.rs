//! Interactive request collection
//!
//! `--interactive` walks the user through every deployment parameter, using
//! whatever is already known (flags, environment, settings) as defaults, and
//! produces the same `DeploymentRequest` the flag-driven path would.

use crate::config::settings::Settings;
use crate::error::Result;
use crate::manifest::request::DEFAULT_OUTPUT_PATH;
use crate::manifest::{DeploymentMode, DeploymentRequest};
use crate::utils::interactive::{InteractivePrompt, SetupHelper};
use std::path::PathBuf;
use tracing::debug;

const MODE_CHOICES: [&str; 2] = [
    "SingleBinary (one replicated process)",
    "Distributed (independently scaled components)",
];

/// Prompts for deployment parameters
pub struct RequestInitializer {
    prompt: InteractivePrompt,
}

impl RequestInitializer {
    pub fn new() -> Self {
        Self {
            prompt: InteractivePrompt::new(),
        }
    }

    /// Run the prompts, seeding each answer with the known value
    pub fn run(&self, seed: &DeploymentRequest) -> Result<DeploymentRequest> {
        self.prompt.welcome()?;

        self.prompt.step(1, 4, "Storage")?;
        let storage_account = self.prompt.input_text_validated(
            "Azure storage account name",
            seed.storage_account.as_deref(),
            SetupHelper::validate_storage_account_name,
        )?;

        self.prompt.step(2, 4, "Workload identity")?;
        let client_id = self.prompt.input_text_validated(
            "Managed identity client ID",
            seed.client_id.as_deref(),
            SetupHelper::validate_required,
        )?;

        self.prompt.step(3, 4, "Topology")?;
        let seeded_mode = seed
            .mode
            .as_deref()
            .and_then(|m| m.parse::<DeploymentMode>().ok())
            .unwrap_or_default();
        let default_index = DeploymentMode::ALL.iter().position(|m| *m == seeded_mode);
        let selected = self.prompt.select("Deployment mode", &MODE_CHOICES, default_index)?;
        let mode = DeploymentMode::ALL[selected];

        self.prompt.step(4, 4, "Azure provisioning and output")?;
        let subscription_id = self.prompt.input_optional(
            "Azure subscription ID (leave empty to skip the provisioning script)",
            seed.subscription_id.as_deref(),
            SetupHelper::validate_subscription_id,
        )?;
        let resource_group = self.prompt.input_optional(
            "Resource group (leave empty for the default)",
            seed.resource_group.as_deref(),
            SetupHelper::validate_resource_group_name,
        )?;
        let default_output = seed
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());
        let output_path = self.prompt.input_text_validated(
            "Output file",
            Some(&default_output),
            SetupHelper::validate_output_path,
        )?;

        debug!(mode = %mode, "Interactive request collected");

        Ok(DeploymentRequest {
            storage_account: Some(storage_account),
            client_id: Some(client_id),
            subscription_id,
            resource_group,
            mode: Some(mode.as_chart_value().to_string()),
            output_path: Some(PathBuf::from(output_path)),
        })
    }

    /// Offer to remember the answers as defaults for later runs
    pub fn offer_to_save(&self, request: &DeploymentRequest, settings: &mut Settings) -> Result<bool> {
        if !self.prompt.confirm("Save these answers as defaults?", false)? {
            return Ok(false);
        }

        settings.remember(request);
        Ok(true)
    }
}

impl Default for RequestInitializer {
    fn default() -> Self {
        Self::new()
    }
}
