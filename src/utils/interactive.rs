//! Interactive input utilities for user prompts
//!
//! This module provides the prompt wrapper used by `--interactive` and the
//! field validators shared with the non-interactive path.

use crate::error::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Select};
use regex::Regex;
use std::sync::OnceLock;

/// Interactive prompt utilities
pub struct InteractivePrompt {
    theme: ColorfulTheme,
}

impl InteractivePrompt {
    /// Create a new interactive prompt instance
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }

    /// Display a welcome message for the interactive session
    pub fn welcome(&self) -> Result<()> {
        println!("🚀 lokigen interactive setup");
        println!("Answer the prompts below to render a Loki deployment manifest.");
        println!();
        Ok(())
    }

    /// Prompt for yes/no confirmation with a default value
    pub fn confirm(&self, message: &str, default: bool) -> Result<bool> {
        let result = Confirm::with_theme(&self.theme)
            .with_prompt(message)
            .default(default)
            .interact()?;
        Ok(result)
    }

    /// Prompt for text input with validation function
    pub fn input_text_validated<F>(&self, message: &str, default: Option<&str>, validator: F) -> Result<String>
    where
        F: Fn(&str) -> std::result::Result<(), String> + 'static,
    {
        let mut input = Input::with_theme(&self.theme)
            .with_prompt(message)
            .validate_with(move |input: &String| validator(input.as_str()));

        if let Some(default_value) = default {
            input = input.default(default_value.to_string());
        }

        let result = input.interact_text()?;
        Ok(result.trim().to_string())
    }

    /// Prompt for optional text input; an empty answer yields `None`
    pub fn input_optional<F>(&self, message: &str, default: Option<&str>, validator: F) -> Result<Option<String>>
    where
        F: Fn(&str) -> std::result::Result<(), String> + 'static,
    {
        let mut input = Input::<String>::with_theme(&self.theme)
            .with_prompt(message)
            .allow_empty(true)
            .validate_with(move |input: &String| {
                if input.trim().is_empty() {
                    Ok(())
                } else {
                    validator(input.as_str())
                }
            });

        if let Some(default_value) = default {
            input = input.default(default_value.to_string());
        }

        let result = input.interact_text()?;
        let trimmed = result.trim();
        Ok((!trimmed.is_empty()).then(|| trimmed.to_string()))
    }

    /// Prompt for selection from a list of options
    pub fn select(&self, message: &str, options: &[&str], default: Option<usize>) -> Result<usize> {
        let mut select = Select::with_theme(&self.theme)
            .with_prompt(message)
            .items(options)
            .max_length(20);

        if let Some(default_index) = default {
            select = select.default(default_index);
        }

        Ok(select.interact()?)
    }

    /// Display a step header
    pub fn step(&self, step_number: u8, total_steps: u8, title: &str) -> Result<()> {
        println!();
        println!("📋 Step {step_number}/{total_steps}: {title}");
        Ok(())
    }
}

impl Default for InteractivePrompt {
    fn default() -> Self {
        Self::new()
    }
}

fn guid_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
            .expect("GUID pattern should compile")
    })
}

/// Field validators for deployment parameters
pub struct SetupHelper;

impl SetupHelper {
    /// Any non-blank answer
    pub fn validate_required(value: &str) -> std::result::Result<(), String> {
        if value.trim().is_empty() {
            return Err("A value is required".to_string());
        }
        Ok(())
    }

    pub fn validate_subscription_id(subscription_id: &str) -> std::result::Result<(), String> {
        Self::validate_guid("Subscription ID", subscription_id)
    }

    /// Managed identity client IDs are GUIDs. Generation only warns on a
    /// mismatch, so prompts use `validate_required` for this field.
    pub fn validate_client_id(client_id: &str) -> std::result::Result<(), String> {
        Self::validate_guid("Client ID", client_id)
    }

    fn validate_guid(label: &str, value: &str) -> std::result::Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("{label} cannot be empty"));
        }
        if !guid_pattern().is_match(value) {
            return Err(format!("{label} should be a GUID"));
        }
        Ok(())
    }

    /// 1-90 characters of `[A-Za-z0-9._-]`, no leading or trailing `.`/`-`,
    /// no doubled `.` or `-`
    pub fn validate_resource_group_name(name: &str) -> std::result::Result<(), String> {
        let name = name.trim();
        if name.is_empty() {
            return Err("Resource group name cannot be empty".to_string());
        }
        if name.len() > 90 {
            return Err("Resource group name is longer than 90 characters".to_string());
        }
        if let Some(bad) = name.chars().find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))) {
            return Err(format!("Resource group name contains '{bad}'"));
        }
        if [".", "-"].iter().any(|edge| name.starts_with(edge) || name.ends_with(edge)) {
            return Err("Resource group name starts or ends with '.' or '-'".to_string());
        }
        if name.contains("..") || name.contains("--") {
            return Err("Resource group name repeats '.' or '-'".to_string());
        }
        Ok(())
    }

    /// 3-24 lowercase letters and digits
    pub fn validate_storage_account_name(name: &str) -> std::result::Result<(), String> {
        let name = name.trim();

        if name.is_empty() {
            return Err("Storage account name cannot be empty".to_string());
        }

        if name.len() < 3 || name.len() > 24 {
            return Err("Storage account name must be between 3 and 24 characters".to_string());
        }

        if !name.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()) {
            return Err("Storage account name can only contain lowercase letters and numbers".to_string());
        }

        Ok(())
    }

    /// Validate the manifest output path
    pub fn validate_output_path(path: &str) -> std::result::Result<(), String> {
        let path = path.trim();
        if path.is_empty() {
            return Err("Output path cannot be empty".to_string());
        }
        if path.ends_with('/') {
            return Err("Output path must name a file, not a directory".to_string());
        }
        Ok(())
    }
}
