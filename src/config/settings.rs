//! Configuration settings management
//!
//! Settings are layered from the built-in defaults, an optional TOML file and
//! `LOKIGEN_*` environment variables. Command-line flags are applied on top by
//! the CLI layer.

use crate::error::{LokigenError, Result};
use crate::manifest::DeploymentRequest;
use crate::provision::DEFAULT_LOCATION;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tabled::Tabled;
use tracing::debug;

pub const ENV_PREFIX: &str = "LOKIGEN";

/// Keys accepted by `config set`
pub const SETTING_KEYS: &[&str] = &[
    "debug",
    "no_color",
    "storage_account",
    "client_id",
    "subscription_id",
    "resource_group",
    "mode",
    "output_path",
    "location",
];

/// Persistent defaults. Empty strings mean "not set".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub debug: bool,
    pub no_color: bool,
    pub storage_account: String,
    pub client_id: String,
    pub subscription_id: String,
    pub resource_group: String,
    pub mode: String,
    pub output_path: String,
    pub location: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            debug: false,
            no_color: false,
            storage_account: String::new(),
            client_id: String::new(),
            subscription_id: String::new(),
            resource_group: String::new(),
            mode: String::new(),
            output_path: String::new(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }
}

/// Row used by `config show`
#[derive(Debug, Clone, Tabled)]
pub struct SettingRow {
    #[tabled(rename = "Setting")]
    pub key: &'static str,
    #[tabled(rename = "Value")]
    pub value: String,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn parse_bool(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value == "1"
}

impl Settings {
    pub fn get_config_path() -> Result<PathBuf> {
        #[cfg(any(target_os = "linux", target_os = "macos"))]
        {
            use std::env;
            let config_dir = if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME") {
                PathBuf::from(xdg_config_home)
            } else {
                let home_dir = env::var("HOME")
                    .map_err(|_| LokigenError::config("HOME environment variable not set"))?;
                PathBuf::from(home_dir).join(".config")
            };
            Ok(config_dir.join("lokigen").join("lokigen.toml"))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos")))]
        {
            let config_dir = dirs::config_dir()
                .ok_or_else(|| LokigenError::config("Unable to determine config directory"))?;
            Ok(config_dir.join("lokigen").join("lokigen.toml"))
        }
    }

    /// Fill request fields the caller left unset from these settings.
    /// Values already on the request win.
    pub fn fill_request(&self, mut request: DeploymentRequest) -> DeploymentRequest {
        fn fill(slot: &mut Option<String>, fallback: &str) {
            if slot.as_deref().map_or(true, |v| v.trim().is_empty()) {
                if let Some(value) = non_empty(fallback) {
                    *slot = Some(value);
                }
            }
        }

        fill(&mut request.storage_account, &self.storage_account);
        fill(&mut request.client_id, &self.client_id);
        fill(&mut request.subscription_id, &self.subscription_id);
        fill(&mut request.resource_group, &self.resource_group);
        fill(&mut request.mode, &self.mode);
        if request.output_path.is_none() {
            request.output_path = non_empty(&self.output_path).map(PathBuf::from);
        }
        request
    }

    /// Store a request's values as defaults for later runs
    pub fn remember(&mut self, request: &DeploymentRequest) {
        self.storage_account = request.storage_account.clone().unwrap_or_default();
        self.client_id = request.client_id.clone().unwrap_or_default();
        self.subscription_id = request.subscription_id.clone().unwrap_or_default();
        self.resource_group = request.resource_group.clone().unwrap_or_default();
        self.mode = request.mode.clone().unwrap_or_default();
        self.output_path = request
            .output_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
    }

    /// Update a single setting by key
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "debug" => self.debug = parse_bool(value),
            "no_color" => self.no_color = parse_bool(value),
            "storage_account" => self.storage_account = value.to_string(),
            "client_id" => self.client_id = value.to_string(),
            "subscription_id" => self.subscription_id = value.to_string(),
            "resource_group" => self.resource_group = value.to_string(),
            "mode" => {
                if !value.is_empty() {
                    value.parse::<crate::manifest::DeploymentMode>()?;
                }
                self.mode = value.to_string();
            }
            "output_path" => self.output_path = value.to_string(),
            "location" => self.location = value.to_string(),
            _ => {
                return Err(LokigenError::config(format!(
                    "Unknown configuration key: {key}. Available keys: {}",
                    SETTING_KEYS.join(", ")
                )))
            }
        }
        Ok(())
    }

    pub fn rows(&self) -> Vec<SettingRow> {
        let show = |value: &str| {
            if value.is_empty() {
                "(not set)".to_string()
            } else {
                value.to_string()
            }
        };

        vec![
            SettingRow { key: "debug", value: self.debug.to_string() },
            SettingRow { key: "no_color", value: self.no_color.to_string() },
            SettingRow { key: "storage_account", value: show(&self.storage_account) },
            SettingRow { key: "client_id", value: show(&self.client_id) },
            SettingRow { key: "subscription_id", value: show(&self.subscription_id) },
            SettingRow { key: "resource_group", value: show(&self.resource_group) },
            SettingRow { key: "mode", value: show(&self.mode) },
            SettingRow { key: "output_path", value: show(&self.output_path) },
            SettingRow { key: "location", value: show(&self.location) },
        ]
    }
}

/// Load settings from `path` (or the default location) and the environment
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Settings::get_config_path()?,
    };
    debug!(path = %path.display(), exists = path.exists(), "Loading settings");

    let settings = config::Config::builder()
        .add_source(
            config::File::from(path.as_path())
                .format(config::FileFormat::Toml)
                .required(false),
        )
        .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
        .build()?
        .try_deserialize::<Settings>()?;

    Ok(settings)
}

/// Persist settings as TOML, creating parent directories as needed
pub fn save_settings(settings: &Settings, path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => Settings::get_config_path()?,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let contents = toml::to_string_pretty(settings)?;
    std::fs::write(&path, contents)?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // load_settings reads LOKIGEN_* from the process environment
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_remember_round_trips_through_fill_request() {
        let request = DeploymentRequest {
            storage_account: Some("acct1".to_string()),
            client_id: Some("cid-123".to_string()),
            subscription_id: None,
            resource_group: Some("rg-obs".to_string()),
            mode: Some("Distributed".to_string()),
            output_path: Some(PathBuf::from("deploy/loki.yaml")),
        };

        let mut settings = Settings::default();
        settings.remember(&request);
        assert_eq!(settings.output_path, "deploy/loki.yaml");
        assert_eq!(settings.subscription_id, "");

        let refilled = settings.fill_request(DeploymentRequest::default());
        assert_eq!(refilled, request);
    }

    #[test]
    fn test_precedence_cli_over_env_over_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lokigen.toml");
        let file = Settings {
            storage_account: "fromfile".to_string(),
            client_id: "file-client".to_string(),
            ..Default::default()
        };
        save_settings(&file, Some(&path)).unwrap();

        std::env::set_var("LOKIGEN_STORAGE_ACCOUNT", "fromenv");
        let loaded = load_settings(Some(&path));
        std::env::remove_var("LOKIGEN_STORAGE_ACCOUNT");
        let loaded = loaded.unwrap();

        assert_eq!(loaded.storage_account, "fromenv");
        assert_eq!(loaded.client_id, "file-client");

        let from_env = loaded.fill_request(DeploymentRequest::default());
        assert_eq!(from_env.storage_account.as_deref(), Some("fromenv"));

        let from_cli = loaded.fill_request(DeploymentRequest {
            storage_account: Some("fromcli".to_string()),
            ..Default::default()
        });
        assert_eq!(from_cli.storage_account.as_deref(), Some("fromcli"));
        assert_eq!(from_cli.client_id.as_deref(), Some("file-client"));
    }

    #[test]
    fn test_debug_setting_loads_from_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("lokigen.toml");

        let mut settings = Settings::default();
        settings.set("debug", "true").unwrap();
        save_settings(&settings, Some(&path)).unwrap();

        assert!(load_settings(Some(&path)).unwrap().debug);
    }

    #[test]
    fn test_request_values_win_over_settings() {
        let settings = Settings {
            storage_account: "fromfile".to_string(),
            client_id: "file-client".to_string(),
            resource_group: "rg-file".to_string(),
            ..Default::default()
        };
        let request = DeploymentRequest {
            storage_account: Some("fromcli".to_string()),
            ..Default::default()
        };

        let merged = settings.fill_request(request);
        assert_eq!(merged.storage_account.as_deref(), Some("fromcli"));
        assert_eq!(merged.client_id.as_deref(), Some("file-client"));
        assert_eq!(merged.resource_group.as_deref(), Some("rg-file"));
        assert_eq!(merged.mode, None);
        assert_eq!(merged.output_path, None);
    }

    #[test]
    fn test_empty_settings_leave_request_untouched() {
        let merged = Settings::default().fill_request(DeploymentRequest::default());
        assert_eq!(merged, DeploymentRequest::default());
    }

    #[test]
    fn test_set_known_and_unknown_keys() {
        let mut settings = Settings::default();
        settings.set("debug", "TRUE").unwrap();
        settings.set("mode", "dist").unwrap();
        settings.set("location", "westeurope").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.mode, "dist");
        assert_eq!(settings.location, "westeurope");

        assert!(settings.set("mode", "sideways").is_err());
        assert!(settings.set("bogus", "x").is_err());
    }

    #[test]
    fn test_save_then_load_from_explicit_path() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("conf").join("lokigen.toml");

        let settings = Settings {
            storage_account: "acctfile".to_string(),
            mode: "distributed".to_string(),
            ..Default::default()
        };
        save_settings(&settings, Some(&path)).unwrap();

        let loaded = load_settings(Some(&path)).unwrap();
        assert_eq!(loaded.storage_account, "acctfile");
        assert_eq!(loaded.mode, "distributed");
        assert_eq!(loaded.location, DEFAULT_LOCATION);
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let temp = TempDir::new().unwrap();
        let loaded = load_settings(Some(&temp.path().join("absent.toml"))).unwrap();
        assert_eq!(loaded.location, DEFAULT_LOCATION);
    }
}
