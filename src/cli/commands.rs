//! CLI commands and argument parsing
//!
//! This module defines the command-line interface structure using clap and
//! dispatches to the generator, settings and informational commands.

use crate::build_info::get_build_info;
use crate::config::init::RequestInitializer;
use crate::config::{load_settings, save_settings, Settings};
use crate::error::{LokigenError, Result};
use crate::manifest::{resolve_profile, DeploymentMode, DeploymentRequest, GeneratedArtifacts, GeneratorOptions};
use crate::output::{generate_and_write, ArtifactWriter, FsWriter, StdoutWriter};
use crate::utils::format::{format_rows, format_table, DisplayUtils, OutputFormat};
use crate::utils::interactive::SetupHelper;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tabled::Table;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "lokigen")]
#[command(about = "Render ArgoCD manifests for Grafana Loki on AKS backed by Azure Blob Storage")]
#[command(version, author)]
pub struct Cli {
    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Settings file to use instead of the default location
    #[arg(long = "config", global = true, value_name = "PATH", env = "LOKIGEN_CONFIG")]
    pub settings_file: Option<PathBuf>,

    #[command(flatten)]
    pub generate: GenerateArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Flags for manifest generation (the default action)
#[derive(Args, Debug, Default, Clone)]
pub struct GenerateArgs {
    /// Azure storage account holding Loki chunks, ruler and admin data
    #[arg(long, value_name = "NAME", env = "LOKIGEN_STORAGE_ACCOUNT")]
    pub storage_account: Option<String>,

    /// Client ID of the managed identity used for workload identity
    #[arg(long, value_name = "ID", env = "LOKIGEN_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Azure subscription ID (enables the provisioning script with --resource-group)
    #[arg(long, value_name = "ID", env = "AZURE_SUBSCRIPTION_ID")]
    pub subscription_id: Option<String>,

    /// Azure resource group
    #[arg(long, value_name = "NAME", env = "LOKIGEN_RESOURCE_GROUP")]
    pub resource_group: Option<String>,

    /// Deployment mode: single | singlebinary | distributed | dist
    #[arg(long, value_name = "MODE", env = "LOKIGEN_MODE")]
    pub mode: Option<String>,

    /// Manifest output path
    #[arg(short, long, value_name = "PATH", env = "LOKIGEN_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Prompt for every parameter
    #[arg(long)]
    pub interactive: bool,

    /// Print artifacts to stdout instead of writing files
    #[arg(long)]
    pub stdout: bool,
}

impl GenerateArgs {
    pub fn to_request(&self) -> DeploymentRequest {
        DeploymentRequest {
            storage_account: self.storage_account.clone(),
            client_id: self.client_id.clone(),
            subscription_id: self.subscription_id.clone(),
            resource_group: self.resource_group.clone(),
            mode: self.mode.clone(),
            output_path: self.output.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the replica and resource sizing for a deployment mode
    Profile {
        /// Mode to show (both when omitted)
        #[arg(long)]
        mode: Option<String>,
        /// Output format
        #[arg(long, value_enum, default_value = "table")]
        format: OutputFormat,
    },
    /// Settings management commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Show detailed version and build information
    Version,
    /// Generate shell completions
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show current settings
    Show,
    /// Set a setting value
    Set {
        /// Setting name
        key: String,
        /// Setting value
        value: String,
    },
    /// Show settings file path
    Path,
}

impl Cli {
    /// Debug logging is on when `--debug` is given or the loaded settings
    /// (file or `LOKIGEN_DEBUG`) enable it
    pub fn debug_enabled(&self) -> bool {
        self.debug
            || load_settings(self.settings_file.as_deref())
                .map(|settings| settings.debug)
                .unwrap_or(false)
    }

    pub fn execute(self) -> Result<()> {
        let mut settings = load_settings(self.settings_file.as_deref())?;
        if self.no_color {
            settings.no_color = true;
        }

        match self.command {
            Some(Commands::Profile { mode, format }) => execute_profile(mode.as_deref(), format, &settings),
            Some(Commands::Config { command }) => execute_config_command(command, settings, self.settings_file.as_deref()),
            Some(Commands::Version) => execute_version_command(),
            Some(Commands::Completions { shell }) => execute_completions(shell),
            None => execute_generate(&self.generate, settings, self.settings_file.as_deref()),
        }
    }
}

/// Resolve the request, run the generator and hand the artifacts to a writer
pub fn execute_generate(args: &GenerateArgs, mut settings: Settings, config_path: Option<&Path>) -> Result<()> {
    let display = DisplayUtils::new(settings.no_color);
    let mut request = settings.fill_request(args.to_request());

    if args.interactive {
        let initializer = RequestInitializer::new();
        request = initializer.run(&request)?;
        if initializer.offer_to_save(&request, &mut settings)? {
            let path = save_settings(&settings, config_path)?;
            display.print_info(&format!("Defaults saved to {}", path.display()));
        }
    }

    for warning in name_warnings(&request) {
        display.print_warning(&warning);
    }

    let options = GeneratorOptions {
        location: settings.location.clone(),
    };
    let writer: &dyn ArtifactWriter = if args.stdout { &StdoutWriter } else { &FsWriter };
    let artifacts = generate_and_write(&request, &options, writer)?;

    if !args.stdout {
        print_summary(&artifacts, settings.no_color);
    }
    Ok(())
}

/// Azure naming problems worth flagging without failing the run
pub fn name_warnings(request: &DeploymentRequest) -> Vec<String> {
    let present = |value: &Option<String>| value.as_deref().map(str::trim).filter(|v| !v.is_empty()).map(String::from);
    let mut warnings = Vec::new();

    if let Some(account) = present(&request.storage_account) {
        if let Err(reason) = SetupHelper::validate_storage_account_name(&account) {
            warnings.push(format!("storage account '{account}': {reason}"));
        }
    }
    if let Some(client_id) = present(&request.client_id) {
        if let Err(reason) = SetupHelper::validate_client_id(&client_id) {
            warnings.push(format!("client ID '{client_id}': {reason}"));
        }
    }
    if let Some(group) = present(&request.resource_group) {
        if let Err(reason) = SetupHelper::validate_resource_group_name(&group) {
            warnings.push(format!("resource group '{group}': {reason}"));
        }
    }
    warnings
}

fn print_summary(artifacts: &GeneratedArtifacts, no_color: bool) {
    let display = DisplayUtils::new(no_color);
    let request = &artifacts.request;

    display.print_success(&format!("Manifest written to {}", artifacts.manifest.path.display()));
    if let Some(script) = &artifacts.provisioning_script {
        display.print_success(&format!("Provisioning script written to {}", script.path.display()));
    }

    let mode = request.mode.to_string();
    let replicas = resolve_profile(request.mode)
        .components()
        .into_iter()
        .filter(|(_, sizing)| sizing.replicas > 0)
        .map(|(name, sizing)| format!("{name}={}", sizing.replicas))
        .collect::<Vec<_>>()
        .join(", ");
    println!(
        "{}",
        display.format_key_value_pairs(&[
            ("Mode", mode.as_str()),
            ("Storage account", request.storage_account.as_str()),
            ("Resource group", request.resource_group.as_str()),
            ("Replicas", replicas.as_str()),
        ])
    );
}

fn execute_profile(mode: Option<&str>, format: OutputFormat, settings: &Settings) -> Result<()> {
    let modes = match mode {
        Some(raw) => vec![raw.parse::<DeploymentMode>()?],
        None => DeploymentMode::ALL.to_vec(),
    };
    let profiles: Vec<_> = modes.into_iter().map(resolve_profile).collect();

    match format {
        OutputFormat::Table => {
            let display = DisplayUtils::new(settings.no_color);
            for profile in profiles {
                display.print_header(&format!(
                    "{} (replication factor {})",
                    profile.mode, profile.replication_factor
                ));
                println!("{}", format_rows(&profile.rows(), format, settings.no_color)?);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&profiles)?),
        OutputFormat::Yaml => {
            let text = serde_yaml::to_string(&profiles).map_err(|e| LokigenError::encoding(e.to_string()))?;
            print!("{text}");
        }
    }
    Ok(())
}

fn execute_config_command(command: ConfigCommands, mut settings: Settings, config_path: Option<&Path>) -> Result<()> {
    match command {
        ConfigCommands::Show => {
            println!("{}", format_table(Table::new(settings.rows()), settings.no_color));
        }
        ConfigCommands::Set { key, value } => {
            settings.set(&key, &value)?;
            let path = save_settings(&settings, config_path)?;
            debug!(path = %path.display(), key = %key, "Settings saved");
            DisplayUtils::new(settings.no_color).print_success(&format!("Configuration updated: {key} = {value}"));
        }
        ConfigCommands::Path => {
            let path = match config_path {
                Some(p) => p.to_path_buf(),
                None => Settings::get_config_path()?,
            };
            println!("{}", path.display());
        }
    }
    Ok(())
}

fn execute_version_command() -> Result<()> {
    let build_info = get_build_info();

    println!("lokigen");
    println!("=======");
    println!("Version:      {}", build_info.version);
    println!("Git Hash:     {}", build_info.git_hash);
    println!("Git Branch:   {}", build_info.git_branch);
    println!("Built:        {}", build_info.build_time);
    println!("Target:       {}", build_info.target);
    println!("Profile:      {}", build_info.profile);

    Ok(())
}

fn execute_completions(shell: clap_complete::Shell) -> Result<()> {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "lokigen", &mut std::io::stdout());
    Ok(())
}
