//! Configuration management CLI commands.

use clap::{Args, Subcommand};

use syncdesk_core::config::AppConfig;
use syncdesk_core::error::AppError;

use crate::output::{self, Mark, OutputFormat, Printer};

/// Arguments for config commands
#[derive(Debug, Args)]
pub struct ConfigArgs {
    /// Config subcommand
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
}

/// Execute config commands
pub fn execute(
    args: &ConfigArgs,
    config: AppConfig,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let mut shown = config;
            if !shown.profile.encryption.secret.is_empty() {
                shown.profile.encryption.secret = "****".to_string();
            }
            Printer::new(format).record(&shown)?;
        }
        ConfigCommand::Validate => {
            config.validate()?;
            output::status(Mark::Done, &format!("Configuration '{config_path}' is valid"));
            output::field("Profile", &config.profile.id.to_string());
            output::field("Machine", &config.profile.machine_name);
            for root in &config.roots {
                output::field(&format!("Root {}", root.id), &root.local_path);
            }
            output::field("Workspaces", &config.workspaces.len().to_string());
            output::field("Chunking", &format!("{:?}", config.index.chunking));
            output::field("Cipher", &config.profile.encryption.cipher);
            output::field("Lanes", &config.worker.lanes.to_string());
        }
    }

    Ok(())
}
