//! Configuration inspection CLI commands.

use clap::{Args, Subcommand};

use crate::output::{self, OutputFormat};
use dealerchat_core::config::AppConfig;
use dealerchat_core::error::AppError;
use dealerchat_database::connection::redact_url;

/// Placeholder shown instead of secrets.
const MASK: &str = "****";

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
    /// Show the effective configuration with secrets masked
    Show,
    /// Validate configuration file
    Validate,
}

/// Execute config commands
pub async fn execute(
    args: &ConfigArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        ConfigCommand::Show => {
            let config = super::load_config(config_path)?;
            output::print_item(&redact(config), format);
        }
        ConfigCommand::Validate => match super::load_config(config_path) {
            Ok(config) => {
                validate(&config)?;
                output::print_success(&format!("Configuration '{}' is valid", config_path));
                output::print_kv("Server", &config.server.bind_address());
                output::print_kv("Database", &redact_url(&config.database.url));
                output::print_kv("Assignee role", &config.chat.assignee_role);
                output::print_kv("Log format", &config.logging.format);
            }
            Err(e) => {
                output::print_error(&format!("Configuration invalid: {}", e));
                return Err(e);
            }
        },
    }

    Ok(())
}

/// Replace secrets with a fixed mask.
fn redact(mut config: AppConfig) -> AppConfig {
    config.auth.jwt_secret = MASK.to_string();
    config.database.url = redact_url(&config.database.url);
    config
}

/// Checks the loader cannot express.
fn validate(config: &AppConfig) -> Result<(), AppError> {
    config
        .chat
        .assignee_role
        .parse::<dealerchat_entity::employee::EmployeeRole>()
        .map_err(|e| AppError::configuration(format!("chat.assignee_role: {}", e.message)))?;

    if config.realtime.channel_buffer_size == 0 {
        return Err(AppError::configuration(
            "realtime.channel_buffer_size must be positive",
        ));
    }
    if config.auth.jwt_secret.len() < 16 {
        output::print_warning("auth.jwt_secret is shorter than 16 bytes");
    }
    Ok(())
}
