//! Employee directory CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use dealerchat_core::error::AppError;

/// Arguments for employee commands
#[derive(Debug, Args)]
pub struct EmployeeArgs {
    /// Employee subcommand
    #[command(subcommand)]
    pub command: EmployeeCommand,
}

/// Employee subcommands
#[derive(Debug, Subcommand)]
pub enum EmployeeCommand {
    /// List employees
    List,
}

/// Employee display row
#[derive(Debug, Serialize, Tabled)]
struct EmployeeRow {
    /// Employee ID
    id: String,
    /// Name
    name: String,
    /// Role
    role: String,
    /// Activated
    activated: String,
}

/// Execute employee commands
pub async fn execute(
    args: &EmployeeArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let database = super::create_db_pool(&config).await?;
    let store = database.chat_store();

    match &args.command {
        EmployeeCommand::List => {
            let employees = store.employees().find_all().await;
            database.close().await;

            let rows: Vec<EmployeeRow> = employees?
                .into_iter()
                .map(|e| EmployeeRow {
                    id: e.id.to_string(),
                    name: e.name,
                    role: e.role.to_string(),
                    activated: if e.is_activated { "✓" } else { "✗" }.to_string(),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    Ok(())
}
