//! Access token commands for local testing.

use clap::{Args, Subcommand};
use serde::Serialize;

use crate::output::{self, OutputFormat};
use dealerchat_auth::{JwtDecoder, JwtEncoder};
use dealerchat_core::error::AppError;
use dealerchat_core::types::EmployeeId;

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Sign an access token for an activated employee
    Mint {
        /// Employee ID
        #[arg(long)]
        employee: String,
    },
    /// Verify a token and print its claims
    Inspect {
        /// The encoded token
        token: String,
    },
}

#[derive(Debug, Serialize)]
struct MintedToken {
    employee_id: EmployeeId,
    name: String,
    role: String,
    access_token: String,
    expires_at: String,
}

/// Execute token commands
pub async fn execute(
    args: &TokenArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;

    match &args.command {
        TokenCommand::Mint { employee } => {
            let employee_id: EmployeeId = employee
                .parse()
                .map_err(|_| AppError::validation(format!("Invalid employee ID: '{employee}'")))?;

            let database = super::create_db_pool(&config).await?;
            let store = database.chat_store();
            let found = store.employees().find_by_id(employee_id).await?;
            database.close().await;

            let employee = found
                .ok_or_else(|| AppError::not_found(format!("Employee {employee_id} not found")))?;
            if !employee.is_activated {
                return Err(AppError::conflict(format!(
                    "Employee {employee_id} is not activated"
                )));
            }

            let issued = JwtEncoder::new(&config.auth).generate_access_token(
                employee.id,
                employee.role,
                &employee.name,
            )?;

            let minted = MintedToken {
                employee_id: employee.id,
                name: employee.name,
                role: employee.role.to_string(),
                access_token: issued.access_token,
                expires_at: issued.expires_at.to_rfc3339(),
            };
            match format {
                OutputFormat::Json => output::print_item(&minted, format),
                OutputFormat::Table => {
                    output::print_kv("Employee", &minted.employee_id.to_string());
                    output::print_kv("Name", &minted.name);
                    output::print_kv("Role", &minted.role);
                    output::print_kv("Expires", &minted.expires_at);
                    println!();
                    println!("{}", minted.access_token);
                }
            }
        }
        TokenCommand::Inspect { token } => {
            let claims = JwtDecoder::new(&config.auth).decode_access_token(token)?;
            output::print_item(&claims, format);
        }
    }

    Ok(())
}
