//! Chat session CLI commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::output::{self, OutputFormat};
use dealerchat_core::error::AppError;
use dealerchat_core::types::{ChatSessionId, FormInstanceId};
use dealerchat_database::{ChatStore, PgChatStore};
use dealerchat_entity::chat::ChatSession;

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// List chat sessions, newest first
    List {
        /// Only show active sessions
        #[arg(long)]
        active: bool,
    },
    /// Show one session and its message count
    Show {
        /// Session ID
        id: String,
    },
    /// Show the active session of a form instance
    ByForm {
        /// Form instance ID
        form_instance_id: String,
    },
}

/// Session display row
#[derive(Debug, Serialize, Tabled)]
struct SessionRow {
    /// Session ID
    id: String,
    /// Form instance
    form: String,
    /// Customer
    customer: String,
    /// Assigned employee
    employee: String,
    /// Status
    status: String,
    /// Created
    created: String,
    /// Closed
    closed: String,
}

impl From<&ChatSession> for SessionRow {
    fn from(s: &ChatSession) -> Self {
        Self {
            id: s.id.to_string(),
            form: s.form_instance_id.to_string(),
            customer: s.customer_name.clone(),
            employee: s.employee_id.to_string(),
            status: s.status.to_string(),
            created: s.created_at.format("%Y-%m-%d %H:%M").to_string(),
            closed: s
                .closed_at
                .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config_path: &str,
    format: OutputFormat,
) -> Result<(), AppError> {
    let config = super::load_config(config_path)?;
    let database = super::create_db_pool(&config).await?;
    let store = database.chat_store();

    let result = run(&args.command, &store, format).await;
    database.close().await;
    result
}

async fn run(
    command: &SessionCommand,
    store: &PgChatStore,
    format: OutputFormat,
) -> Result<(), AppError> {
    match command {
        SessionCommand::List { active } => {
            let sessions = store.list_sessions().await?;
            let rows: Vec<SessionRow> = sessions
                .iter()
                .filter(|s| !*active || s.is_active())
                .map(SessionRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        SessionCommand::Show { id } => {
            let session_id: ChatSessionId = id
                .parse()
                .map_err(|_| AppError::validation(format!("Invalid chat session ID: '{id}'")))?;
            let session = store
                .find_session(session_id)
                .await?
                .ok_or_else(|| AppError::not_found(format!("Chat session {session_id} not found")))?;
            let messages = store.list_messages(session_id).await?;

            output::print_item(&SessionRow::from(&session), format);
            if format == OutputFormat::Table {
                output::print_kv("Messages", &messages.len().to_string());
            }
        }
        SessionCommand::ByForm { form_instance_id } => {
            let form: FormInstanceId = form_instance_id.parse().map_err(|_| {
                AppError::validation(format!("Invalid form instance ID: '{form_instance_id}'"))
            })?;
            match store.find_active_session_for_form(form).await? {
                Some(session) => output::print_item(&SessionRow::from(&session), format),
                None => output::print_warning(&format!(
                    "No active chat session for form instance {form}"
                )),
            }
        }
    }
    Ok(())
}
