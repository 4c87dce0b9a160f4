//! Chat session configuration.

use serde::{Deserialize, Serialize};

/// Settings for opening and staffing chat sessions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// Employee role eligible to be assigned to new sessions.
    #[serde(default = "default_assignee_role")]
    pub assignee_role: String,
    /// Display name used when a session is opened without a customer name.
    #[serde(default = "default_customer_name")]
    pub default_customer_name: String,
    /// Maximum length of a customer display name.
    #[serde(default = "default_max_customer_name")]
    pub max_customer_name_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            assignee_role: default_assignee_role(),
            default_customer_name: default_customer_name(),
            max_customer_name_length: default_max_customer_name(),
        }
    }
}

fn default_assignee_role() -> String {
    "sales_executive".to_string()
}

fn default_customer_name() -> String {
    "Anonymous Customer".to_string()
}

fn default_max_customer_name() -> usize {
    120
}
