//! Employee role enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Roles held by dealership staff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "employee_role", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EmployeeRole {
    /// Platform administrator.
    Admin,
    /// Dealership owner or manager.
    Dealer,
    /// Handles customer conversations and forms.
    SalesExecutive,
    /// Verifies payments and accounts.
    Finance,
    /// Handles vehicle registration paperwork.
    Rto,
}

impl EmployeeRole {
    /// Return the role as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Dealer => "dealer",
            Self::SalesExecutive => "sales_executive",
            Self::Finance => "finance",
            Self::Rto => "rto",
        }
    }

    /// Whether this role may push notifications to other employees.
    pub fn can_dispatch_notifications(&self) -> bool {
        matches!(self, Self::Admin | Self::Dealer)
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EmployeeRole {
    type Err = dealerchat_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "dealer" => Ok(Self::Dealer),
            "sales_executive" => Ok(Self::SalesExecutive),
            "finance" => Ok(Self::Finance),
            "rto" => Ok(Self::Rto),
            _ => Err(dealerchat_core::AppError::validation(format!(
                "Invalid employee role: '{s}'. Expected one of: admin, dealer, sales_executive, finance, rto"
            ))),
        }
    }
}
