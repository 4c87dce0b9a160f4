//! Chat participant role.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use dealerchat_core::AppError;

/// The two sides of a chat session.
///
/// Stored and serialized as `EMPLOYEE` / `CUSTOMER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "chat_participant_role", rename_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ParticipantRole {
    /// The employee assigned to the session.
    Employee,
    /// The customer who owns the form instance.
    Customer,
}

impl ParticipantRole {
    /// Return the role as its uppercase wire label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Employee => "EMPLOYEE",
            Self::Customer => "CUSTOMER",
        }
    }
}

impl fmt::Display for ParticipantRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ParticipantRole {
    type Err = AppError;

    /// Case-insensitive. `sales_executive` is accepted as a legacy label for
    /// the employee side.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "employee" | "sales_executive" => Ok(Self::Employee),
            "customer" => Ok(Self::Customer),
            _ => Err(AppError::validation(format!(
                "Invalid role: '{s}'. Expected one of: employee, customer"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_is_case_insensitive() {
        assert_eq!(
            "customer".parse::<ParticipantRole>().unwrap(),
            ParticipantRole::Customer
        );
        assert_eq!(
            "CuStOmEr".parse::<ParticipantRole>().unwrap(),
            ParticipantRole::Customer
        );
        assert_eq!(
            "EMPLOYEE".parse::<ParticipantRole>().unwrap(),
            ParticipantRole::Employee
        );
        assert_eq!(
            "SALES_EXECUTIVE".parse::<ParticipantRole>().unwrap(),
            ParticipantRole::Employee
        );
    }

    #[test]
    fn test_unknown_label_is_rejected() {
        assert!("admin".parse::<ParticipantRole>().is_err());
        assert!("".parse::<ParticipantRole>().is_err());
    }

    #[test]
    fn test_wire_label() {
        let json = serde_json::to_string(&ParticipantRole::Employee).unwrap();
        assert_eq!(json, "\"EMPLOYEE\"");
        assert_eq!(ParticipantRole::Customer.to_string(), "CUSTOMER");
    }
}
