//! Verified employee identity.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use dealerchat_core::error::AppError;
use dealerchat_core::types::EmployeeId;
use dealerchat_entity::employee::EmployeeRole;

use crate::jwt::Claims;

/// The employee behind a verified credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Employee ID.
    pub employee_id: EmployeeId,
    /// Employee role.
    pub role: EmployeeRole,
    /// Display name.
    pub name: String,
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Self {
            employee_id: claims.sub,
            role: claims.role,
            name: claims.name,
        }
    }
}

/// Turns a bearer credential into a [`Principal`].
///
/// Failures are `Authentication` errors.
#[async_trait]
pub trait PrincipalVerifier: Send + Sync + std::fmt::Debug + 'static {
    /// Verify a credential.
    async fn verify(&self, credential: &str) -> Result<Principal, AppError>;
}
