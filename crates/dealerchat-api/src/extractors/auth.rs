//! `AuthEmployee` extractor: pulls the JWT from the Authorization header and
//! verifies it.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use dealerchat_auth::Principal;
use dealerchat_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified employee behind a request.
#[derive(Debug, Clone)]
pub struct AuthEmployee(pub Principal);

impl AuthEmployee {
    /// Returns the inner `Principal`.
    pub fn principal(&self) -> &Principal {
        &self.0
    }
}

impl std::ops::Deref for AuthEmployee {
    type Target = Principal;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthEmployee {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::authentication("Invalid Authorization header format"))?;

        let principal = state.verifier.verify(token).await?;
        Ok(AuthEmployee(principal))
    }
}
