//! # dealerchat-auth
//!
//! Employee authentication for DealerChat.
//!
//! ## Modules
//!
//! - `jwt` — access token creation and validation
//! - `principal` — the verified caller identity and the verifier seam

pub mod jwt;
pub mod principal;

pub use jwt::{Claims, IssuedToken, JwtDecoder, JwtEncoder};
pub use principal::{Principal, PrincipalVerifier};
