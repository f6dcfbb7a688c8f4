//! Authentication failures
//!
//! Every variant maps to `401 Unauthorized`. The `Display` text is what the
//! client sees, so it stays a short human-readable summary.

use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("No authentication token provided")]
    MissingToken,

    #[error("Authorization header must be 'Bearer <token>'")]
    MalformedHeader,

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token signing algorithm is not accepted")]
    InvalidAlgorithm,

    #[error("Token has expired")]
    Expired,

    #[error("Token is not valid yet")]
    NotYetValid,

    #[error("Token is malformed")]
    Malformed,

    #[error("Token signing secret is not configured")]
    MissingSecret,

    #[error("Failed to sign token")]
    Signing,
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        match e.kind() {
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::MissingAlgorithm => {
                AuthError::InvalidAlgorithm
            }
            ErrorKind::ExpiredSignature => AuthError::Expired,
            ErrorKind::ImmatureSignature => AuthError::NotYetValid,
            _ => AuthError::Malformed,
        }
    }
}
