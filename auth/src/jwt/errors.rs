use jsonwebtoken::errors::Error as JwtLibError;
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;

/// Why a token failed verification.
///
/// Closed set: callers can tell routine expiry apart from tampering.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Token signature is invalid: {0}")]
    SignatureInvalid(String),

    #[error("Token is expired")]
    Expired,

    #[error("Token claim mismatch: {0}")]
    ClaimMismatch(String),
}

impl From<JwtLibError> for TokenError {
    fn from(err: JwtLibError) -> Self {
        match err.kind() {
            ErrorKind::InvalidSignature
            | ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidKeyFormat => TokenError::SignatureInvalid(err.to_string()),
            ErrorKind::ExpiredSignature => TokenError::Expired,
            ErrorKind::InvalidIssuer
            | ErrorKind::InvalidAudience
            | ErrorKind::InvalidSubject
            | ErrorKind::ImmatureSignature => TokenError::ClaimMismatch(err.to_string()),
            _ => TokenError::Malformed(err.to_string()),
        }
    }
}

/// Error type for token issuance.
#[derive(Debug, Clone, Error)]
#[error("Failed to sign token: {0}")]
pub struct SigningError(pub String);
