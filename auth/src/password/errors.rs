use thiserror::Error;

/// Error type for password hashing operations.
///
/// Verification never produces one of these: malformed digests verify as `false`.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid hashing parameters: {0}")]
    InvalidParameters(String),
}

/// A password rejected by [`PasswordPolicy`](super::PasswordPolicy), naming the unmet rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyViolation {
    #[error("Password must be at least {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Password must include an uppercase letter")]
    MissingUppercase,

    #[error("Password must include a lowercase letter")]
    MissingLowercase,

    #[error("Password must include a number")]
    MissingDigit,

    #[error("Password must include a special character")]
    MissingSpecial,
}
