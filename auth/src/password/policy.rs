use serde::Deserialize;

use super::errors::PasswordPolicyViolation;

/// Password strength requirements checked before a password is hashed.
///
/// Length is measured in characters, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_upper: bool,
    pub require_lower: bool,
    pub require_digit: bool,
    /// Requires at least one character outside ASCII letters and digits.
    pub require_special: bool,
}

impl PasswordPolicy {
    /// Check a plaintext password against the policy.
    ///
    /// Rules are evaluated in a fixed order (minimum length, maximum length,
    /// uppercase, lowercase, digit, special) and the first unmet rule is reported.
    /// Character classes are ASCII: `Ä` is not an uppercase letter here but
    /// does count as a special character.
    ///
    /// # Errors
    /// * `PasswordPolicyViolation` - The specific rule the password fails
    pub fn validate(&self, password: &str) -> Result<(), PasswordPolicyViolation> {
        let length = password.chars().count();

        if length < self.min_length {
            return Err(PasswordPolicyViolation::TooShort {
                min: self.min_length,
                actual: length,
            });
        }
        if length > self.max_length {
            return Err(PasswordPolicyViolation::TooLong {
                max: self.max_length,
                actual: length,
            });
        }
        if self.require_upper && !password.chars().any(|c| c.is_ascii_uppercase()) {
            return Err(PasswordPolicyViolation::MissingUppercase);
        }
        if self.require_lower && !password.chars().any(|c| c.is_ascii_lowercase()) {
            return Err(PasswordPolicyViolation::MissingLowercase);
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            return Err(PasswordPolicyViolation::MissingDigit);
        }
        if self.require_special && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(PasswordPolicyViolation::MissingSpecial);
        }

        Ok(())
    }
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 256,
            require_upper: false,
            require_lower: false,
            require_digit: false,
            require_special: false,
        }
    }
}
