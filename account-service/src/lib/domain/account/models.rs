use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::account::errors::AccountIdError;
use crate::account::errors::EmailError;

/// Account aggregate, public shape.
///
/// Carries no credential material; the password digest only ever travels in
/// [`Credentials`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub email: EmailAddress,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Fresh account as created by registration: active, unverified.
    pub fn new(email: EmailAddress, created_at: DateTime<Utc>) -> Self {
        Self {
            id: AccountId::new(),
            email,
            display_name: None,
            is_active: true,
            is_verified: false,
            created_at,
        }
    }

    /// Apply a partial update in place. `id` and `created_at` never change.
    pub fn apply(&mut self, update: AccountUpdate) {
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(display_name) = update.display_name {
            self.display_name = display_name;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
        if let Some(is_verified) = update.is_verified {
            self.is_verified = is_verified;
        }
    }
}

/// Private login shape. Not serializable, and its `Debug` output hides the digest.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub id: AccountId,
    pub password_hash: String,
    pub is_active: bool,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("id", &self.id)
            .field("password_hash", &"<redacted>")
            .field("is_active", &self.is_active)
            .finish()
    }
}

/// Account unique identifier type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Generate a new random account ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an account ID from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, AccountIdError> {
        Uuid::parse_str(s)
            .map(AccountId)
            .map_err(|e| AccountIdError::InvalidFormat(e.to_string()))
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Trim and lower-case an email address.
///
/// Idempotent: `normalize_email(&normalize_email(e)) == normalize_email(e)`.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Normalized email address type
///
/// Always trimmed and lower-cased, then validated with an RFC 5322 parser.
/// Repositories only accept this type, so every comparison and every stored
/// value goes through normalization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Normalize and validate an email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(raw: &str) -> Result<Self, EmailError> {
        let email = normalize_email(raw);
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Partial update of the mutable public fields of an account.
///
/// `display_name: Some(None)` clears the display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountUpdate {
    pub email: Option<EmailAddress>,
    pub display_name: Option<Option<String>>,
    pub is_active: Option<bool>,
    pub is_verified: Option<bool>,
}

impl AccountUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.display_name.is_none()
            && self.is_active.is_none()
            && self.is_verified.is_none()
    }
}

/// Command to register a new account
#[derive(Debug)]
pub struct RegisterCommand {
    pub email: EmailAddress,
    pub password: String,
}

impl RegisterCommand {
    /// Construct a new registration command.
    ///
    /// # Arguments
    /// * `email` - Normalized email address
    /// * `password` - Plain text password (checked against policy and hashed by the service)
    pub fn new(email: EmailAddress, password: String) -> Self {
        Self { email, password }
    }
}

/// Command to exchange an email and password for an access token.
///
/// The email is kept raw: a malformed address must fail like any other
/// unknown account.
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Command to replace an account's password
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub current_password: String,
    pub new_password: String,
}
