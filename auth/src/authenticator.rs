use std::sync::OnceLock;

use crate::jwt::Claims;
use crate::jwt::SigningError;
use crate::jwt::TokenError;
use crate::jwt::TokenResponse;
use crate::jwt::TokenService;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and token issuance.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_service: TokenService,
    decoy_hash: OnceLock<Option<String>>,
}

const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

impl Authenticator {
    pub fn new(password_hasher: PasswordHasher, token_service: TokenService) -> Self {
        Self {
            password_hasher,
            token_service,
            decoy_hash: OnceLock::new(),
        }
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored digest. Fails closed.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> bool {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Spend one full verification on a login for an account that does not
    /// exist, so it costs as much as a wrong password. Always `false`.
    pub fn verify_without_account(&self, password: &str) -> bool {
        let decoy = self
            .decoy_hash
            .get_or_init(|| self.password_hasher.hash(DECOY_PASSWORD).ok());
        if let Some(digest) = decoy {
            self.password_hasher.verify(password, digest);
        }
        false
    }

    /// Whether a stored digest should be upgraded to the current hashing settings.
    pub fn needs_rehash(&self, stored_hash: &str) -> bool {
        self.password_hasher.needs_rehash(stored_hash)
    }

    /// Issue an access token for `subject`. Callers verify credentials first.
    ///
    /// # Errors
    /// * `SigningError` - Token generation failed
    pub fn issue_token(&self, subject: &str) -> Result<TokenResponse, SigningError> {
        self.token_service.issue_access_token(subject)
    }

    /// Validate a token and return its claims.
    ///
    /// # Errors
    /// * `TokenError` - Token validation failed
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.token_service.verify(token)
    }

    pub fn token_service(&self) -> &TokenService {
        &self.token_service
    }
}
