use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use chrono::Duration;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::Deserialize;
use serde::Serialize;

use super::claims::Claims;
use super::clock::Clock;
use super::clock::SystemClock;
use super::errors::SigningError;
use super::errors::TokenError;

/// Token type reported alongside every issued access token.
pub const TOKEN_TYPE_BEARER: &str = "bearer";

/// Signing and validation parameters for identity tokens.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: String,
    pub algorithm: Algorithm,
    pub access_ttl: Duration,
    pub leeway: Duration,
    pub issuer: Option<String>,
    pub audience: Option<String>,
}

impl TokenSettings {
    /// HS256 settings with a 7 day access token lifetime and 30s leeway.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            access_ttl: Duration::days(7),
            leeway: Duration::seconds(30),
            issuer: None,
            audience: None,
        }
    }

    /// Parse a symmetric signing algorithm name (`HS256`, `HS384` or `HS512`).
    ///
    /// Asymmetric algorithms are rejected: tokens are signed with a shared secret.
    pub fn hmac_algorithm(name: &str) -> Option<Algorithm> {
        match name.trim().to_ascii_uppercase().as_str() {
            "HS256" => Some(Algorithm::HS256),
            "HS384" => Some(Algorithm::HS384),
            "HS512" => Some(Algorithm::HS512),
            _ => None,
        }
    }
}

impl fmt::Debug for TokenSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSettings")
            .field("secret", &"<redacted>")
            .field("algorithm", &self.algorithm)
            .field("access_ttl", &self.access_ttl)
            .field("leeway", &self.leeway)
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .finish()
    }
}

/// Result of a successful token issuance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
        }
    }
}

/// Issues and verifies signed, self-contained identity tokens.
///
/// Stateless: verification needs only the shared secret and the clock.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
    access_ttl: Duration,
    leeway: Duration,
    issuer: Option<String>,
    audience: Option<String>,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Create a token service using the system clock.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(settings: &TokenSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            algorithm: settings.algorithm,
            access_ttl: settings.access_ttl,
            leeway: settings.leeway,
            issuer: settings.issuer.clone(),
            audience: settings.audience.clone(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for `iat`/`exp` and expiry checks.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Lifetime of access tokens issued by [`issue_access_token`](Self::issue_access_token).
    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    /// Issue a token for `subject` that expires `ttl` from now.
    ///
    /// The signing algorithm is recorded in the token header.
    ///
    /// # Errors
    /// * `SigningError` - Expiration out of range, or token encoding failed
    pub fn issue(&self, subject: &str, ttl: Duration) -> Result<String, SigningError> {
        let mut claims = Claims::new(subject, self.clock.now(), ttl)
            .ok_or_else(|| SigningError(format!("token lifetime {} is out of range", ttl)))?;
        if let Some(issuer) = &self.issuer {
            claims = claims.with_issuer(issuer.as_str());
        }
        if let Some(audience) = &self.audience {
            claims = claims.with_audience(audience.as_str());
        }

        encode(&Header::new(self.algorithm), &claims, &self.encoding_key)
            .map_err(|e| SigningError(e.to_string()))
    }

    /// Issue an access token with the configured lifetime.
    ///
    /// # Errors
    /// * `SigningError` - Token encoding failed
    pub fn issue_access_token(&self, subject: &str) -> Result<TokenResponse, SigningError> {
        self.issue(subject, self.access_ttl)
            .map(TokenResponse::bearer)
    }

    /// Verify a token and return its claims.
    ///
    /// Checks run in order: structure and signature (including the header
    /// algorithm), expiry with leeway, then issuer and audience when configured.
    ///
    /// # Errors
    /// * `Malformed` - Not a decodable token, or `sub`/`exp` missing
    /// * `SignatureInvalid` - Bad signature or unexpected algorithm
    /// * `Expired` - Past `exp` plus leeway, or issued with no lifetime
    /// * `ClaimMismatch` - Issuer or audience differs from configuration
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(self.algorithm);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims =
            HashSet::from(["sub".to_string(), "exp".to_string()]);

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)?.claims;

        let now = self.clock.now().timestamp();
        if claims.is_expired(now, self.leeway.num_seconds()) {
            return Err(TokenError::Expired);
        }

        if let Some(expected) = &self.issuer {
            if claims.iss.as_deref() != Some(expected.as_str()) {
                return Err(TokenError::ClaimMismatch(format!(
                    "issuer {:?} does not match",
                    claims.iss
                )));
            }
        }
        if let Some(expected) = &self.audience {
            if claims.aud.as_deref() != Some(expected.as_str()) {
                return Err(TokenError::ClaimMismatch(format!(
                    "audience {:?} does not match",
                    claims.aud
                )));
            }
        }

        Ok(claims)
    }
}
