use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Identity token claims.
///
/// `sub`, `iat` and `exp` are always present; issuer and audience only when
/// the issuing service is configured with them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (account identifier), opaque to the token layer
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Issuer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Audience
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
}

impl Claims {
    /// Create claims for a subject, valid for `ttl` from `issued_at`.
    ///
    /// Returns `None` when the expiration falls outside the representable range.
    pub fn new(subject: impl ToString, issued_at: DateTime<Utc>, ttl: Duration) -> Option<Self> {
        let expiration = issued_at.checked_add_signed(ttl)?;

        Some(Self {
            sub: subject.to_string(),
            iat: issued_at.timestamp(),
            exp: expiration.timestamp(),
            iss: None,
            aud: None,
        })
    }

    /// Set issuer.
    pub fn with_issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set audience.
    pub fn with_audience(mut self, aud: impl Into<String>) -> Self {
        self.aud = Some(aud.into());
        self
    }

    /// Check if the token is expired at `now` (Unix timestamp).
    ///
    /// `leeway_seconds` tolerates clock skew between issuer and verifier.
    /// A token with no lifetime (`exp <= iat`) is expired regardless of leeway.
    pub fn is_expired(&self, now: i64, leeway_seconds: i64) -> bool {
        self.exp <= self.iat || now >= self.exp.saturating_add(leeway_seconds)
    }
}
