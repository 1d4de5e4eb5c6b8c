use std::sync::Arc;

use auth::Authenticator;
use auth::TokenError;

use crate::account::errors::AuthError;
use crate::account::ports::AccountRepository;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;

/// Whether resolution should load the account behind the token subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountLookup {
    /// Trust the verified token subject without touching the repository.
    SubjectOnly,
    /// Load the account and require that it exists and is active.
    Load,
}

/// Identity proven by a verified bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedIdentity {
    pub subject: AccountId,
    pub account: Option<Account>,
}

/// Outcome of permissive resolution: a request is either anonymous or
/// carries a resolved identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthContext {
    Anonymous,
    Authenticated(ResolvedIdentity),
}

impl AuthContext {
    pub fn identity(&self) -> Option<&ResolvedIdentity> {
        match self {
            AuthContext::Anonymous => None,
            AuthContext::Authenticated(identity) => Some(identity),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::Authenticated(_))
    }
}

impl From<Result<ResolvedIdentity, AuthError>> for AuthContext {
    fn from(result: Result<ResolvedIdentity, AuthError>) -> Self {
        match result {
            Ok(identity) => AuthContext::Authenticated(identity),
            Err(_) => AuthContext::Anonymous,
        }
    }
}

/// Turns a raw `Authorization` header into a [`ResolvedIdentity`].
///
/// Strict callers propagate the [`AuthError`]; permissive callers convert the
/// result into an [`AuthContext`] and carry on anonymously.
pub struct AuthContextResolver<R>
where
    R: AccountRepository + ?Sized,
{
    authenticator: Arc<Authenticator>,
    repository: Arc<R>,
}

impl<R> AuthContextResolver<R>
where
    R: AccountRepository + ?Sized,
{
    pub fn new(authenticator: Arc<Authenticator>, repository: Arc<R>) -> Self {
        Self {
            authenticator,
            repository,
        }
    }

    /// Resolve an identity from a raw `Authorization` header value.
    ///
    /// # Errors
    /// * `MissingCredential` - No header, wrong scheme or empty token
    /// * `TokenExpired` - Token verified but past its expiry
    /// * `TokenInvalid` - Malformed, bad signature, claim mismatch or non-UUID subject
    /// * `AccountNotFound` - Lookup requested and no active account exists
    pub async fn resolve(
        &self,
        raw_header: Option<&str>,
        lookup: AccountLookup,
    ) -> Result<ResolvedIdentity, AuthError> {
        self.resolve_token(auth::parse_bearer(raw_header), lookup)
            .await
    }

    /// Resolve an identity from a request's credential carriers.
    ///
    /// A bearer token in the `Authorization` header wins; the session cookie
    /// value is used only when the header carries no token.
    ///
    /// # Errors
    /// Same as [`resolve`](Self::resolve).
    pub async fn resolve_request(
        &self,
        raw_header: Option<&str>,
        cookie_token: Option<&str>,
        lookup: AccountLookup,
    ) -> Result<ResolvedIdentity, AuthError> {
        self.resolve_token(auth::parse_bearer(raw_header).or(cookie_token), lookup)
            .await
    }

    /// Resolve an identity from an already extracted bearer token.
    pub async fn resolve_token(
        &self,
        token: Option<&str>,
        lookup: AccountLookup,
    ) -> Result<ResolvedIdentity, AuthError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingCredential)?;

        let claims = self.authenticator.validate_token(token).map_err(|e| match e {
            TokenError::Expired => {
                tracing::debug!("Rejected expired token");
                AuthError::TokenExpired
            }
            other => {
                tracing::warn!(error = %other, "Rejected invalid token");
                AuthError::TokenInvalid
            }
        })?;

        let subject = AccountId::from_string(&claims.sub).map_err(|e| {
            tracing::warn!(error = %e, "Token subject is not an account id");
            AuthError::TokenInvalid
        })?;

        let account = match lookup {
            AccountLookup::SubjectOnly => None,
            AccountLookup::Load => Some(self.load_active(&subject).await?),
        };

        Ok(ResolvedIdentity { subject, account })
    }

    async fn load_active(&self, subject: &AccountId) -> Result<Account, AuthError> {
        match self.repository.find_account_by_id(subject).await {
            Ok(Some(account)) if account.is_active => Ok(account),
            Ok(Some(_)) => {
                tracing::debug!(account_id = %subject, "Token subject is inactive");
                Err(AuthError::AccountNotFound)
            }
            Ok(None) => Err(AuthError::AccountNotFound),
            Err(e) => {
                tracing::error!(account_id = %subject, error = %e, "Account lookup failed");
                Err(AuthError::AccountNotFound)
            }
        }
    }
}
