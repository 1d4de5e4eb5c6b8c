use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::PasswordPolicy;
use auth::TokenResponse;

use crate::account::errors::AccountError;
use crate::account::ports::AccountRepository;
use crate::account::ports::AccountServicePort;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::RegisterCommand;

/// Domain service implementation for account operations.
///
/// Password hashing and verification run on the blocking thread pool.
pub struct AccountService<R>
where
    R: AccountRepository + ?Sized,
{
    repository: Arc<R>,
    authenticator: Arc<Authenticator>,
    password_policy: PasswordPolicy,
}

impl<R> AccountService<R>
where
    R: AccountRepository + ?Sized,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - Account persistence implementation
    /// * `authenticator` - Password hashing and token issuance
    /// * `password_policy` - Rules new passwords must satisfy
    pub fn new(
        repository: Arc<R>,
        authenticator: Arc<Authenticator>,
        password_policy: PasswordPolicy,
    ) -> Self {
        Self {
            repository,
            authenticator,
            password_policy,
        }
    }

    async fn run_blocking<T, F>(&self, task: F) -> Result<T, AccountError>
    where
        F: FnOnce(&Authenticator) -> T + Send + 'static,
        T: Send + 'static,
    {
        let authenticator = Arc::clone(&self.authenticator);
        tokio::task::spawn_blocking(move || task(&authenticator))
            .await
            .map_err(|e| AccountError::Unknown(format!("Password task failed: {}", e)))
    }

    async fn hash_password(&self, password: String) -> Result<String, AccountError> {
        Ok(self
            .run_blocking(move |authenticator| authenticator.hash_password(&password))
            .await??)
    }

    /// Replace an outdated digest after a successful login. Failures are logged only.
    async fn rehash(&self, id: &AccountId, password: String) {
        let password_hash = match self.hash_password(password).await {
            Ok(password_hash) => password_hash,
            Err(e) => {
                tracing::warn!(account_id = %id, error = %e, "Password rehash failed");
                return;
            }
        };

        match self.repository.update_credentials(id, &password_hash).await {
            Ok(()) => tracing::info!(account_id = %id, "Password digest upgraded"),
            Err(e) => {
                tracing::warn!(account_id = %id, error = %e, "Failed to store upgraded password digest")
            }
        }
    }
}

#[async_trait]
impl<R> AccountServicePort for AccountService<R>
where
    R: AccountRepository + ?Sized,
{
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError> {
        // Cheap early rejection; the repository still enforces uniqueness atomically.
        if self
            .repository
            .find_account_by_email(&command.email)
            .await?
            .is_some()
        {
            return Err(AccountError::DuplicateAccount(command.email.to_string()));
        }

        self.password_policy.validate(&command.password)?;

        let password_hash = self.hash_password(command.password).await?;
        let account = self
            .repository
            .create_account(&command.email, &password_hash)
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(account)
    }

    async fn login(&self, command: LoginCommand) -> Result<TokenResponse, AccountError> {
        let Ok(email) = EmailAddress::new(&command.email) else {
            return Err(AccountError::InvalidCredentials);
        };

        let Some(credentials) = self.repository.get_account_credentials(&email).await? else {
            tracing::debug!("Login attempt for unknown account");
            let password = command.password;
            self.run_blocking(move |authenticator| {
                authenticator.verify_without_account(&password)
            })
            .await?;
            return Err(AccountError::InvalidCredentials);
        };

        let stored_hash = credentials.password_hash.clone();
        let password = command.password.clone();
        let (is_valid, is_outdated) = self
            .run_blocking(move |authenticator| {
                (
                    authenticator.verify_password(&password, &stored_hash),
                    authenticator.needs_rehash(&stored_hash),
                )
            })
            .await?;

        if !is_valid {
            tracing::debug!(account_id = %credentials.id, "Login with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        if !credentials.is_active {
            return Err(AccountError::InactiveAccount);
        }

        if is_outdated {
            self.rehash(&credentials.id, command.password).await;
        }

        let token = self
            .authenticator
            .issue_token(&credentials.id.to_string())?;

        tracing::info!(account_id = %credentials.id, "Login succeeded");

        Ok(token)
    }

    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError> {
        self.repository
            .find_account_by_id(id)
            .await?
            .ok_or_else(|| AccountError::NotFound(id.to_string()))
    }

    async fn find_account_by_email(&self, email: &EmailAddress) -> Result<Account, AccountError> {
        self.repository
            .find_account_by_email(email)
            .await?
            .ok_or_else(|| AccountError::NotFound(email.to_string()))
    }

    async fn update_account(
        &self,
        id: &AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError> {
        if update.is_empty() {
            return self.get_account(id).await;
        }

        let account = self.repository.update_account(id, update).await?;
        tracing::info!(account_id = %account.id, "Account updated");

        Ok(account)
    }

    async fn change_password(
        &self,
        id: &AccountId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError> {
        let account = self.get_account(id).await?;
        let credentials = self
            .repository
            .get_account_credentials(&account.email)
            .await?
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;

        let current = command.current_password;
        let stored_hash = credentials.password_hash;
        let is_valid = self
            .run_blocking(move |authenticator| authenticator.verify_password(&current, &stored_hash))
            .await?;
        if !is_valid {
            return Err(AccountError::InvalidCredentials);
        }

        self.password_policy.validate(&command.new_password)?;

        let password_hash = self.hash_password(command.new_password).await?;
        self.repository
            .update_credentials(id, &password_hash)
            .await?;

        tracing::info!(account_id = %id, "Password changed");

        Ok(())
    }
}
