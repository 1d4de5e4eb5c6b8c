use async_trait::async_trait;
use auth::TokenResponse;

use crate::account::errors::AccountError;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::ChangePasswordCommand;
use crate::domain::account::models::Credentials;
use crate::domain::account::models::EmailAddress;
use crate::domain::account::models::LoginCommand;
use crate::domain::account::models::RegisterCommand;

/// Port for account domain service operations.
#[async_trait]
pub trait AccountServicePort: Send + Sync + 'static {
    /// Register a new account.
    ///
    /// # Arguments
    /// * `command` - Normalized email and plaintext password
    ///
    /// # Returns
    /// Created account, public shape
    ///
    /// # Errors
    /// * `DuplicateAccount` - Email is already registered
    /// * `PasswordPolicy` - Password fails the configured policy
    /// * `DatabaseError` - Database operation failed
    async fn register(&self, command: RegisterCommand) -> Result<Account, AccountError>;

    /// Exchange an email and password for an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `InactiveAccount` - Password matched a deactivated account
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, command: LoginCommand) -> Result<TokenResponse, AccountError>;

    /// Retrieve account by unique identifier.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_account(&self, id: &AccountId) -> Result<Account, AccountError>;

    /// Retrieve account by email.
    ///
    /// # Errors
    /// * `NotFound` - No account with this email
    /// * `DatabaseError` - Database operation failed
    async fn find_account_by_email(&self, email: &EmailAddress) -> Result<Account, AccountError>;

    /// Update mutable public fields of an account.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DuplicateAccount` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_account(
        &self,
        id: &AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError>;

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `InvalidCredentials` - Current password is wrong
    /// * `PasswordPolicy` - New password fails the configured policy
    /// * `DatabaseError` - Database operation failed
    async fn change_password(
        &self,
        id: &AccountId,
        command: ChangePasswordCommand,
    ) -> Result<(), AccountError>;
}

/// Persistence operations for the account aggregate.
///
/// Every backend must honour the same contract: emails are stored and compared
/// normalized, create and update are atomic with respect to the email
/// uniqueness check, and only [`get_account_credentials`](Self::get_account_credentials)
/// ever returns password material.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Persist a new account with its password digest.
    ///
    /// # Arguments
    /// * `email` - Normalized email address
    /// * `password_hash` - Tagged password digest
    ///
    /// # Returns
    /// Created account, public shape
    ///
    /// # Errors
    /// * `DuplicateAccount` - Email is already registered (also under concurrent creation)
    /// * `DatabaseError` - Database operation failed
    async fn create_account(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<Account, AccountError>;

    /// Retrieve account by email address.
    ///
    /// # Returns
    /// Optional account (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountError>;

    /// Retrieve account by identifier.
    ///
    /// # Returns
    /// Optional account (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_account_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError>;

    /// Retrieve the login credentials for an email address.
    ///
    /// # Returns
    /// Optional credentials (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn get_account_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Credentials>, AccountError>;

    /// Apply a partial update, all or nothing.
    ///
    /// # Returns
    /// Updated account
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DuplicateAccount` - New email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn update_account(
        &self,
        id: &AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError>;

    /// Replace the stored password digest.
    ///
    /// # Errors
    /// * `NotFound` - Account does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_credentials(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<(), AccountError>;
}
