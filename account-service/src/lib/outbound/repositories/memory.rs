use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::account::errors::AccountError;
use crate::account::ports::AccountRepository;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::Credentials;
use crate::domain::account::models::EmailAddress;

struct StoredAccount {
    account: Account,
    password_hash: String,
}

#[derive(Default)]
struct Store {
    accounts: HashMap<AccountId, StoredAccount>,
    by_email: HashMap<EmailAddress, AccountId>,
}

/// Process-local account store.
///
/// A single lock guards both the records and the email index, so the
/// uniqueness check and the write happen under one write guard.
#[derive(Default)]
pub struct InMemoryAccountRepository {
    store: RwLock<Store>,
}

impl InMemoryAccountRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn create_account(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<Account, AccountError> {
        let mut store = self.store.write().await;

        if store.by_email.contains_key(email) {
            return Err(AccountError::DuplicateAccount(email.to_string()));
        }

        let account = Account::new(email.clone(), Utc::now());
        store.by_email.insert(email.clone(), account.id);
        store.accounts.insert(
            account.id,
            StoredAccount {
                account: account.clone(),
                password_hash: password_hash.to_string(),
            },
        );

        Ok(account)
    }

    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountError> {
        let store = self.store.read().await;

        Ok(store
            .by_email
            .get(email)
            .and_then(|id| store.accounts.get(id))
            .map(|stored| stored.account.clone()))
    }

    async fn find_account_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        let store = self.store.read().await;

        Ok(store.accounts.get(id).map(|stored| stored.account.clone()))
    }

    async fn get_account_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Credentials>, AccountError> {
        let store = self.store.read().await;

        Ok(store
            .by_email
            .get(email)
            .and_then(|id| store.accounts.get(id))
            .map(|stored| Credentials {
                id: stored.account.id,
                password_hash: stored.password_hash.clone(),
                is_active: stored.account.is_active,
            }))
    }

    async fn update_account(
        &self,
        id: &AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError> {
        let mut store = self.store.write().await;

        let current_email = store
            .accounts
            .get(id)
            .map(|stored| stored.account.email.clone())
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;

        if let Some(new_email) = &update.email {
            if *new_email != current_email {
                if store.by_email.contains_key(new_email) {
                    return Err(AccountError::DuplicateAccount(new_email.to_string()));
                }
                store.by_email.remove(&current_email);
                store.by_email.insert(new_email.clone(), *id);
            }
        }

        let stored = store
            .accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;
        stored.account.apply(update);

        Ok(stored.account.clone())
    }

    async fn update_credentials(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<(), AccountError> {
        let mut store = self.store.write().await;

        let stored = store
            .accounts
            .get_mut(id)
            .ok_or_else(|| AccountError::NotFound(id.to_string()))?;
        stored.password_hash = password_hash.to_string();

        Ok(())
    }
}
