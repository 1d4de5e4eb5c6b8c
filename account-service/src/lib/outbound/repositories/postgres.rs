use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use sqlx::FromRow;
use sqlx::PgPool;
use uuid::Uuid;

use crate::account::errors::AccountError;
use crate::account::ports::AccountRepository;
use crate::domain::account::models::Account;
use crate::domain::account::models::AccountId;
use crate::domain::account::models::AccountUpdate;
use crate::domain::account::models::Credentials;
use crate::domain::account::models::EmailAddress;

const EMAIL_UNIQUE_CONSTRAINT: &str = "accounts_email_key";

/// Row in the `accounts` table.
#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    display_name: Option<String>,
    is_active: bool,
    is_verified: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<AccountRow> for Account {
    type Error = AccountError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: AccountId(row.id),
            email: EmailAddress::new(&row.email)?,
            display_name: row.display_name,
            is_active: row.is_active,
            is_verified: row.is_verified,
            created_at: row.created_at,
        })
    }
}

#[derive(FromRow)]
struct CredentialsRow {
    id: Uuid,
    password_hash: String,
    is_active: bool,
}

fn database_error(e: sqlx::Error) -> AccountError {
    AccountError::DatabaseError(e.to_string())
}

/// Map a write failure, turning the email uniqueness violation into a domain error.
fn write_error(e: sqlx::Error, email: &EmailAddress) -> AccountError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) {
            return AccountError::DuplicateAccount(email.to_string());
        }
    }
    database_error(e)
}

pub struct PostgresAccountRepository {
    pool: PgPool,
}

impl PostgresAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply pending schema migrations.
    pub async fn migrate(&self) -> Result<(), AccountError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AccountError::DatabaseError(e.to_string()))
    }
}

#[async_trait]
impl AccountRepository for PostgresAccountRepository {
    async fn create_account(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<Account, AccountError> {
        let account = Account::new(email.clone(), Utc::now());

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (id, email, password_hash, display_name, is_active, is_verified, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, email, display_name, is_active, is_verified, created_at
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(password_hash)
        .bind(account.display_name.as_deref())
        .bind(account.is_active)
        .bind(account.is_verified)
        .bind(account.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| write_error(e, email))?;

        Account::try_from(row)
    }

    async fn find_account_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Account>, AccountError> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, display_name, is_active, is_verified, created_at
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(Account::try_from)
        .transpose()
    }

    async fn find_account_by_id(&self, id: &AccountId) -> Result<Option<Account>, AccountError> {
        sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, display_name, is_active, is_verified, created_at
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?
        .map(Account::try_from)
        .transpose()
    }

    async fn get_account_credentials(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<Credentials>, AccountError> {
        let row = sqlx::query_as::<_, CredentialsRow>(
            r#"
            SELECT id, password_hash, is_active
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        Ok(row.map(|r| Credentials {
            id: AccountId(r.id),
            password_hash: r.password_hash,
            is_active: r.is_active,
        }))
    }

    async fn update_account(
        &self,
        id: &AccountId,
        update: AccountUpdate,
    ) -> Result<Account, AccountError> {
        let mut tx = self.pool.begin().await.map_err(database_error)?;

        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, email, display_name, is_active, is_verified, created_at
            FROM accounts
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(database_error)?
        .ok_or_else(|| AccountError::NotFound(id.to_string()))?;

        let mut account = Account::try_from(row)?;
        account.apply(update);

        sqlx::query(
            r#"
            UPDATE accounts
            SET email = $2, display_name = $3, is_active = $4, is_verified = $5, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(account.id.0)
        .bind(account.email.as_str())
        .bind(account.display_name.as_deref())
        .bind(account.is_active)
        .bind(account.is_verified)
        .execute(&mut *tx)
        .await
        .map_err(|e| write_error(e, &account.email))?;

        tx.commit().await.map_err(database_error)?;

        Ok(account)
    }

    async fn update_credentials(
        &self,
        id: &AccountId,
        password_hash: &str,
    ) -> Result<(), AccountError> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET password_hash = $2, updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id.0)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(AccountError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
