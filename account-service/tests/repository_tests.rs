//! One contract, every backend. The in-memory store always runs; the
//! PostgreSQL run needs `DATABASE_URL` and is ignored by default.

use std::sync::Arc;

use account_service::account::errors::AccountError;
use account_service::domain::account::models::AccountId;
use account_service::domain::account::models::AccountUpdate;
use account_service::domain::account::models::EmailAddress;
use account_service::domain::account::ports::AccountRepository;
use account_service::outbound::repositories::InMemoryAccountRepository;
use account_service::outbound::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;

const CONCURRENT_WRITERS: usize = 16;

fn email(local: &str, run: &str) -> EmailAddress {
    EmailAddress::new(&format!("{}+{}@example.com", local, run)).unwrap()
}

async fn create_and_find<R: AccountRepository>(repository: &R, run: &str) {
    let address = email("Create", run);
    let account = repository
        .create_account(&address, "$pbkdf2-sha256$digest")
        .await
        .unwrap();

    assert_eq!(account.email, address);
    assert!(account.is_active);
    assert!(!account.is_verified);
    assert!(account.display_name.is_none());

    let by_email = repository.find_account_by_email(&address).await.unwrap();
    assert_eq!(by_email.as_ref().map(|a| a.id), Some(account.id));

    // Differently cased input normalizes to the same key.
    let shouted = EmailAddress::new(&address.as_str().to_uppercase()).unwrap();
    let again = repository.find_account_by_email(&shouted).await.unwrap();
    assert_eq!(again.map(|a| a.id), Some(account.id));

    let by_id = repository.find_account_by_id(&account.id).await.unwrap();
    assert_eq!(by_id.map(|a| a.email), Some(address));

    assert!(repository
        .find_account_by_id(&AccountId::new())
        .await
        .unwrap()
        .is_none());
}

async fn duplicate_is_rejected<R: AccountRepository>(repository: &R, run: &str) {
    let address = email("dup", run);
    repository.create_account(&address, "hash").await.unwrap();

    let result = repository.create_account(&address, "other").await;
    assert!(matches!(result, Err(AccountError::DuplicateAccount(_))));
}

async fn concurrent_duplicates<R: AccountRepository>(repository: Arc<R>, run: &str) {
    let address = email("race", run);

    let handles: Vec<_> = (0..CONCURRENT_WRITERS)
        .map(|_| {
            let repository = Arc::clone(&repository);
            let address = address.clone();
            tokio::spawn(async move { repository.create_account(&address, "hash").await })
        })
        .collect();

    let mut created = 0;
    let mut duplicates = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => created += 1,
            Err(AccountError::DuplicateAccount(_)) => duplicates += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }

    assert_eq!(created, 1);
    assert_eq!(duplicates, CONCURRENT_WRITERS - 1);
}

async fn credentials_round_trip<R: AccountRepository>(repository: &R, run: &str) {
    let address = email("creds", run);
    let account = repository.create_account(&address, "first").await.unwrap();

    let credentials = repository
        .get_account_credentials(&address)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credentials.id, account.id);
    assert_eq!(credentials.password_hash, "first");
    assert!(credentials.is_active);

    repository
        .update_credentials(&account.id, "second")
        .await
        .unwrap();
    let credentials = repository
        .get_account_credentials(&address)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credentials.password_hash, "second");

    assert!(repository
        .get_account_credentials(&email("missing", run))
        .await
        .unwrap()
        .is_none());

    let missing = repository.update_credentials(&AccountId::new(), "x").await;
    assert!(matches!(missing, Err(AccountError::NotFound(_))));
}

async fn partial_updates<R: AccountRepository>(repository: &R, run: &str) {
    let account = repository
        .create_account(&email("update", run), "hash")
        .await
        .unwrap();
    let taken = email("taken", run);
    repository.create_account(&taken, "hash").await.unwrap();

    let updated = repository
        .update_account(
            &account.id,
            AccountUpdate {
                display_name: Some(Some("Alice".to_string())),
                is_verified: Some(true),
                ..AccountUpdate::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.display_name.as_deref(), Some("Alice"));
    assert!(updated.is_verified);
    assert_eq!(updated.email, account.email);
    assert_eq!(updated.created_at, account.created_at);

    let conflict = repository
        .update_account(
            &account.id,
            AccountUpdate {
                email: Some(taken),
                display_name: Some(None),
                ..AccountUpdate::default()
            },
        )
        .await;
    assert!(matches!(conflict, Err(AccountError::DuplicateAccount(_))));

    let unchanged = repository
        .find_account_by_id(&account.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.display_name.as_deref(), Some("Alice"));

    let deactivated = repository
        .update_account(
            &account.id,
            AccountUpdate {
                is_active: Some(false),
                ..AccountUpdate::default()
            },
        )
        .await
        .unwrap();
    assert!(!deactivated.is_active);
    let credentials = repository
        .get_account_credentials(&account.email)
        .await
        .unwrap()
        .unwrap();
    assert!(!credentials.is_active);

    let missing = repository
        .update_account(&AccountId::new(), AccountUpdate::default())
        .await;
    assert!(matches!(missing, Err(AccountError::NotFound(_))));
}

async fn run_contract<R: AccountRepository>(repository: Arc<R>) {
    let run = uuid::Uuid::new_v4().simple().to_string();

    create_and_find(repository.as_ref(), &run).await;
    duplicate_is_rejected(repository.as_ref(), &run).await;
    concurrent_duplicates(Arc::clone(&repository), &run).await;
    credentials_round_trip(repository.as_ref(), &run).await;
    partial_updates(repository.as_ref(), &run).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_in_memory_repository_contract() {
    run_contract(Arc::new(InMemoryAccountRepository::new())).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
#[ignore = "requires DATABASE_URL pointing at a PostgreSQL instance"]
async fn test_postgres_repository_contract() {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPoolOptions::new()
        .max_connections(CONCURRENT_WRITERS as u32)
        .connect(&url)
        .await
        .expect("Failed to connect to Postgres");

    let repository = PostgresAccountRepository::new(pool);
    repository.migrate().await.expect("Failed to run migrations");

    run_contract(Arc::new(repository)).await;
}
