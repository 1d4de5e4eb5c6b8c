use std::sync::Arc;

use account_service::config::Settings;
use account_service::domain::account::context::AuthContextResolver;
use account_service::domain::account::ports::AccountRepository;
use account_service::domain::account::service::AccountService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::repositories::InMemoryAccountRepository;
use account_service::outbound::repositories::PostgresAccountRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const MAX_DB_CONNECTIONS: u32 = 5;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,auth=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let settings = Settings::load()?;

    tracing::info!(
        http_port = settings.http_port(),
        algorithm = ?settings.token_settings().algorithm,
        database = settings.database_url().is_some(),
        "Configuration loaded"
    );

    let repository: Arc<dyn AccountRepository> = match settings.database_url() {
        Some(url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(MAX_DB_CONNECTIONS)
                .connect(url)
                .await?;
            tracing::info!(
                max_connections = MAX_DB_CONNECTIONS,
                database = "postgresql",
                "Database connection pool created"
            );

            let repository = PostgresAccountRepository::new(pg_pool);
            repository.migrate().await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            Arc::new(repository)
        }
        None => {
            tracing::warn!("No database configured, accounts are kept in memory");
            Arc::new(InMemoryAccountRepository::new())
        }
    };

    let authenticator = Arc::new(settings.authenticator());
    let account_service = Arc::new(AccountService::new(
        Arc::clone(&repository),
        Arc::clone(&authenticator),
        settings.password_policy().clone(),
    ));
    let resolver = Arc::new(AuthContextResolver::new(authenticator, repository));

    let http_address = format!("0.0.0.0:{}", settings.http_port());
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = settings.http_port(),
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(account_service, resolver)).await?;

    tracing::info!("Server exited");

    Ok(())
}
