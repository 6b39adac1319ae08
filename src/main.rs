use std::net::TcpListener;
use std::sync::Arc;

use qa_service::auth::{spawn_refresh_token_sweeper, RefreshTokenLedger, TokenSigner};
use qa_service::configuration::get_configuration;
use qa_service::repository::PgStore;
use qa_service::startup::{run, AppServices};
use qa_service::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => {
            tracing::info!("Configuration loaded successfully");
            config
        }
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };

    tracing::info!("Attempting to connect to database");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&configuration.database.connection_string())
        .await
        .map_err(|e| {
            tracing::error!("Failed to create connection pool: {}", e);
            std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                "Database connection error",
            )
        })?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to run database migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
        })?;
    tracing::info!("Database ready");

    let store = Arc::new(PgStore::new(pool));
    let signer = TokenSigner::new(&configuration.jwt);
    let ledger = Arc::new(RefreshTokenLedger::new());

    let shutdown = CancellationToken::new();
    let sweeper = spawn_refresh_token_sweeper(
        ledger.clone(),
        configuration.auth.sweep_interval(),
        shutdown.clone(),
    );

    let services = AppServices::new(
        store,
        signer,
        ledger,
        configuration.auth.password_hash_cost,
    );

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let result = run(listener, services)?.await;

    // actix handles SIGINT/SIGTERM; stop the sweeper once the server is down.
    shutdown.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!("Refresh token sweeper ended abnormally: {}", e);
    }
    tracing::info!("Server stopped");

    result
}
