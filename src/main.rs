use std::net::TcpListener;
use std::sync::Arc;

use actix_web::web;
use chirpy::auth::SessionManager;
use chirpy::configuration::get_configuration;
use chirpy::metrics::HitCounter;
use chirpy::startup::run;
use chirpy::state::AppState;
use chirpy::store::{PostgresChirpStore, PostgresRefreshTokenStore, PostgresUserStore};
use chirpy::telemetry::init_telemetry;
use sqlx::postgres::PgPoolOptions;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();

    tracing::info!("Starting application");

    let configuration = match get_configuration() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to read configuration: {}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Configuration error",
            ));
        }
    };
    if let Err(e) = configuration.validate() {
        tracing::error!("Invalid configuration: {}", e);
        return Err(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Configuration error",
        ));
    }
    tracing::info!(platform = %configuration.application.platform, "Configuration loaded successfully");

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
            tracing::error!("Failed to run migrations: {}", e);
            std::io::Error::new(std::io::ErrorKind::Other, "Migration error")
        })?;

    tracing::info!("Database ready");

    let sessions = SessionManager::from_settings(
        Arc::new(PostgresRefreshTokenStore::new(pool.clone())),
        &configuration.jwt,
    );
    let state = AppState {
        users: Arc::new(PostgresUserStore::new(pool.clone())),
        chirps: Arc::new(PostgresChirpStore::new(pool)),
        sessions,
        is_dev: configuration.application.is_dev(),
        polka_key: configuration.polka.api_key.clone(),
    };

    let address = format!(
        "{}:{}",
        configuration.application.host, configuration.application.port
    );
    let listener = TcpListener::bind(&address)?;
    tracing::info!("Server listening on: {}", address);

    let server = run(
        listener,
        state,
        web::Data::new(HitCounter::new()),
        configuration.application.static_dir.clone(),
    )?;

    server.await
}
