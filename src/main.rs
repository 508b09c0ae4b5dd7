use circulation_ledger::{
    adapters::SystemClock,
    adapters::memory::BorrowerDirectory as MemoryBorrowerDirectory,
    adapters::postgres::{PostgresCatalogStore, PostgresLedgerEntryStore},
    api::{handlers::AppState, router::create_router},
    application::circulation::ServiceDependencies,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "circulation_ledger=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let database_url =
        std::env::var("DATABASE_URL").unwrap_or_else(|_| "postgres://localhost/circulation".into());

    tracing::info!("Database URL: {}", database_url);

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    // Initialize adapters.
    // TODO: replace the in-memory borrower directory with a client for
    // the identity service once its lookup endpoint is available.
    let catalog = Arc::new(PostgresCatalogStore::new(pool.clone()));
    let ledger = Arc::new(PostgresLedgerEntryStore::new(pool.clone()));
    let borrowers = Arc::new(MemoryBorrowerDirectory::new());
    let clock = Arc::new(SystemClock);

    let service_deps = ServiceDependencies {
        catalog,
        ledger,
        borrowers,
        clock,
    };

    let app_state = Arc::new(AppState { service_deps });
    let app = create_router(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
