use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sheet_catalog_server::{
    db::{create_pool, PgStore},
    routes,
    storage::CloudinaryStore,
    AppState, Config, SheetManager, Timeouts,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sheet_catalog_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sheet Catalog Server...");

    // Load configuration
    let config = Config::from_env().map_err(|e| anyhow::anyhow!(e))?;

    tracing::info!(
        "Environment: {}, Server: {}",
        config.environment,
        config.server_address()
    );

    if config.admin_username.is_none() || config.admin_password_hash.is_none() {
        tracing::warn!("ADMIN_USERNAME / ADMIN_PASSWORD_HASH not set; admin login is disabled");
    }

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.db_timeout()).await?;

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations").run(&pool).await?;
    tracing::info!("Migrations complete");

    let store = Arc::new(PgStore::new(pool));
    let blobs = Arc::new(CloudinaryStore::new(&config.cloudinary, config.blob_timeout())?);

    let timeouts = Timeouts {
        blob: config.blob_timeout(),
        db: config.db_timeout(),
    };
    let sheets = SheetManager::new(store.clone(), blobs, timeouts);

    // Create app state
    let state = AppState::new(sheets, store, config.clone());

    // Build router
    let app = routes::router(state);

    // Start server
    let addr: SocketAddr = config.server_address().parse()?;
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
