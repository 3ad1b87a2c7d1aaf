use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use threadline_api::{build_router, cache::ResponseCache, config::Config, state::AppState};
use threadline_persist::{
    MemoryThreadStore, MongoOptions, MongoThreadStore, ThreadActionsBuilder, ThreadStore,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting Threadline API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    let store = build_store(&config).await?;
    let cache = Arc::new(ResponseCache::from_config(&config.cache));

    let actions = ThreadActionsBuilder::new()
        .store(store)
        .revalidator(cache.clone())
        .build()?;

    let state = Arc::new(AppState::new(config.clone(), actions, cache));
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn ThreadStore>> {
    if config.mongodb.in_memory {
        tracing::warn!("Using in-memory store, data will not survive a restart");
        return Ok(Arc::new(MemoryThreadStore::new()));
    }

    tracing::info!("Connecting to MongoDB");
    let options = MongoOptions {
        app_name: Some("threadline-api".to_string()),
        pool_size: Some(config.mongodb.pool_size),
        timeout_ms: Some(config.mongodb.timeout_ms),
    };
    let store = MongoThreadStore::connect(
        &config.mongodb_uri,
        &config.mongodb.database,
        options,
    ).await?;

    if let Err(e) = store.ensure_indexes().await {
        tracing::warn!("Failed to create thread indexes: {}", e);
    }
    tracing::info!("MongoDB connected");

    Ok(Arc::new(store))
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
