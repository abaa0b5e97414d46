use std::env;
use std::sync::Arc;

use anyhow::Result;
use sqlx::migrate::Migrator;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use api::{payment::SimulatedGateway, routes, state::AppState};
use common::{
    cache::{RedisConfig, RedisPool},
    database::{DatabaseConfig, init_pool, run_migrations},
};

static MIGRATOR: Migrator = sqlx::migrate!();

/// Server configuration
#[derive(Debug, Clone)]
struct ServerConfig {
    bind_addr: String,
}

impl ServerConfig {
    fn from_env() -> Self {
        let bind_addr =
            env::var("API_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string());
        Self { bind_addr }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    info!("Starting API service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = init_pool(&db_config).await?;

    // Check database connectivity
    if common::database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    run_migrations(&pool, &MIGRATOR).await?;
    info!("Database migrations applied");

    // Initialize the Redis-backed session store
    let redis_config = RedisConfig::from_env()?;
    let redis_pool = RedisPool::new(&redis_config).await?;

    let app_state = AppState::new(pool, redis_pool, Arc::new(SimulatedGateway));

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let server_config = ServerConfig::from_env();
    let listener = tokio::net::TcpListener::bind(&server_config.bind_addr).await?;
    info!("API service listening on {}", server_config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
