//! eventra-api - HTTP API server for eventra

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eventra_api::{router, AppState};
use eventra_assist::{AssistPlanner, GeminiBackend};
use eventra_db::Database;

/// Default token lifetime: seven days.
const DEFAULT_TOKEN_TTL_SECS: i64 = 7 * 24 * 3600;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // LOG_FORMAT selects "json" or "text"; RUST_LOG is the usual filter.
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "eventra_api=debug,tower_http=debug".into());
    let registry = tracing_subscriber::registry().with(env_filter);
    if log_format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    let database_url = std::env::var("DATABASE_URL")
        .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?;
    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let token_ttl_secs = std::env::var("TOKEN_TTL_SECS")
        .ok()
        .and_then(|v| v.parse::<i64>().ok())
        .unwrap_or(DEFAULT_TOKEN_TTL_SECS);

    let db = Database::connect(&database_url).await?;

    let planner = match GeminiBackend::from_env()? {
        Some(backend) => AssistPlanner::new(Some(Arc::new(backend))),
        None => AssistPlanner::rule_based(),
    };
    info!(
        subsystem = "api",
        assist_backend = planner.backend_name().unwrap_or("rule-based"),
        "Assist planner configured"
    );

    let state = AppState {
        db: Arc::new(db),
        planner,
        token_ttl_secs,
    };

    let app = router(state);

    let addr: SocketAddr = bind_addr.parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
