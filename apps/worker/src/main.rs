//! Assent reconciliation worker.
//!
//! Periodically flips overdue `pending` authorization requests to `expired`
//! and prunes stale rate-limit windows. Pure hygiene: every read path applies
//! the lazy expiry predicate itself, so nothing depends on this sweeper
//! running.

#![forbid(unsafe_code)]

use std::env;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use assent_application::{AuthorizationRequestRepository, RateLimitService};
use assent_core::AppError;
use assent_infrastructure::{
    PostgresAuthorizationRequestRepository, PostgresRateLimitRepository,
};

/// How often stale rate-limit windows are pruned.
const RATE_LIMIT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Clone)]
struct WorkerConfig {
    database_url: String,
    sweep_interval_ms: u64,
}

impl WorkerConfig {
    fn load() -> Result<Self, AppError> {
        let database_url = env::var("DATABASE_URL")
            .map_err(|_| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let sweep_interval_ms = env::var("SWEEP_INTERVAL_MS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .unwrap_or(60_000);

        Ok(Self {
            database_url,
            sweep_interval_ms,
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = WorkerConfig::load()?;
    let pool = connect_pool(config.database_url.as_str()).await?;

    let repository = PostgresAuthorizationRequestRepository::new(pool.clone());
    let rate_limit_service = RateLimitService::new(Arc::new(PostgresRateLimitRepository::new(pool)));

    info!(
        sweep_interval_ms = config.sweep_interval_ms,
        "assent-worker started"
    );

    let mut last_cleanup = Instant::now();

    loop {
        match repository.expire_overdue(Utc::now()).await {
            Ok(0) => {}
            Ok(count) => info!(count, "expired overdue authorization requests"),
            Err(error) => warn!(
                error = %error,
                "failed to expire overdue authorization requests"
            ),
        }

        if last_cleanup.elapsed() >= RATE_LIMIT_CLEANUP_INTERVAL {
            match rate_limit_service.cleanup().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "pruned stale rate limit windows"),
                Err(error) => warn!(error = %error, "failed to prune rate limit windows"),
            }
            last_cleanup = Instant::now();
        }

        tokio::time::sleep(Duration::from_millis(config.sweep_interval_ms)).await;
    }
}

async fn connect_pool(database_url: &str) -> Result<PgPool, AppError> {
    PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(|error| AppError::Unavailable(format!("failed to connect to database: {error}")))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
