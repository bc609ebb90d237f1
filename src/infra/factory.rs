use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, warn};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{AuditRepository, DispatchService, JobRepository};
use crate::infra::dispatch::{http_dispatch_service::HttpDispatchService, noop_dispatch_service::NoopDispatchService};
use crate::infra::repositories::{
    postgres_audit_repo::PostgresAuditRepo, postgres_job_repo::PostgresJobRepo,
    sqlite_audit_repo::SqliteAuditRepo, sqlite_job_repo::SqliteJobRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    config.workflow.validate().expect("Invalid workflow configuration");

    let dispatch_service: Arc<dyn DispatchService> = match &config.dispatch_url {
        Some(url) => {
            info!("Auto-dispatch enabled via {}", url);
            Arc::new(HttpDispatchService::new(url.clone(), config.dispatch_token.clone()))
        }
        None => {
            warn!("DISPATCH_SERVICE_URL not set, jobs will not be offered automatically");
            Arc::new(NoopDispatchService)
        }
    };

    let database_url = &config.database_url;
    let (job_repo, audit_repo): (Arc<dyn JobRepository>, Arc<dyn AuditRepository>) =
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            info!("Initializing PostgreSQL connection...");

            let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
            opts = opts.log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect_with(opts)
                .await
                .expect("Failed to connect to Postgres");

            run_postgres_migrations(&pool).await;

            (Arc::new(PostgresJobRepo::new(pool.clone())), Arc::new(PostgresAuditRepo::new(pool)))
        } else {
            info!("Initializing SQLite connection with WAL Mode...");

            let opts = SqliteConnectOptions::from_str(database_url)
                .expect("Invalid SQLite connection string")
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5))
                .log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(opts)
                .await
                .expect("Failed to connect to SQLite");

            run_sqlite_migrations(&pool).await;

            (Arc::new(SqliteJobRepo::new(pool.clone())), Arc::new(SqliteAuditRepo::new(pool)))
        };

    AppState::new(config.clone(), job_repo, audit_repo, dispatch_service)
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
