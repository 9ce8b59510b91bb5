//! Database service for listing-service.

use crate::models::{UpsertWatermark, User, Watermark};
use crate::services::metrics::DB_QUERY_DURATION;
use service_core::error::AppError;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, instrument};

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if needed) the SQLite database at `database_url`.
    #[instrument(skip(database_url), fields(service = "listing-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Opening SQLite database"
        );

        if let Some(parent) = sqlite_file_path(database_url).and_then(|p| p.parent().map(PathBuf::from))
        {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(&parent).await.map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!(
                        "Failed to create database directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| AppError::ConfigError(anyhow::anyhow!("Invalid DATABASE_URL: {}", e)))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .pragma("temp_store", "MEMORY")
            .pragma("cache_size", "-2000");

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect_with(options)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("SQLite connection pool established");

        Ok(Self { pool })
    }

    /// Close every pooled connection. Later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
        info!("SQLite connection pool closed");
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Watermark Operations
    // -------------------------------------------------------------------------

    /// Get the watermark of a user, if one was saved.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_watermark(&self, user_id: &str) -> Result<Option<Watermark>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_watermark"])
            .start_timer();

        let watermark = sqlx::query_as::<_, Watermark>(
            r#"
            SELECT user_id, file_path, sha256, placement, opacity, margin, updated_at
            FROM watermarks
            WHERE user_id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get watermark: {}", e)))?;

        timer.observe_duration();

        Ok(watermark)
    }

    /// Save a user's watermark, creating the user row on first save.
    ///
    /// Both statements run in one transaction. An existing user keeps its
    /// original username.
    #[instrument(skip(self, input), fields(user_id = %input.user_id))]
    pub async fn upsert_watermark(&self, input: &UpsertWatermark) -> Result<Watermark, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["upsert_watermark"])
            .start_timer();

        let now = chrono::Utc::now().timestamp_millis();
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let created = sqlx::query(
            r#"
            INSERT INTO users (id, username, created_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&input.user_id)
        .bind(&input.username)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to ensure user: {}", e)))?
        .rows_affected()
            > 0;

        let watermark = sqlx::query_as::<_, Watermark>(
            r#"
            INSERT INTO watermarks (user_id, file_path, sha256, placement, opacity, margin, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(user_id) DO UPDATE SET
                file_path = excluded.file_path,
                sha256 = excluded.sha256,
                placement = excluded.placement,
                opacity = excluded.opacity,
                margin = excluded.margin,
                updated_at = excluded.updated_at
            RETURNING user_id, file_path, sha256, placement, opacity, margin, updated_at
            "#,
        )
        .bind(&input.user_id)
        .bind(&input.file_path)
        .bind(&input.sha256)
        .bind(&input.placement)
        .bind(input.opacity)
        .bind(input.margin)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to save watermark: {}", e)))?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(user_created = created, placement = %watermark.placement, "Watermark saved");

        Ok(watermark)
    }

    /// Get a user by ID.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, created_at
            FROM users
            WHERE id = ?1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get user: {}", e)))?;

        timer.observe_duration();

        Ok(user)
    }
}

/// Extract the file path from a `sqlite:` URL. `None` for in-memory databases.
fn sqlite_file_path(database_url: &str) -> Option<PathBuf> {
    let rest = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = rest.split('?').next().unwrap_or_default();
    if path.is_empty() || path == ":memory:" {
        return None;
    }
    Some(PathBuf::from(path))
}
