use std::str::FromStr;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bid_core::db::repository::{decode_snapshot, encode_snapshot};
use bid_core::{CompanyData, CompanyRepository, RepositoryError, db::SNAPSHOT_KEY};
use chrono::SecondsFormat;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use tracing::{debug, info};

pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    /// Opens `database_url`, which may be a bare file path, a `sqlite:` URL
    /// or `:memory:`. Missing database files are created.
    pub async fn new(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("Invalid database location: {}", database_url))?
            .create_if_missing(true);

        // An in-memory database lives as long as its one connection.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .with_context(|| format!("Failed to connect to database: {}", database_url))?;
        Ok(Self { pool })
    }

    /// [`new`](Self::new) followed by [`run_migrations`](Self::run_migrations):
    /// a store ready for the company snapshot.
    pub async fn open(location: &str) -> Result<Self> {
        let repo = Self::new(location).await?;
        repo.run_migrations().await?;
        info!(%location, "sqlite store ready");
        Ok(repo)
    }

    pub async fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn db_error(err: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(err.to_string())
}

#[async_trait]
impl CompanyRepository for SqliteRepository {
    async fn load(&self) -> Result<Option<CompanyData>, RepositoryError> {
        let row = sqlx::query("SELECT payload FROM snapshots WHERE key = ?")
            .bind(SNAPSHOT_KEY)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        match row {
            Some(row) => {
                let payload: String = row.try_get("payload").map_err(db_error)?;
                decode_snapshot(&payload).map(Some)
            }
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        data: &CompanyData,
    ) -> Result<(), RepositoryError> {
        let payload = encode_snapshot(data)?;
        let updated_at = data
            .last_updated
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        sqlx::query(
            "INSERT INTO snapshots (key, payload, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
        )
        .bind(SNAPSHOT_KEY)
        .bind(&payload)
        .bind(&updated_at)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        debug!(bytes = payload.len(), %updated_at, "snapshot written");
        Ok(())
    }

    async fn clear(&self) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM snapshots WHERE key = ?")
            .bind(SNAPSHOT_KEY)
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
