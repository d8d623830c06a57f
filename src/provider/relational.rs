use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use tokio::sync::OnceCell;
use tracing::info;

use super::{Preload, ProviderError};
use crate::config;

/// Relational store handle backed by a lazily created postgres pool.
/// Cloning shares the underlying pool; the handle lives for the whole
/// process while requests borrow it through their context.
#[derive(Clone, Default)]
pub struct RelationalStore {
    pool: Arc<OnceCell<PgPool>>,
}

impl RelationalStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn connection_string() -> Result<String, ProviderError> {
        let raw = std::env::var("DATABASE_URL")
            .map_err(|_| ProviderError::ConfigMissing("DATABASE_URL"))?;
        let parsed = url::Url::parse(&raw).map_err(|_| ProviderError::InvalidDatabaseUrl)?;
        Ok(String::from(parsed))
    }

    /// Get the shared pool, connecting on first use
    pub async fn pool(&self) -> Result<PgPool, ProviderError> {
        let pool = self
            .pool
            .get_or_try_init(|| async {
                let settings = &config::config().database;
                let connection_string = Self::connection_string()?;

                let pool = PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .acquire_timeout(Duration::from_secs(settings.connection_timeout))
                    .connect(&connection_string)
                    .await?;

                info!("Connected relational store pool");
                Ok::<PgPool, ProviderError>(pool)
            })
            .await?;

        Ok(pool.clone())
    }

    /// Pings the pool to ensure connectivity
    pub async fn ping(&self) -> Result<(), ProviderError> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    /// Tenant lookup used while building the request context for admin routes
    pub async fn verify_tenant_active(&self, tenant: &str) -> Result<(), ProviderError> {
        let pool = self.pool().await?;

        let row = sqlx::query(
            "SELECT is_active FROM tenants WHERE name = $1 AND deleted_at IS NULL",
        )
        .bind(tenant)
        .fetch_optional(&pool)
        .await?;

        match row {
            Some(row) => {
                let is_active: bool = row.try_get("is_active")?;
                if is_active {
                    Ok(())
                } else {
                    Err(ProviderError::TenantInactive(tenant.to_string()))
                }
            }
            None => Err(ProviderError::TenantInactive(tenant.to_string())),
        }
    }
}

#[async_trait]
impl Preload for RelationalStore {
    fn name(&self) -> &'static str {
        "relational"
    }

    async fn preload(&self) -> Result<(), ProviderError> {
        self.ping().await?;
        info!("{} store preload complete", self.name());
        Ok(())
    }
}
