pub mod document;
pub mod relational;

pub use document::DocumentStore;
pub use relational::RelationalStore;

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the persistence providers
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Tenant '{0}' is not active or does not exist")]
    TenantInactive(String),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),

    #[error(transparent)]
    Redis(#[from] redis::RedisError),

    #[error("Document encoding error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Async warmup capability shared by both providers. Preloading is optional:
/// a provider that was never preloaded still connects lazily on first use.
#[async_trait]
pub trait Preload {
    fn name(&self) -> &'static str;

    async fn preload(&self) -> Result<(), ProviderError>;
}

/// Warm both providers. Spawned fire-and-forget at startup; requests never
/// block on this.
pub async fn preload_all(
    doc_store: &DocumentStore,
    rel_store: &RelationalStore,
) -> Result<(), ProviderError> {
    futures::future::try_join(doc_store.preload(), rel_store.preload()).await?;
    Ok(())
}
