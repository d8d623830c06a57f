use std::sync::Arc;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::OnceCell;
use tracing::info;

use super::{Preload, ProviderError};

/// Document store handle over redis. Documents are JSON values stored under
/// `billing:<collection>:<id>` keys. The connection is established lazily
/// and shared across clones.
#[derive(Clone, Default)]
pub struct DocumentStore {
    conn: Arc<OnceCell<ConnectionManager>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn manager(&self) -> Result<ConnectionManager, ProviderError> {
        let conn = self
            .conn
            .get_or_try_init(|| async {
                let url = std::env::var("REDIS_URL")
                    .map_err(|_| ProviderError::ConfigMissing("REDIS_URL"))?;

                let client = redis::Client::open(url.as_str())?;
                let manager = ConnectionManager::new(client).await?;

                info!("Connected document store");
                Ok::<ConnectionManager, ProviderError>(manager)
            })
            .await?;

        Ok(conn.clone())
    }

    fn key(collection: &str, id: &str) -> String {
        format!("billing:{}:{}", collection, id)
    }

    /// Store a document, replacing any previous version
    pub async fn put<T: Serialize + Sync>(
        &self,
        collection: &str,
        id: &str,
        value: &T,
    ) -> Result<(), ProviderError> {
        let mut conn = self.manager().await?;
        let serialized = serde_json::to_string(value)?;
        let _: () = conn.set(Self::key(collection, id), serialized).await?;
        Ok(())
    }

    /// Fetch a document, `None` if absent
    pub async fn get<T: DeserializeOwned>(
        &self,
        collection: &str,
        id: &str,
    ) -> Result<Option<T>, ProviderError> {
        let mut conn = self.manager().await?;
        let value: Option<String> = conn.get(Self::key(collection, id)).await?;

        match value {
            Some(v) => Ok(Some(serde_json::from_str(&v)?)),
            None => Ok(None),
        }
    }

    pub async fn ping(&self) -> Result<(), ProviderError> {
        let mut conn = self.manager().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

#[async_trait]
impl Preload for DocumentStore {
    fn name(&self) -> &'static str {
        "document"
    }

    async fn preload(&self) -> Result<(), ProviderError> {
        self.ping().await?;
        info!("{} store preload complete", self.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_namespaced_per_collection() {
        assert_eq!(
            DocumentStore::key("receipt", "abc-123"),
            "billing:receipt:abc-123"
        );
        assert_ne!(
            DocumentStore::key("receipt", "x"),
            DocumentStore::key("subscription", "x")
        );
    }
}
