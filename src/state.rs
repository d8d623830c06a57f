use std::sync::Arc;

use crate::config::AppConfig;
use crate::crypto::BodyCipher;
use crate::provider::{DocumentStore, RelationalStore};
use crate::routes::RouteTable;

/// Process-wide dispatch state: the classified route lists, the response
/// cipher and the two persistence provider handles. Built once at startup;
/// cloning is cheap and every request sees the same underlying data.
#[derive(Clone)]
pub struct AppState {
    pub doc_store: DocumentStore,
    pub rel_store: RelationalStore,
    pub routes: Arc<RouteTable>,
    pub cipher: Arc<BodyCipher>,
}

impl AppState {
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let cipher = BodyCipher::from_base64(&config.security.response_key)
            .map_err(|e| anyhow::anyhow!("Invalid response encryption key: {}", e))?;

        let routes = RouteTable::classify()?;

        Ok(Self {
            doc_store: DocumentStore::new(),
            rel_store: RelationalStore::new(),
            routes: Arc::new(routes),
            cipher: Arc::new(cipher),
        })
    }
}
