use std::sync::Arc;

use crate::config::ServerConfig;
use crate::service::RankingService;
use crate::store::{RankingStore, StoreError};

#[derive(Clone)]
pub struct AppState {
    pub ranking: Arc<RankingService>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    /// Open the configured store and wire the service around it.
    pub fn new(config: ServerConfig) -> Result<Self, StoreError> {
        let store = RankingStore::open(&config.store)?;
        Ok(Self::with_store(config, store))
    }

    pub fn with_store(config: ServerConfig, store: RankingStore) -> Self {
        let ranking = RankingService::new(store, config.reset_password.clone());
        Self {
            ranking: Arc::new(ranking),
            config: Arc::new(config),
        }
    }
}
