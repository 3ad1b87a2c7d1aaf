use std::sync::Arc;

use crate::actions::ThreadActions;
use crate::error::{PersistError, Result};
use crate::revalidate::{NoopRevalidator, PathRevalidator};
use crate::store::ThreadStore;

pub struct ThreadActionsBuilder {
    mongodb_uri: Option<String>,
    database: Option<String>,
    app_name: Option<String>,
    pool_size: Option<u32>,
    timeout_ms: Option<u64>,
    store: Option<Arc<dyn ThreadStore>>,
    revalidator: Option<Arc<dyn PathRevalidator>>,
}

impl ThreadActionsBuilder {
    pub fn new() -> Self {
        Self {
            mongodb_uri: None,
            database: None,
            app_name: None,
            pool_size: None,
            timeout_ms: None,
            store: None,
            revalidator: None,
        }
    }

    pub fn mongodb_uri(mut self, uri: impl Into<String>) -> Self {
        self.mongodb_uri = Some(uri.into());
        self
    }

    pub fn database(mut self, db: impl Into<String>) -> Self {
        self.database = Some(db.into());
        self
    }

    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = Some(name.into());
        self
    }

    pub fn pool_size(mut self, size: u32) -> Self {
        self.pool_size = Some(size);
        self
    }

    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    /// Use an existing store instead of opening a MongoDB connection
    pub fn store(mut self, store: Arc<dyn ThreadStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn revalidator(mut self, revalidator: Arc<dyn PathRevalidator>) -> Self {
        self.revalidator = Some(revalidator);
        self
    }

    /// Build the actions. The MongoDB connection, if any, is opened lazily
    /// on the first operation.
    pub fn build(self) -> Result<ThreadActions> {
        let store = match &self.store {
            Some(store) => Arc::clone(store),
            None => self.mongo_store()?,
        };
        let revalidator = self
            .revalidator
            .unwrap_or_else(|| Arc::new(NoopRevalidator));

        Ok(ThreadActions::new(store, revalidator))
    }

    #[cfg(feature = "mongodb")]
    fn mongo_store(&self) -> Result<Arc<dyn ThreadStore>> {
        use crate::dbs::{MongoOptions, MongoThreadStore};

        let mongodb_uri = self.mongodb_uri.as_deref()
            .ok_or_else(|| PersistError::Internal("mongodb_uri is required".to_string()))?;
        let database = self.database.as_deref()
            .ok_or_else(|| PersistError::Internal("database is required".to_string()))?;

        let options = MongoOptions {
            app_name: self.app_name.clone(),
            pool_size: self.pool_size,
            timeout_ms: self.timeout_ms,
        };
        Ok(Arc::new(MongoThreadStore::new(mongodb_uri, database, options)))
    }

    #[cfg(not(feature = "mongodb"))]
    fn mongo_store(&self) -> Result<Arc<dyn ThreadStore>> {
        Err(PersistError::Internal(
            "a store is required when built without the mongodb feature".to_string(),
        ))
    }
}

impl Default for ThreadActionsBuilder {
    fn default() -> Self {
        Self::new()
    }
}
