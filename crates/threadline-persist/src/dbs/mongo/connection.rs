#[cfg(feature = "mongodb")]
use std::time::Duration;

#[cfg(feature = "mongodb")]
use mongodb::{bson::doc, options::ClientOptions, Client};
#[cfg(feature = "mongodb")]
use tokio::sync::OnceCell;

#[cfg(feature = "mongodb")]
use crate::error::{PersistError, Result};

/// Driver tuning applied when the connection is first established.
#[derive(Debug, Clone, Default)]
pub struct MongoOptions {
    pub app_name: Option<String>,
    pub pool_size: Option<u32>,
    pub timeout_ms: Option<u64>,
}

/// Lazily established, shared MongoDB connection.
///
/// The first call to [`client`](Self::client) connects; every later call
/// returns the same client, so it is safe to call at the top of each
/// operation.
#[cfg(feature = "mongodb")]
pub struct MongoConnection {
    uri: String,
    database: String,
    options: MongoOptions,
    client: OnceCell<Client>,
}

#[cfg(feature = "mongodb")]
impl MongoConnection {
    pub fn new(uri: impl Into<String>, database: impl Into<String>, options: MongoOptions) -> Self {
        Self {
            uri: uri.into(),
            database: database.into(),
            options,
            client: OnceCell::new(),
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    pub async fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Client> {
        let mut client_options = ClientOptions::parse(&self.uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        if let Some(app_name) = &self.options.app_name {
            client_options.app_name = Some(app_name.clone());
        }
        if let Some(pool_size) = self.options.pool_size {
            client_options.max_pool_size = Some(pool_size);
        }
        if let Some(timeout_ms) = self.options.timeout_ms {
            let timeout = Duration::from_millis(timeout_ms);
            client_options.server_selection_timeout = Some(timeout);
            client_options.connect_timeout = Some(timeout);
        }

        let client = Client::with_options(client_options)
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        tracing::info!(database = %self.database, "MongoDB client initialized");
        Ok(client)
    }

    /// Round trip to the server
    pub async fn ping(&self) -> Result<()> {
        let client = self.client().await?;
        client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;
        Ok(())
    }
}
