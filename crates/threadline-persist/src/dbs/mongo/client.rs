#[cfg(feature = "mongodb")]
use mongodb::bson::oid::ObjectId;
#[cfg(feature = "mongodb")]
use async_trait::async_trait;

#[cfg(feature = "mongodb")]
use crate::dbs::mongo::connection::{MongoConnection, MongoOptions};
#[cfg(feature = "mongodb")]
use crate::dbs::mongo::repositories::{MongoThreadRepository, MongoUserRepository};
#[cfg(feature = "mongodb")]
use crate::error::Result;
#[cfg(feature = "mongodb")]
use crate::models::{AuthorSelection, ThreadDoc, UserDoc};
#[cfg(feature = "mongodb")]
use crate::pagination::PageRequest;
#[cfg(feature = "mongodb")]
use crate::store::ThreadStore;

#[cfg(feature = "mongodb")]
pub struct MongoThreadStore {
    connection: MongoConnection,
}

#[cfg(feature = "mongodb")]
impl MongoThreadStore {
    /// Create a store; the connection is opened on first use
    pub fn new(mongodb_uri: &str, database: &str, options: MongoOptions) -> Self {
        Self {
            connection: MongoConnection::new(mongodb_uri, database, options),
        }
    }

    /// Create a store and connect right away
    pub async fn connect(mongodb_uri: &str, database: &str, options: MongoOptions) -> Result<Self> {
        let store = Self::new(mongodb_uri, database, options);
        store.connection.client().await?;
        Ok(store)
    }

    pub fn connection(&self) -> &MongoConnection {
        &self.connection
    }

    async fn threads(&self) -> Result<MongoThreadRepository> {
        let client = self.connection.client().await?;
        Ok(MongoThreadRepository::new(client, self.connection.database()))
    }

    async fn users(&self) -> Result<MongoUserRepository> {
        let client = self.connection.client().await?;
        Ok(MongoUserRepository::new(client, self.connection.database()))
    }

    /// Create the indexes the thread queries rely on
    pub async fn ensure_indexes(&self) -> Result<()> {
        self.threads().await?.ensure_indexes().await
    }
}

#[cfg(feature = "mongodb")]
#[async_trait]
impl ThreadStore for MongoThreadStore {
    async fn insert_thread(&self, thread: &ThreadDoc) -> Result<()> {
        self.threads().await?.insert(thread).await
    }

    async fn find_thread(&self, id: ObjectId) -> Result<Option<ThreadDoc>> {
        self.threads().await?.find_by_id(id).await
    }

    async fn find_threads(&self, ids: &[ObjectId]) -> Result<Vec<ThreadDoc>> {
        self.threads().await?.find_many(ids).await
    }

    async fn find_top_level(&self, page: PageRequest) -> Result<Vec<ThreadDoc>> {
        self.threads().await?.find_top_level(page).await
    }

    async fn count_top_level(&self) -> Result<u64> {
        self.threads().await?.count_top_level().await
    }

    async fn push_child(&self, parent: ObjectId, child: ObjectId) -> Result<()> {
        self.threads().await?.push_child(parent, child).await
    }

    async fn delete_thread(&self, id: ObjectId) -> Result<()> {
        self.threads().await?.delete(id).await
    }

    async fn push_user_thread(&self, user: ObjectId, thread: ObjectId) -> Result<()> {
        self.users().await?.push_thread(user, thread).await
    }

    async fn find_users(
        &self,
        ids: &[ObjectId],
        selection: AuthorSelection,
    ) -> Result<Vec<UserDoc>> {
        self.users().await?.find_many(ids, selection).await
    }

    async fn ping(&self) -> Result<()> {
        self.connection.ping().await
    }
}
