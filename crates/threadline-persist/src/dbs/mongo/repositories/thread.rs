#[cfg(feature = "mongodb")]
use mongodb::{bson::doc, bson::oid::ObjectId, bson::Document, Client, Collection, IndexModel};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;

#[cfg(feature = "mongodb")]
use crate::error::{PersistError, Result};
#[cfg(feature = "mongodb")]
use crate::models::ThreadDoc;
#[cfg(feature = "mongodb")]
use crate::pagination::PageRequest;

pub const THREADS_COLLECTION: &str = "threads";

/// Matches threads whose `parentId` is null or missing.
#[cfg(feature = "mongodb")]
pub fn top_level_filter() -> Document {
    doc! { "parentId": { "$in": [null] } }
}

/// Feed order: newest first, `_id` descending when timestamps collide.
/// BSON datetimes keep milliseconds only, so `createdAt` alone does not
/// give skip/limit a total order.
#[cfg(feature = "mongodb")]
pub fn feed_sort() -> Document {
    doc! { "createdAt": -1, "_id": -1 }
}

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<ThreadDoc>,
}

#[cfg(feature = "mongodb")]
impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection(THREADS_COLLECTION);
        Self { collection }
    }

    /// Insert a thread
    pub async fn insert(&self, thread: &ThreadDoc) -> Result<()> {
        self.collection.insert_one(thread).await?;
        Ok(())
    }

    /// Get thread by ID
    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<ThreadDoc>> {
        let filter = doc! { "_id": id };
        Ok(self.collection.find_one(filter).await?)
    }

    /// Get threads by ID (unordered)
    pub async fn find_many(&self, ids: &[ObjectId]) -> Result<Vec<ThreadDoc>> {
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let threads = self.collection
            .find(filter)
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    /// List top-level threads, newest first
    pub async fn find_top_level(&self, page: PageRequest) -> Result<Vec<ThreadDoc>> {
        let threads = self.collection
            .find(top_level_filter())
            .sort(feed_sort())
            .skip(page.skip())
            .limit(page.limit())
            .await?
            .try_collect()
            .await?;
        Ok(threads)
    }

    /// Count top-level threads
    pub async fn count_top_level(&self) -> Result<u64> {
        Ok(self.collection.count_documents(top_level_filter()).await?)
    }

    /// Append a reply id to `children` with `$push`
    pub async fn push_child(&self, parent: ObjectId, child: ObjectId) -> Result<()> {
        let filter = doc! { "_id": parent };
        let update = doc! { "$push": { "children": child } };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(PersistError::ThreadNotFound(parent.to_hex()));
        }
        Ok(())
    }

    /// Delete thread
    pub async fn delete(&self, id: ObjectId) -> Result<()> {
        let filter = doc! { "_id": id };
        self.collection.delete_one(filter).await?;
        Ok(())
    }

    /// Indexes backing the feed query and per-author lookups
    pub async fn ensure_indexes(&self) -> Result<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "parentId": 1, "createdAt": -1, "_id": -1 })
                .build(),
            IndexModel::builder()
                .keys(doc! { "author": 1 })
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;
        Ok(())
    }
}
