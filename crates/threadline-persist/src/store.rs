use async_trait::async_trait;
use bson::oid::ObjectId;

use crate::error::Result;
use crate::models::{AuthorSelection, ThreadDoc, UserDoc};
use crate::pagination::PageRequest;

/// Storage operations the thread actions are built on.
///
/// Implementations provide database-specific access to the `threads` and
/// `users` collections.
#[async_trait]
pub trait ThreadStore: Send + Sync {
    /// Insert a new thread document
    async fn insert_thread(&self, thread: &ThreadDoc) -> Result<()>;

    /// Get a thread by ID
    async fn find_thread(&self, id: ObjectId) -> Result<Option<ThreadDoc>>;

    /// Get every thread whose id is in `ids`; missing ids are skipped
    async fn find_threads(&self, ids: &[ObjectId]) -> Result<Vec<ThreadDoc>>;

    /// One page of top-level threads, newest first
    async fn find_top_level(&self, page: PageRequest) -> Result<Vec<ThreadDoc>>;

    /// Count all top-level threads
    async fn count_top_level(&self) -> Result<u64>;

    /// Append `child` to the parent's `children`.
    ///
    /// Fails with `ThreadNotFound` when the parent does not exist.
    async fn push_child(&self, parent: ObjectId, child: ObjectId) -> Result<()>;

    /// Remove a thread document. Only used to undo a partial write.
    async fn delete_thread(&self, id: ObjectId) -> Result<()>;

    /// Append `thread` to the user's `threads`.
    ///
    /// Fails with `UserNotFound` when the user does not exist.
    async fn push_user_thread(&self, user: ObjectId, thread: ObjectId) -> Result<()>;

    /// Get users by id, loading at least the fields `selection` asks for
    async fn find_users(&self, ids: &[ObjectId], selection: AuthorSelection)
        -> Result<Vec<UserDoc>>;

    /// Check the store is reachable
    async fn ping(&self) -> Result<()>;
}
