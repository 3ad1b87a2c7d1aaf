use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::models::{AuthorSelection, ThreadDoc, UserDoc};
use crate::pagination::PageRequest;
use crate::store::ThreadStore;

/// In-process store with the same query semantics as the MongoDB one.
///
/// Used by tests and by local runs without a database.
#[derive(Clone, Default)]
pub struct MemoryThreadStore {
    threads: Arc<RwLock<HashMap<ObjectId, ThreadDoc>>>,
    users: Arc<RwLock<HashMap<ObjectId, UserDoc>>>,
}

impl MemoryThreadStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a user
    pub async fn insert_user(&self, user: UserDoc) -> ObjectId {
        let id = user.id;
        self.users.write().await.insert(id, user);
        id
    }

    pub async fn get_user(&self, id: ObjectId) -> Option<UserDoc> {
        self.users.read().await.get(&id).cloned()
    }

    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }

    /// Every thread in the store, oldest first
    pub async fn all_threads(&self) -> Vec<ThreadDoc> {
        let mut threads: Vec<ThreadDoc> = self.threads.read().await.values().cloned().collect();
        threads.sort_by_key(|t| t.created_at);
        threads
    }
}

#[async_trait]
impl ThreadStore for MemoryThreadStore {
    async fn insert_thread(&self, thread: &ThreadDoc) -> Result<()> {
        let mut threads = self.threads.write().await;
        if threads.contains_key(&thread.id) {
            return Err(PersistError::Internal(format!(
                "duplicate thread id {}",
                thread.id
            )));
        }
        threads.insert(thread.id, thread.clone());
        Ok(())
    }

    async fn find_thread(&self, id: ObjectId) -> Result<Option<ThreadDoc>> {
        Ok(self.threads.read().await.get(&id).cloned())
    }

    async fn find_threads(&self, ids: &[ObjectId]) -> Result<Vec<ThreadDoc>> {
        let threads = self.threads.read().await;
        Ok(ids.iter().filter_map(|id| threads.get(id).cloned()).collect())
    }

    async fn find_top_level(&self, page: PageRequest) -> Result<Vec<ThreadDoc>> {
        let threads = self.threads.read().await;
        let mut top_level: Vec<&ThreadDoc> = threads.values().filter(|t| t.is_top_level()).collect();
        // Newest first, id as tie breaker so equal timestamps page stably
        top_level.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(top_level
            .into_iter()
            .skip(page.skip() as usize)
            .take(page.size() as usize)
            .cloned()
            .collect())
    }

    async fn count_top_level(&self) -> Result<u64> {
        let threads = self.threads.read().await;
        Ok(threads.values().filter(|t| t.is_top_level()).count() as u64)
    }

    async fn push_child(&self, parent: ObjectId, child: ObjectId) -> Result<()> {
        let mut threads = self.threads.write().await;
        let thread = threads
            .get_mut(&parent)
            .ok_or_else(|| PersistError::ThreadNotFound(parent.to_hex()))?;
        thread.children.push(child);
        Ok(())
    }

    async fn delete_thread(&self, id: ObjectId) -> Result<()> {
        self.threads.write().await.remove(&id);
        Ok(())
    }

    async fn push_user_thread(&self, user: ObjectId, thread: ObjectId) -> Result<()> {
        let mut users = self.users.write().await;
        let doc = users
            .get_mut(&user)
            .ok_or_else(|| PersistError::UserNotFound(user.to_hex()))?;
        doc.threads.push(thread);
        Ok(())
    }

    async fn find_users(
        &self,
        ids: &[ObjectId],
        _selection: AuthorSelection,
    ) -> Result<Vec<UserDoc>> {
        let users = self.users.read().await;
        Ok(ids.iter().filter_map(|id| users.get(id).cloned()).collect())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
