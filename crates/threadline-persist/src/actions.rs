use std::sync::Arc;

use bson::oid::ObjectId;

use crate::error::{Action, ActionError, ActionResult, PersistError, Result};
use crate::models::{ThreadDoc, ThreadView};
use crate::pagination::{PageRequest, PostsPage};
use crate::populate::{populate, PopulateSpec};
use crate::revalidate::PathRevalidator;
use crate::store::ThreadStore;

/// Arguments for [`ThreadActions::create_thread`].
#[derive(Debug, Clone)]
pub struct CreateThreadParams {
    pub text: String,
    pub author: String,
    /// Accepted for forward compatibility; threads are never linked to a
    /// community yet.
    pub community_id: Option<String>,
    pub path: String,
}

/// The thread data access layer.
///
/// Writes that span two documents (thread + user, reply + parent) are not
/// atomic. When the second write fails, the first one is undone with a
/// compensating delete before the error is returned. Appends go through
/// `$push`, so concurrent replies to one parent cannot overwrite each other.
#[derive(Clone)]
pub struct ThreadActions {
    store: Arc<dyn ThreadStore>,
    revalidator: Arc<dyn PathRevalidator>,
}

impl ThreadActions {
    pub fn new(store: Arc<dyn ThreadStore>, revalidator: Arc<dyn PathRevalidator>) -> Self {
        Self { store, revalidator }
    }

    pub fn store(&self) -> &Arc<dyn ThreadStore> {
        &self.store
    }

    /// Create a top-level thread and record it on its author.
    pub async fn create_thread(&self, params: CreateThreadParams) -> ActionResult<()> {
        self.try_create_thread(params)
            .await
            .map_err(|e| ActionError::new(Action::CreateThread, e))
    }

    async fn try_create_thread(&self, params: CreateThreadParams) -> Result<()> {
        let author = parse_object_id(&params.author)?;
        if let Some(community_id) = &params.community_id {
            tracing::debug!(community_id = %community_id, "Ignoring community for new thread");
        }

        let thread = ThreadDoc::new(params.text, author);
        self.store.insert_thread(&thread).await?;

        if let Err(e) = self.store.push_user_thread(author, thread.id).await {
            self.undo_insert(thread.id, &e).await;
            return Err(e);
        }

        tracing::info!(
            thread_id = %thread.id,
            author = %author,
            path = %params.path,
            "Thread created"
        );
        self.revalidator.revalidate_path(&params.path).await;
        Ok(())
    }

    /// One page of top-level threads, newest first.
    ///
    /// Unlike the other actions, errors come back unwrapped.
    pub async fn fetch_posts(&self, page_number: i64, page_size: i64) -> Result<PostsPage> {
        let page = PageRequest::new(page_number, page_size)?;

        let total = self.store.count_top_level().await?;
        let docs = self.store.find_top_level(page).await?;
        let posts = populate(self.store.as_ref(), docs, &PopulateSpec::post_list()).await?;

        tracing::debug!(
            page = page.number(),
            page_size = page.size(),
            returned = posts.len(),
            total,
            "Fetched posts"
        );
        Ok(PostsPage::new(posts, page, total))
    }

    /// A thread with two levels of replies resolved, or `None` if no thread
    /// has this id.
    pub async fn fetch_thread_by_id(&self, id: &str) -> ActionResult<Option<ThreadView>> {
        self.try_fetch_thread_by_id(id)
            .await
            .map_err(|e| ActionError::new(Action::FetchThreadById, e))
    }

    async fn try_fetch_thread_by_id(&self, id: &str) -> Result<Option<ThreadView>> {
        let id = parse_object_id(id)?;

        let Some(doc) = self.store.find_thread(id).await? else {
            tracing::debug!(thread_id = %id, "Thread not found");
            return Ok(None);
        };

        let mut views =
            populate(self.store.as_ref(), vec![doc], &PopulateSpec::thread_detail()).await?;
        Ok(views.pop())
    }

    /// Reply to an existing thread.
    pub async fn add_comment_to_thread(
        &self,
        thread_id: &str,
        comment_text: &str,
        user_id: &str,
        path: &str,
    ) -> ActionResult<()> {
        self.try_add_comment(thread_id, comment_text, user_id, path)
            .await
            .map_err(|e| ActionError::new(Action::AddComment, e))
    }

    async fn try_add_comment(
        &self,
        thread_id: &str,
        comment_text: &str,
        user_id: &str,
        path: &str,
    ) -> Result<()> {
        let parent_id = parse_object_id(thread_id)?;
        let author = parse_object_id(user_id)?;

        let parent = self
            .store
            .find_thread(parent_id)
            .await?
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;

        let comment = ThreadDoc::reply(comment_text, author, parent.id);
        self.store.insert_thread(&comment).await?;

        if let Err(e) = self.store.push_child(parent.id, comment.id).await {
            self.undo_insert(comment.id, &e).await;
            return Err(e);
        }

        tracing::info!(
            thread_id = %parent.id,
            comment_id = %comment.id,
            author = %author,
            path = %path,
            "Comment added"
        );
        self.revalidator.revalidate_path(path).await;
        Ok(())
    }

    /// Compensate for a write whose dependent update failed.
    async fn undo_insert(&self, id: ObjectId, cause: &PersistError) {
        tracing::warn!(thread_id = %id, error = %cause, "Dependent write failed, removing inserted thread");
        if let Err(e) = self.store.delete_thread(id).await {
            tracing::error!(thread_id = %id, error = %e, "Failed to remove orphaned thread");
        }
    }
}

fn parse_object_id(id: &str) -> Result<ObjectId> {
    ObjectId::parse_str(id).map_err(|e| PersistError::InvalidObjectId(format!("{}: {}", id, e)))
}
