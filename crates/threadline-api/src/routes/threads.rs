use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::{StatusCode, Uri},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use threadline_persist::{CreateThreadParams, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};

use crate::{
    cache::page_key,
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Path revalidated when a write request does not name one.
pub const DEFAULT_REVALIDATE_PATH: &str = "/threads";

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateThreadRequest {
    pub text: String,
    pub author: String,
    #[serde(default)]
    pub community_id: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddCommentRequest {
    pub text: String,
    pub user_id: String,
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListPostsQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

fn default_page() -> i64 {
    DEFAULT_PAGE_NUMBER
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Create a top-level thread
pub async fn create_thread(
    State(state): State<Arc<AppState>>,
    req: Result<Json<CreateThreadRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(req) = req?;
    state
        .actions
        .create_thread(CreateThreadParams {
            text: req.text,
            author: req.author,
            community_id: req.community_id,
            path: req.path.unwrap_or_else(|| DEFAULT_REVALIDATE_PATH.to_string()),
        })
        .await?;

    Ok(StatusCode::CREATED)
}

/// List top-level threads, newest first
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    let Query(query) = query?;
    let key = page_key(uri.path(), query.page, query.page_size);
    if let Some(cached) = state.cache.get(&key).await {
        return Ok(Json(cached));
    }

    let generation = state.cache.generation();
    let page = state.actions.fetch_posts(query.page, query.page_size).await?;
    let body = serde_json::to_value(&page)
        .map_err(|e| ApiError::Internal(format!("Unserializable page: {}", e)))?;

    state.cache.put(key, body.clone(), generation).await;
    Ok(Json(body))
}

/// Get a thread with its replies
pub async fn get_thread(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    uri: Uri,
) -> ApiResult<Json<Value>> {
    let key = uri.path().to_string();
    if let Some(cached) = state.cache.get(&key).await {
        return Ok(Json(cached));
    }

    let generation = state.cache.generation();
    let thread = state
        .actions
        .fetch_thread_by_id(&thread_id)
        .await?
        .ok_or_else(|| ApiError::ThreadNotFound(thread_id))?;
    let body = serde_json::to_value(&thread)
        .map_err(|e| ApiError::Internal(format!("Unserializable thread: {}", e)))?;

    state.cache.put(key, body.clone(), generation).await;
    Ok(Json(body))
}

/// Reply to a thread
pub async fn add_comment(
    State(state): State<Arc<AppState>>,
    Path(thread_id): Path<String>,
    req: Result<Json<AddCommentRequest>, JsonRejection>,
) -> ApiResult<StatusCode> {
    let Json(req) = req?;
    let path = req.path.unwrap_or_else(|| DEFAULT_REVALIDATE_PATH.to_string());
    state
        .actions
        .add_comment_to_thread(&thread_id, &req.text, &req.user_id, &path)
        .await?;

    Ok(StatusCode::CREATED)
}
