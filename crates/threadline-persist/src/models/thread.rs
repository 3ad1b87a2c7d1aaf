use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Thread document as stored in the `threads` collection.
///
/// Replies are threads too: a reply carries the id of the thread it answers
/// in `parent_id`, and the parent lists the reply in `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub text: String,
    pub author: ObjectId,
    pub community: Option<ObjectId>,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<ObjectId>,
    #[serde(default)]
    pub children: Vec<ObjectId>,
    #[serde(
        rename = "createdAt",
        with = "bson::serde_helpers::chrono_datetime_as_bson_datetime"
    )]
    pub created_at: DateTime<Utc>,
}

impl ThreadDoc {
    /// New top-level thread. Community linkage is not supported yet, so
    /// `community` is always null.
    pub fn new(text: impl Into<String>, author: ObjectId) -> Self {
        Self {
            id: ObjectId::new(),
            text: text.into(),
            author,
            community: None,
            parent_id: None,
            children: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// New reply to `parent`.
    pub fn reply(text: impl Into<String>, author: ObjectId, parent: ObjectId) -> Self {
        Self {
            parent_id: Some(parent),
            ..Self::new(text, author)
        }
    }

    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }
}
