use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// User document as stored in the `users` collection.
///
/// Every field besides `_id` defaults so that projected reads (see
/// [`AuthorSelection::Summary`]) still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserDoc {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Identifier issued by the auth provider.
    #[serde(rename = "id", default)]
    pub external_id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default)]
    pub onboarded: bool,
    #[serde(default)]
    pub threads: Vec<ObjectId>,
    #[serde(rename = "parentId", default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl UserDoc {
    pub fn new(username: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: ObjectId::new(),
            external_id: String::new(),
            username: username.into(),
            name: name.into(),
            image: None,
            bio: None,
            onboarded: false,
            threads: Vec::new(),
            parent_id: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// Which user fields a populated author carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorSelection {
    /// All display fields.
    Full,
    /// `_id`, `name`, `parentId` and `image` only.
    Summary,
}

impl AuthorSelection {
    pub const SUMMARY_FIELDS: [&'static str; 4] = ["_id", "name", "parentId", "image"];
}

/// Author data embedded into a populated thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onboarded: Option<bool>,
}

impl AuthorView {
    pub fn project(user: UserDoc, selection: AuthorSelection) -> Self {
        let mut view = Self {
            id: user.id.to_hex(),
            name: user.name,
            image: user.image,
            parent_id: user.parent_id,
            username: None,
            bio: None,
            onboarded: None,
        };
        if selection == AuthorSelection::Full {
            view.username = Some(user.username);
            view.bio = user.bio;
            view.onboarded = Some(user.onboarded);
        }
        view
    }
}
