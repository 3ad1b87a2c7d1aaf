#[cfg(feature = "mongodb")]
use mongodb::{bson::doc, bson::oid::ObjectId, bson::Document, Client, Collection};
#[cfg(feature = "mongodb")]
use futures::TryStreamExt;

#[cfg(feature = "mongodb")]
use crate::error::{PersistError, Result};
#[cfg(feature = "mongodb")]
use crate::models::{AuthorSelection, UserDoc};

pub const USERS_COLLECTION: &str = "users";

#[cfg(feature = "mongodb")]
#[derive(Clone)]
pub struct MongoUserRepository {
    collection: Collection<UserDoc>,
}

#[cfg(feature = "mongodb")]
impl MongoUserRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection(USERS_COLLECTION);
        Self { collection }
    }

    /// Append a thread id to the user's `threads`
    pub async fn push_thread(&self, user: ObjectId, thread: ObjectId) -> Result<()> {
        let filter = doc! { "_id": user };
        let update = doc! { "$push": { "threads": thread } };

        let result = self.collection.update_one(filter, update).await?;
        if result.matched_count == 0 {
            return Err(PersistError::UserNotFound(user.to_hex()));
        }
        Ok(())
    }

    /// Get users by ID, projected down to what `selection` needs
    pub async fn find_many(
        &self,
        ids: &[ObjectId],
        selection: AuthorSelection,
    ) -> Result<Vec<UserDoc>> {
        let filter = doc! { "_id": { "$in": ids.to_vec() } };
        let mut find = self.collection.find(filter);
        if let Some(projection) = projection(selection) {
            find = find.projection(projection);
        }

        let users = find
            .await?
            .try_collect()
            .await?;
        Ok(users)
    }
}

#[cfg(feature = "mongodb")]
fn projection(selection: AuthorSelection) -> Option<Document> {
    match selection {
        AuthorSelection::Full => None,
        AuthorSelection::Summary => {
            let mut projection = Document::new();
            for field in AuthorSelection::SUMMARY_FIELDS {
                projection.insert(field, 1);
            }
            Some(projection)
        }
    }
}

#[cfg(all(test, feature = "mongodb"))]
mod tests {
    use super::*;

    #[test]
    fn test_summary_projection() {
        let summary = projection(AuthorSelection::Summary).unwrap();
        assert_eq!(summary.len(), 4);
        assert_eq!(summary.get_i32("name").unwrap(), 1);
        assert!(summary.contains_key("parentId"));
        assert!(projection(AuthorSelection::Full).is_none());
    }
}
