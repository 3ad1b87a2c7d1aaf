use std::collections::HashMap;

use bson::oid::ObjectId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AuthorView, ThreadDoc};

/// A stored reference that may or may not have been resolved.
///
/// Serializes untagged: an unresolved reference is the hex id string, a
/// resolved one is the target's own representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reference<T> {
    Resolved(T),
    Id(String),
}

impl<T> Reference<T> {
    pub fn resolved(&self) -> Option<&T> {
        match self {
            Reference::Resolved(value) => Some(value),
            Reference::Id(_) => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Reference::Resolved(_))
    }
}

/// Database-agnostic thread returned to callers, with references resolved
/// according to a [`PopulateSpec`](crate::PopulateSpec).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreadView {
    pub id: String,
    pub text: String,
    pub author: Reference<AuthorView>,
    pub community: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub children: Vec<Reference<ThreadView>>,
    pub created_at: DateTime<Utc>,
}

impl ThreadView {
    /// Builds a view from a stored document, looking references up in the
    /// already-resolved maps.
    ///
    /// `resolve_children` tells whether the children level was populated at
    /// all. When it was, children missing from `children` are dangling and
    /// get dropped; when it was not, every child stays an id reference.
    pub(crate) fn assemble(
        doc: ThreadDoc,
        authors: &HashMap<ObjectId, AuthorView>,
        children: &HashMap<ObjectId, ThreadView>,
        resolve_children: bool,
    ) -> Self {
        let author = match authors.get(&doc.author) {
            Some(view) => Reference::Resolved(view.clone()),
            None => Reference::Id(doc.author.to_hex()),
        };

        let children = if resolve_children {
            doc.children
                .iter()
                .filter_map(|id| children.get(id).cloned().map(Reference::Resolved))
                .collect()
        } else {
            doc.children.iter().map(|id| Reference::Id(id.to_hex())).collect()
        };

        Self {
            id: doc.id.to_hex(),
            text: doc.text,
            author,
            community: doc.community.map(|c| c.to_hex()),
            parent_id: doc.parent_id.map(|p| p.to_hex()),
            children,
            created_at: doc.created_at,
        }
    }

    /// Resolved direct children, skipping unresolved ones.
    pub fn resolved_children(&self) -> impl Iterator<Item = &ThreadView> {
        self.children.iter().filter_map(Reference::resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_serializes_untagged() {
        let unresolved: Reference<AuthorView> = Reference::Id("abc".to_string());
        assert_eq!(serde_json::to_value(&unresolved).unwrap(), serde_json::json!("abc"));

        let resolved = Reference::Resolved(AuthorView {
            id: "abc".to_string(),
            name: "Ada".to_string(),
            image: None,
            parent_id: None,
            username: None,
            bio: None,
            onboarded: None,
        });
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["name"], "Ada");
    }

    #[test]
    fn test_assemble_without_children_level_keeps_ids() {
        let mut doc = ThreadDoc::new("root", ObjectId::new());
        let child = ObjectId::new();
        doc.children.push(child);

        let view = ThreadView::assemble(doc, &HashMap::new(), &HashMap::new(), false);

        assert_eq!(view.children, vec![Reference::Id(child.to_hex())]);
        assert!(!view.author.is_resolved());
    }

    #[test]
    fn test_assemble_drops_dangling_children() {
        let mut doc = ThreadDoc::new("root", ObjectId::new());
        doc.children.push(ObjectId::new());

        let view = ThreadView::assemble(doc, &HashMap::new(), &HashMap::new(), true);

        assert!(view.children.is_empty());
    }
}
