//! Reference resolution for thread documents.
//!
//! A [`PopulateSpec`] says which references of a thread get expanded: the
//! author (with a field selection) and, recursively, the children. Each
//! level costs one `find_users` and one `find_threads` round trip no matter
//! how many documents it covers. Specs are bounded by [`MAX_POPULATE_DEPTH`].

use std::collections::{HashMap, HashSet};

use bson::oid::ObjectId;
use futures::future::{BoxFuture, FutureExt};

use crate::error::{PersistError, Result};
use crate::models::{AuthorSelection, AuthorView, ThreadDoc, ThreadView};
use crate::store::ThreadStore;

/// Deepest chain of `children` levels a spec may expand.
pub const MAX_POPULATE_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PopulateSpec {
    pub author: Option<AuthorSelection>,
    pub children: Option<Box<PopulateSpec>>,
}

impl PopulateSpec {
    /// Resolve nothing
    pub fn none() -> Self {
        Self::default()
    }

    pub fn author(selection: AuthorSelection) -> Self {
        Self {
            author: Some(selection),
            children: None,
        }
    }

    pub fn with_children(mut self, children: PopulateSpec) -> Self {
        self.children = Some(Box::new(children));
        self
    }

    /// Number of `children` levels this spec expands.
    pub fn depth(&self) -> usize {
        match &self.children {
            Some(children) => 1 + children.depth(),
            None => 0,
        }
    }

    /// Feed listing: full author, children with summary authors.
    pub fn post_list() -> Self {
        Self::author(AuthorSelection::Full)
            .with_children(Self::author(AuthorSelection::Summary))
    }

    /// Thread page: summary authors on the thread, its replies and their
    /// replies. Anything deeper stays unresolved.
    pub fn thread_detail() -> Self {
        Self::author(AuthorSelection::Summary).with_children(
            Self::author(AuthorSelection::Summary)
                .with_children(Self::author(AuthorSelection::Summary)),
        )
    }

    pub fn validate(&self) -> Result<()> {
        let depth = self.depth();
        if depth > MAX_POPULATE_DEPTH {
            return Err(PersistError::PopulateTooDeep {
                depth,
                max: MAX_POPULATE_DEPTH,
            });
        }
        Ok(())
    }
}

/// Resolve references on `docs` as described by `spec`, keeping order.
pub async fn populate(
    store: &dyn ThreadStore,
    docs: Vec<ThreadDoc>,
    spec: &PopulateSpec,
) -> Result<Vec<ThreadView>> {
    spec.validate()?;
    populate_level(store, docs, spec).await
}

fn populate_level<'a>(
    store: &'a dyn ThreadStore,
    docs: Vec<ThreadDoc>,
    spec: &'a PopulateSpec,
) -> BoxFuture<'a, Result<Vec<ThreadView>>> {
    async move {
        if docs.is_empty() {
            return Ok(Vec::new());
        }

        let authors: HashMap<ObjectId, AuthorView> = match spec.author {
            Some(selection) => {
                let ids = unique(docs.iter().map(|d| d.author));
                store
                    .find_users(&ids, selection)
                    .await?
                    .into_iter()
                    .map(|user| (user.id, AuthorView::project(user, selection)))
                    .collect()
            }
            None => HashMap::new(),
        };

        let children: HashMap<ObjectId, ThreadView> = match spec.children.as_deref() {
            Some(child_spec) => {
                let ids = unique(docs.iter().flat_map(|d| d.children.iter().copied()));
                let child_docs = if ids.is_empty() {
                    Vec::new()
                } else {
                    store.find_threads(&ids).await?
                };
                let child_ids: Vec<ObjectId> = child_docs.iter().map(|d| d.id).collect();
                let views = populate_level(store, child_docs, child_spec).await?;
                child_ids.into_iter().zip(views).collect()
            }
            None => HashMap::new(),
        };

        let resolve_children = spec.children.is_some();
        Ok(docs
            .into_iter()
            .map(|doc| ThreadView::assemble(doc, &authors, &children, resolve_children))
            .collect())
    }
    .boxed()
}

fn unique(ids: impl Iterator<Item = ObjectId>) -> Vec<ObjectId> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
