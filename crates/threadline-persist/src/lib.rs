pub mod actions;
pub mod builder;
pub mod dbs;
pub mod error;
pub mod models;
pub mod pagination;
pub mod populate;
pub mod revalidate;
pub mod store;

pub use actions::{CreateThreadParams, ThreadActions};
pub use builder::ThreadActionsBuilder;
pub use error::{Action, ActionError, ErrorKind, PersistError};
pub use models::{AuthorSelection, AuthorView, Reference, ThreadDoc, ThreadView, UserDoc};
pub use pagination::{PageRequest, PostsPage, DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
pub use populate::{PopulateSpec, MAX_POPULATE_DEPTH};
pub use revalidate::{NoopRevalidator, PathRevalidator};
pub use store::ThreadStore;

// Store implementations
pub use dbs::MemoryThreadStore;
#[cfg(feature = "mongodb")]
pub use dbs::{MongoConnection, MongoOptions, MongoThreadStore};
