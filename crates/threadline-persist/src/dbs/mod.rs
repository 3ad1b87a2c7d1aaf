pub mod memory;
#[cfg(feature = "mongodb")]
pub mod mongo;

pub use memory::MemoryThreadStore;
#[cfg(feature = "mongodb")]
pub use mongo::{MongoConnection, MongoOptions, MongoThreadStore};
