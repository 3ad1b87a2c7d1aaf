pub mod client;
pub mod connection;
pub mod repositories;

pub use client::MongoThreadStore;
pub use connection::{MongoConnection, MongoOptions};
