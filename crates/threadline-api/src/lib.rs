pub mod cache;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;

pub use routes::build_router;
