mod thread;
mod user;
mod view;

// Stored documents
pub use thread::ThreadDoc;
pub use user::{AuthorSelection, AuthorView, UserDoc};

// Database-agnostic views
pub use view::{Reference, ThreadView};
