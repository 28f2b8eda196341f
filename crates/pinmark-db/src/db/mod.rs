//! Database repositories for the import pipeline
//
// Bookmark and category queries
pub mod bookmark;
//
// Connection pool and migrations
pub mod setup;
//
// Repository trait consumed by the pipeline
pub mod traits;

pub use bookmark::BookmarkRepository;
pub use setup::setup_database;
pub use traits::BookmarkStore;
