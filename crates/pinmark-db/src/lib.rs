//! Pinmark Database Library
//!
//! Repositories for the tables the import pipeline reads and writes: bookmarks and
//! categories. The `BookmarkStore` trait is the seam the pipeline depends on;
//! `BookmarkRepository` implements it on Postgres.

pub mod db;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use db::*;
