//! Attempt persistence layer
//!
//! SQLite-backed storage for analysis attempts with embedded migrations.

pub mod repo;
pub mod schema;

pub use repo::{AttemptStore, Database, StoreHealth};
