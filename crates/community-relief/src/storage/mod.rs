//! SQLite persistence for the directory and operator accounts.

mod columns;
mod schema;
pub mod seed;
pub mod sqlite;

pub use seed::{load_sample_directory, seed_default_categories, SampleSummary};
pub use sqlite::SqliteStore;
