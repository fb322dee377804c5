//! Database layer for sutta-agent
//!
//! Provides SQLite-based storage with:
//! - Passage embeddings for the similarity index
//! - Append-only answer memory

mod memories;
mod passages;
mod schema;
pub mod vectors;

pub use memories::{question_hash, MemoryRecord};
pub use schema::Database;
use std::path::PathBuf;

impl Database {
    /// Get the default database path
    pub fn default_path() -> PathBuf {
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("index.sqlite")
    }
}
