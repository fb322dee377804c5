//! CLI command handlers

pub mod memory;
pub mod research;
pub mod search;
pub mod status;
