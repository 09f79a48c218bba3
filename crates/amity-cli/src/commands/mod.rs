//! CLI command implementations

pub mod completions;
pub mod config;
pub mod friendship;
pub mod group;
pub mod query;
