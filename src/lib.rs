pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod export;
pub mod genetics;
pub mod store;
mod utils;

// Re-export main API
pub use api::*;
