//! CLI command handlers

pub mod ask;
pub mod config;
pub mod embed;
pub mod ingest;
pub mod models;
pub mod search;
pub mod serve;
pub mod status;
