pub mod cache;
pub mod candidate_source;
pub mod config;
pub mod logger;
