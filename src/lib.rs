pub mod catalog;
pub mod config;
pub mod error;
pub mod football_json;
pub mod http_cache;
pub mod http_client;
pub mod identity;
pub mod orchestrator;
pub mod standings;
pub mod store;
pub mod sync;
