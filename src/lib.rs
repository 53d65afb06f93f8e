// Library interface for mangalivre_scraper
// The binary and the integration tests both drive the scraper through it

pub mod browser;
pub mod config;
pub mod crawler;
pub mod http_client;
pub mod metrics;
pub mod models;
pub mod sources;
pub mod store;
