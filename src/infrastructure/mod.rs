// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod logging;
pub mod open_data_feed;
pub mod server;
pub mod tagger_store;
