// Presentation layer - HTTP routing, extraction and responses
pub mod app_state;
pub mod dashboard_handlers;
pub mod dashboard_page;
pub mod error;
pub mod form;
pub mod handlers;
pub mod routes;
