// Image conversion, text analysis and call dashboard services
pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
