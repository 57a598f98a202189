// Application layer - Use cases behind the HTTP handlers
pub mod call_feed;
pub mod conversion_service;
pub mod dashboard_service;
pub mod tagger;
pub mod text_analysis_service;
pub mod tokenizer;
