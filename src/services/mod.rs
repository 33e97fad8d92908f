// Linkshelf services
// Services provide core functionality: bookmark orchestration, metadata scraping, URL normalization, settings.

pub mod bookmark_service;
pub mod metadata_fetcher;
pub mod settings_engine;
pub mod url_normalizer;
