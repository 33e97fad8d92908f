//! Linkshelf, a personal bookmark manager backend.
//!
//! This library crate exposes all modules for use by the binary and integration tests.

pub mod app;
pub mod database;
pub mod http_handler;
pub mod managers;
pub mod platform;
pub mod services;
pub mod types;
