/// State management module
///
/// This module handles the application state that is not derived:
/// - The in-memory photo collection (collection.rs)
/// - Shared data structures (data.rs)
/// - Settings loaded at startup (config.rs)
///
/// Everything the window shows is derived from these by the `feed` module.

pub mod collection;
pub mod config;
pub mod data;
