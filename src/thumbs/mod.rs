/// Thumbnail module
///
/// This module handles:
/// - Generating thumbnails and caching them to disk (cache.rs)
/// - The async request lifecycle: issue, cancel, stop-all (manager.rs)

pub mod cache;
pub mod manager;
