/// State management module
///
/// This module handles all application state, including:
/// - The media catalog database and folder import (library.rs)
/// - Shared data structures (data.rs)

pub mod data;
pub mod library;
