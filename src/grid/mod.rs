/// Asset grid module
///
/// This module holds the grid's moving parts:
/// - Layout policy and device context (layout.rs)
/// - Per-section configuration (config.rs)
/// - The thumbnail cell view model (cell.rs)
/// - Sections and their capability traits (section.rs)
/// - The coordinator binding sections to the hosted view (coordinator.rs)

pub mod cell;
pub mod config;
pub mod coordinator;
pub mod layout;
pub mod section;
