/// UI widgets
///
/// - The navigation bar rendering the controller's affordances (nav_bar.rs)
/// - The thumbnail grid and its visible-window math (grid_view.rs)
/// - The canvas-drawn selection badge (badge.rs)

pub mod badge;
pub mod grid_view;
pub mod nav_bar;
