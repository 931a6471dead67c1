/// Picker module
///
/// The editing-mode state machine, navigation chrome, and the delegate
/// contract for reporting picks (controller.rs).

pub mod controller;
