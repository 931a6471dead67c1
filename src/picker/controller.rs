/// Picker controller
///
/// The editing-mode state machine and the navigation chrome it drives.
/// The controller mutates the grid coordinator, rebuilds the navigation
/// affordances on every transition, and relays final picks to the
/// caller-supplied delegate.

use crate::grid::coordinator::GridCoordinator;
use crate::grid::layout::LayoutBackend;
use crate::state::data::Asset;
use crate::thumbs::manager::ImageCaching;

/// Receives the outcome of a picking session
pub trait PickerDelegate {
    fn assets_picked(&mut self, assets: Vec<Asset>);
    fn pick_cancelled(&mut self);
}

/// One navigation affordance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavItem {
    Cancel,
    Select,
    Done,
    Open { enabled: bool },
    SelectAll,
    SelectNone,
}

/// The navigation bar the view renders verbatim
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavBar {
    pub leading: Vec<NavItem>,
    pub trailing: Vec<NavItem>,
    pub title: String,
}

/// Title outside editing mode
pub const DEFAULT_TITLE: &str = "Photos";
/// Title while editing with nothing selected
pub const SELECTION_PROMPT: &str = "Select Items";

impl NavBar {
    /// The initial {Cancel, Select} configuration
    fn browsing() -> Self {
        NavBar {
            leading: vec![NavItem::Cancel],
            trailing: vec![NavItem::Select],
            title: DEFAULT_TITLE.to_string(),
        }
    }
}

pub struct PickerController {
    editing: bool,
    nav: NavBar,
    backend: LayoutBackend,
}

impl PickerController {
    pub fn new(backend: LayoutBackend) -> Self {
        PickerController {
            editing: false,
            nav: NavBar::browsing(),
            backend,
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    pub fn nav(&self) -> &NavBar {
        &self.nav
    }

    pub fn backend(&self) -> LayoutBackend {
        self.backend
    }

    /// Enter editing mode: enable multi-select, start from an empty
    /// selection, and swap the chrome to {toggle | Done, Open}.
    pub fn begin_editing(&mut self, grid: &mut GridCoordinator) {
        if self.editing {
            return;
        }
        self.editing = true;
        grid.set_editing(true);
        self.refresh_nav(grid);
    }

    /// Leave editing mode: drop the selection and restore {Cancel, Select}.
    pub fn end_editing(&mut self, grid: &mut GridCoordinator) {
        if !self.editing {
            return;
        }
        self.editing = false;
        grid.set_editing(false);
        self.nav = NavBar::browsing();
    }

    /// Re-derive title, Open enablement, and the select-all toggle from
    /// the current selection. Call after any selection change.
    pub fn selection_changed(&mut self, grid: &GridCoordinator) {
        if self.editing {
            self.refresh_nav(grid);
        }
    }

    fn refresh_nav(&mut self, grid: &GridCoordinator) {
        let count = grid.selection_count();
        let toggle = if count < grid.total_selectable() {
            NavItem::SelectAll
        } else {
            NavItem::SelectNone
        };

        self.nav = NavBar {
            leading: vec![toggle],
            trailing: vec![
                NavItem::Done,
                NavItem::Open { enabled: count > 0 },
            ],
            title: if count == 0 {
                SELECTION_PROMPT.to_string()
            } else {
                format!("{} Selected", count)
            },
        };
    }

    /// A tap on a cell. While editing it toggles that index; otherwise it
    /// is a single pick, relayed to the delegate immediately. Returns true
    /// when the picking session finished and the host should close.
    pub fn cell_pressed(
        &mut self,
        grid: &mut GridCoordinator,
        section: usize,
        index: usize,
        delegate: &mut dyn PickerDelegate,
    ) -> bool {
        if self.editing {
            // Out-of-range taps cannot come from a rendered cell
            debug_assert!(
                grid.provider().get(section).map_or(true, |s| index < s.len()),
                "tapped index out of range"
            );
            grid.toggle_select(section, index);
            self.selection_changed(grid);
            return false;
        }

        let Some(asset) = grid.provider().get(section).map(|s| s.asset(index).clone()) else {
            return false;
        };
        delegate.assets_picked(vec![asset]);
        true
    }

    /// Confirm the selection. Only reachable while editing with at least
    /// one selected asset; resolves the actual selection and hands it to
    /// the delegate exactly once. Returns true when it fired.
    pub fn open(&mut self, grid: &GridCoordinator, delegate: &mut dyn PickerDelegate) -> bool {
        if !self.editing || grid.selection_count() == 0 {
            return false;
        }
        delegate.assets_picked(grid.selected_assets());
        true
    }

    /// Abandon picking; no assets are returned.
    pub fn cancel(&mut self, delegate: &mut dyn PickerDelegate) {
        delegate.pick_cancelled();
    }

    /// The leading toggle: select everything while anything remains
    /// unselected, otherwise clear.
    pub fn toggle_select_all(&mut self, grid: &mut GridCoordinator) {
        if !self.editing {
            return;
        }
        if grid.selection_count() < grid.total_selectable() {
            grid.select_all();
        } else {
            grid.deselect_all();
        }
        self.refresh_nav(grid);
    }

    /// Layout-environment change. Active pre-caching always stops to bound
    /// memory across the transition; the flow backend additionally needs
    /// its memoized metrics invalidated, the declarative one recomputes
    /// on its own.
    pub fn size_changed(&mut self, grid: &GridCoordinator, cache: &dyn ImageCaching) {
        cache.stop_all_caching();
        if self.backend == LayoutBackend::Flow {
            grid.invalidate_layout();
        }
    }

    /// Low-memory signal: stop pre-caching, touch nothing else.
    pub fn memory_warning(&self, cache: &dyn ImageCaching) {
        cache.stop_all_caching();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::config::GridConfig;
    use crate::grid::coordinator::SectionProvider;
    use crate::grid::section::AssetGridSection;
    use crate::state::data::AssetKind;
    use crate::thumbs::manager::doubles::ScriptedCache;
    use chrono::Utc;
    use std::sync::Arc;

    #[derive(Default)]
    struct RecordingDelegate {
        picked: Vec<Vec<Asset>>,
        cancelled: usize,
    }

    impl PickerDelegate for RecordingDelegate {
        fn assets_picked(&mut self, assets: Vec<Asset>) {
            self.picked.push(assets);
        }

        fn pick_cancelled(&mut self) {
            self.cancelled += 1;
        }
    }

    fn asset(id: i64) -> Asset {
        Asset {
            id,
            local_id: format!("/media/{id}.jpg"),
            filename: format!("{id}.jpg"),
            kind: AssetKind::Photo,
            created_at: Utc::now(),
        }
    }

    fn grid(cache: &Arc<ScriptedCache>, count: i64) -> GridCoordinator {
        let section = AssetGridSection::new(
            (0..count).map(asset).collect(),
            GridConfig::default(),
            Arc::clone(cache) as Arc<dyn ImageCaching + Send + Sync>,
        );
        let mut provider = SectionProvider::new();
        provider.push(Box::new(section));
        GridCoordinator::new(provider)
    }

    #[test]
    fn test_initial_nav_is_cancel_select() {
        let controller = PickerController::new(LayoutBackend::Compositional);
        assert!(!controller.is_editing());
        assert_eq!(controller.nav().leading, vec![NavItem::Cancel]);
        assert_eq!(controller.nav().trailing, vec![NavItem::Select]);
        assert_eq!(controller.nav().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_begin_editing_swaps_chrome_and_disables_open() {
        let cache = ScriptedCache::new();
        let mut grid = grid(&cache, 4);
        let mut controller = PickerController::new(LayoutBackend::Compositional);

        controller.begin_editing(&mut grid);

        assert!(controller.is_editing());
        assert_eq!(controller.nav().leading, vec![NavItem::SelectAll]);
        assert_eq!(
            controller.nav().trailing,
            vec![NavItem::Done, NavItem::Open { enabled: false }]
        );
        assert_eq!(controller.nav().title, SELECTION_PROMPT);
    }

    #[test]
    fn test_editing_round_trip_restores_initial_nav_and_clears_selection() {
        let cache = ScriptedCache::new();
        let mut grid = grid(&cache, 4);
        let mut controller = PickerController::new(LayoutBackend::Compositional);
        let initial = controller.nav().clone();

        controller.begin_editing(&mut grid);
        grid.toggle_select(0, 1);
        controller.selection_changed(&grid);
        assert_eq!(grid.selection_count(), 1);

        controller.end_editing(&mut grid);

        assert_eq!(controller.nav(), &initial);
        assert_eq!(grid.selection_count(), 0);
    }

    #[test]
    fn test_title_tracks_selection_count() {
        let cache = ScriptedCache::new();
        let mut grid = grid(&cache, 4);
        let mut controller = PickerController::new(LayoutBackend::Compositional);
        let mut delegate = RecordingDelegate::default();

        controller.begin_editing(&mut grid);
        controller.cell_pressed(&mut grid, 0, 0, &mut delegate);
        controller.cell_pressed(&mut grid, 0, 1, &mut delegate);
        assert_eq!(controller.nav().title, "2 Selected");

        controller.cell_pressed(&mut grid, 0, 1, &mut delegate);
        assert_eq!(controller.nav().title, "1 Selected");

        controller.cell_pressed(&mut grid, 0, 0, &mut delegate);
        assert_eq!(controller.nav().title, SELECTION_PROMPT);
        assert!(delegate.picked.is_empty());
    }

    #[test]
    fn test_select_all_then_open_delivers_full_selection_once() {
        let cache = ScriptedCache::new();
        let mut grid = grid(&cache, 3);
        let mut controller = PickerController::new(LayoutBackend::Compositional);
        let mut delegate = RecordingDelegate::default();

        controller.begin_editing(&mut grid);
        controller.toggle_select_all(&mut grid);

        assert_eq!(
            controller.nav().trailing,
            vec![NavItem::Done, NavItem::Open { enabled: true }]
        );
        assert_eq!(controller.nav().leading, vec![NavItem::SelectNone]);

        assert!(controller.open(&grid, &mut delegate));
        assert_eq!(delegate.picked.len(), 1);
        assert_eq!(delegate.picked[0].len(), 3);
        assert_eq!(delegate.picked[0][0].local_id, "/media/0.jpg");
    }

    #[test]
    fn test_open_does_not_fire_with_empty_selection() {
        let cache = ScriptedCache::new();
        let mut grid = grid(&cache, 3);
        let mut controller = PickerController::new(LayoutBackend::Compositional);
        let mut delegate = RecordingDelegate::default();

        assert!(!controller.open(&grid, &mut delegate));
        controller.begin_editing(&mut grid);
        assert!(!controller.open(&grid, &mut delegate));
        assert!(delegate.picked.is_empty());
    }

    #[test]
    fn test_toggle_select_all_flips_to_select_none_and_back() {
        let cache = ScriptedCache::new();
        let mut grid = grid(&cache, 3);
        let mut controller = PickerController::new(LayoutBackend::Compositional);

        controller.begin_editing(&mut grid);
        controller.toggle_select_all(&mut grid);
        assert_eq!(grid.selection_count(), 3);

        controller.toggle_select_all(&mut grid);
        assert_eq!(grid.selection_count(), 0);
        assert_eq!(controller.nav().leading, vec![NavItem::SelectAll]);
    }

    #[test]
    fn test_tap_outside_editing_is_a_single_pick() {
        let cache = ScriptedCache::new();
        let mut grid = grid(&cache, 3);
        let mut controller = PickerController::new(LayoutBackend::Compositional);
        let mut delegate = RecordingDelegate::default();

        let finished = controller.cell_pressed(&mut grid, 0, 2, &mut delegate);

        assert!(finished);
        assert_eq!(delegate.picked.len(), 1);
        assert_eq!(delegate.picked[0].len(), 1);
        assert_eq!(delegate.picked[0][0].local_id, "/media/2.jpg");
    }

    #[test]
    fn test_cancel_notifies_delegate_without_assets() {
        let mut controller = PickerController::new(LayoutBackend::Compositional);
        let mut delegate = RecordingDelegate::default();

        controller.cancel(&mut delegate);

        assert_eq!(delegate.cancelled, 1);
        assert!(delegate.picked.is_empty());
    }

    #[test]
    fn test_memory_warning_stops_caching_and_nothing_else() {
        let cache = ScriptedCache::new();
        let mut grid = grid(&cache, 4);
        let mut controller = PickerController::new(LayoutBackend::Compositional);

        controller.begin_editing(&mut grid);
        grid.toggle_select(0, 1);
        controller.selection_changed(&grid);

        controller.memory_warning(cache.as_ref());

        assert_eq!(cache.stop_all_count(), 1);
        assert!(controller.is_editing());
        assert_eq!(grid.selection_count(), 1);
    }

    #[test]
    fn test_size_change_invalidates_flow_metrics_for_flow_backend() {
        use crate::grid::layout::{
            DeviceContext, DeviceIdiom, LayoutEnvironment, SizeCategory, WidthClass,
        };
        use iced::Size;

        let cache = ScriptedCache::new();
        let grid = grid(&cache, 2);
        let mut controller = PickerController::new(LayoutBackend::Flow);

        let regular = LayoutEnvironment {
            container: Size::new(760.0, 600.0),
            device: DeviceContext {
                idiom: DeviceIdiom::Tablet,
                width_class: WidthClass::Regular,
                size_category: SizeCategory::Large,
                screen: Size::new(1000.0, 750.0),
                native: Size::new(2000.0, 1500.0),
            },
        };
        let mut compact = regular;
        compact.device.width_class = WidthClass::Compact;

        let flow = grid.provider().get(0).unwrap().flow_layout().unwrap();
        assert_eq!(flow.flow_metrics(&regular).minimum_line_spacing, 10.0);
        // Without invalidation the memo keeps answering for the old class
        assert_eq!(flow.flow_metrics(&compact).minimum_line_spacing, 10.0);

        controller.size_changed(&grid, cache.as_ref());

        assert_eq!(cache.stop_all_count(), 1);
        assert_eq!(flow.flow_metrics(&compact).minimum_line_spacing, 1.0);
    }

    #[test]
    fn test_size_change_always_stops_caching() {
        let cache = ScriptedCache::new();
        let grid = grid(&cache, 4);

        let mut compositional = PickerController::new(LayoutBackend::Compositional);
        compositional.size_changed(&grid, cache.as_ref());
        assert_eq!(cache.stop_all_count(), 1);

        let mut flow = PickerController::new(LayoutBackend::Flow);
        flow.size_changed(&grid, cache.as_ref());
        assert_eq!(cache.stop_all_count(), 2);
    }
}
