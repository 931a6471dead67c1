/// Grid sections and their capabilities
///
/// A section is a self-contained unit of the composed grid: it owns its
/// slice of content and its layout policy. Beyond the base contract,
/// behavior is split into capability traits a section may or may not
/// support; hosts discover support through the explicit accessor methods
/// instead of downcasting, so an absent capability is a visible None
/// rather than a silent no-op.

use std::cell::RefCell;
use std::sync::Arc;

use super::cell::ThumbnailCell;
use super::config::GridConfig;
use super::layout::{
    self, FlowLayoutMetrics, FlowSizingStrategy, GridLayoutSection, LayoutEnvironment,
};
use crate::state::data::Asset;
use crate::thumbs::manager::{ImageCaching, RequestHandle, ThumbnailFuture};

/// A thumbnail fetch issued during cell binding, handed to the host to
/// drive; the cell's reuse callback already knows how to cancel it.
pub struct PendingThumbnail {
    pub handle: RequestHandle,
    pub asset_id: String,
    pub future: ThumbnailFuture,
}

/// Base contract every section fulfills
pub trait GridSection {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The asset at an index. Out-of-range is a caller bug.
    fn asset(&self, index: usize) -> &Asset;

    /// Bind a cell to the content at `index`: associate it with the
    /// asset's identity, issue the thumbnail fetch, and register a reuse
    /// handler that cancels that specific fetch.
    fn cell_content(&self, index: usize, cell: &mut ThumbnailCell) -> PendingThumbnail;

    // Capability discovery; the default section supports nothing extra.
    fn selection_handler(&mut self) -> Option<&mut dyn SelectionHandler> {
        None
    }
    fn editing_handler(&mut self) -> Option<&mut dyn EditingHandler> {
        None
    }
    fn compositional_layout(&self) -> Option<&dyn CompositionalLayoutHandler> {
        None
    }
    fn flow_layout(&self) -> Option<&dyn FlowLayoutHandler> {
        None
    }
}

/// Selection hooks. Bookkeeping itself lives with the coordinator; these
/// are extension points for sections that care.
pub trait SelectionHandler {
    /// Whether more than one index may be selected at a time. The
    /// coordinator replaces instead of accumulates when this is false.
    fn allows_multiple_selection(&self) -> bool {
        false
    }

    fn did_select(&mut self, _index: usize) {}
    fn did_deselect(&mut self, _index: usize) {}
}

/// Editing-mode participation
pub trait EditingHandler {
    /// The section-wide flag flips before any cell is touched
    fn did_set_editing(&mut self, editing: bool);
    /// Forward the editing flag into one bound cell's visual state
    fn set_editing(&mut self, editing: bool, index: usize, cell: &mut ThumbnailCell);
}

/// Declarative layout backend
pub trait CompositionalLayoutHandler {
    fn layout_section(&self, env: &LayoutEnvironment) -> GridLayoutSection;
}

/// Imperative flow layout backend. Metrics are memoized, so environments
/// that resize without re-asking must call `invalidate_layout` explicitly.
pub trait FlowLayoutHandler {
    fn flow_metrics(&self, env: &LayoutEnvironment) -> FlowLayoutMetrics;
    fn sizing_strategy(&self, index: usize, env: &LayoutEnvironment) -> FlowSizingStrategy;
    fn invalidate_layout(&self) {}
}

/// The picker's one real section: a fetched asset collection rendered as
/// a responsive square grid of thumbnails.
pub struct AssetGridSection {
    assets: Vec<Asset>,
    config: GridConfig,
    manager: Arc<dyn ImageCaching + Send + Sync>,
    allows_multiple_selection: bool,
    /// Lazily computed flow metrics; cleared by `invalidate_layout`
    cached_flow_metrics: RefCell<Option<FlowLayoutMetrics>>,
}

impl AssetGridSection {
    pub fn new(
        assets: Vec<Asset>,
        config: GridConfig,
        manager: Arc<dyn ImageCaching + Send + Sync>,
    ) -> Self {
        AssetGridSection {
            assets,
            config,
            manager,
            allows_multiple_selection: false,
            cached_flow_metrics: RefCell::new(None),
        }
    }

    pub fn allows_multiple_selection(&self) -> bool {
        self.allows_multiple_selection
    }

    fn column_count(&self, env: &LayoutEnvironment) -> usize {
        layout::column_count(env.container, &env.device)
    }
}

impl GridSection for AssetGridSection {
    fn len(&self) -> usize {
        self.assets.len()
    }

    fn asset(&self, index: usize) -> &Asset {
        debug_assert!(index < self.assets.len(), "asset index out of range");
        &self.assets[index]
    }

    fn cell_content(&self, index: usize, cell: &mut ThumbnailCell) -> PendingThumbnail {
        debug_assert!(index < self.assets.len(), "cell index out of range");
        let asset = &self.assets[index];

        let (handle, future) = self.manager.request_thumbnail(asset, &self.config);

        let manager = Arc::clone(&self.manager);
        cell.bind(
            asset.local_id.clone(),
            Box::new(move || manager.cancel(handle)),
        );

        PendingThumbnail {
            handle,
            asset_id: asset.local_id.clone(),
            future,
        }
    }

    fn selection_handler(&mut self) -> Option<&mut dyn SelectionHandler> {
        Some(self)
    }

    fn editing_handler(&mut self) -> Option<&mut dyn EditingHandler> {
        Some(self)
    }

    fn compositional_layout(&self) -> Option<&dyn CompositionalLayoutHandler> {
        Some(self)
    }

    fn flow_layout(&self) -> Option<&dyn FlowLayoutHandler> {
        Some(self)
    }
}

impl SelectionHandler for AssetGridSection {
    // Selection bookkeeping lives with the coordinator; the section only
    // reports the mode editing put it in.
    fn allows_multiple_selection(&self) -> bool {
        self.allows_multiple_selection
    }
}

impl EditingHandler for AssetGridSection {
    fn did_set_editing(&mut self, editing: bool) {
        self.allows_multiple_selection = editing;
    }

    fn set_editing(&mut self, editing: bool, _index: usize, cell: &mut ThumbnailCell) {
        cell.set_editing(editing);
    }
}

impl CompositionalLayoutHandler for AssetGridSection {
    fn layout_section(&self, env: &LayoutEnvironment) -> GridLayoutSection {
        let spacing = layout::spacing(&env.device);
        GridLayoutSection {
            column_count: self.column_count(env),
            item_spacing: spacing,
            line_spacing: spacing,
            inset: layout::inset(&env.device),
        }
    }
}

impl FlowLayoutHandler for AssetGridSection {
    fn flow_metrics(&self, env: &LayoutEnvironment) -> FlowLayoutMetrics {
        if let Some(metrics) = *self.cached_flow_metrics.borrow() {
            return metrics;
        }

        // The flow engine uses the spacing value for its insets as well
        let spacing = layout::spacing(&env.device);
        let metrics = FlowLayoutMetrics {
            minimum_line_spacing: spacing,
            minimum_interitem_spacing: spacing,
            content_insets: layout::EdgeInsets::uniform(spacing),
        };
        *self.cached_flow_metrics.borrow_mut() = Some(metrics);
        metrics
    }

    fn sizing_strategy(&self, _index: usize, env: &LayoutEnvironment) -> FlowSizingStrategy {
        FlowSizingStrategy {
            column_count: self.column_count(env),
            aspect_ratio: 1.0,
            metrics: self.flow_metrics(env),
        }
    }

    fn invalidate_layout(&self) {
        self.cached_flow_metrics.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layout::{DeviceContext, DeviceIdiom, SizeCategory, WidthClass};
    use crate::state::data::AssetKind;
    use crate::thumbs::manager::doubles::ScriptedCache;
    use chrono::Utc;
    use iced::Size;

    fn asset(id: i64) -> Asset {
        Asset {
            id,
            local_id: format!("/media/{id}.jpg"),
            filename: format!("{id}.jpg"),
            kind: AssetKind::Photo,
            created_at: Utc::now(),
        }
    }

    fn env() -> LayoutEnvironment {
        LayoutEnvironment {
            container: Size::new(760.0, 600.0),
            device: DeviceContext {
                idiom: DeviceIdiom::Tablet,
                width_class: WidthClass::Regular,
                size_category: SizeCategory::Large,
                screen: Size::new(1000.0, 750.0),
                native: Size::new(2000.0, 1500.0),
            },
        }
    }

    fn section(cache: &Arc<ScriptedCache>, count: i64) -> AssetGridSection {
        AssetGridSection::new(
            (0..count).map(asset).collect(),
            GridConfig::default(),
            Arc::clone(cache) as Arc<dyn ImageCaching + Send + Sync>,
        )
    }

    #[test]
    fn test_cell_content_binds_identity_and_cancellation() {
        let cache = ScriptedCache::new();
        let section = section(&cache, 3);
        let mut cell = ThumbnailCell::new();

        let pending = section.cell_content(1, &mut cell);
        assert_eq!(cell.asset_id(), Some("/media/1.jpg"));
        assert_eq!(pending.asset_id, "/media/1.jpg");

        // Recycling the cell cancels that specific fetch
        cell.notify_reuse();
        assert_eq!(cache.cancelled(), vec![pending.handle]);
    }

    #[test]
    fn test_editing_capability_toggles_multiple_selection() {
        let cache = ScriptedCache::new();
        let mut section = section(&cache, 2);
        assert!(!section.allows_multiple_selection());

        section
            .editing_handler()
            .expect("asset sections support editing")
            .did_set_editing(true);
        assert!(section.allows_multiple_selection());

        section.editing_handler().unwrap().did_set_editing(false);
        assert!(!section.allows_multiple_selection());
    }

    #[test]
    fn test_compositional_descriptor_follows_policy() {
        let cache = ScriptedCache::new();
        let section = section(&cache, 2);

        let descriptor = section
            .compositional_layout()
            .expect("asset sections support the declarative backend")
            .layout_section(&env());

        assert_eq!(descriptor.column_count, 4);
        assert_eq!(descriptor.item_spacing, 10.0);
        assert_eq!(descriptor.line_spacing, 10.0);
        assert_eq!(descriptor.inset, 1.0);
    }

    #[test]
    fn test_flow_metrics_memo_survives_environment_change_until_invalidated() {
        let cache = ScriptedCache::new();
        let section = section(&cache, 2);
        let flow = section.flow_layout().unwrap();

        let regular = flow.flow_metrics(&env());
        assert_eq!(regular.minimum_line_spacing, 10.0);

        // The environment narrows, but the memo answers until invalidated
        let mut compact = env();
        compact.device.width_class = WidthClass::Compact;
        assert_eq!(flow.flow_metrics(&compact), regular);

        flow.invalidate_layout();
        assert_eq!(flow.flow_metrics(&compact).minimum_line_spacing, 1.0);
    }

    #[test]
    fn test_sizing_strategy_divides_container_into_columns() {
        let cache = ScriptedCache::new();
        let section = section(&cache, 2);

        let strategy = section.flow_layout().unwrap().sizing_strategy(0, &env());
        assert_eq!(strategy.column_count, 4);
        assert_eq!(strategy.aspect_ratio, 1.0);

        let size = strategy.item_size(env().container.width);
        assert!((size.width - size.height).abs() < f32::EPSILON);
        // 760 - 20 insets - 30 interitem = 710 across 4 columns
        assert_eq!(size.width, 177.5);
    }
}
