/// Responsive grid layout policy
///
/// Pure arithmetic shared by both layout backends: the column count for a
/// container, the spacing/inset policy per width class, and the item-size
/// math each backend derives from them.

use iced::Size;

/// Cell width the grid aims for when the context favors larger content
const PREFERRED_CELL_WIDTH_LARGE: f32 = 190.0;
/// Cell width the grid aims for otherwise
const PREFERRED_CELL_WIDTH_SMALL: f32 = 120.0;
/// Column multiplier at accessibility text sizes (fewer, larger cells)
const ACCESSIBILITY_MULTIPLIER: f32 = 0.75;

/// Coarse device family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceIdiom {
    Phone,
    Tablet,
}

/// Coarse bucket describing available horizontal space
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthClass {
    Compact,
    Regular,
}

/// Preferred content size, ordered smallest to largest.
/// Everything above ExtraExtraExtraLarge is an accessibility size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum SizeCategory {
    ExtraSmall,
    Small,
    Medium,
    Large,
    ExtraLarge,
    ExtraExtraLarge,
    ExtraExtraExtraLarge,
    AccessibilityMedium,
    AccessibilityLarge,
    AccessibilityExtraLarge,
    AccessibilityExtraExtraLarge,
    AccessibilityExtraExtraExtraLarge,
}

impl SizeCategory {
    /// Whether this category reduces the column target
    pub fn is_accessibility(self) -> bool {
        self > SizeCategory::ExtraExtraExtraLarge
    }
}

/// Everything the layout policy needs to know about the hosting device
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceContext {
    pub idiom: DeviceIdiom,
    pub width_class: WidthClass,
    pub size_category: SizeCategory,
    /// Logical screen size, in points
    pub screen: Size,
    /// Native panel size, in pixels; orientation shows in the aspect
    pub native: Size,
}

impl DeviceContext {
    /// Derive a context from the hosting window. On desktop the window is
    /// the whole world the grid can see, so it stands in for the screen.
    pub fn from_window(window: Size) -> Self {
        DeviceContext {
            idiom: if window.width >= 768.0 {
                DeviceIdiom::Tablet
            } else {
                DeviceIdiom::Phone
            },
            width_class: if window.width < 500.0 {
                WidthClass::Compact
            } else {
                WidthClass::Regular
            },
            size_category: SizeCategory::Large,
            screen: window,
            native: window,
        }
    }
}

/// Container geometry plus device context, handed to the layout handlers
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutEnvironment {
    pub container: Size,
    pub device: DeviceContext,
}

/// Number of columns for a container width.
///
/// The column target widens (fewer, larger cells) when the context favors
/// larger content: tablet-class devices showing more than half the screen,
/// or phones whose native panel is landscape. Accessibility text sizes
/// scale the count down by 0.75.
pub fn column_count(container: Size, device: &DeviceContext) -> usize {
    let mut multiplier: f32 = 1.0;
    if device.size_category.is_accessibility() {
        multiplier = ACCESSIBILITY_MULTIPLIER;
    }

    let prefers_larger_content = match device.idiom {
        DeviceIdiom::Tablet => container.width > device.screen.width / 2.0,
        DeviceIdiom::Phone => device.native.width > device.native.height,
    };

    let preferred_width = if prefers_larger_content {
        PREFERRED_CELL_WIDTH_LARGE
    } else {
        PREFERRED_CELL_WIDTH_SMALL
    };
    let count = (container.width / preferred_width * multiplier).floor() as usize;

    // Both backends divide by the column count; a zero-column grid has no
    // item width, so a too-narrow container still gets one full-width column.
    count.max(1)
}

/// Spacing between items and rows
pub fn spacing(device: &DeviceContext) -> f32 {
    match device.width_class {
        WidthClass::Compact => 1.0,
        WidthClass::Regular => 10.0,
    }
}

/// Uniform section content inset
pub fn inset(device: &DeviceContext) -> f32 {
    match device.width_class {
        WidthClass::Compact => 0.0,
        WidthClass::Regular => 1.0,
    }
}

/// Declarative grid descriptor: a square-aspect grid of `column_count`
/// equal-width items per row with uniform spacing and section inset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayoutSection {
    pub column_count: usize,
    /// Spacing between items within a row
    pub item_spacing: f32,
    /// Spacing between rows
    pub line_spacing: f32,
    /// Uniform content inset on all four edges
    pub inset: f32,
}

impl GridLayoutSection {
    /// Side length of one (square) item for a container width
    pub fn item_side(&self, container_width: f32) -> f32 {
        let content = container_width
            - 2.0 * self.inset
            - self.item_spacing * (self.column_count.saturating_sub(1)) as f32;
        (content / self.column_count as f32).max(0.0)
    }
}

/// Edge insets for the imperative flow backend
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EdgeInsets {
    pub top: f32,
    pub left: f32,
    pub bottom: f32,
    pub right: f32,
}

impl EdgeInsets {
    pub fn uniform(value: f32) -> Self {
        EdgeInsets {
            top: value,
            left: value,
            bottom: value,
            right: value,
        }
    }

    pub fn horizontal(&self) -> f32 {
        self.left + self.right
    }
}

/// Metrics object for environments that only support an imperative
/// flow layout engine
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowLayoutMetrics {
    pub minimum_line_spacing: f32,
    pub minimum_interitem_spacing: f32,
    pub content_insets: EdgeInsets,
}

/// Sizing strategy for the flow backend: divide the container into
/// `column_count` columns of aspect-ratio-1 items.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlowSizingStrategy {
    pub column_count: usize,
    pub aspect_ratio: f32,
    pub metrics: FlowLayoutMetrics,
}

impl FlowSizingStrategy {
    /// Item size for a container width
    pub fn item_size(&self, container_width: f32) -> Size {
        let content = container_width
            - self.metrics.content_insets.horizontal()
            - self.metrics.minimum_interitem_spacing
                * (self.column_count.saturating_sub(1)) as f32;
        let width = (content / self.column_count as f32).max(0.0);
        Size::new(width, width * self.aspect_ratio)
    }
}

/// Which layout engine the hosting environment supports.
/// Picked once at composition time, never mid-flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutBackend {
    /// Declarative grid descriptors; recomputes on every environment change
    Compositional,
    /// Imperative flow metrics; needs an explicit invalidation on resize
    Flow,
}

impl LayoutBackend {
    /// Capability detection. The declarative engine is the default; the
    /// flow engine can be forced for environments (or debugging sessions)
    /// that only have the older path.
    pub fn detect() -> Self {
        match std::env::var("MEDIA_PICKER_LAYOUT") {
            Ok(value) if value.eq_ignore_ascii_case("flow") => LayoutBackend::Flow,
            _ => LayoutBackend::Compositional,
        }
    }
}
