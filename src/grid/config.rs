/// Grid configuration
///
/// A value object fixed at section construction time. It controls the
/// thumbnail target size, how thumbnails fill their square cell, and how
/// the caching manager is asked to deliver and resize them.

use serde::{Deserialize, Serialize};

use super::layout::{DeviceContext, DeviceIdiom};

/// Default square thumbnail target, in pixels
pub const DEFAULT_THUMBNAIL_SIZE: u32 = 320;

/// How a thumbnail occupies its cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentMode {
    /// Fill the cell, cropping overflow
    AspectFill,
    /// Fit entirely inside the cell, letterboxing as needed
    AspectFit,
}

/// How eagerly the caching manager should deliver results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeliveryMode {
    /// Accept whatever is already cached; fastest to first pixel
    Opportunistic,
    /// Regenerate undersized cache entries before delivering
    HighQuality,
}

/// Resize strategy for thumbnail generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResizeMode {
    /// Cheap filter, good enough for grid cells
    Fast,
    /// High-quality filter
    Exact,
}

/// Immutable per-section configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    /// Square thumbnail target (width, height) in pixels
    pub preferred_thumbnail_size: (u32, u32),
    pub content_mode: ContentMode,
    pub delivery: DeliveryMode,
    pub resize: ResizeMode,
}

impl Default for GridConfig {
    fn default() -> Self {
        GridConfig {
            preferred_thumbnail_size: (DEFAULT_THUMBNAIL_SIZE, DEFAULT_THUMBNAIL_SIZE),
            content_mode: ContentMode::AspectFill,
            delivery: DeliveryMode::Opportunistic,
            resize: ResizeMode::Fast,
        }
    }
}

impl GridConfig {
    /// Configuration for a device context. Tablet-class devices show the
    /// whole asset letterboxed and can afford the high-quality path;
    /// everything else crops to fill the cell and takes whatever the
    /// cache already has.
    pub fn for_device(device: &DeviceContext) -> Self {
        match device.idiom {
            DeviceIdiom::Tablet => GridConfig {
                content_mode: ContentMode::AspectFit,
                delivery: DeliveryMode::HighQuality,
                resize: ResizeMode::Exact,
                ..GridConfig::default()
            },
            DeviceIdiom::Phone => GridConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::layout::{SizeCategory, WidthClass};
    use iced::Size;

    fn context(idiom: DeviceIdiom) -> DeviceContext {
        DeviceContext {
            idiom,
            width_class: WidthClass::Regular,
            size_category: SizeCategory::Large,
            screen: Size::new(1024.0, 768.0),
            native: Size::new(2048.0, 1536.0),
        }
    }

    #[test]
    fn test_default_targets_320() {
        let config = GridConfig::default();
        assert_eq!(config.preferred_thumbnail_size, (320, 320));
        assert_eq!(config.delivery, DeliveryMode::Opportunistic);
    }

    #[test]
    fn test_tablet_prefers_fit_and_quality() {
        let config = GridConfig::for_device(&context(DeviceIdiom::Tablet));
        assert_eq!(config.content_mode, ContentMode::AspectFit);
        assert_eq!(config.delivery, DeliveryMode::HighQuality);
        assert_eq!(config.resize, ResizeMode::Exact);
    }

    #[test]
    fn test_phone_prefers_fill_and_speed() {
        let config = GridConfig::for_device(&context(DeviceIdiom::Phone));
        assert_eq!(config.content_mode, ContentMode::AspectFill);
        assert_eq!(config.delivery, DeliveryMode::Opportunistic);
        assert_eq!(config.resize, ResizeMode::Fast);
    }
}
