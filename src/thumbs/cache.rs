/// Disk-backed thumbnail generation
///
/// Thumbnails are JPEGs named after the asset's catalog ID, stored in the
/// user's cache directory. Generation decodes the source, resizes it to
/// the configured square target, and writes the result; everything here is
/// synchronous and meant to run on a blocking worker.

use image::imageops::FilterType;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::grid::config::{ContentMode, GridConfig, ResizeMode};

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Get the default thumbnail cache directory
/// Returns ~/.cache/media-picker/thumbnails on Linux
pub fn default_cache_dir() -> PathBuf {
    let mut path = dirs_next::cache_dir()
        .or_else(dirs_next::home_dir)
        .expect("Could not determine cache directory");

    path.push("media-picker");
    path.push("thumbnails");

    // Ensure the directory exists
    std::fs::create_dir_all(&path).expect("Failed to create thumbnail cache directory");

    path
}

/// Cache path for an asset's thumbnail (doesn't generate, just names it)
pub fn thumbnail_path(cache_dir: &Path, asset_id: i64) -> PathBuf {
    cache_dir.join(format!("{}.jpg", asset_id))
}

/// Generate a thumbnail for a photo and write it to the cache.
/// Returns the path of the written JPEG.
pub fn generate_thumbnail(
    source: &Path,
    cache_dir: &Path,
    asset_id: i64,
    config: &GridConfig,
) -> Result<PathBuf, ThumbnailError> {
    let img = image::open(source)?;

    let (width, height) = config.preferred_thumbnail_size;
    let filter = match config.resize {
        ResizeMode::Fast => FilterType::Triangle,
        ResizeMode::Exact => FilterType::Lanczos3,
    };

    let thumbnail = match config.content_mode {
        ContentMode::AspectFill => img.resize_to_fill(width, height, filter),
        ContentMode::AspectFit => img.resize(width, height, filter),
    };

    std::fs::create_dir_all(cache_dir)?;
    let path = thumbnail_path(cache_dir, asset_id);

    // JPEG has no alpha channel; flatten before encoding
    image::DynamicImage::ImageRgb8(thumbnail.to_rgb8()).save(&path)?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::config::DeliveryMode;

    fn source_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        image::RgbaImage::from_pixel(width, height, image::Rgba([40, 80, 120, 255]))
            .save(&path)
            .unwrap();
        path
    }

    fn config(content_mode: ContentMode) -> GridConfig {
        GridConfig {
            preferred_thumbnail_size: (32, 32),
            content_mode,
            delivery: DeliveryMode::Opportunistic,
            resize: ResizeMode::Fast,
        }
    }

    #[test]
    fn test_aspect_fill_produces_exact_square() {
        let media = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let source = source_png(media.path(), "wide.png", 64, 48);

        let path =
            generate_thumbnail(&source, cache.path(), 1, &config(ContentMode::AspectFill))
                .unwrap();

        assert_eq!(path, thumbnail_path(cache.path(), 1));
        assert_eq!(image::image_dimensions(&path).unwrap(), (32, 32));
    }

    #[test]
    fn test_aspect_fit_preserves_ratio_within_target() {
        let media = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let source = source_png(media.path(), "wide.png", 64, 48);

        let path =
            generate_thumbnail(&source, cache.path(), 2, &config(ContentMode::AspectFit))
                .unwrap();

        assert_eq!(image::image_dimensions(&path).unwrap(), (32, 24));
    }

    #[test]
    fn test_unreadable_source_is_an_error() {
        let media = tempfile::tempdir().unwrap();
        let cache = tempfile::tempdir().unwrap();
        let missing = media.path().join("nope.jpg");

        let result =
            generate_thumbnail(&missing, cache.path(), 3, &config(ContentMode::AspectFill));
        assert!(result.is_err());
        assert!(!thumbnail_path(cache.path(), 3).exists());
    }
}
