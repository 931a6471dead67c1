/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the catalog layer and the UI layer.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Media kinds the picker understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Photo,
    Video,
}

impl AssetKind {
    /// Classify a file by its extension (lowercase, without the dot).
    /// Returns None for files the picker should not import.
    pub fn from_extension(ext: &str) -> Option<Self> {
        const PHOTO_EXTENSIONS: [&str; 8] = [
            "jpg", "jpeg", "png", "gif", "webp", "tif", "tiff", "bmp",
        ];
        const VIDEO_EXTENSIONS: [&str; 6] = ["mp4", "mov", "m4v", "avi", "mkv", "webm"];

        if PHOTO_EXTENSIONS.contains(&ext) {
            Some(AssetKind::Photo)
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            Some(AssetKind::Video)
        } else {
            None
        }
    }

    /// Database representation ('photo' / 'video')
    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Photo => "photo",
            AssetKind::Video => "video",
        }
    }

    /// Parse the database representation back; unknown strings become Photo
    /// so a catalog written by a newer build still loads.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "video" => AssetKind::Video,
            _ => AssetKind::Photo,
        }
    }
}

/// Represents a single media asset in the library
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Asset {
    /// Unique catalog ID
    pub id: i64,
    /// Stable identity: the absolute path of the media file. Every
    /// stale-thumbnail check compares this, never the struct itself.
    pub local_id: String,
    /// Filename only (e.g., "IMG_0001.jpg")
    pub filename: String,
    /// Photo or video
    pub kind: AssetKind,
    /// Creation timestamp of the underlying file; the grid is ordered by
    /// this, newest first
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_photo_extensions_classify() {
        assert_eq!(AssetKind::from_extension("jpg"), Some(AssetKind::Photo));
        assert_eq!(AssetKind::from_extension("webp"), Some(AssetKind::Photo));
        assert_eq!(AssetKind::from_extension("mov"), Some(AssetKind::Video));
        assert_eq!(AssetKind::from_extension("txt"), None);
    }

    #[test]
    fn test_kind_round_trips_through_db_string() {
        assert_eq!(
            AssetKind::from_str_lossy(AssetKind::Video.as_str()),
            AssetKind::Video
        );
        assert_eq!(
            AssetKind::from_str_lossy(AssetKind::Photo.as_str()),
            AssetKind::Photo
        );
        assert_eq!(AssetKind::from_str_lossy("hologram"), AssetKind::Photo);
    }

    #[test]
    fn test_asset_serializes_for_the_delegate() {
        let asset = Asset {
            id: 7,
            local_id: "/photos/IMG_0001.jpg".to_string(),
            filename: "IMG_0001.jpg".to_string(),
            kind: AssetKind::Photo,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let json = serde_json::to_string(&asset).unwrap();
        assert!(json.contains("\"local_id\":\"/photos/IMG_0001.jpg\""));
        assert!(json.contains("\"kind\":\"photo\""));
    }
}
