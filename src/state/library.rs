use chrono::{DateTime, Utc};
use rusqlite::{Connection, ErrorCode, Result as SqlResult};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use super::data::{Asset, AssetKind};

/// The AssetLibrary manages the SQLite media catalog.
/// It stores one row per imported photo or video and hands the picker its
/// session collection, ordered newest first.
pub struct AssetLibrary {
    conn: Connection,
    db_path: PathBuf,
}

impl AssetLibrary {
    /// Create a new AssetLibrary instance and initialize the database.
    ///
    /// The database file is created in the user's data directory:
    /// - Linux: ~/.local/share/media-picker/media_picker.db
    /// - macOS: ~/Library/Application Support/media-picker/media_picker.db
    /// - Windows: %APPDATA%\media-picker\media_picker.db
    pub fn new() -> SqlResult<Self> {
        Self::open_at(Self::default_db_path())
    }

    /// Open (or create) the catalog at an explicit path.
    /// Background import tasks and tests use this directly.
    pub fn open_at(db_path: PathBuf) -> SqlResult<Self> {
        // Ensure the parent directory exists
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .expect("Failed to create application data directory");
        }

        let conn = Connection::open(&db_path)?;

        let mut library = AssetLibrary { conn, db_path };
        library.init_schema()?;

        Ok(library)
    }

    /// Get the path where the database should be stored
    fn default_db_path() -> PathBuf {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .expect("Could not determine user data directory");

        path.push("media-picker");
        path.push("media_picker.db");
        path
    }

    /// Initialize the database schema.
    /// Creates all necessary tables and indexes if they don't exist.
    fn init_schema(&mut self) -> SqlResult<()> {
        // One row per media file; path is the stable identity, so it is UNIQUE
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS assets (
                id              INTEGER PRIMARY KEY AUTOINCREMENT,
                path            TEXT NOT NULL UNIQUE,
                filename        TEXT NOT NULL,
                kind            TEXT NOT NULL,
                created_at      INTEGER NOT NULL,
                imported_at     INTEGER NOT NULL,
                file_status     TEXT DEFAULT 'exists'
            )",
            [],
        )?;

        // The session fetch sorts by creation date, newest first
        self.conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_assets_created_at
             ON assets(created_at DESC)",
            [],
        )?;

        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &PathBuf {
        &self.db_path
    }

    /// Get a count of assets in the library
    pub fn asset_count(&self) -> SqlResult<i64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM assets", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Fetch the session's asset collection, newest first.
    /// The returned ordering is stable for the life of a grid section; a
    /// re-import rebuilds the section from a fresh fetch.
    pub fn fetch_assets(&self) -> SqlResult<Vec<Asset>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, path, filename, kind, created_at
             FROM assets
             WHERE COALESCE(file_status, 'exists') = 'exists'
             ORDER BY created_at DESC, id DESC",
        )?;

        let asset_iter = stmt.query_map([], |row| {
            let kind: String = row.get(3)?;
            let created_at: i64 = row.get(4)?;
            Ok(Asset {
                id: row.get(0)?,
                local_id: row.get(1)?,
                filename: row.get(2)?,
                kind: AssetKind::from_str_lossy(&kind),
                created_at: DateTime::from_timestamp(created_at, 0)
                    .unwrap_or(DateTime::UNIX_EPOCH),
            })
        })?;

        let mut assets = Vec::new();
        for asset in asset_iter {
            assets.push(asset?);
        }

        Ok(assets)
    }

    /// Verify that media files still exist on disk.
    /// Mark as 'deleted' if a file is missing, so it drops out of the grid.
    pub fn verify_files(&self) -> SqlResult<usize> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, path FROM assets WHERE COALESCE(file_status, 'exists') = 'exists'")?;

        let existing: Vec<(i64, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .filter_map(|r| r.ok())
            .collect();

        let mut deleted_count = 0;
        for (id, file_path) in existing {
            if !Path::new(&file_path).exists() {
                self.conn.execute(
                    "UPDATE assets SET file_status = 'deleted' WHERE id = ?1",
                    rusqlite::params![id],
                )?;
                deleted_count += 1;
            }
        }

        if deleted_count > 0 {
            println!("⚠️  Marked {} missing files as deleted", deleted_count);
        }

        Ok(deleted_count)
    }
}

// Implement Debug for better error messages
impl std::fmt::Debug for AssetLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLibrary")
            .field("db_path", &self.db_path)
            .finish()
    }
}

/// Result of a folder import operation
#[derive(Debug, Clone)]
pub struct ImportResult {
    pub imported_count: usize,
    pub skipped_count: usize,
}

/// Best-effort creation timestamp of a file.
/// Filesystems without birth times fall back to the modification time.
fn file_created_at(path: &Path) -> DateTime<Utc> {
    std::fs::metadata(path)
        .ok()
        .and_then(|meta| meta.created().or_else(|_| meta.modified()).ok())
        .map(DateTime::<Utc>::from)
        .unwrap_or_else(Utc::now)
}

/// Async function to import all media files from a folder.
/// Runs off the UI loop to avoid blocking it.
pub async fn import_folder(folder_path: PathBuf, db_path: PathBuf) -> ImportResult {
    let mut imported_count = 0;
    let mut skipped_count = 0;

    // Open a new database connection for this background task
    // rusqlite::Connection is not Send, so we can't share the main connection
    let conn = Connection::open(&db_path)
        .expect("Failed to open database connection for import");

    println!("🔍 Scanning folder: {}", folder_path.display());

    // Walk the directory tree recursively
    for entry in WalkDir::new(&folder_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();

        // Only process files (not directories)
        if !path.is_file() {
            continue;
        }

        // Check whether this is a media file by extension
        let kind = match path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .and_then(|ext| AssetKind::from_extension(&ext))
        {
            Some(kind) => kind,
            None => continue,
        };

        // Extract path and filename
        let path_str = path.to_string_lossy().to_string();
        let filename = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        let created_at = file_created_at(path);

        // Try to insert into database
        let result = conn.execute(
            "INSERT INTO assets (path, filename, kind, created_at, imported_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            rusqlite::params![
                &path_str,
                &filename,
                kind.as_str(),
                created_at.timestamp(),
                Utc::now().timestamp(),
            ],
        );

        match result {
            Ok(_) => {
                imported_count += 1;
                if imported_count % 100 == 0 {
                    println!("⏳ Imported {} files...", imported_count);
                }
            }
            Err(rusqlite::Error::SqliteFailure(err, _)) => {
                // A UNIQUE constraint violation means the file is already
                // in the catalog
                if err.code == ErrorCode::ConstraintViolation {
                    skipped_count += 1;
                } else {
                    eprintln!("⚠️  Error importing {}: {:?}", filename, err);
                }
            }
            Err(e) => {
                eprintln!("⚠️  Error importing {}: {:?}", filename, e);
            }
        }
    }

    println!(
        "✅ Import complete: {} new, {} skipped",
        imported_count, skipped_count
    );

    ImportResult {
        imported_count,
        skipped_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn temp_library(dir: &tempfile::TempDir) -> AssetLibrary {
        AssetLibrary::open_at(dir.path().join("catalog.db")).unwrap()
    }

    fn touch(dir: &tempfile::TempDir, name: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).unwrap();
        file.write_all(b"media bytes").unwrap();
        path
    }

    #[tokio::test]
    async fn test_import_counts_and_skips_duplicates() {
        let dir = tempfile::tempdir().unwrap();
        let library = temp_library(&dir);

        let media = tempfile::tempdir().unwrap();
        touch(&media, "a.jpg");
        touch(&media, "b.mp4");
        touch(&media, "notes.txt");

        let first = import_folder(media.path().to_path_buf(), library.path().clone()).await;
        assert_eq!(first.imported_count, 2);
        assert_eq!(first.skipped_count, 0);

        // Re-importing the same folder must not duplicate rows
        let second = import_folder(media.path().to_path_buf(), library.path().clone()).await;
        assert_eq!(second.imported_count, 0);
        assert_eq!(second.skipped_count, 2);

        assert_eq!(library.asset_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn test_fetch_is_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let library = temp_library(&dir);

        // Insert directly with controlled timestamps
        let conn = Connection::open(library.path()).unwrap();
        for (path, created) in [("/m/old.jpg", 100), ("/m/new.jpg", 300), ("/m/mid.jpg", 200)] {
            conn.execute(
                "INSERT INTO assets (path, filename, kind, created_at, imported_at)
                 VALUES (?1, ?2, 'photo', ?3, ?3)",
                rusqlite::params![path, path.rsplit('/').next().unwrap(), created],
            )
            .unwrap();
        }

        let assets = library.fetch_assets().unwrap();
        let names: Vec<&str> = assets.iter().map(|a| a.filename.as_str()).collect();
        assert_eq!(names, vec!["new.jpg", "mid.jpg", "old.jpg"]);
    }

    #[tokio::test]
    async fn test_verify_files_drops_missing_assets_from_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let library = temp_library(&dir);

        let media = tempfile::tempdir().unwrap();
        let keep = touch(&media, "keep.png");
        let lose = touch(&media, "lose.png");
        import_folder(media.path().to_path_buf(), library.path().clone()).await;

        std::fs::remove_file(&lose).unwrap();
        let marked = library.verify_files().unwrap();
        assert_eq!(marked, 1);

        let assets = library.fetch_assets().unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].local_id, keep.to_string_lossy());
    }
}
