/// Caching image manager
///
/// Owns the async thumbnail request lifecycle: issue, cancel, stop-all.
/// Each request gets an opaque handle and a shared cancellation flag; the
/// flag is checked before the blocking stage, and again at delivery, so a
/// cancelled request resolves to no image even when cancellation races the
/// work. CPU-bound decode/resize runs on a blocking worker; the delivered
/// value re-enters the UI loop as a message, never on the worker thread.

use iced::widget::image::Handle;
use std::collections::HashMap;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use super::cache;
use crate::grid::config::{DeliveryMode, GridConfig};
use crate::state::data::{Asset, AssetKind};

/// Opaque token identifying one in-flight thumbnail request
pub type RequestHandle = u64;

/// The async side of a request; resolves to the image, or None on
/// failure or cancellation
pub type ThumbnailFuture = Pin<Box<dyn Future<Output = Option<Handle>> + Send>>;

/// Boundary contract with the image-caching collaborator. The grid only
/// ever talks to this trait, so tests can substitute a scripted double.
pub trait ImageCaching {
    /// Issue an async thumbnail fetch. Never fails synchronously; a fetch
    /// that cannot produce an image resolves to None.
    fn request_thumbnail(&self, asset: &Asset, config: &GridConfig)
        -> (RequestHandle, ThumbnailFuture);

    /// Best-effort cancellation of one request
    fn cancel(&self, handle: RequestHandle);

    /// Cancel every in-flight request (size transitions, memory pressure)
    fn stop_all_caching(&self);
}

type Registry = Arc<Mutex<HashMap<RequestHandle, Arc<AtomicBool>>>>;

pub struct CachingImageManager {
    cache_dir: PathBuf,
    next_handle: AtomicU64,
    live: Registry,
}

impl CachingImageManager {
    pub fn new(cache_dir: PathBuf) -> Self {
        CachingImageManager {
            cache_dir,
            next_handle: AtomicU64::new(0),
            live: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of requests currently in flight
    pub fn live_request_count(&self) -> usize {
        self.live.lock().expect("request registry poisoned").len()
    }
}

impl ImageCaching for CachingImageManager {
    fn request_thumbnail(
        &self,
        asset: &Asset,
        config: &GridConfig,
    ) -> (RequestHandle, ThumbnailFuture) {
        let handle = self.next_handle.fetch_add(1, Ordering::Relaxed) + 1;

        // Videos have no decode path in the cache; the cell keeps its
        // placeholder. Nothing to cancel, so the request isn't registered.
        if asset.kind == AssetKind::Video {
            return (handle, Box::pin(async { None }));
        }

        let cancelled = Arc::new(AtomicBool::new(false));
        self.live
            .lock()
            .expect("request registry poisoned")
            .insert(handle, Arc::clone(&cancelled));

        let live = Arc::clone(&self.live);
        let cache_dir = self.cache_dir.clone();
        let asset = asset.clone();
        let config = *config;

        let future = async move {
            let finish = |produced: Option<PathBuf>| {
                live.lock().expect("request registry poisoned").remove(&handle);
                // Cancellation may have raced the work; a cancelled
                // request never delivers
                if cancelled.load(Ordering::Acquire) {
                    return None;
                }
                produced.map(Handle::from_path)
            };

            if cancelled.load(Ordering::Acquire) {
                return finish(None);
            }

            let path = cache::thumbnail_path(&cache_dir, asset.id);
            let cached = tokio::fs::metadata(&path).await.is_ok();

            let needs_generation = if !cached {
                true
            } else {
                match config.delivery {
                    DeliveryMode::Opportunistic => false,
                    DeliveryMode::HighQuality => {
                        // A cache entry smaller than the target on both
                        // axes is an upscale; regenerate it
                        let probe = path.clone();
                        let (tw, th) = config.preferred_thumbnail_size;
                        tokio::task::spawn_blocking(move || {
                            match image::image_dimensions(&probe) {
                                Ok((w, h)) => w < tw && h < th,
                                Err(_) => true,
                            }
                        })
                        .await
                        .unwrap_or(true)
                    }
                }
            };

            let produced = if !needs_generation {
                Some(path)
            } else {
                let source = PathBuf::from(&asset.local_id);
                let dir = cache_dir.clone();
                let generated = tokio::task::spawn_blocking(move || {
                    cache::generate_thumbnail(&source, &dir, asset.id, &config)
                })
                .await;

                match generated {
                    Ok(Ok(path)) => Some(path),
                    Ok(Err(err)) => {
                        eprintln!(
                            "⚠️  Thumbnail generation failed for {}: {}",
                            asset.filename, err
                        );
                        None
                    }
                    Err(err) => {
                        eprintln!("⚠️  Thumbnail task failed: {}", err);
                        None
                    }
                }
            };

            finish(produced)
        };

        (handle, Box::pin(future))
    }

    fn cancel(&self, handle: RequestHandle) {
        if let Some(flag) = self
            .live
            .lock()
            .expect("request registry poisoned")
            .remove(&handle)
        {
            flag.store(true, Ordering::Release);
        }
    }

    fn stop_all_caching(&self) {
        let mut live = self.live.lock().expect("request registry poisoned");
        let stopped = live.len();
        for flag in live.values() {
            flag.store(true, Ordering::Release);
        }
        live.clear();

        if stopped > 0 {
            println!("🧹 Cancelled {} in-flight thumbnail requests", stopped);
        }
    }
}

impl std::fmt::Debug for CachingImageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachingImageManager")
            .field("cache_dir", &self.cache_dir)
            .field("live_requests", &self.live_request_count())
            .finish()
    }
}
