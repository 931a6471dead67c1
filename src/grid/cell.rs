/// Thumbnail cell
///
/// View model for one grid slot. The cell never owns the asset or the
/// fetch it displays: it keeps the asset's identity for staleness checks,
/// the delivered image handle, and a cleanup callback that cancels the
/// outstanding thumbnail request when the slot is recycled.

use iced::widget::image::Handle;

/// Alpha applied to the thumbnail while it is selected in editing mode
pub const DIMMED_ALPHA: f32 = 0.5;
/// Duration of the dim/undim fade, in milliseconds
pub const FADE_DURATION_MS: f32 = 100.0;

pub type ReuseCallback = Box<dyn FnOnce() + Send>;

pub struct ThumbnailCell {
    /// Identity of the bound asset; compared, never dereferenced
    asset_id: Option<String>,
    image: Option<Handle>,
    on_reuse: Option<ReuseCallback>,
    selected: bool,
    editing: bool,
    alpha: f32,
    target_alpha: f32,
}

impl Default for ThumbnailCell {
    fn default() -> Self {
        Self::new()
    }
}

impl ThumbnailCell {
    pub fn new() -> Self {
        ThumbnailCell {
            asset_id: None,
            image: None,
            on_reuse: None,
            selected: false,
            editing: false,
            alpha: 1.0,
            target_alpha: 1.0,
        }
    }

    /// Associate the cell with an asset identity and a cleanup callback.
    /// Replaces any prior association without invoking the previous
    /// cleanup; recycling a bound cell goes through `notify_reuse` first.
    pub fn bind(&mut self, asset_id: String, on_reuse: ReuseCallback) {
        self.asset_id = Some(asset_id);
        self.on_reuse = Some(on_reuse);
    }

    /// Recycle the cell. Invokes the stored cleanup exactly once (a second
    /// consecutive call finds nothing to invoke), then clears the image,
    /// the asset association, and the selection visuals.
    pub fn notify_reuse(&mut self) {
        if let Some(cleanup) = self.on_reuse.take() {
            cleanup();
        }

        self.image = None;
        self.asset_id = None;
        self.selected = false;
        self.alpha = 1.0;
        self.target_alpha = 1.0;
    }

    /// Apply an async thumbnail result. Applied only when the currently
    /// bound identity still matches the identity the request was issued
    /// for; a result for a superseded bind is dropped silently. Returns
    /// whether the image was applied.
    pub fn apply_thumbnail(&mut self, asset_id: &str, image: Option<Handle>) -> bool {
        if self.asset_id.as_deref() != Some(asset_id) {
            return false;
        }
        match image {
            Some(handle) => {
                self.image = Some(handle);
                true
            }
            // A failed or cancelled fetch leaves the placeholder in place
            None => false,
        }
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
        self.retarget_alpha();
    }

    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;
        self.retarget_alpha();
    }

    fn retarget_alpha(&mut self) {
        self.target_alpha = if self.editing && self.selected {
            DIMMED_ALPHA
        } else {
            1.0
        };
    }

    /// Advance the dim fade by `dt_ms`. Returns true while still animating.
    pub fn step_fade(&mut self, dt_ms: f32) -> bool {
        if self.alpha == self.target_alpha {
            return false;
        }
        let step = (1.0 - DIMMED_ALPHA) / FADE_DURATION_MS * dt_ms;
        if (self.target_alpha - self.alpha).abs() <= step {
            self.alpha = self.target_alpha;
        } else if self.target_alpha > self.alpha {
            self.alpha += step;
        } else {
            self.alpha -= step;
        }
        self.alpha != self.target_alpha
    }

    pub fn is_fading(&self) -> bool {
        self.alpha != self.target_alpha
    }

    pub fn asset_id(&self) -> Option<&str> {
        self.asset_id.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.asset_id.is_some()
    }

    pub fn image(&self) -> Option<&Handle> {
        self.image.as_ref()
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// The selection overlay is visible only in editing mode
    pub fn shows_selection_badge(&self) -> bool {
        self.editing
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl Drop for ThumbnailCell {
    /// Dropping a cell with an unresolved cleanup is an implicit reuse;
    /// the outstanding request must not leak.
    fn drop(&mut self) {
        if let Some(cleanup) = self.on_reuse.take() {
            cleanup();
        }
    }
}

impl std::fmt::Debug for ThumbnailCell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailCell")
            .field("asset_id", &self.asset_id)
            .field("has_image", &self.image.is_some())
            .field("selected", &self.selected)
            .field("editing", &self.editing)
            .finish()
    }
}
