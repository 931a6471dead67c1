/// Grid coordinator
///
/// Binds an ordered list of sections to the hosted grid view. The
/// coordinator owns the cell pool and the selection state; sections own
/// content and layout policy. As the grid scrolls, slots entering the
/// visible window are bound (issuing thumbnail fetches) and slots leaving
/// it are recycled (cancelling theirs).

use std::collections::BTreeSet;
use std::ops::Range;

use iced::widget::image::Handle;

use super::cell::ThumbnailCell;
use super::section::{GridSection, PendingThumbnail};
use crate::state::data::Asset;

/// Ordered list of sections composing the grid
#[derive(Default)]
pub struct SectionProvider {
    sections: Vec<Box<dyn GridSection>>,
}

impl SectionProvider {
    pub fn new() -> Self {
        SectionProvider::default()
    }

    pub fn push(&mut self, section: Box<dyn GridSection>) {
        self.sections.push(section);
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&dyn GridSection> {
        self.sections.get(index).map(|s| s.as_ref())
    }
}

/// A fetch issued during window binding, tagged with its destination slot
pub struct IssuedFetch {
    pub section: usize,
    pub index: usize,
    pub pending: PendingThumbnail,
}

pub struct GridCoordinator {
    provider: SectionProvider,
    /// One slot per content index; None until first bound
    slots: Vec<Vec<Option<ThumbnailCell>>>,
    /// Recycled cells awaiting rebinding
    pool: Vec<ThumbnailCell>,
    /// Selected indices per section; only sections with the selection
    /// capability ever get entries
    selected: Vec<BTreeSet<usize>>,
    /// Capability probe results, fixed at construction
    selectable: Vec<bool>,
    editing: bool,
}

impl GridCoordinator {
    pub fn new(mut provider: SectionProvider) -> Self {
        let slots = provider
            .sections
            .iter()
            .map(|s| {
                let mut column = Vec::new();
                column.resize_with(s.len(), || None);
                column
            })
            .collect();
        let selected = provider.sections.iter().map(|_| BTreeSet::new()).collect();
        let selectable = provider
            .sections
            .iter_mut()
            .map(|s| s.selection_handler().is_some())
            .collect();

        GridCoordinator {
            provider,
            slots,
            pool: Vec::new(),
            selected,
            selectable,
            editing: false,
        }
    }

    pub fn provider(&self) -> &SectionProvider {
        &self.provider
    }

    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Flip editing mode. Selection is cleared on both transitions: it is
    /// emptied on exit, and starts empty on entry. Sections hear about the
    /// flag first, then every bound cell's visuals follow.
    pub fn set_editing(&mut self, editing: bool) {
        self.editing = editing;

        for set in &mut self.selected {
            set.clear();
        }

        let Self {
            provider, slots, ..
        } = self;
        for (s, section) in provider.sections.iter_mut().enumerate() {
            if let Some(handler) = section.editing_handler() {
                handler.did_set_editing(editing);
                for (i, slot) in slots[s].iter_mut().enumerate() {
                    if let Some(cell) = slot {
                        cell.set_selected(false);
                        handler.set_editing(editing, i, cell);
                    }
                }
            }
        }
    }

    /// Bind the slots of `section` inside `range`, recycling slots outside
    /// it. Returns the fetches issued for newly bound slots; the host
    /// drives their futures and routes results back via `apply_thumbnail`.
    pub fn bind_window(&mut self, section: usize, range: Range<usize>) -> Vec<IssuedFetch> {
        let mut issued = Vec::new();

        let Self {
            provider,
            slots,
            pool,
            selected,
            editing,
            ..
        } = self;
        let Some(boxed) = provider.sections.get_mut(section) else {
            return issued;
        };

        for (index, slot) in slots[section].iter_mut().enumerate() {
            let in_window = range.contains(&index);

            if !in_window {
                // Recycle cells that scrolled out; this cancels their fetch
                if let Some(mut cell) = slot.take() {
                    cell.notify_reuse();
                    pool.push(cell);
                }
                continue;
            }

            if slot.as_ref().is_some_and(|cell| cell.is_bound()) {
                continue;
            }

            let mut cell = slot
                .take()
                .or_else(|| pool.pop())
                .unwrap_or_default();

            let pending = boxed.cell_content(index, &mut cell);
            cell.set_selected(selected[section].contains(&index));
            if let Some(handler) = boxed.editing_handler() {
                handler.set_editing(*editing, index, &mut cell);
            }

            *slot = Some(cell);
            issued.push(IssuedFetch {
                section,
                index,
                pending,
            });
        }

        issued
    }

    /// Route an async thumbnail result to its slot. Results for recycled
    /// slots, or for a slot rebound to a different asset, are dropped.
    pub fn apply_thumbnail(
        &mut self,
        section: usize,
        index: usize,
        asset_id: &str,
        image: Option<Handle>,
    ) -> bool {
        match self
            .slots
            .get_mut(section)
            .and_then(|column| column.get_mut(index))
        {
            Some(Some(cell)) => cell.apply_thumbnail(asset_id, image),
            _ => false,
        }
    }

    /// Toggle one index while editing. Returns the new selection state,
    /// or None when the tap cannot select (not editing, or the section
    /// has no selection capability).
    pub fn toggle_select(&mut self, section: usize, index: usize) -> Option<bool> {
        if !self.editing || !self.selectable.get(section).copied().unwrap_or(false) {
            return None;
        }

        let allows_multiple = self.provider.sections[section]
            .selection_handler()
            .map_or(false, |handler| handler.allows_multiple_selection());

        let was_selected = self.selected[section].remove(&index);
        let now_selected = if was_selected {
            false
        } else {
            if !allows_multiple && !self.selected[section].is_empty() {
                // Single-select mode replaces the previous pick
                self.selected[section].clear();
                for cell in self.slots[section].iter_mut().flatten() {
                    cell.set_selected(false);
                }
            }
            self.selected[section].insert(index);
            true
        };

        if let Some(Some(cell)) = self
            .slots
            .get_mut(section)
            .and_then(|column| column.get_mut(index))
        {
            cell.set_selected(now_selected);
        }

        if let Some(handler) = self.provider.sections[section].selection_handler() {
            if now_selected {
                handler.did_select(index);
            } else {
                handler.did_deselect(index);
            }
        }

        Some(now_selected)
    }

    /// Select every index of every selection-capable section
    pub fn select_all(&mut self) {
        for s in 0..self.provider.sections.len() {
            if !self.selectable[s] {
                continue;
            }
            self.selected[s] = (0..self.provider.sections[s].len()).collect();
            for cell in self.slots[s].iter_mut().flatten() {
                cell.set_selected(true);
            }
        }
    }

    /// Clear the selection of every selection-capable section
    pub fn deselect_all(&mut self) {
        for s in 0..self.provider.sections.len() {
            if !self.selectable[s] {
                continue;
            }
            self.selected[s].clear();
            for cell in self.slots[s].iter_mut().flatten() {
                cell.set_selected(false);
            }
        }
    }

    pub fn selection_count(&self) -> usize {
        self.selected.iter().map(|set| set.len()).sum()
    }

    /// Total indices that could be selected, across all selection-capable
    /// sections
    pub fn total_selectable(&self) -> usize {
        self.provider
            .sections
            .iter()
            .zip(&self.selectable)
            .filter(|(_, selectable)| **selectable)
            .map(|(section, _)| section.len())
            .sum()
    }

    pub fn is_selected(&self, section: usize, index: usize) -> bool {
        self.selected
            .get(section)
            .is_some_and(|set| set.contains(&index))
    }

    /// Resolve the selected indices to their assets, in section and index
    /// order
    pub fn selected_assets(&self) -> Vec<Asset> {
        let mut assets = Vec::with_capacity(self.selection_count());
        for (s, set) in self.selected.iter().enumerate() {
            if let Some(section) = self.provider.get(s) {
                for &i in set {
                    assets.push(section.asset(i).clone());
                }
            }
        }
        assets
    }

    pub fn cell_at(&self, section: usize, index: usize) -> Option<&ThumbnailCell> {
        self.slots
            .get(section)
            .and_then(|column| column.get(index))
            .and_then(|slot| slot.as_ref())
    }

    /// Recycle every bound slot. A geometry change rebinds the grid from
    /// scratch; cached thumbnails re-deliver from disk on the next bind.
    pub fn recycle_all(&mut self) {
        let Self { slots, pool, .. } = self;
        for column in slots.iter_mut() {
            for slot in column.iter_mut() {
                if let Some(mut cell) = slot.take() {
                    cell.notify_reuse();
                    pool.push(cell);
                }
            }
        }
    }

    /// Clear memoized flow metrics in every flow-capable section. The
    /// declarative backend recomputes from the environment on its own.
    pub fn invalidate_layout(&self) {
        for section in &self.provider.sections {
            if let Some(flow) = section.flow_layout() {
                flow.invalidate_layout();
            }
        }
    }

    /// Advance every mid-fade cell. Returns true while any is animating.
    pub fn step_fades(&mut self, dt_ms: f32) -> bool {
        let mut fading = false;
        for column in &mut self.slots {
            for cell in column.iter_mut().flatten() {
                fading |= cell.step_fade(dt_ms);
            }
        }
        fading
    }

    pub fn any_fading(&self) -> bool {
        self.slots
            .iter()
            .flatten()
            .flatten()
            .any(|cell| cell.is_fading())
    }
}
