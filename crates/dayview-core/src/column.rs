//! A day column: the occurrence set, its scheduler and the published layout.
//!
//! The column is the only owner of its occurrences. Collaborators mutate
//! them through [`EventColumn::add_occurrence`] and
//! [`EventColumn::remove_occurrence`]; renderers read the current
//! [`LayoutTree`] through [`EventColumn::layout`]. A new tree is built in full
//! and swapped in as a fresh `Arc`, so a reader holding the previous tree
//! never sees a half-built one.
//!
//! ## Usage
//!
//! ```ignore
//! let mut column = EventColumn::new(context, &SchedulerConfig::default());
//! column.add_occurrence(occurrence);
//! // In the UI loop:
//! column.tick(); // lays out once the debounce settles
//! let tree = column.layout();
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::{Config, SchedulerConfig};
use crate::error::{LayoutError, ValidationError};
use crate::layout::{compute_layout, ColumnContext, LayoutTree};
use crate::occurrence::{Occurrence, OccurrenceId};
use crate::scheduler::{now_ms, RecomputeReason, UpdateScheduler};

#[derive(Debug)]
pub struct EventColumn {
    context: ColumnContext,
    occurrences: BTreeMap<OccurrenceId, Arc<Occurrence>>,
    scheduler: UpdateScheduler,
    layout: Arc<LayoutTree>,
    /// Number of layouts published so far.
    generation: u64,
    /// Error the next recompute reports instead of laying out.
    #[cfg(test)]
    fail_next: Option<LayoutError>,
}

impl EventColumn {
    pub fn new(context: ColumnContext, scheduler: &SchedulerConfig) -> Self {
        Self {
            context,
            occurrences: BTreeMap::new(),
            scheduler: UpdateScheduler::from_config(scheduler),
            layout: Arc::new(LayoutTree::default()),
            generation: 0,
            #[cfg(test)]
            fail_next: None,
        }
    }

    /// Build a column for `date` from the layout configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured timezone is unknown.
    pub fn from_config(date: NaiveDate, config: &Config) -> Result<Self, ValidationError> {
        Ok(Self::new(
            ColumnContext::from_config(date, config)?,
            &config.scheduler,
        ))
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// The most recently published layout.
    pub fn layout(&self) -> Arc<LayoutTree> {
        Arc::clone(&self.layout)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn context(&self) -> &ColumnContext {
        &self.context
    }

    pub fn scheduler(&self) -> &UpdateScheduler {
        &self.scheduler
    }

    pub fn occurrence(&self, id: &OccurrenceId) -> Option<&Arc<Occurrence>> {
        self.occurrences.get(id)
    }

    /// All held occurrences, ordered by id.
    pub fn occurrences(&self) -> impl Iterator<Item = &Arc<Occurrence>> {
        self.occurrences.values()
    }

    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }

    pub fn is_selected(&self, id: &OccurrenceId) -> bool {
        self.occurrences.get(id).is_some_and(|o| o.selected)
    }

    // ── Mutations ────────────────────────────────────────────────────

    /// Add or replace an occurrence. Layout follows after the debounce.
    ///
    /// A replaced occurrence keeps its selection flag.
    pub fn add_occurrence(&mut self, occurrence: Occurrence) {
        self.add_occurrence_at(occurrence, now_ms());
    }

    pub fn add_occurrence_at(&mut self, mut occurrence: Occurrence, now_ms: u64) {
        if let Some(previous) = self.occurrences.get(&occurrence.id) {
            occurrence.selected = previous.selected;
        }
        tracing::trace!(id = %occurrence.id, "add occurrence");
        self.occurrences
            .insert(occurrence.id.clone(), Arc::new(occurrence));
        self.scheduler.on_add(now_ms);
    }

    /// Remove an occurrence and lay out immediately.
    ///
    /// Returns `false` if the occurrence was not held.
    pub fn remove_occurrence(&mut self, id: &OccurrenceId) -> bool {
        if self.occurrences.remove(id).is_none() {
            return false;
        }
        tracing::trace!(%id, "remove occurrence");
        if let Some(reason) = self.scheduler.on_remove() {
            self.run(reason);
        }
        true
    }

    /// Drop every occurrence. The empty layout is published like a removal.
    pub fn clear(&mut self) {
        if self.occurrences.is_empty() {
            return;
        }
        self.occurrences.clear();
        if let Some(reason) = self.scheduler.on_remove() {
            self.run(reason);
        }
    }

    pub fn select_occurrence(&mut self, id: &OccurrenceId) -> bool {
        self.set_selected(id, true)
    }

    pub fn unselect_occurrence(&mut self, id: &OccurrenceId) -> bool {
        self.set_selected(id, false)
    }

    /// Returns `false` if the occurrence is not held. A changed flag is
    /// republished so the tree carries it.
    fn set_selected(&mut self, id: &OccurrenceId, selected: bool) -> bool {
        let Some(occurrence) = self.occurrences.get_mut(id) else {
            return false;
        };
        if occurrence.selected == selected {
            return true;
        }
        Arc::make_mut(occurrence).selected = selected;
        if let Some(reason) = self.scheduler.request(RecomputeReason::SelectionChanged) {
            self.run(reason);
        }
        true
    }

    /// Switch date, timezone, visible range or minimum duration.
    pub fn set_context(&mut self, context: ColumnContext) {
        if context == self.context {
            return;
        }
        self.context = context;
        if let Some(reason) = self.scheduler.request(RecomputeReason::Requested) {
            self.run(reason);
        }
    }

    // ── Scheduling ───────────────────────────────────────────────────

    pub fn start_batch(&mut self) {
        self.scheduler.start_batch();
    }

    /// # Panics
    ///
    /// Panics if there is no open batch.
    pub fn end_batch(&mut self) {
        if let Some(reason) = self.scheduler.end_batch() {
            self.run(reason);
        }
    }

    /// Call periodically. Returns `true` when a layout was published.
    pub fn tick(&mut self) -> bool {
        self.tick_at(now_ms())
    }

    pub fn tick_at(&mut self, now_ms: u64) -> bool {
        match self.scheduler.tick(now_ms) {
            Some(reason) => self.run(reason),
            None => false,
        }
    }

    /// Lay out now, unless a batch is open (the batch end will).
    ///
    /// # Errors
    ///
    /// Returns the allocator's error if the layout could not be built; the
    /// previous layout stays published.
    pub fn relayout(&mut self) -> Result<(), LayoutError> {
        match self.scheduler.request(RecomputeReason::Requested) {
            Some(reason) => self.recompute(reason),
            None => Ok(()),
        }
    }

    fn run(&mut self, reason: RecomputeReason) -> bool {
        self.recompute(reason).is_ok()
    }

    fn recompute(&mut self, reason: RecomputeReason) -> Result<(), LayoutError> {
        self.scheduler.begin_recompute()?;
        let result = self.build_layout();
        self.scheduler.finish_recompute();

        match result {
            Ok(tree) => {
                self.layout = Arc::new(tree);
                self.generation += 1;
                tracing::debug!(
                    ?reason,
                    occurrences = self.occurrences.len(),
                    generation = self.generation,
                    "published layout"
                );
                Ok(())
            }
            Err(e) => {
                tracing::error!(?reason, error = %e, "layout recompute aborted, keeping previous layout");
                Err(e)
            }
        }
    }

    fn build_layout(&mut self) -> Result<LayoutTree, LayoutError> {
        #[cfg(test)]
        if let Some(e) = self.fail_next.take() {
            return Err(e);
        }
        compute_layout(self.occurrences.values(), &self.context)
    }
}
