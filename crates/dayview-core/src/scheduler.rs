//! Recompute scheduling for a day column.
//!
//! The scheduler is a wall-clock-based state machine. It does not use
//! internal threads or timers - the owning column calls `tick()`
//! periodically and runs a recompute whenever a method returns a
//! [`RecomputeReason`].
//!
//! ## Phases
//!
//! ```text
//! Idle -> DebouncePending -> Recomputing -> Idle
//!   \________________________/^
//!        (removal, batch end)
//! ```
//!
//! Each phase has a batch-suppressed variant: while the batch depth is
//! non-zero no recompute is ever requested, and any mutation or expired
//! debounce is remembered until the outermost batch ends.

use serde::{Deserialize, Serialize};

use crate::config::SchedulerConfig;
use crate::error::LayoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchedulerPhase {
    Idle,
    DebouncePending,
    Recomputing,
}

/// Why a recompute should run now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecomputeReason {
    /// A burst of additions settled.
    DebounceElapsed,
    /// An occurrence was removed.
    Removal,
    /// The outermost batch ended after a mutation.
    BatchEnded,
    /// An occurrence was selected or unselected.
    SelectionChanged,
    /// The caller asked for one (context change, explicit relayout).
    Requested,
}

/// Coalesces add/remove notifications into recompute requests.
#[derive(Debug, Clone)]
pub struct UpdateScheduler {
    debounce_ms: u64,
    /// Deadline (ms since epoch) of the pending debounce, if any.
    deadline_ms: Option<u64>,
    batch_depth: u32,
    /// A mutation or expired debounce happened inside the current batch.
    batch_dirty: bool,
    recomputing: bool,
}

impl UpdateScheduler {
    pub fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            deadline_ms: None,
            batch_depth: 0,
            batch_dirty: false,
            recomputing: false,
        }
    }

    pub fn from_config(config: &SchedulerConfig) -> Self {
        Self::new(config.debounce_ms)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> SchedulerPhase {
        if self.recomputing {
            SchedulerPhase::Recomputing
        } else if self.deadline_ms.is_some() {
            SchedulerPhase::DebouncePending
        } else {
            SchedulerPhase::Idle
        }
    }

    /// Whether recomputes are currently held back by a batch.
    pub fn is_suppressed(&self) -> bool {
        self.batch_depth > 0
    }

    pub fn batch_depth(&self) -> u32 {
        self.batch_depth
    }

    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    // ── Notifications ────────────────────────────────────────────────

    /// An occurrence was added or updated at `now_ms`.
    ///
    /// Restarts the debounce window so a burst of additions is laid out
    /// once.
    pub fn on_add(&mut self, now_ms: u64) {
        if self.is_suppressed() {
            self.batch_dirty = true;
        } else {
            self.deadline_ms = Some(now_ms.saturating_add(self.debounce_ms));
        }
    }

    /// An occurrence was removed. Removal is laid out immediately.
    pub fn on_remove(&mut self) -> Option<RecomputeReason> {
        self.request(RecomputeReason::Removal)
    }

    /// Ask for a recompute outside the add/remove flow.
    pub fn request(&mut self, reason: RecomputeReason) -> Option<RecomputeReason> {
        if self.is_suppressed() {
            self.batch_dirty = true;
            return None;
        }
        self.deadline_ms = None;
        Some(reason)
    }

    pub fn start_batch(&mut self) {
        self.batch_depth += 1;
    }

    /// Close one batch level.
    ///
    /// # Panics
    ///
    /// Panics if there is no open batch; an unmatched `end_batch` is a caller
    /// bug.
    pub fn end_batch(&mut self) -> Option<RecomputeReason> {
        assert!(
            self.batch_depth > 0,
            "end_batch called without a matching start_batch"
        );
        self.batch_depth -= 1;
        if self.batch_depth > 0 || !self.batch_dirty {
            return None;
        }
        self.batch_dirty = false;
        self.deadline_ms = None;
        Some(RecomputeReason::BatchEnded)
    }

    /// Call periodically. Returns a reason once the debounce deadline passes.
    pub fn tick(&mut self, now_ms: u64) -> Option<RecomputeReason> {
        match self.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.deadline_ms = None;
                if self.is_suppressed() {
                    self.batch_dirty = true;
                    None
                } else {
                    Some(RecomputeReason::DebounceElapsed)
                }
            }
            _ => None,
        }
    }

    // ── Recompute bracket ────────────────────────────────────────────

    /// Enter the `Recomputing` phase.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Reentrant`] if a recompute is already running.
    pub fn begin_recompute(&mut self) -> Result<(), LayoutError> {
        if self.recomputing {
            return Err(LayoutError::Reentrant);
        }
        self.recomputing = true;
        Ok(())
    }

    pub fn finish_recompute(&mut self) {
        self.recomputing = false;
    }
}

impl Default for UpdateScheduler {
    fn default() -> Self {
        Self::from_config(&SchedulerConfig::default())
    }
}

pub(crate) fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}
