//! # Dayview Core Library
//!
//! This library lays out calendar occurrences (events and tasks) inside a
//! single day column of a day or week view. It turns a flat set of
//! occurrence intervals into a toolkit-agnostic tree of layers, columns and
//! chunks; drawing that tree is left to the caller.
//!
//! ## Architecture
//!
//! - **Layout**: clipping, blob partitioning, three-step column allocation
//!   (reuse, shrink, create), layer stacking and chunk sequencing
//! - **Scheduler**: a tick-driven state machine that debounces additions,
//!   lays out removals immediately and honours nested batches
//! - **Column**: owner of the occurrence set and the published layout
//! - **Config**: TOML-based view and scheduling settings
//!
//! ## Key Components
//!
//! - [`EventColumn`]: Occurrence set plus scheduled, atomically published layout
//! - [`compute_layout`]: Pure layout of a set of occurrences
//! - [`UpdateScheduler`]: Debounce and batch state machine
//! - [`Config`]: Layout configuration

pub mod column;
pub mod config;
pub mod error;
pub mod layout;
pub mod occurrence;
pub mod scheduler;

pub use column::EventColumn;
pub use config::{Config, SchedulerConfig, ViewConfig};
pub use error::{ConfigError, CoreError, LayoutError, ValidationError};
pub use layout::{
    compute_blobs, compute_layout, occurrence_minutes, Blob, Chunk, Column, ColumnAssignment,
    ColumnContext, GripBars, Layer, LayoutTree, OccurrenceChunk, OccurrenceInterval,
    OccurrenceMinutes,
};
pub use occurrence::{read_occurrences, Occurrence, OccurrenceId, OccurrenceKind};
pub use scheduler::{RecomputeReason, SchedulerPhase, UpdateScheduler};
