#![warn(missing_docs)]
//! Linkbench Core - Sweep Enumeration
//!
//! This crate holds the algorithmic heart of the harness:
//! - `Range` parsing and per-axis cursors
//! - lockstep enumeration of a `ParameterSet` into a `TestMatrix`
//! - the progress-unit estimator that sizes the progress bar up front
//! - the `ProgressSink` contract consumed by the sweep driver
//!
//! Nothing in this crate spawns processes or touches the filesystem.

mod estimate;
mod matrix;
mod progress;
mod stepper;

pub use estimate::{SweepShape, estimate_units};
pub use matrix::build_matrix;
pub use progress::{CountingSink, NullSink, ProgressSink};
pub use stepper::{Cursor, ParameterSet, Range, SweepCursor, Test};

use thiserror::Error;

/// Name of the axis whose realized value is the per-test module count.
///
/// Reset, Generate, Convert, and the step estimator all key off this axis.
pub const MODULES_AXIS: &str = "modules";

/// The per-test module count, or zero if the axis is absent.
pub fn module_count(test: &Test) -> u64 {
    test.get(MODULES_AXIS).copied().unwrap_or(0).max(0) as u64
}

/// Errors raised while validating a sweep, before anything runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweepError {
    /// The range specification could not be parsed.
    #[error("invalid range '{spec}': {reason}")]
    InvalidRange {
        /// The specification string as given.
        spec: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Every axis is a constant; a sweep must vary at least one parameter.
    #[error("degenerate sweep: at least one axis must take more than one value")]
    DegenerateSweep,
}
