//! Progress-Unit Estimation
//!
//! Computes, without running anything, the total number of progress units a
//! full sweep will consume. The estimate must exactly equal the number of
//! units the sweep driver emits for the same configuration; the driver's
//! final stage counter is checked against it in the integration tests.

use crate::stepper::ParameterSet;
use crate::module_count;

/// The static per-test workload, independent of axis values.
#[derive(Debug, Clone, Copy)]
pub struct SweepShape {
    /// Number of targets measured per test.
    pub targets: u64,
    /// Timed invocations per target per test.
    pub repeats: u64,
    /// Whether at least one target requires the conversion phase.
    pub needs_conversion: bool,
}

/// Total progress units for a full sweep over `params`.
///
/// Each test contributes one unit per generated module, one more per module
/// when any target needs conversion (the converted objects are shared, so
/// that cost is paid once per test), and one unit per timed run for every
/// target. Uses an independent cursor traversal; the matrix is never
/// materialized here and the enumeration order is irrelevant to the sum.
pub fn estimate_units(params: &ParameterSet, shape: &SweepShape) -> u64 {
    // A set with no varying axis never exhausts its cursor; the matrix
    // builder rejects it before estimation is reachable.
    if !params.has_varying_axis() {
        return 0;
    }

    let mut total = 0u64;
    let mut cursor = params.cursor();
    while let Some(test) = cursor.next() {
        let modules = module_count(&test);
        total += modules;
        if shape.needs_conversion {
            total += modules;
        }
        total += shape.targets * shape.repeats;
    }
    total
}
