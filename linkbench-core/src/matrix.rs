//! Test Matrix Construction
//!
//! Materializes the full set of test points from a `ParameterSet` and
//! randomizes their execution order. Randomization avoids systematic bias
//! from thermal and cache effects that correlate with sweep order; it
//! changes only the order, never the membership.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::stepper::{ParameterSet, Test};
use crate::SweepError;

/// Enumerate every test point and shuffle them into execution order.
///
/// Fails with [`SweepError::DegenerateSweep`] when no axis takes more than
/// one value: such a set would either describe a single measurement or, if
/// every axis is a constant, never terminate.
pub fn build_matrix<R: Rng + ?Sized>(
    params: &ParameterSet,
    rng: &mut R,
) -> Result<Vec<Test>, SweepError> {
    if !params.has_varying_axis() {
        return Err(SweepError::DegenerateSweep);
    }

    let mut tests = Vec::new();
    let mut cursor = params.cursor();
    while let Some(test) = cursor.next() {
        tests.push(test);
    }

    // Fisher-Yates, uniform over all n! orderings given a fair RNG.
    tests.shuffle(rng);
    Ok(tests)
}
