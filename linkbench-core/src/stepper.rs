//! Sweep Ranges and Cursors
//!
//! A `Range` describes the values one axis may take: either a single fixed
//! value or an inclusive arithmetic progression. A `Cursor` walks those
//! values one call at a time; the `SweepCursor` derived from a
//! `ParameterSet` co-steps every axis in lockstep and terminates as soon as
//! any single axis runs out. Axes given as fixed values never exhaust, so
//! they never drive termination.

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::SweepError;

/// One concrete point in the sweep: axis name to realized value.
pub type Test = BTreeMap<String, i64>;

/// The set of values a single axis may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Range {
    /// A constant axis. Its cursor yields this value forever.
    Fixed(i64),
    /// Values from `start` to `stop` inclusive, advancing by `step`.
    Span {
        /// First value yielded.
        start: i64,
        /// Inclusive upper bound.
        stop: i64,
        /// Increment between values; always at least 1.
        step: i64,
    },
}

impl Range {
    /// Build a span, coercing a step of 0 to 1.
    pub fn span(start: i64, stop: i64, step: i64) -> Self {
        Range::Span {
            start,
            stop,
            step: if step == 0 { 1 } else { step },
        }
    }

    /// Parse a comma-separated specification of 1, 2, or 3 integers.
    ///
    /// A single value is a constant axis. Two values gain an implicit step
    /// of 1. Anything else is rejected with [`SweepError::InvalidRange`]
    /// before any cursor exists.
    pub fn parse(spec: &str) -> Result<Self, SweepError> {
        let invalid = |reason: String| SweepError::InvalidRange {
            spec: spec.to_string(),
            reason,
        };

        let mut values = Vec::new();
        for token in spec.split(',') {
            let token = token.trim();
            let value: i64 = token
                .parse()
                .map_err(|_| invalid(format!("'{token}' is not an integer")))?;
            values.push(value);
        }

        match values[..] {
            [value] => Ok(Range::Fixed(value)),
            [start, stop] => Ok(Range::span(start, stop, 1)),
            [start, stop, step] => Ok(Range::span(start, stop, step)),
            _ => Err(invalid(format!(
                "expected 1, 2, or 3 comma-separated values, got {}",
                values.len()
            ))),
        }
    }

    /// How many distinct values this axis can realize.
    pub fn value_count(&self) -> u64 {
        match *self {
            Range::Fixed(_) => 1,
            Range::Span { start, stop, step } => {
                if stop < start {
                    0
                } else {
                    ((stop - start) / step) as u64 + 1
                }
            }
        }
    }

    /// True if the axis takes more than one value.
    pub fn is_varying(&self) -> bool {
        self.value_count() > 1
    }

    /// A fresh cursor over this range. Cursors are independent: each one
    /// owns its own position.
    pub fn cursor(&self) -> Cursor {
        match *self {
            Range::Fixed(value) => Cursor {
                kind: CursorKind::Fixed(value),
            },
            Range::Span { start, stop, step } => Cursor {
                kind: CursorKind::Span {
                    next: start,
                    stop,
                    step,
                },
            },
        }
    }
}

impl FromStr for Range {
    type Err = SweepError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Range::parse(s)
    }
}

/// A mutable position within one axis's value sequence.
#[derive(Debug, Clone)]
pub struct Cursor {
    kind: CursorKind,
}

#[derive(Debug, Clone)]
enum CursorKind {
    Fixed(i64),
    Span { next: i64, stop: i64, step: i64 },
}

impl Cursor {
    /// Yield the next value, or `None` forever once the progression passes
    /// its stop. Fixed cursors never return `None`.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<i64> {
        match &mut self.kind {
            CursorKind::Fixed(value) => Some(*value),
            CursorKind::Span { next, stop, step } => {
                if *next > *stop {
                    return None;
                }
                let value = *next;
                *next = next.saturating_add(*step);
                Some(value)
            }
        }
    }
}

/// A named, ordered collection of axes. Immutable once the sweep starts.
#[derive(Debug, Clone, Default)]
pub struct ParameterSet {
    axes: BTreeMap<String, Range>,
}

impl ParameterSet {
    /// An empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an axis.
    pub fn insert(&mut self, name: impl Into<String>, range: Range) {
        self.axes.insert(name.into(), range);
    }

    /// Iterate the axes in name order.
    pub fn axes(&self) -> impl Iterator<Item = (&str, &Range)> {
        self.axes.iter().map(|(name, range)| (name.as_str(), range))
    }

    /// Axis names in iteration order.
    pub fn axis_names(&self) -> Vec<&str> {
        self.axes.keys().map(String::as_str).collect()
    }

    /// True if at least one axis takes more than one value.
    pub fn has_varying_axis(&self) -> bool {
        self.axes.values().any(Range::is_varying)
    }

    /// A combined cursor that advances every axis in lockstep. Returns the
    /// sentinel as soon as any single axis is exhausted.
    pub fn cursor(&self) -> SweepCursor<'_> {
        SweepCursor {
            axes: self
                .axes
                .iter()
                .map(|(name, range)| (name.as_str(), range.cursor()))
                .collect(),
            exhausted: false,
        }
    }
}

impl FromIterator<(String, Range)> for ParameterSet {
    fn from_iter<I: IntoIterator<Item = (String, Range)>>(iter: I) -> Self {
        Self {
            axes: iter.into_iter().collect(),
        }
    }
}

/// Lockstep cursor over every axis of a [`ParameterSet`].
#[derive(Debug)]
pub struct SweepCursor<'a> {
    axes: Vec<(&'a str, Cursor)>,
    exhausted: bool,
}

impl SweepCursor<'_> {
    /// The next test point, or `None` forever once any axis has exhausted.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<Test> {
        if self.exhausted {
            return None;
        }
        let mut test = Test::new();
        for (name, cursor) in &mut self.axes {
            match cursor.next() {
                Some(value) => {
                    test.insert((*name).to_string(), value);
                }
                None => {
                    self.exhausted = true;
                    return None;
                }
            }
        }
        Some(test)
    }
}
