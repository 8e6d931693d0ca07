#![warn(missing_docs)]
//! Linkbench Statistical Aggregation
//!
//! Reduces raw timing samples to the pair every downstream consumer wants:
//! the sample mean and a 95% confidence interval. Also provides the
//! least-squares line fit used by the plot writer.

mod fit;
mod summary;

pub use fit::{LineFit, least_squares};
pub use summary::{RunStats, confidence_interval, mean, population_std_dev, summarize};

/// z value for a two-sided 95% confidence interval under the normal
/// approximation.
pub const Z_95: f64 = 1.96;
