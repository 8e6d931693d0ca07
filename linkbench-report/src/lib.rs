#![warn(missing_docs)]
//! Linkbench Report - Result Writers
//!
//! Turns per-test, per-target statistics into the two artifacts the
//! harness leaves behind:
//! - one CSV per target (spreadsheet- and gnuplot-readable)
//! - a gnuplot script plotting every target's mean with error bars and a
//!   least-squares trend line

mod csv;
mod plot;

pub use csv::{SweepRow, column_indices, csv_file_name, render_csv, write_csv};
pub use plot::{PlotSeries, gnuplot_script};
