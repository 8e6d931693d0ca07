//! Terminal Progress Rendering
//!
//! An indicatif bar behind the `ProgressSink` contract. The message slot
//! carries the current stage label so the user can see which phase or
//! target is running. Under `--verbose` the bar is replaced by `NullSink`
//! and log lines take over.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use linkbench_core::ProgressSink;

/// Progress bar for the controlling terminal.
pub struct TermProgress {
    bar: ProgressBar,
}

impl TermProgress {
    /// A bar that stays hidden until `start` announces the total.
    pub fn new() -> Self {
        let bar = ProgressBar::hidden();
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }
}

impl Default for TermProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressSink for TermProgress {
    fn start(&self, total_units: u64) {
        self.bar.set_length(total_units);
        self.bar.set_position(0);
        self.bar.set_draw_target(ProgressDrawTarget::stderr());
    }

    fn increment(&self, delta: u64, stage: &str) {
        self.bar.set_message(stage.to_string());
        self.bar.inc(delta);
    }

    fn update(&self, position: u64, stage: &str) {
        self.bar.set_message(stage.to_string());
        self.bar.set_position(position);
    }

    fn stop(&self) {
        self.bar.finish_with_message("complete");
    }
}
