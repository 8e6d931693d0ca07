//! Sweep Driver
//!
//! Runs the shuffled test matrix one test at a time. Each test is a strict
//! four-phase pipeline:
//!
//! 1. **Reset** — delete the previous test's tickets, objects, and
//!    repository; already-missing files are not an error.
//! 2. **Generate** — one generator invocation produces the synthetic
//!    inputs; its per-module progress reports drive the bar.
//! 3. **Convert** — when any target links object files, every ticket is
//!    converted once, fanned out across the logical CPUs. The results are
//!    shared by all converting targets.
//! 4. **Measure** — per target, strictly sequential timed runs. Targets
//!    never run concurrently: they compete for the same CPU and IO, and
//!    wall-clock time is the observable.
//!
//! The stage counter is passed explicitly through the phases; each phase
//! advances it by a fixed amount so that, on success, the final count
//! equals the estimator's total for the same configuration. Only the
//! convert phase reports from multiple threads, and there the sink's
//! increments are atomic. Any phase failure aborts the whole sweep; a
//! harness that silently emits partial sweep data is worse than one that
//! stops.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use rayon::prelude::*;
use regex::Regex;
use thiserror::Error;
use tracing::debug;

use linkbench_core::{ProgressSink, SweepShape, Test, module_count};
use linkbench_exec::{CommandRunner, ExecError, Toolchain, object_file, ticket_file};
use linkbench_stats::{RunStats, summarize};

/// Stage label for the input-generation phase.
pub const GENERATE_STAGE: &str = "generate";
/// Stage label for the ticket-to-object conversion phase.
pub const CONVERT_STAGE: &str = "convert";

/// A linker under timing comparison.
#[derive(Debug, Clone)]
pub struct Target {
    /// Display name; also the stage label and CSV file component.
    pub name: String,
    /// Resolved executable path.
    pub path: PathBuf,
    /// Whether this target links converted object files rather than
    /// tickets straight from the repository. Resolved once when the sweep
    /// is configured, never re-derived per invocation.
    pub needs_conversion: bool,
}

/// Everything the driver needs to run one sweep.
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Directory holding generated inputs and the repository.
    pub work_dir: PathBuf,
    /// Repository file name, relative to `work_dir`.
    pub repo_name: String,
    /// Target triple handed to the generator.
    pub triple: String,
    /// Resolved generator executable.
    pub generator: PathBuf,
    /// Resolved converter executable.
    pub converter: PathBuf,
    /// Timed runs per target per test.
    pub runs: u64,
    /// Targets in measurement order.
    pub targets: Vec<Target>,
}

impl SweepConfig {
    /// Whether any target requires the conversion phase.
    pub fn needs_conversion(&self) -> bool {
        self.targets.iter().any(|t| t.needs_conversion)
    }

    /// The per-test workload shape, for the step estimator.
    pub fn shape(&self) -> SweepShape {
        SweepShape {
            targets: self.targets.len() as u64,
            repeats: self.runs,
            needs_conversion: self.needs_conversion(),
        }
    }
}

/// Aggregated timing for one target at one test point.
#[derive(Debug, Clone)]
pub struct TargetTiming {
    /// Target name.
    pub target: String,
    /// Mean and confidence interval over the timed runs, in milliseconds.
    pub stats: RunStats,
}

/// One completed test with a timing per target, in target order.
#[derive(Debug, Clone)]
pub struct TestResult {
    /// The realized axis values.
    pub test: Test,
    /// Per-target timings.
    pub timings: Vec<TargetTiming>,
}

/// A finished sweep.
#[derive(Debug)]
pub struct SweepOutcome {
    /// Results in completion order.
    pub results: Vec<TestResult>,
    /// Final stage-counter value; equals the estimator's total.
    pub total_units: u64,
}

/// Errors that abort a running sweep.
#[derive(Debug, Error)]
pub enum SweepRunError {
    /// The input generator exited non-zero or could not be spawned.
    #[error("generator failed: {0}")]
    Generator(#[source] ExecError),

    /// A ticket-to-object conversion failed.
    #[error("conversion failed: {0}")]
    Conversion(#[source] ExecError),

    /// A timed target invocation failed; no partial statistics are kept.
    #[error("timed run of '{target}' failed: {source}")]
    Measurement {
        /// The target being measured.
        target: String,
        /// The underlying process failure.
        #[source]
        source: ExecError,
    },

    /// Workspace reset hit an error other than a missing file.
    #[error("workspace reset failed: {0}")]
    Workspace(#[from] io::Error),
}

/// Drives one sweep over a prepared test matrix.
pub struct SweepDriver<'a> {
    config: &'a SweepConfig,
    runner: CommandRunner,
    progress: &'a dyn ProgressSink,
    progress_value: Regex,
}

impl<'a> SweepDriver<'a> {
    /// A driver reporting into `progress`. The caller is expected to have
    /// sized the sink with the estimator's total already.
    pub fn new(config: &'a SweepConfig, progress: &'a dyn ProgressSink) -> Self {
        Self {
            config,
            runner: CommandRunner::new(&config.work_dir),
            progress,
            // Leading integer of a report line, the way parseInt reads it.
            progress_value: Regex::new(r"^[0-9]+").expect("literal pattern"),
        }
    }

    /// Run every test, front to back. Fails fast: the first phase error
    /// aborts the sweep and no result is returned for the failed test or
    /// any test after it.
    pub fn run(&self, tests: &[Test]) -> Result<SweepOutcome, SweepRunError> {
        let mut stage = 0u64;
        let mut results = Vec::with_capacity(tests.len());
        for test in tests {
            let timings = self.run_test(test, &mut stage)?;
            results.push(TestResult {
                test: test.clone(),
                timings,
            });
        }
        Ok(SweepOutcome {
            results,
            total_units: stage,
        })
    }

    fn run_test(&self, test: &Test, stage: &mut u64) -> Result<Vec<TargetTiming>, SweepRunError> {
        let modules = module_count(test);
        debug!(?test, modules, "starting test");

        self.reset_workspace(modules)?;

        let toolchain = Toolchain::new(
            &self.runner,
            &self.config.generator,
            &self.config.converter,
            &self.config.repo_name,
            &self.config.triple,
        );

        self.generate(&toolchain, test, stage)?;

        let tickets: Vec<String> = (0..modules).map(ticket_file).collect();
        let objects = if self.config.needs_conversion() {
            Some(self.convert(&toolchain, modules, stage)?)
        } else {
            None
        };

        let mut timings = Vec::with_capacity(self.config.targets.len());
        for target in &self.config.targets {
            let inputs: Vec<String> = if target.needs_conversion {
                match &objects {
                    Some(objects) => objects.clone(),
                    None => unreachable!("conversion runs whenever a target needs it"),
                }
            } else {
                let mut inputs = vec!["--repo".to_string(), self.config.repo_name.clone()];
                inputs.extend(tickets.iter().cloned());
                inputs
            };

            let stats = self.measure(target, &inputs, stage)?;
            timings.push(TargetTiming {
                target: target.name.clone(),
                stats,
            });
        }
        Ok(timings)
    }

    /// Delete the previous test's artifacts. Missing files are fine: the
    /// first test of a sweep starts from an empty directory.
    fn reset_workspace(&self, modules: u64) -> Result<(), SweepRunError> {
        let mut doomed: Vec<String> = Vec::with_capacity(modules as usize * 2 + 1);
        for index in 0..modules {
            doomed.push(ticket_file(index));
            doomed.push(object_file(index));
        }
        doomed.push(self.config.repo_name.clone());

        for name in doomed {
            let path = self.config.work_dir.join(&name);
            debug!(path = %path.display(), "unlink");
            match fs::remove_file(&path) {
                Ok(()) => {}
                Err(err) if err.kind() == io::ErrorKind::NotFound => {}
                Err(err) => return Err(SweepRunError::Workspace(err)),
            }
        }
        Ok(())
    }

    fn generate(
        &self,
        toolchain: &Toolchain<'_>,
        test: &Test,
        stage: &mut u64,
    ) -> Result<(), SweepRunError> {
        let base = *stage;
        let sink = self.progress;
        let pattern = &self.progress_value;
        let on_line = move |line: &str| {
            let reported = pattern
                .find(line.trim())
                .and_then(|m| m.as_str().parse::<u64>().ok());
            if let Some(module) = reported {
                sink.update(base + module + 1, GENERATE_STAGE);
            }
        };

        toolchain
            .generate(test, &on_line)
            .map_err(SweepRunError::Generator)?;
        *stage += module_count(test);
        Ok(())
    }

    /// Convert every ticket to an object file. The only parallel phase:
    /// conversion output is shared input, not an observable, so the
    /// fan-out (bounded by the logical CPU count) cannot skew timings.
    fn convert(
        &self,
        toolchain: &Toolchain<'_>,
        modules: u64,
        stage: &mut u64,
    ) -> Result<Vec<String>, SweepRunError> {
        let sink = self.progress;
        let objects: Result<Vec<String>, ExecError> = (0..modules)
            .into_par_iter()
            .map(|index| {
                let ticket = ticket_file(index);
                let object = object_file(index);
                toolchain.convert(&ticket, &object)?;
                sink.increment(1, CONVERT_STAGE);
                Ok(object)
            })
            .collect();

        let objects = objects.map_err(SweepRunError::Conversion)?;
        *stage += modules;
        Ok(objects)
    }

    /// Sequential timed runs of one target. Aborts on the first failed
    /// invocation without reporting partial statistics.
    fn measure(
        &self,
        target: &Target,
        inputs: &[String],
        stage: &mut u64,
    ) -> Result<RunStats, SweepRunError> {
        debug!(linker = %target.name, runs = self.config.runs, "starting timed runs");

        let mut samples = Vec::with_capacity(self.config.runs as usize);
        for run in 0..self.config.runs {
            self.progress.update(*stage + run + 1, &target.name);
            let started = Instant::now();
            self.runner
                .run(&target.path, inputs, None)
                .map_err(|source| SweepRunError::Measurement {
                    target: target.name.clone(),
                    source,
                })?;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
            debug!(linker = %target.name, run, elapsed_ms, "timed run complete");
            samples.push(elapsed_ms);
        }
        *stage += self.config.runs;

        let stats = summarize(&samples);
        debug!(
            linker = %target.name,
            mean = stats.mean,
            confidence_interval = stats.confidence_interval,
            "measurement complete"
        );
        Ok(stats)
    }
}
