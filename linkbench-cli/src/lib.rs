#![warn(missing_docs)]
//! Linkbench CLI
//!
//! Ties the sweep machinery together: parses the command line, layers it
//! over an optional `linkbench.toml`, builds and shuffles the test matrix,
//! sizes the progress bar from the step estimator, drives the sweep, and
//! writes the CSV and plot outputs.

mod config;
mod progress;
pub mod sweep;

pub use config::{LinkbenchConfig, RunConfig, ToolsConfig};
pub use progress::TermProgress;
pub use sweep::{SweepConfig, SweepDriver, SweepOutcome, Target, TargetTiming, TestResult};

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use linkbench_core::{
    MODULES_AXIS, NullSink, ParameterSet, ProgressSink, Range, build_matrix, estimate_units,
};
use linkbench_exec::{describe_host, resolve_executable, tool_name};
use linkbench_report::{
    PlotSeries, SweepRow, column_indices, csv_file_name, gnuplot_script, write_csv,
};
use linkbench_stats::least_squares;

/// Time linkers across a swept parameter space.
#[derive(Parser, Debug)]
#[command(name = "linkbench")]
#[command(author, version, about = "linkbench - parameter-sweep timing harness for linkers")]
pub struct Cli {
    /// Number of common symbols per module
    #[arg(long, default_value = "0", help_heading = "Steppable arguments")]
    pub common: Range,

    /// Number of external symbols per module
    #[arg(long, default_value = "0,10000,1000", help_heading = "Steppable arguments")]
    pub external: Range,

    /// Number of linkonce symbols per module
    #[arg(long, default_value = "0", help_heading = "Steppable arguments")]
    pub linkonce: Range,

    /// Number of modules to generate per test
    #[arg(long, default_value = "100", help_heading = "Steppable arguments")]
    pub modules: Range,

    /// Section size in bytes
    #[arg(long, default_value = "8", help_heading = "Steppable arguments")]
    pub section_size: Range,

    /// Length of the generated symbol-name prefix
    #[arg(long, default_value = "0", help_heading = "Steppable arguments")]
    pub prefix_length: Range,

    /// Number of external fixups per section
    #[arg(long, default_value = "0", help_heading = "Steppable arguments")]
    pub external_fixups: Range,

    /// Number of internal fixups per section
    #[arg(long, default_value = "0", help_heading = "Steppable arguments")]
    pub internal_fixups: Range,

    /// The location of the input-generator executable
    #[arg(long)]
    pub generator: Option<String>,

    /// The location of the ticket-to-object converter executable
    #[arg(long)]
    pub converter: Option<String>,

    /// The name of the program repository file
    #[arg(long)]
    pub repo_name: Option<String>,

    /// The directory for work files and results
    #[arg(long)]
    pub work_dir: Option<PathBuf>,

    /// A prefix applied to the output CSV file names
    #[arg(long)]
    pub prefix: Option<String>,

    /// The number of timed runs of each target for each test
    #[arg(long)]
    pub runs: Option<u64>,

    /// Shuffle seed for a reproducible execution order
    #[arg(long)]
    pub seed: Option<u64>,

    /// Target triple passed to the generator
    #[arg(long)]
    pub triple: Option<String>,

    /// The target that links tickets directly from the repository
    #[arg(long)]
    pub direct_linker: Option<String>,

    /// Write a gnuplot script to this file after the sweep
    #[arg(long)]
    pub plot: Option<PathBuf>,

    /// The axis used for the plot's x values
    #[arg(long, default_value = "external")]
    pub xname: String,

    /// Run with verbose logging instead of a progress bar
    #[arg(short, long)]
    pub verbose: bool,

    /// The linkers to be timed
    #[arg(required = true)]
    pub targets: Vec<String>,
}

impl Cli {
    /// The swept/fixed axes as a `ParameterSet`, keyed by the flag names
    /// the generator expects.
    pub fn parameter_set(&self) -> ParameterSet {
        let mut params = ParameterSet::new();
        params.insert("common", self.common);
        params.insert("external", self.external);
        params.insert("linkonce", self.linkonce);
        params.insert(MODULES_AXIS, self.modules);
        params.insert("section-size", self.section_size);
        params.insert("prefix-length", self.prefix_length);
        params.insert("external-fixups", self.external_fixups);
        params.insert("internal-fixups", self.internal_fixups);
        params
    }
}

/// Parse the command line and run a sweep.
pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("linkbench=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("linkbench=warn")
            .init();
    }

    run_with_cli(cli)
}

/// Run a sweep with pre-parsed arguments.
pub fn run_with_cli(cli: Cli) -> anyhow::Result<()> {
    let config = LinkbenchConfig::discover().unwrap_or_default();

    // All validation happens before any side effect: a bad range, a
    // degenerate sweep, or a missing tool fails here with nothing spawned
    // and nothing deleted.
    let params = cli.parameter_set();
    let mut rng: StdRng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let tests = build_matrix(&params, &mut rng)?;

    let generator_name = cli.generator.as_deref().unwrap_or(&config.tools.generator);
    let converter_name = cli.converter.as_deref().unwrap_or(&config.tools.converter);
    let direct_linker = cli
        .direct_linker
        .as_deref()
        .unwrap_or(&config.tools.direct_linker);

    let generator = resolve_executable(generator_name)?;
    let converter = resolve_executable(converter_name)?;
    let targets = cli
        .targets
        .iter()
        .map(|raw| {
            let path = resolve_executable(raw)?;
            let name = tool_name(&path);
            let needs_conversion = name != direct_linker;
            Ok(Target {
                name,
                path,
                needs_conversion,
            })
        })
        .collect::<Result<Vec<_>, linkbench_exec::ExecError>>()?;

    let work_dir = cli
        .work_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.run.work_dir));
    std::fs::create_dir_all(&work_dir)
        .with_context(|| format!("creating work directory {}", work_dir.display()))?;

    let sweep_config = SweepConfig {
        work_dir: work_dir.clone(),
        repo_name: cli
            .repo_name
            .clone()
            .unwrap_or_else(|| config.run.repo_name.clone()),
        triple: cli
            .triple
            .clone()
            .unwrap_or_else(|| config.run.triple.clone()),
        generator,
        converter,
        runs: cli.runs.unwrap_or(config.run.runs),
        targets,
    };

    let total_units = estimate_units(&params, &sweep_config.shape());
    debug!(tests = tests.len(), total_units, "sweep prepared");

    let progress: Box<dyn ProgressSink> = if cli.verbose {
        Box::new(NullSink)
    } else {
        Box::new(TermProgress::new())
    };
    progress.start(total_units);

    let driver = SweepDriver::new(&sweep_config, progress.as_ref());
    let outcome = driver.run(&tests);
    progress.stop();
    let outcome = outcome?;

    if outcome.total_units != total_units {
        warn!(
            estimated = total_units,
            emitted = outcome.total_units,
            "progress estimate diverged from emitted units"
        );
    }

    write_outputs(&cli, &config, &params, &sweep_config, &outcome)
}

/// Write one CSV per target and, if requested, the gnuplot script.
fn write_outputs(
    cli: &Cli,
    config: &LinkbenchConfig,
    params: &ParameterSet,
    sweep_config: &SweepConfig,
    outcome: &SweepOutcome,
) -> anyhow::Result<()> {
    let axes = params.axis_names();
    let prefix = cli.prefix.as_deref().unwrap_or(&config.run.prefix);
    let mut series = Vec::with_capacity(sweep_config.targets.len());

    for (index, target) in sweep_config.targets.iter().enumerate() {
        let rows: Vec<SweepRow> = outcome
            .results
            .iter()
            .map(|result| SweepRow {
                test: result.test.clone(),
                stats: result.timings[index].stats,
            })
            .collect();

        let path = sweep_config
            .work_dir
            .join(csv_file_name(prefix, &target.name));
        write_csv(&path, &axes, &rows)
            .with_context(|| format!("writing {}", path.display()))?;
        debug!(path = %path.display(), rows = rows.len(), "csv written");

        let points: Vec<(f64, f64)> = rows
            .iter()
            .filter_map(|row| {
                row.test
                    .get(&cli.xname)
                    .map(|x| (*x as f64, row.stats.mean))
            })
            .collect();
        series.push(PlotSeries {
            title: target.name.clone(),
            csv_path: path,
            fit: least_squares(&points),
        });
    }

    if let Some(plot_path) = &cli.plot {
        let (x_column, mean_column, ci_column) = column_indices(&axes, &cli.xname)
            .ok_or_else(|| anyhow::anyhow!("'{}' is not a swept axis", cli.xname))?;
        let script = gnuplot_script(
            &series,
            x_column,
            mean_column,
            ci_column,
            &describe_host(),
            chrono::Utc::now(),
        );
        std::fs::write(plot_path, script)
            .with_context(|| format!("writing {}", plot_path.display()))?;
        debug!(path = %plot_path.display(), "plot script written");
    }

    Ok(())
}
