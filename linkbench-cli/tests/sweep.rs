//! End-to-end sweep tests against fake tools.
//!
//! The generator, converter, and targets are small shell scripts that
//! honor the real invocation contracts: the generator reports per-module
//! progress and writes tickets plus the repository, the converter copies a
//! ticket to an object file, targets exit cleanly or not. Everything runs
//! in a temporary workspace.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;

use linkbench_cli::sweep::{SweepConfig, SweepDriver, SweepRunError, Target};
use linkbench_core::{
    CountingSink, MODULES_AXIS, ParameterSet, ProgressSink, Range, build_matrix, estimate_units,
};

const GENERATOR: &str = r#"
modules=0
repo=repo.db
while [ $# -gt 0 ]; do
  case "$1" in
    --modules) modules="$2"; shift 2 ;;
    --repo) repo="$2"; shift 2 ;;
    *) shift ;;
  esac
done
i=0
while [ "$i" -lt "$modules" ]; do
  echo "$i"
  : > "t$i.o"
  i=$((i+1))
done
: > "$repo"
"#;

const CONVERTER: &str = r#"
obj=
ticket=
while [ $# -gt 0 ]; do
  case "$1" in
    --repo) shift 2 ;;
    -o) obj="$2"; shift 2 ;;
    *) ticket="$1"; shift ;;
  esac
done
cp "$ticket" "$obj"
"#;

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    let mut perms = fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).unwrap();
    path
}

struct Fixture {
    _root: tempfile::TempDir,
    bin_dir: PathBuf,
    work_dir: PathBuf,
    generator: PathBuf,
    converter: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = tempfile::tempdir().unwrap();
        let bin_dir = root.path().join("bin");
        let work_dir = root.path().join("work");
        fs::create_dir_all(&bin_dir).unwrap();
        fs::create_dir_all(&work_dir).unwrap();

        let generator = write_script(&bin_dir, "fake-gen", GENERATOR);
        let converter = write_script(&bin_dir, "fake-convert", CONVERTER);

        Self {
            _root: root,
            bin_dir,
            work_dir,
            generator,
            converter,
        }
    }

    fn target(&self, name: &str, body: &str, needs_conversion: bool) -> Target {
        Target {
            name: name.to_string(),
            path: write_script(&self.bin_dir, name, body),
            needs_conversion,
        }
    }

    fn config(&self, runs: u64, targets: Vec<Target>) -> SweepConfig {
        SweepConfig {
            work_dir: self.work_dir.clone(),
            repo_name: "repo.db".to_string(),
            triple: "x86_64-pc-linux-gnu-repo".to_string(),
            generator: self.generator.clone(),
            converter: self.converter.clone(),
            runs,
            targets,
        }
    }
}

fn params(external_stop: i64, modules: i64) -> ParameterSet {
    let mut params = ParameterSet::new();
    params.insert("external", Range::span(0, external_stop, 1));
    params.insert(MODULES_AXIS, Range::Fixed(modules));
    params
}

fn run_sweep(
    config: &SweepConfig,
    params: &ParameterSet,
) -> (Result<linkbench_cli::SweepOutcome, SweepRunError>, CountingSink, u64) {
    let total = estimate_units(params, &config.shape());
    let sink = CountingSink::new();
    sink.start(total);

    let tests = build_matrix(params, &mut StdRng::seed_from_u64(7)).unwrap();
    let driver = SweepDriver::new(config, &sink);
    let outcome = driver.run(&tests);
    (outcome, sink, total)
}

#[test]
fn estimate_matches_emitted_units_without_conversion() {
    let fixture = Fixture::new();
    let direct = fixture.target("rld", "exit 0", false);
    let config = fixture.config(2, vec![direct]);
    let params = params(2, 3); // 3 tests, 3 modules each

    let (outcome, sink, total) = run_sweep(&config, &params);
    let outcome = outcome.unwrap();

    // 3 tests x (3 generate + 1 target x 2 runs) = 15.
    assert_eq!(total, 15);
    assert_eq!(outcome.total_units, total);
    assert_eq!(sink.position(), total);

    assert_eq!(outcome.results.len(), 3);
    for result in &outcome.results {
        assert_eq!(result.timings.len(), 1);
        assert_eq!(result.timings[0].target, "rld");
        assert!(result.timings[0].stats.mean >= 0.0);
    }
    // No conversion phase ran.
    assert!(!fixture.work_dir.join("t0.o.elf").exists());
}

#[test]
fn estimate_matches_emitted_units_with_conversion() {
    let fixture = Fixture::new();
    let converting = fixture.target("lld", "exit 0", true);
    let config = fixture.config(2, vec![converting]);
    let params = params(2, 3);

    let (outcome, sink, total) = run_sweep(&config, &params);
    let outcome = outcome.unwrap();

    // 3 tests x (3 generate + 3 convert + 2 measure) = 24.
    assert_eq!(total, 24);
    assert_eq!(outcome.total_units, total);
    assert_eq!(sink.position(), total);

    // The last test's converted objects survive the sweep.
    for index in 0..3 {
        assert!(fixture.work_dir.join(format!("t{index}.o.elf")).exists());
    }
}

#[test]
fn estimate_matches_emitted_units_with_mixed_targets() {
    let fixture = Fixture::new();
    let direct = fixture.target("rld", "exit 0", false);
    let converting = fixture.target("lld", "exit 0", true);
    let config = fixture.config(2, vec![direct, converting]);
    let params = params(1, 2); // 2 tests, 2 modules each

    let (outcome, sink, total) = run_sweep(&config, &params);
    let outcome = outcome.unwrap();

    // 2 tests x (2 generate + 2 convert + 2 targets x 2 runs) = 16.
    assert_eq!(total, 16);
    assert_eq!(outcome.total_units, total);
    assert_eq!(sink.position(), total);

    for result in &outcome.results {
        assert_eq!(result.timings.len(), 2);
        assert_eq!(result.timings[0].target, "rld");
        assert_eq!(result.timings[1].target, "lld");
    }
}

#[test]
fn generator_failure_aborts_the_sweep() {
    let fixture = Fixture::new();
    let bad_gen = write_script(&fixture.bin_dir, "broken-gen", "echo no inputs 1>&2\nexit 2");
    let direct = fixture.target("rld", "exit 0", false);
    let mut config = fixture.config(2, vec![direct]);
    config.generator = bad_gen;

    let (outcome, _sink, _total) = run_sweep(&config, &params(2, 3));
    assert!(matches!(outcome, Err(SweepRunError::Generator(_))));
}

#[test]
fn measurement_failure_aborts_before_any_further_test() {
    let fixture = Fixture::new();
    // Record every invocation so the abort point is observable.
    let flaky = fixture.target(
        "flaky",
        "echo run >> invocations.log\nexit 1",
        false,
    );
    let config = fixture.config(5, vec![flaky]);

    let (outcome, _sink, _total) = run_sweep(&config, &params(3, 2));
    match outcome {
        Err(SweepRunError::Measurement { target, .. }) => assert_eq!(target, "flaky"),
        other => panic!("expected measurement failure, got {other:?}"),
    }

    // The first failed run ended the sweep: one invocation, not 5 runs and
    // not 4 tests.
    let log = fs::read_to_string(fixture.work_dir.join("invocations.log")).unwrap();
    assert_eq!(log.lines().count(), 1);
}

#[test]
fn reset_deletes_stale_artifacts() {
    let fixture = Fixture::new();
    // Stale conversion outputs from an earlier (aborted) sweep. With a
    // direct-only target nothing recreates them, so they survive iff the
    // reset phase failed to delete them.
    fs::write(fixture.work_dir.join("t0.o.elf"), "stale").unwrap();
    fs::write(fixture.work_dir.join("t1.o.elf"), "stale").unwrap();

    let direct = fixture.target("rld", "exit 0", false);
    let config = fixture.config(1, vec![direct]);

    let (outcome, _sink, _total) = run_sweep(&config, &params(1, 2));
    outcome.unwrap();

    assert!(!fixture.work_dir.join("t0.o.elf").exists());
    assert!(!fixture.work_dir.join("t1.o.elf").exists());
}

#[test]
fn reset_propagates_errors_other_than_missing_files() {
    let fixture = Fixture::new();
    let direct = fixture.target("rld", "exit 0", false);
    let mut config = fixture.config(1, vec![direct]);

    // A "work directory" that is actually a file: deleting t0.o inside it
    // fails with ENOTDIR, which is not a missing-file error and must
    // surface instead of being swallowed.
    let bogus = fixture.work_dir.join("not-a-directory");
    fs::write(&bogus, "").unwrap();
    config.work_dir = bogus;

    let (outcome, _sink, _total) = run_sweep(&config, &params(1, 2));
    assert!(matches!(outcome, Err(SweepRunError::Workspace(_))));
}
