//! Tool Invocation Contracts
//!
//! Fixed flag spellings for the two generated-input tools. The generator
//! takes every swept/fixed axis as a long flag of the same name plus the
//! repository bookkeeping flags; the converter takes one ticket file in and
//! one object file out against the shared repository.

use std::path::Path;

use linkbench_core::Test;

use crate::runner::{CommandRunner, ExecError, LineHandler};

/// Extension appended to a ticket file name to form its converted object.
pub const OBJECT_EXTENSION: &str = ".elf";

/// Name of the `index`th ticket file the generator emits.
pub fn ticket_file(index: u64) -> String {
    format!("t{index}.o")
}

/// Name of the object file produced by converting the `index`th ticket.
pub fn object_file(index: u64) -> String {
    format!("{}{OBJECT_EXTENSION}", ticket_file(index))
}

/// The generator and converter, bound to one repository and target triple.
pub struct Toolchain<'a> {
    runner: &'a CommandRunner,
    generator: &'a Path,
    converter: &'a Path,
    repo_name: &'a str,
    triple: &'a str,
}

impl<'a> Toolchain<'a> {
    /// Bind resolved tool paths to a runner and repository.
    pub fn new(
        runner: &'a CommandRunner,
        generator: &'a Path,
        converter: &'a Path,
        repo_name: &'a str,
        triple: &'a str,
    ) -> Self {
        Self {
            runner,
            generator,
            converter,
            repo_name,
            triple,
        }
    }

    fn generator_args(&self, test: &Test) -> Vec<String> {
        let mut args = vec!["--append".to_string(), "0".to_string()];
        for (axis, value) in test {
            args.push(format!("--{axis}"));
            args.push(value.to_string());
        }
        args.extend(
            [
                "--output-directory",
                ".",
                "--repo",
                self.repo_name,
                "--triple",
                self.triple,
                "--progress",
            ]
            .map(String::from),
        );
        args
    }

    /// Generate the synthetic inputs for one test. The generator writes the
    /// ticket files and repository into the runner's working directory and
    /// reports each finished module as a bare integer on its output, which
    /// `on_line` receives live.
    pub fn generate(&self, test: &Test, on_line: LineHandler<'_>) -> Result<(), ExecError> {
        self.runner
            .run(self.generator, &self.generator_args(test), Some(on_line))
    }

    /// Convert one ticket file into an object file.
    pub fn convert(&self, ticket: &str, object: &str) -> Result<(), ExecError> {
        let args = ["--repo", self.repo_name, "-o", object, ticket].map(String::from);
        self.runner.run(self.converter, &args, None)
    }
}
