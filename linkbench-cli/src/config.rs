//! Configuration loading from linkbench.toml
//!
//! Defaults for the non-swept knobs can live in a `linkbench.toml` file,
//! discovered by walking up from the current directory. CLI flags always
//! win over file values; file values win over built-in defaults.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Harness configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LinkbenchConfig {
    /// Sweep execution defaults.
    #[serde(default)]
    pub run: RunConfig,
    /// External tool locations and target classification.
    #[serde(default)]
    pub tools: ToolsConfig,
}

/// Sweep execution defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Timed runs of each target for each test.
    #[serde(default = "default_runs")]
    pub runs: u64,
    /// Directory for work files and results.
    #[serde(default = "default_work_dir")]
    pub work_dir: String,
    /// Name of the program repository file.
    #[serde(default = "default_repo_name")]
    pub repo_name: String,
    /// Target triple passed to the generator.
    #[serde(default = "default_triple")]
    pub triple: String,
    /// Prefix applied to output CSV file names.
    #[serde(default = "default_prefix")]
    pub prefix: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            runs: default_runs(),
            work_dir: default_work_dir(),
            repo_name: default_repo_name(),
            triple: default_triple(),
            prefix: default_prefix(),
        }
    }
}

fn default_runs() -> u64 {
    30
}
fn default_work_dir() -> String {
    "gen".to_string()
}
fn default_repo_name() -> String {
    "repo.db".to_string()
}
fn default_triple() -> String {
    "x86_64-pc-linux-gnu-repo".to_string()
}
fn default_prefix() -> String {
    "sweep".to_string()
}

/// External tool locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// The input-generator executable.
    #[serde(default = "default_generator")]
    pub generator: String,
    /// The ticket-to-object converter executable.
    #[serde(default = "default_converter")]
    pub converter: String,
    /// The target that links tickets directly from the repository; every
    /// other target gets converted object files.
    #[serde(default = "default_direct_linker")]
    pub direct_linker: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            generator: default_generator(),
            converter: default_converter(),
            direct_linker: default_direct_linker(),
        }
    }
}

fn default_generator() -> String {
    "rld-gen".to_string()
}
fn default_converter() -> String {
    "repo2obj".to_string()
}
fn default_direct_linker() -> String {
    "rld".to_string()
}

impl LinkbenchConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Discover and load a `linkbench.toml` by walking up from the current
    /// directory. `None` when no file is found or it fails to parse.
    pub fn discover() -> Option<Self> {
        let mut dir = std::env::current_dir().ok()?;
        loop {
            let config_path = dir.join("linkbench.toml");
            if config_path.exists() {
                return Self::load(&config_path).ok();
            }
            if !dir.pop() {
                break;
            }
        }
        None
    }
}
