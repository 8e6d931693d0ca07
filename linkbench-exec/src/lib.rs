#![warn(missing_docs)]
//! Linkbench Process Collaborators
//!
//! Everything that touches the world outside the harness process:
//! - streamed execution of external commands with a working-directory
//!   override
//! - resolution of tool names to absolute paths
//! - the invocation contracts of the input generator and format converter
//! - a host description for report headers
//!
//! The sweep driver in `linkbench-cli` composes these; nothing here knows
//! about sweeps, stages, or statistics.

mod host;
mod resolve;
mod runner;
mod tools;

pub use host::{describe_host, logical_cpus};
pub use resolve::{resolve_executable, tool_name};
pub use runner::{CommandRunner, ExecError, LineHandler};
pub use tools::{OBJECT_EXTENSION, Toolchain, object_file, ticket_file};
