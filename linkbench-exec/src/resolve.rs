//! Executable Resolution
//!
//! Maps user-supplied tool names to paths before the sweep starts, so a
//! missing tool fails fast instead of after minutes of timed runs. A name
//! containing a path separator is checked as given; a bare name is searched
//! on `PATH`.

use std::env;
use std::path::{Path, PathBuf};

use crate::runner::ExecError;

/// Resolve `name` to an executable path.
pub fn resolve_executable(name: &str) -> Result<PathBuf, ExecError> {
    let not_found = || ExecError::ExecutableNotFound(name.to_string());

    if name.contains(std::path::MAIN_SEPARATOR) {
        let path = Path::new(name);
        return if path.is_file() {
            Ok(path.to_path_buf())
        } else {
            Err(not_found())
        };
    }

    let path_var = env::var_os("PATH").unwrap_or_default();
    env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(not_found)
}

/// Short display name for a tool: the file name with any `.exe` suffix
/// removed. Used for stage labels and CSV file names.
pub fn tool_name(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    name.strip_suffix(".exe").unwrap_or(&name).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn unknown_bare_name_is_not_found() {
        let err = resolve_executable("linkbench-no-such-tool-1b2c").unwrap_err();
        assert!(matches!(err, ExecError::ExecutableNotFound(_)));
    }

    #[test]
    #[cfg(unix)]
    fn bare_name_is_found_on_path() {
        // Every unix test environment carries a shell.
        let path = resolve_executable("sh").unwrap();
        assert!(path.is_absolute());
        assert!(path.is_file());
    }

    #[test]
    fn explicit_path_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("mytool");
        let name = tool.to_string_lossy().into_owned();

        assert!(matches!(
            resolve_executable(&name),
            Err(ExecError::ExecutableNotFound(_))
        ));

        let mut file = std::fs::File::create(&tool).unwrap();
        file.write_all(b"#!/bin/sh\n").unwrap();
        drop(file);
        assert_eq!(resolve_executable(&name).unwrap(), tool);
    }

    #[test]
    fn tool_names_strip_exe_suffix() {
        assert_eq!(tool_name(Path::new("/opt/bin/rld")), "rld");
        assert_eq!(tool_name(Path::new("ld64.exe")), "ld64");
        assert_eq!(tool_name(Path::new("work/lld")), "lld");
    }
}
