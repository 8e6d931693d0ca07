//! CSV Output
//!
//! One file per target, named `<prefix>.<target>.csv`. Columns are the
//! axis names in order followed by `mean` and `confidenceInterval`; rows
//! appear in the order the tests completed. The column names are part of
//! the format: the plot writer and downstream tooling look them up by
//! header.

use std::io;
use std::path::Path;

use linkbench_core::Test;
use linkbench_stats::RunStats;

/// One completed test for one target.
#[derive(Debug, Clone)]
pub struct SweepRow {
    /// The realized axis values.
    pub test: Test,
    /// Aggregated timing for the target at this point.
    pub stats: RunStats,
}

/// File name for a target's CSV.
pub fn csv_file_name(prefix: &str, target: &str) -> String {
    format!("{prefix}.{target}.csv")
}

/// 1-based column indices `(x, mean, confidenceInterval)` for a CSV laid
/// out over `axes`. `None` when `xname` is not an axis.
pub fn column_indices(axes: &[&str], xname: &str) -> Option<(usize, usize, usize)> {
    let x = axes.iter().position(|a| *a == xname)? + 1;
    Some((x, axes.len() + 1, axes.len() + 2))
}

/// Render rows to CSV text.
pub fn render_csv(axes: &[&str], rows: &[SweepRow]) -> String {
    let mut out = String::new();

    for axis in axes {
        out.push_str(axis);
        out.push(',');
    }
    out.push_str("mean,confidenceInterval\n");

    for row in rows {
        for axis in axes {
            if let Some(value) = row.test.get(*axis) {
                out.push_str(&value.to_string());
            }
            out.push(',');
        }
        out.push_str(&format!(
            "{},{}\n",
            row.stats.mean, row.stats.confidence_interval
        ));
    }
    out
}

/// Render rows and write them to `path`.
pub fn write_csv(path: &Path, axes: &[&str], rows: &[SweepRow]) -> io::Result<()> {
    std::fs::write(path, render_csv(axes, rows))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, i64)], mean: f64, ci: f64) -> SweepRow {
        let mut test = Test::new();
        for (axis, value) in pairs {
            test.insert((*axis).to_string(), *value);
        }
        SweepRow {
            test,
            stats: RunStats {
                mean,
                confidence_interval: ci,
            },
        }
    }

    #[test]
    fn header_then_one_line_per_row() {
        let axes = ["external", "modules"];
        let rows = vec![
            row(&[("external", 0), ("modules", 100)], 12.5, 1.25),
            row(&[("external", 1000), ("modules", 100)], 14.0, 0.5),
        ];

        let text = render_csv(&axes, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "external,modules,mean,confidenceInterval");
        assert_eq!(lines[1], "0,100,12.5,1.25");
        assert_eq!(lines[2], "1000,100,14,0.5");
    }

    #[test]
    fn empty_rows_still_emit_the_header() {
        let text = render_csv(&["a"], &[]);
        assert_eq!(text, "a,mean,confidenceInterval\n");
    }

    #[test]
    fn column_indices_are_one_based() {
        let axes = ["common", "external", "modules"];
        assert_eq!(column_indices(&axes, "external"), Some((2, 4, 5)));
        assert_eq!(column_indices(&axes, "missing"), None);
    }

    #[test]
    fn file_names_compose_prefix_and_target() {
        assert_eq!(csv_file_name("external", "rld"), "external.rld.csv");
    }

    #[test]
    fn write_round_trips_through_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = vec![row(&[("x", 3)], 9.0, 0.0)];
        write_csv(&path, &["x"], &rows).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "x,mean,confidenceInterval\n3,9,0\n");
    }
}
