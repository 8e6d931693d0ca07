//! Gnuplot Script Output
//!
//! Emits a script that plots every target's CSV as mean-with-error-bars
//! plus a least-squares trend line. The script references the CSV files by
//! path; running gnuplot is left to the caller.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use linkbench_stats::LineFit;

/// One plotted target.
#[derive(Debug, Clone)]
pub struct PlotSeries {
    /// Legend title, normally the target name.
    pub title: String,
    /// Path of the CSV holding this target's rows.
    pub csv_path: PathBuf,
    /// Trend line over (x axis value, mean). `None` suppresses the fit,
    /// e.g. when every x was identical.
    pub fit: Option<LineFit>,
}

/// Render the gnuplot script.
///
/// `x_column`, `mean_column`, and `ci_column` are 1-based CSV column
/// indices (see `column_indices`); they are shared by every series because
/// all targets are swept over the same axes.
pub fn gnuplot_script(
    series: &[PlotSeries],
    x_column: usize,
    mean_column: usize,
    ci_column: usize,
    host: &str,
    generated: DateTime<Utc>,
) -> String {
    let mut script = format!(
        "# generated {} on {host}\n\
         set terminal svg\n\
         set datafile separator \",\"\n\
         set ylabel \"Time (ms)\"\n\
         set key top left\n\
         set yrange [0<*:]\n",
        generated.to_rfc3339()
    );

    // Two line types per series: points for the measured data, dashes for
    // the fitted line.
    for (index, entry) in series.iter().enumerate() {
        script.push_str(&format!(
            "set linetype {} pointtype 1\nset linetype {} dashtype 2\n",
            index * 2 + 1,
            index * 2 + 2
        ));
        if let Some(fit) = entry.fit {
            script.push_str(&format!("f{index}(x) = {} * x + {}\n", fit.slope, fit.intercept));
        }
    }

    script.push_str("plot \\\n");
    let mut first = true;
    for (index, entry) in series.iter().enumerate() {
        if !first {
            script.push_str(", \\\n");
        }
        first = false;
        script.push_str(&format!(
            "    '{}' using {x_column}:{mean_column}:{ci_column} with yerrorbars title '{}'",
            entry.csv_path.display(),
            entry.title
        ));
        if let Some(fit) = entry.fit {
            script.push_str(&format!(
                ", \\\n    f{index}(x) with lines title '{} (best fit {{/:Italic y={:.3}x+{:.3}}})'",
                entry.title, fit.slope, fit.intercept
            ));
        }
    }
    script.push('\n');
    script
}
