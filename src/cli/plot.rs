use super::CliError;
use crate::viz::chart_for_path;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Renders the hour-of-day chart for a CSV file or a directory of them.
///
/// Writes the SVG to `output` when given, otherwise to stdout.
pub fn run(input: &Path, output: Option<&Path>) -> Result<(), CliError> {
    let chart = chart_for_path(input)?;
    let svg = chart.render_svg()?;

    match output {
        Some(path) => {
            fs::write(path, svg)?;
            info!(path = %path.display(), series = chart.series.len(), "Chart written");
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(svg.as_bytes())?;
            stdout.flush()?;
        }
    }

    Ok(())
}
