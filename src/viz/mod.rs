//! Hour-of-day averages of acquired tables, rendered as SVG line charts.

pub mod aggregate;
pub mod chart;

pub use aggregate::{aggregate_by_time_of_day, format_time_of_day, TimeOfDayStat};
pub use chart::{render_svg, Chart, Series};

use crate::acquisition::IntensitySample;
use crate::table::{read_table_from_path, TableError, TableRow};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum VizError {
    #[error("failed to read table: {0}")]
    Table(#[from] TableError),

    #[error("failed to list directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("table '{}' has no rows", .path.display())]
    Empty { path: PathBuf },

    #[error("no .csv files found in '{}'", .path.display())]
    NoCsvFiles { path: PathBuf },

    #[error("chart rendering failed: {0}")]
    Render(String),
}

/// A stored sample whose rate cell may be blank.
#[derive(Debug, Serialize, Deserialize)]
struct StoredSample {
    #[serde(rename = "start_date", with = "crate::table::timestamp::lenient")]
    timestamp: DateTime<FixedOffset>,
    #[serde(rename = "generated_rate_kg_per_mwh")]
    rate_kg_per_mwh: Option<f64>,
    #[serde(rename = "ISO", default)]
    source_id: String,
}

impl TableRow for StoredSample {
    const COLUMNS: &'static [&'static str] = IntensitySample::COLUMNS;
}

/// Loads one acquired table and aggregates it. The legend label is the file stem.
///
/// Rows with a blank rate are skipped.
pub fn load_series(path: &Path) -> Result<Series, VizError> {
    let rows: Vec<StoredSample> = read_table_from_path(path)?;
    let total = rows.len();
    let samples: Vec<IntensitySample> = rows
        .into_iter()
        .filter_map(|row| {
            row.rate_kg_per_mwh.map(|rate_kg_per_mwh| IntensitySample {
                timestamp: row.timestamp,
                rate_kg_per_mwh,
                source_id: row.source_id,
            })
        })
        .collect();

    if samples.len() < total {
        warn!(
            path = %path.display(),
            skipped = total - samples.len(),
            "Skipping rows with no rate"
        );
    }

    if samples.is_empty() {
        return Err(VizError::Empty {
            path: path.to_path_buf(),
        });
    }

    Ok(Series {
        label: series_label(path),
        stats: aggregate_by_time_of_day(&samples),
    })
}

/// Loads every `*.csv` in `dir`, in file-name order.
pub fn load_directory(dir: &Path) -> Result<Vec<Series>, VizError> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "csv"))
        .collect();
    files.sort();

    if files.is_empty() {
        return Err(VizError::NoCsvFiles {
            path: dir.to_path_buf(),
        });
    }

    files.iter().map(|p| load_series(p)).collect()
}

/// Builds the single-file or all-files chart depending on what `path` is.
pub fn chart_for_path(path: &Path) -> Result<Chart, VizError> {
    if path.is_dir() {
        let series = load_directory(path)?;
        tracing::info!(path = %path.display(), series = series.len(), "Loaded directory overlay");
        Ok(Chart {
            title: "Average Generated Rate by Hour of the Day (All ISOs)".to_string(),
            series,
        })
    } else {
        let series = load_series(path)?;
        Ok(Chart {
            title: format!(
                "Average Generated Rate by Hour of the Day ({}) w/ SD",
                series.label
            ),
            series: vec![series],
        })
    }
}

fn series_label(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
