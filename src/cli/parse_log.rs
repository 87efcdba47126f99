use super::CliError;
use crate::parser::{JobSummary, SimulatorLogExtractor};
use crate::table::write_table_to_path;
use std::path::Path;

/// Extracts job records from a simulator log, optionally writing them as CSV.
///
/// An empty extraction is an error unless `allow_empty` is set.
pub fn run(log_path: &Path, output: Option<&Path>, allow_empty: bool) -> Result<JobSummary, CliError> {
    let extractor = SimulatorLogExtractor::new()?;
    let records = extractor.extract_file(log_path)?;

    if records.is_empty() && !allow_empty {
        return Err(CliError::EmptyResult {
            path: log_path.to_path_buf(),
        });
    }

    if let Some(output) = output {
        write_table_to_path(&records, output)?;
    }

    Ok(JobSummary::from_records(&records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_empty_log_is_error_by_default() {
        let dir = TempDir::new().unwrap();
        let log = dir.path().join("empty.log");
        fs::write(&log, "2024/01/01 nothing happened\n").unwrap();

        assert!(matches!(run(&log, None, false), Err(CliError::EmptyResult { .. })));

        let summary = run(&log, None, true).unwrap();
        assert_eq!(summary.rows, 0);
    }
}
