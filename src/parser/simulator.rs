use super::{ExtractError, MapParser};
use crate::table::TableRow;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// A state dump spans from this marker to the next completed-jobs line.
const BLOCK_PATTERN: &str = r"(?s)Simulator State:.*?Completed Jobs Length: \d+";
const CARBON_MAP_PATTERN: &str = r"Carbon Emission:\s+map\[(.*?)\]";
const SLO_MAP_PATTERN: &str = r"SLO Timeouts:\s+map\[(.*?)\]";

/// Carbon emitted by one job, with its SLO timeout count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobCarbonRecord {
    #[serde(rename = "Job")]
    pub job_key: String,
    #[serde(rename = "Carbon Emission")]
    pub carbon_emission: f64,
    #[serde(rename = "SLO Timeout")]
    pub slo_timeout: i64,
}

impl TableRow for JobCarbonRecord {
    const COLUMNS: &'static [&'static str] = &["Job", "Carbon Emission", "SLO Timeout"];
}

/// Splits simulator logs into state blocks and joins each block's carbon and
/// SLO maps on job key.
#[derive(Debug, Clone)]
pub struct SimulatorLogExtractor {
    block: Regex,
    carbon_map: Regex,
    slo_map: Regex,
    maps: MapParser,
}

impl SimulatorLogExtractor {
    pub fn new() -> Result<Self, ExtractError> {
        Ok(Self {
            block: Regex::new(BLOCK_PATTERN)?,
            carbon_map: Regex::new(CARBON_MAP_PATTERN)?,
            slo_map: Regex::new(SLO_MAP_PATTERN)?,
            maps: MapParser::new()?,
        })
    }

    /// Minimal, non-overlapping state blocks in file order.
    pub fn blocks<'t>(&'t self, text: &'t str) -> impl Iterator<Item = &'t str> + 't {
        self.block.find_iter(text).map(|m| m.as_str())
    }

    /// One record per carbon-map key; SLO timeouts default to 0 and keys found
    /// only in the SLO map are dropped.
    pub fn extract_block(&self, block: &str) -> Vec<JobCarbonRecord> {
        let carbon = self
            .carbon_map
            .captures(block)
            .map(|caps| self.maps.parse_carbon(&caps[1]))
            .unwrap_or_default();
        let slo = self
            .slo_map
            .captures(block)
            .map(|caps| self.maps.parse_slo(&caps[1]))
            .unwrap_or_default();

        carbon
            .iter()
            .map(|(job, emission)| JobCarbonRecord {
                job_key: job.to_string(),
                carbon_emission: *emission,
                slo_timeout: slo.get(job).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Records from every block, in block order. Zero blocks is not an error
    /// here; callers decide whether an empty result is fatal.
    pub fn extract(&self, text: &str) -> Vec<JobCarbonRecord> {
        let mut records = Vec::new();
        let mut block_count = 0usize;

        for block in self.blocks(text) {
            block_count += 1;
            let block_records = self.extract_block(block);
            debug!(block = block_count, records = block_records.len(), "Parsed simulator state block");
            records.extend(block_records);
        }

        info!(blocks = block_count, records = records.len(), "Extracted simulator state");
        records
    }

    pub fn extract_file(&self, path: &Path) -> Result<Vec<JobCarbonRecord>, ExtractError> {
        let text = fs::read_to_string(path).map_err(|e| {
            std::io::Error::new(
                e.kind(),
                format!("failed to read log file '{}': {}", path.display(), e),
            )
        })?;
        Ok(self.extract(&text))
    }
}

/// Averages over a set of extracted records.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSummary {
    pub rows: usize,
    pub mean_carbon_emission: Option<f64>,
    pub mean_slo_timeout: Option<f64>,
}

impl JobSummary {
    pub fn from_records(records: &[JobCarbonRecord]) -> Self {
        if records.is_empty() {
            return Self {
                rows: 0,
                mean_carbon_emission: None,
                mean_slo_timeout: None,
            };
        }

        let n = records.len() as f64;
        let carbon: f64 = records.iter().map(|r| r.carbon_emission).sum();
        let slo: f64 = records.iter().map(|r| r.slo_timeout as f64).sum();

        Self {
            rows: records.len(),
            mean_carbon_emission: Some(carbon / n),
            mean_slo_timeout: Some(slo / n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_block(carbon: &str, slo: &str, completed: usize) -> String {
        format!(
            "\nSimulator State:\n\
             \tCurrent Time: 2024-01-01 06:00:00 +0000 UTC\n\
             \tCarbon Emission: map[{}]\n\
             \tSLO Timeouts: map[{}]\n\
             \tScheduling Policy: hybridSelection\n\
             \tIncoming Jobs Length: 4\n\
             \tQueued Jobs: []\n\
             \tCurrently Running Jobs: []\n\
             \tCompleted Jobs Length: {}\n",
            carbon, slo, completed
        )
    }

    fn extractor() -> SimulatorLogExtractor {
        SimulatorLogExtractor::new().unwrap()
    }

    #[test]
    fn test_join_keeps_carbon_keys_only() {
        let log = state_block("{A 1 2}:1.5 {B 3 4}:2.5", "{B 3 4}:4 {C 5 6}:9", 10);
        let records = extractor().extract(&log);

        assert_eq!(
            records,
            vec![
                JobCarbonRecord {
                    job_key: "A".to_string(),
                    carbon_emission: 1.5,
                    slo_timeout: 0,
                },
                JobCarbonRecord {
                    job_key: "B".to_string(),
                    carbon_emission: 2.5,
                    slo_timeout: 4,
                },
            ]
        );
    }

    #[test]
    fn test_blocks_are_minimal_and_ordered() {
        let log = format!(
            "2024/01/01 [INCOMING] noise\n{}2024/01/01 [COMPLETE] noise\n{}",
            state_block("{first 1}:1", "", 1),
            state_block("{second 1}:2", "", 2)
        );
        let ex = extractor();
        let blocks: Vec<&str> = ex.blocks(&log).collect();
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].ends_with("Completed Jobs Length: 1"));
        assert!(!blocks[0].contains("second"));

        let jobs: Vec<String> = ex.extract(&log).into_iter().map(|r| r.job_key).collect();
        assert_eq!(jobs, vec!["first", "second"]);
    }

    #[test]
    fn test_block_without_maps_yields_nothing() {
        let log = "Simulator State:\n\tCurrent Time: now\n\tCompleted Jobs Length: 0\n";
        let records = extractor().extract(log);
        assert!(records.is_empty());
    }

    #[test]
    fn test_no_blocks_is_empty_not_error() {
        assert!(extractor().extract("just some log lines\n").is_empty());
    }

    #[test]
    fn test_unterminated_block_ignored() {
        let log = format!(
            "{}Simulator State:\n\tCarbon Emission: map[{{late 1}}:5]\n",
            state_block("{early 1}:1", "", 1)
        );
        let jobs: Vec<String> = extractor().extract(&log).into_iter().map(|r| r.job_key).collect();
        assert_eq!(jobs, vec!["early"]);
    }

    #[test]
    fn test_summary_means() {
        let records = vec![
            JobCarbonRecord {
                job_key: "a".to_string(),
                carbon_emission: 10.0,
                slo_timeout: 1,
            },
            JobCarbonRecord {
                job_key: "b".to_string(),
                carbon_emission: 20.0,
                slo_timeout: 2,
            },
        ];
        let summary = JobSummary::from_records(&records);
        assert_eq!(summary.rows, 2);
        assert_eq!(summary.mean_carbon_emission, Some(15.0));
        assert_eq!(summary.mean_slo_timeout, Some(1.5));

        assert_eq!(JobSummary::from_records(&[]).mean_carbon_emission, None);
    }

    #[test]
    fn test_extract_file_missing_path() {
        let result = extractor().extract_file(Path::new("/nonexistent/simulator.log"));
        assert!(matches!(result, Err(ExtractError::Io(_))));
    }
}
