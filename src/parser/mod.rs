//! Extraction of per-job carbon and SLO statistics from simulator logs.

pub mod map;
pub mod simulator;

pub use map::{KeyedValues, MapParser};
pub use simulator::{JobCarbonRecord, JobSummary, SimulatorLogExtractor};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("regex compilation failed: {0}")]
    InvalidPattern(#[from] regex::Error),
}
