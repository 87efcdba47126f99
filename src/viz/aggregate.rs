use crate::acquisition::IntensitySample;
use chrono::Timelike;
use std::collections::BTreeMap;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Mean and spread of all samples sharing one clock time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeOfDayStat {
    /// Minutes after midnight in the sample's own offset.
    pub minute_of_day: u32,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single observation.
    pub std_dev: Option<f64>,
    pub count: usize,
}

impl TimeOfDayStat {
    pub fn label(&self) -> String {
        format_time_of_day(self.minute_of_day)
    }

    /// `(mean - sd, mean + sd)`, collapsing to the mean without a spread.
    pub fn band(&self) -> (f64, f64) {
        let sd = self.std_dev.unwrap_or(0.0);
        (self.mean - sd, self.mean + sd)
    }
}

/// Date-independent `HH:MM` key.
pub fn time_of_day_key(sample: &IntensitySample) -> u32 {
    sample.timestamp.hour() * 60 + sample.timestamp.minute()
}

pub fn format_time_of_day(minute_of_day: u32) -> String {
    format!("{:02}:{:02}", minute_of_day / 60 % 24, minute_of_day % 60)
}

/// Groups samples by time of day, ordered from 00:00.
pub fn aggregate_by_time_of_day(samples: &[IntensitySample]) -> Vec<TimeOfDayStat> {
    let mut groups: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for sample in samples {
        groups
            .entry(time_of_day_key(sample))
            .or_default()
            .push(sample.rate_kg_per_mwh);
    }

    groups
        .into_iter()
        .map(|(minute_of_day, rates)| {
            let count = rates.len();
            let mean = rates.iter().sum::<f64>() / count as f64;
            let std_dev = if count > 1 {
                let ss: f64 = rates.iter().map(|r| (r - mean).powi(2)).sum();
                Some((ss / (count - 1) as f64).sqrt())
            } else {
                None
            };
            TimeOfDayStat {
                minute_of_day,
                mean,
                std_dev,
                count,
            }
        })
        .collect()
}
