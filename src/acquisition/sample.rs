use crate::table::TableRow;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// One interval's carbon intensity for a source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntensitySample {
    #[serde(rename = "start_date", with = "crate::table::timestamp::lenient")]
    pub timestamp: DateTime<FixedOffset>,
    #[serde(rename = "generated_rate_kg_per_mwh")]
    pub rate_kg_per_mwh: f64,
    #[serde(rename = "ISO", default)]
    pub source_id: String,
}

impl TableRow for IntensitySample {
    const COLUMNS: &'static [&'static str] = &["start_date", "generated_rate_kg_per_mwh", "ISO"];
}

/// Samples for one source, concatenated across days in chronological order.
#[derive(Debug, Clone, PartialEq)]
pub struct IntensityTable {
    pub source_id: String,
    pub samples: Vec<IntensitySample>,
}

impl IntensityTable {
    /// Concatenates per-day batches in the order given.
    pub fn from_days(source_id: impl Into<String>, days: Vec<Vec<IntensitySample>>) -> Self {
        let samples = days.into_iter().flatten().collect();
        Self {
            source_id: source_id.into(),
            samples,
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::{read_table_strict, write_table};

    fn sample(ts: &str, rate: f64) -> IntensitySample {
        IntensitySample {
            timestamp: DateTime::parse_from_rfc3339(ts).unwrap(),
            rate_kg_per_mwh: rate,
            source_id: "CAISO".to_string(),
        }
    }

    #[test]
    fn test_from_days_keeps_day_order() {
        let day1 = vec![sample("2024-01-01T00:00:00Z", 1.0), sample("2024-01-01T00:05:00Z", 2.0)];
        let day2 = vec![sample("2024-01-02T00:00:00Z", 3.0)];
        let table = IntensityTable::from_days("CAISO", vec![day1, day2]);

        let rates: Vec<f64> = table.samples.iter().map(|s| s.rate_kg_per_mwh).collect();
        assert_eq!(rates, vec![1.0, 2.0, 3.0]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_csv_schema_and_round_trip() {
        let rows = vec![
            sample("2024-01-01T00:00:00-08:00", 212.25),
            sample("2024-01-01T00:05:00-08:00", 208.0),
        ];
        let mut buf = Vec::new();
        write_table(&rows, &mut buf).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("start_date,generated_rate_kg_per_mwh,ISO"));
        assert_eq!(lines.next(), Some("2024-01-01T00:00:00-08:00,212.25,CAISO"));

        let back: Vec<IntensitySample> = read_table_strict(buf.as_slice()).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_missing_iso_column_defaults_to_empty() {
        let data = "start_date,generated_rate_kg_per_mwh\n2024-01-01 00:00:00,100.5\n";
        let rows: Vec<IntensitySample> = crate::table::read_table(data.as_bytes()).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source_id, "");
        assert_eq!(rows[0].rate_kg_per_mwh, 100.5);
    }
}
