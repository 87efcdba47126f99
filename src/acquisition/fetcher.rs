use super::{
    build_client, AcquisitionWindow, ApiFetch, IntensitySample, IntensityTable, Result,
    StaticCsvFetch,
};
use crate::config::types::{HttpConfig, SourceConfig};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

/// One way of retrieving a single day of samples for a source.
#[async_trait]
pub trait FetchStyle: Send + Sync {
    fn style_name(&self) -> &'static str;

    /// Fetches the 24 hours starting at `day`.
    async fn fetch_day(&self, source_id: &str, day: DateTime<Utc>) -> Result<Vec<IntensitySample>>;
}

/// Runs a fetch style over every day of an [`AcquisitionWindow`].
///
/// Days are requested one at a time in chronological order. The first failing
/// day aborts the run and everything gathered so far is discarded.
pub struct CarbonIntensityFetcher {
    style: Box<dyn FetchStyle>,
}

impl CarbonIntensityFetcher {
    pub fn new(style: Box<dyn FetchStyle>) -> Self {
        Self { style }
    }

    /// Selects the fetch style configured for `source_id`.
    ///
    /// API-style sources resolve their credential here, so a missing key is
    /// reported before any request is sent.
    pub fn from_config(source_id: &str, source: &SourceConfig, http: &HttpConfig) -> Result<Self> {
        let client = build_client(http)?;
        let style: Box<dyn FetchStyle> = match source {
            SourceConfig::Api(api) => Box::new(ApiFetch::from_env(source_id, api, client)?),
            SourceConfig::StaticCsv(csv) => Box::new(StaticCsvFetch::new(source_id, csv, client)?),
        };
        Ok(Self::new(style))
    }

    pub fn style_name(&self) -> &'static str {
        self.style.style_name()
    }

    pub async fn acquire(&self, window: &AcquisitionWindow) -> Result<IntensityTable> {
        let source_id = window.source_id();
        let days = window.days();
        let total = days.len();

        info!(
            source_id = %source_id,
            style = self.style.style_name(),
            start = %window.start().date_naive(),
            end = %window.end().date_naive(),
            days = total,
            "Starting acquisition"
        );

        let mut per_day = Vec::with_capacity(total);
        for (i, day) in days.enumerate() {
            let samples = self.style.fetch_day(source_id, day).await?;
            info!(
                source_id = %source_id,
                day = %day.date_naive(),
                samples = samples.len(),
                "Fetched day {}/{}",
                i + 1,
                total
            );
            per_day.push(samples);
        }

        let table = IntensityTable::from_days(source_id, per_day);
        info!(source_id = %source_id, samples = table.len(), "Acquisition complete");
        Ok(table)
    }
}

impl From<ApiFetch> for CarbonIntensityFetcher {
    fn from(style: ApiFetch) -> Self {
        Self::new(Box::new(style))
    }
}

impl From<StaticCsvFetch> for CarbonIntensityFetcher {
    fn from(style: StaticCsvFetch) -> Self {
        Self::new(Box::new(style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::FetchError;
    use chrono::{Duration, NaiveDate, TimeZone};
    use std::sync::{Arc, Mutex};

    /// Returns one sample per day and fails on a chosen day.
    struct ScriptedFetch {
        fail_on: Option<NaiveDate>,
        requested: Arc<Mutex<Vec<NaiveDate>>>,
    }

    #[async_trait]
    impl FetchStyle for ScriptedFetch {
        fn style_name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_day(&self, source_id: &str, day: DateTime<Utc>) -> Result<Vec<IntensitySample>> {
            self.requested.lock().unwrap().push(day.date_naive());
            if Some(day.date_naive()) == self.fail_on {
                return Err(FetchError::Remote {
                    source_id: source_id.to_string(),
                    day: day.date_naive(),
                    status: 503,
                    body: "unavailable".to_string(),
                });
            }
            Ok(vec![IntensitySample {
                timestamp: day.fixed_offset(),
                rate_kg_per_mwh: day.date_naive().format("%d").to_string().parse().unwrap(),
                source_id: source_id.to_string(),
            }])
        }
    }

    fn window(days: i64) -> AcquisitionWindow {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        AcquisitionWindow::new(start, start + Duration::days(days), "ERCOT").unwrap()
    }

    fn fetcher(fail_on: Option<NaiveDate>) -> (CarbonIntensityFetcher, Arc<Mutex<Vec<NaiveDate>>>) {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let style = ScriptedFetch {
            fail_on,
            requested: requested.clone(),
        };
        (CarbonIntensityFetcher::new(Box::new(style)), requested)
    }

    #[tokio::test]
    async fn test_acquire_concatenates_days_in_order() {
        let (fetcher, requested) = fetcher(None);
        let table = fetcher.acquire(&window(3)).await.unwrap();

        assert_eq!(table.source_id, "ERCOT");
        let rates: Vec<f64> = table.samples.iter().map(|s| s.rate_kg_per_mwh).collect();
        assert_eq!(rates, vec![1.0, 2.0, 3.0]);
        assert_eq!(requested.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_failure_after_successes_yields_no_table() {
        let fail_day = NaiveDate::from_ymd_opt(2024, 1, 3).unwrap();
        let (fetcher, requested) = fetcher(Some(fail_day));

        let result = fetcher.acquire(&window(5)).await;
        match result {
            Err(FetchError::Remote { day, status, body, .. }) => {
                assert_eq!(day, fail_day);
                assert_eq!(status, 503);
                assert_eq!(body, "unavailable");
            }
            other => panic!("expected Remote error, got {:?}", other),
        }

        // Stops at the failing day, nothing after it is requested
        assert_eq!(requested.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_window_makes_no_requests() {
        let (fetcher, requested) = fetcher(None);
        let table = fetcher.acquire(&window(0)).await.unwrap();
        assert!(table.is_empty());
        assert!(requested.lock().unwrap().is_empty());
    }

    #[test]
    fn test_from_config_missing_credential() {
        let source: SourceConfig = serde_yaml::from_str(
            "style: api\nurl: http://localhost:1/carbon\ncredential_env: GRIDCO2_FETCHER_UNSET_KEY\n",
        )
        .unwrap();
        std::env::remove_var("GRIDCO2_FETCHER_UNSET_KEY");

        let result = CarbonIntensityFetcher::from_config("CAISO", &source, &HttpConfig::default());
        assert!(matches!(result, Err(FetchError::MissingCredential { .. })));
    }

    #[test]
    fn test_from_config_static_csv() {
        let source: SourceConfig =
            serde_yaml::from_str("style: static_csv\nurl: http://localhost:1/{date}.csv\n").unwrap();
        let fetcher = CarbonIntensityFetcher::from_config("CAISO", &source, &HttpConfig::default()).unwrap();
        assert_eq!(fetcher.style_name(), "static_csv");
    }
}
