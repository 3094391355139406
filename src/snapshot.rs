//! Immutable in-memory copy of the source tables
//!
//! Loaded once at startup and shared behind an `Arc`; every view builder takes
//! it explicitly, so tests can hand in fixtures directly.

use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::db::{DailyReportRow, Database, TimeSeriesRow};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    daily_report: Vec<DailyReportRow>,
    time_series: Vec<TimeSeriesRow>,
}

pub type SharedSnapshot = Arc<Snapshot>;

impl Snapshot {
    pub fn new(daily_report: Vec<DailyReportRow>, time_series: Vec<TimeSeriesRow>) -> Self {
        Self {
            daily_report,
            time_series,
        }
    }

    /// Read both tables, then release the connection
    pub async fn load(db: Database) -> Result<Self> {
        let daily_report = db.load_daily_report().await?;
        let time_series = db.load_time_series().await?;
        db.close().await;

        info!(
            "Snapshot loaded: {} daily_report rows, {} time_series rows",
            daily_report.len(),
            time_series.len()
        );
        Ok(Self::new(daily_report, time_series))
    }

    pub fn daily_report(&self) -> &[DailyReportRow] {
        &self.daily_report
    }

    pub fn time_series(&self) -> &[TimeSeriesRow] {
        &self.time_series
    }

    /// Countries offered by the map's multi-select, in first-seen order
    pub fn map_country_choices(&self) -> Vec<String> {
        unique_in_order(self.daily_report.iter().map(|r| r.country.as_str()))
    }

    /// Countries offered by the time series single-select, in first-seen order
    pub fn time_series_country_choices(&self) -> Vec<String> {
        unique_in_order(self.time_series.iter().map(|r| r.country.as_str()))
    }
}

fn unique_in_order<'a>(names: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    names
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}

/// Shared fixture builders for unit tests across the crate
#[cfg(test)]
pub mod fixtures {
    use super::*;
    use chrono::NaiveDate;

    pub fn report(country: &str, confirmed: u64, deaths: u64) -> DailyReportRow {
        DailyReportRow {
            country: country.to_string(),
            province: None,
            county: None,
            latitude: Some(10.0),
            longitude: Some(20.0),
            confirmed,
            deaths,
        }
    }

    pub fn series(country: &str, date: &str, confirmed: u64, deaths: u64, doses: Option<u64>) -> TimeSeriesRow {
        TimeSeriesRow {
            country: country.to_string(),
            reported_on: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            confirmed,
            deaths,
            doses_administered: doses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_country_choices_are_unique_in_first_seen_order() {
        let snapshot = Snapshot::new(
            vec![report("B", 1, 0), report("A", 1, 0), report("B", 2, 0)],
            vec![
                series("Y", "2023-01-01", 1, 0, None),
                series("X", "2023-01-01", 1, 0, None),
                series("Y", "2023-01-02", 1, 0, None),
            ],
        );

        assert_eq!(snapshot.map_country_choices(), vec!["B", "A"]);
        assert_eq!(snapshot.time_series_country_choices(), vec!["Y", "X"]);
    }

    #[test]
    fn test_empty_snapshot_has_no_choices() {
        let snapshot = Snapshot::default();
        assert!(snapshot.map_country_choices().is_empty());
        assert!(snapshot.time_series_country_choices().is_empty());
    }
}
