//! Per-country line chart series

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::TimeSeriesRow;
use crate::snapshot::Snapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeriesPoint {
    pub reported_on: NaiveDate,
    pub value: u64,
}

pub type Series = Vec<SeriesPoint>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesView {
    pub country: String,
    pub confirmed: Series,
    pub deaths: Series,
    /// Dates with no recorded doses are absent here
    pub doses_administered: Series,
}

impl TimeSeriesView {
    pub fn is_empty(&self) -> bool {
        self.confirmed.is_empty() && self.deaths.is_empty() && self.doses_administered.is_empty()
    }
}

/// Project one country's rows, oldest first, into three parallel series.
/// An unknown country gives three empty series.
pub fn build_time_series_view(snapshot: &Snapshot, country: &str) -> TimeSeriesView {
    let mut rows: Vec<&TimeSeriesRow> = snapshot
        .time_series()
        .iter()
        .filter(|r| r.country == country)
        .collect();
    rows.sort_by_key(|r| r.reported_on);

    let point = |reported_on, value| SeriesPoint { reported_on, value };

    TimeSeriesView {
        country: country.to_string(),
        confirmed: rows.iter().map(|r| point(r.reported_on, r.confirmed)).collect(),
        deaths: rows.iter().map(|r| point(r.reported_on, r.deaths)).collect(),
        doses_administered: rows
            .iter()
            .filter_map(|r| r.doses_administered.map(|doses| point(r.reported_on, doses)))
            .collect(),
    }
}
