//! Database module
//!
//! Reads the two source relations once, read-only, and turns each raw row into
//! a typed record. Anything that cannot be represented is a [`LoadError`].

mod schema;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde::Serialize;
use sqlx::{Pool, Sqlite, SqlitePool};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::DatabaseConfig;

/// One reporting location with its cumulative counts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyReportRow {
    pub country: String,
    pub province: Option<String>,
    pub county: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub confirmed: u64,
    pub deaths: u64,
}

impl DailyReportRow {
    /// Most specific identifier available: county, then province, then country
    pub fn location_label(&self) -> &str {
        self.county
            .as_deref()
            .or(self.province.as_deref())
            .unwrap_or(&self.country)
    }

    /// Both coordinates, if the row can be placed on a map
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) if lat.is_finite() && lon.is_finite() => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Cumulative counts for one country on one date
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    pub country: String,
    pub reported_on: NaiveDate,
    pub confirmed: u64,
    pub deaths: u64,
    pub doses_administered: Option<u64>,
}

/// A source row that does not fit the typed record
#[derive(Debug, Error, PartialEq)]
pub enum LoadError {
    #[error("{table} row {row}: country is missing")]
    MissingCountry { table: &'static str, row: usize },

    #[error("{table} row {row}: {column} is negative ({value})")]
    NegativeCount {
        table: &'static str,
        row: usize,
        column: &'static str,
        value: i64,
    },

    #[error("{table} row {row}: reported_on '{value}' is not a YYYY-MM-DD date")]
    InvalidDate {
        table: &'static str,
        row: usize,
        value: String,
    },
}

type RawDailyReport = (
    Option<String>,
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<f64>,
    Option<i64>,
    Option<i64>,
);

type RawTimeSeries = (
    Option<String>,
    Option<String>,
    Option<i64>,
    Option<i64>,
    Option<i64>,
);

const DAILY_REPORT: &str = "daily_report";
const TIME_SERIES: &str = "time_series";

#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Open the store read-only. A missing file fails here rather than
    /// creating an empty database.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let pool = SqlitePool::connect(&format!("sqlite:{}?mode=ro", config.url))
            .await
            .with_context(|| format!("Failed to open database: {}", config.url))?;
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn load_daily_report(&self) -> Result<Vec<DailyReportRow>> {
        let rows: Vec<RawDailyReport> = sqlx::query_as(schema::SELECT_DAILY_REPORT)
            .fetch_all(&self.pool)
            .await
            .context("Failed to read daily_report")?;

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, raw)| daily_report_from_raw(index, raw))
            .collect::<Result<Vec<_>, LoadError>>()?;

        debug!("Read {} daily_report rows", records.len());
        Ok(records)
    }

    pub async fn load_time_series(&self) -> Result<Vec<TimeSeriesRow>> {
        let rows: Vec<RawTimeSeries> = sqlx::query_as(schema::SELECT_TIME_SERIES)
            .fetch_all(&self.pool)
            .await
            .context("Failed to read time_series")?;

        let records = rows
            .into_iter()
            .enumerate()
            .map(|(index, raw)| time_series_from_raw(index, raw))
            .collect::<Result<Vec<_>, LoadError>>()?;

        debug!("Read {} time_series rows", records.len());
        Ok(records)
    }

    /// Release the connection once both tables are in memory
    pub async fn close(self) {
        self.pool.close().await;
        info!("Database connection closed");
    }
}

fn daily_report_from_raw(row: usize, raw: RawDailyReport) -> Result<DailyReportRow, LoadError> {
    let (country, province, county, latitude, longitude, confirmed, deaths) = raw;
    Ok(DailyReportRow {
        country: required_country(DAILY_REPORT, row, country)?,
        province: non_empty(province),
        county: non_empty(county),
        latitude,
        longitude,
        confirmed: count(DAILY_REPORT, row, "confirmed", confirmed)?.unwrap_or(0),
        deaths: count(DAILY_REPORT, row, "deaths", deaths)?.unwrap_or(0),
    })
}

fn time_series_from_raw(row: usize, raw: RawTimeSeries) -> Result<TimeSeriesRow, LoadError> {
    let (country, reported_on, confirmed, deaths, doses) = raw;
    let reported_on = reported_on.unwrap_or_default();
    let date = NaiveDate::parse_from_str(reported_on.trim(), schema::REPORTED_ON_FORMAT).map_err(|_| {
        LoadError::InvalidDate {
            table: TIME_SERIES,
            row,
            value: reported_on.clone(),
        }
    })?;

    Ok(TimeSeriesRow {
        country: required_country(TIME_SERIES, row, country)?,
        reported_on: date,
        confirmed: count(TIME_SERIES, row, "confirmed", confirmed)?.unwrap_or(0),
        deaths: count(TIME_SERIES, row, "deaths", deaths)?.unwrap_or(0),
        doses_administered: count(TIME_SERIES, row, "doses_administered", doses)?,
    })
}

fn required_country(table: &'static str, row: usize, value: Option<String>) -> Result<String, LoadError> {
    non_empty(value).ok_or(LoadError::MissingCountry { table, row })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn count(
    table: &'static str,
    row: usize,
    column: &'static str,
    value: Option<i64>,
) -> Result<Option<u64>, LoadError> {
    match value {
        None => Ok(None),
        Some(v) => u64::try_from(v)
            .map(Some)
            .map_err(|_| LoadError::NegativeCount { table, row, column, value: v }),
    }
}
