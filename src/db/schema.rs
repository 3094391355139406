//! Database schema definitions
//!
//! The dashboard never writes to the store. Columns are cast explicitly so
//! that tables written by dataframe tooling (where integer columns holding
//! missing values end up as REAL) still decode into the typed rows.

pub const SELECT_DAILY_REPORT: &str = r#"
SELECT
    CAST(country AS TEXT),
    CAST(province AS TEXT),
    CAST(county AS TEXT),
    CAST(latitude AS REAL),
    CAST(longitude AS REAL),
    CAST(confirmed AS INTEGER),
    CAST(deaths AS INTEGER)
FROM daily_report
"#;

pub const SELECT_TIME_SERIES: &str = r#"
SELECT
    CAST(country AS TEXT),
    CAST(reported_on AS TEXT),
    CAST(confirmed AS INTEGER),
    CAST(deaths AS INTEGER),
    CAST(doses_administered AS INTEGER)
FROM time_series
"#;

/// Date format of `time_series.reported_on`
pub const REPORTED_ON_FORMAT: &str = "%Y-%m-%d";

#[cfg(test)]
pub const CREATE_DAILY_REPORT_TABLE: &str = r#"
CREATE TABLE daily_report (
    country TEXT NOT NULL,
    province TEXT,
    county TEXT,
    latitude REAL,
    longitude REAL,
    confirmed INTEGER,
    deaths INTEGER
)
"#;

#[cfg(test)]
pub const CREATE_TIME_SERIES_TABLE: &str = r#"
CREATE TABLE time_series (
    reported_on TEXT NOT NULL,
    country TEXT NOT NULL,
    confirmed INTEGER,
    deaths INTEGER,
    doses_administered INTEGER
)
"#;
