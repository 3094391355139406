//! Marker layer for the global map

use serde::Serialize;
use std::collections::HashSet;

use crate::config::DashboardConfig;
use crate::db::DailyReportRow;
use crate::snapshot::Snapshot;

/// How confirmed counts turn into marker sizes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerScale {
    /// Area in px² given to the largest confirmed count in the layer
    pub reference_area: f64,
    /// Lower bound on the marker diameter in px
    pub min_size: f64,
}

impl Default for MarkerScale {
    fn default() -> Self {
        Self {
            reference_area: 2500.0,
            min_size: 2.0,
        }
    }
}

impl From<&DashboardConfig> for MarkerScale {
    fn from(config: &DashboardConfig) -> Self {
        Self {
            reference_area: config.marker_reference_area,
            min_size: config.marker_min_size,
        }
    }
}

impl MarkerScale {
    /// Diameter under area scaling: area grows linearly with `confirmed`
    pub fn size_for(&self, confirmed: u64, max_confirmed: u64) -> f64 {
        if max_confirmed == 0 {
            return self.min_size;
        }
        let area = self.reference_area * confirmed as f64 / max_confirmed as f64;
        area.sqrt().max(self.min_size)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lon: f64,
    pub label: String,
    pub confirmed: u64,
    pub deaths: u64,
    pub size_hint: f64,
    /// Position on the colour scale, 0.0 to 1.0
    pub color_hint: f64,
    /// HTML-escaped tooltip text
    pub hover_text: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MarkerLayer {
    pub markers: Vec<Marker>,
    pub max_confirmed: u64,
}

impl MarkerLayer {
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Build one marker per daily report row of the selected countries.
///
/// Rows without both coordinates are left off the map. An empty selection
/// gives an empty layer.
pub fn build_map_view<S: AsRef<str>>(snapshot: &Snapshot, countries: &[S], scale: &MarkerScale) -> MarkerLayer {
    if countries.is_empty() {
        return MarkerLayer::default();
    }

    let selected: HashSet<&str> = countries.iter().map(|c| c.as_ref()).collect();
    let rows: Vec<(&DailyReportRow, (f64, f64))> = snapshot
        .daily_report()
        .iter()
        .filter(|r| selected.contains(r.country.as_str()))
        .filter_map(|r| r.position().map(|pos| (r, pos)))
        .collect();

    let max_confirmed = rows.iter().map(|(r, _)| r.confirmed).max().unwrap_or(0);

    let markers = rows
        .into_iter()
        .map(|(row, (lat, lon))| Marker {
            lat,
            lon,
            label: row.location_label().to_string(),
            confirmed: row.confirmed,
            deaths: row.deaths,
            size_hint: scale.size_for(row.confirmed, max_confirmed),
            color_hint: if max_confirmed == 0 {
                0.0
            } else {
                row.confirmed as f64 / max_confirmed as f64
            },
            hover_text: hover_text(row),
        })
        .collect();

    MarkerLayer {
        markers,
        max_confirmed,
    }
}

/// `Location: country, province, county<br>Confirmed: n<br>Deaths: n`
fn hover_text(row: &DailyReportRow) -> String {
    let location = [Some(row.country.as_str()), row.province.as_deref(), row.county.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Location: {}<br>Confirmed: {}<br>Deaths: {}",
        html_escape::encode_text(&location),
        row.confirmed,
        row.deaths
    )
}
