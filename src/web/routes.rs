//! HTTP routes

use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::AppState;
use crate::aggregation::Summary;
use crate::views::{build_time_series_view, MarkerLayer, TimeSeriesView};

/// Serve the dashboard page
pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// API: Header figures
pub async fn api_summary(State(state): State<Arc<AppState>>) -> Json<Summary> {
    Json(state.summary.clone())
}

#[derive(Debug, Serialize)]
pub struct CountriesResponse {
    /// Multi-select choices for the map
    pub map: Vec<String>,
    /// Single-select choices for the time series tab
    pub time_series: Vec<String>,
    pub default_map_selection: Vec<String>,
    pub default_country: String,
}

/// API: Dropdown choices and their initial values
pub async fn api_countries(State(state): State<Arc<AppState>>) -> Json<CountriesResponse> {
    Json(CountriesResponse {
        map: state.snapshot.map_country_choices(),
        time_series: state.snapshot.time_series_country_choices(),
        default_map_selection: state.default_map_selection().to_vec(),
        default_country: state.default_country.clone(),
    })
}

#[derive(Debug, Deserialize)]
pub struct MapRequest {
    #[serde(default)]
    pub countries: Vec<String>,
}

/// API: Marker layer for the default selection (page load)
pub async fn api_map_default(State(state): State<Arc<AppState>>) -> Json<MarkerLayer> {
    let layer = state.map_layer(state.default_map_selection());
    Json(MarkerLayer::clone(&layer))
}

/// API: Marker layer for the countries the user picked
pub async fn api_map(
    State(state): State<Arc<AppState>>,
    Json(request): Json<MapRequest>,
) -> Json<MarkerLayer> {
    tracing::debug!("Map requested for {} countries", request.countries.len());
    let layer = state.map_layer(&request.countries);
    Json(MarkerLayer::clone(&layer))
}

#[derive(Debug, Deserialize)]
pub struct TimeSeriesQuery {
    pub country: Option<String>,
}

/// API: Confirmed, deaths and doses series for one country
pub async fn api_time_series(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TimeSeriesQuery>,
) -> Json<TimeSeriesView> {
    let country = query.country.as_deref().unwrap_or(&state.default_country);
    let view = build_time_series_view(&state.snapshot, country);
    if view.is_empty() {
        tracing::debug!("No time series rows for '{}'", country);
    }
    Json(view)
}
