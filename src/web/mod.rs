//! Web server module

mod middleware;
mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use cached::{Cached, SizedCache};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::{services::ServeDir, set_header::SetResponseHeaderLayer};
use tracing::{info, warn};

use crate::aggregation::{self, Summary};
use crate::config::{Config, DashboardConfig};
use crate::snapshot::SharedSnapshot;
use crate::views::{build_map_view, MarkerLayer, MarkerScale};

pub struct AppState {
    pub snapshot: SharedSnapshot,
    /// Computed once; the snapshot never changes
    pub summary: Summary,
    pub default_country: String,
    pub scale: MarkerScale,
    map_cache: Mutex<SizedCache<String, Arc<MarkerLayer>>>,
}

impl AppState {
    pub fn new(snapshot: SharedSnapshot, dashboard: &DashboardConfig) -> Result<Self> {
        let summary = aggregation::summarize(&snapshot, dashboard.vaccination_date()?, dashboard.top_n);
        Ok(Self {
            snapshot,
            summary,
            default_country: dashboard.default_country.clone(),
            scale: MarkerScale::from(dashboard),
            map_cache: Mutex::new(SizedCache::with_size(dashboard.map_cache_size)),
        })
    }

    /// Countries the map shows before the user changes the selection
    pub fn default_map_selection(&self) -> &[String] {
        &self.summary.top_countries
    }

    /// Marker layer for a selection, served from the cache when the same set
    /// of countries was asked for before
    pub fn map_layer(&self, countries: &[String]) -> Arc<MarkerLayer> {
        let key = selection_key(countries);
        if let Some(layer) = self.lock_cache().cache_get(&key).cloned() {
            return layer;
        }

        // Built without the lock so other selections are not held up
        let layer = Arc::new(build_map_view(&self.snapshot, countries, &self.scale));
        self.lock_cache().cache_set(key, layer.clone());
        layer
    }

    fn lock_cache(&self) -> MutexGuard<'_, SizedCache<String, Arc<MarkerLayer>>> {
        self.map_cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Order-insensitive cache key for a country selection
fn selection_key(countries: &[String]) -> String {
    let mut names: Vec<&str> = countries.iter().map(String::as_str).collect();
    names.sort_unstable();
    names.dedup();
    names.join("\u{1f}")
}

/// Handler for all unknown paths
async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Html("<!DOCTYPE html><html><head><title>404 Not Found</title></head><body><h1>Not Found</h1></body></html>"))
}

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/summary", get(routes::api_summary))
        .route("/countries", get(routes::api_countries))
        .route("/map", get(routes::api_map_default).post(routes::api_map))
        .route("/time-series", get(routes::api_time_series))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        ));

    Router::new()
        .route("/", get(routes::index))
        .nest("/api", api)
        .nest_service("/static", ServeDir::new("static"))
        .fallback(not_found)
        .layer(middleware::RequestLoggingLayer)
        .with_state(state)
}

/// Build the default map layer so the first page load hits the cache
pub fn warm_cache(state: &AppState) {
    let layer = state.map_layer(state.default_map_selection());
    if layer.is_empty() {
        warn!("Default map selection has no mappable rows");
    }
    info!(
        "Cache warmed with default selection ({} countries, {} markers)",
        state.default_map_selection().len(),
        layer.markers.len()
    );
}

pub async fn start_server(config: &Config, state: Arc<AppState>) -> Result<()> {
    let app = router(state);

    let addr = format!("{}:{}", config.server.host, config.server.http_port);
    info!("Web server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app).await?;

    Ok(())
}
