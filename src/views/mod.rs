//! View builders invoked by the web shell

pub mod map;
pub mod time_series;

pub use map::{build_map_view, MarkerLayer, MarkerScale};
pub use time_series::{build_time_series_view, TimeSeriesView};
