//! Core library for the weather dashboard.
//!
//! This crate defines:
//! - Configuration and the persisted theme preference
//! - A typed client for the dashboard backend
//! - Forecast aggregation and display formatting
//! - Declarative chart specs and the four panel builders
//! - The refresh controller that keeps every panel up to date
//!
//! It is used by `dashboard-cli`, which supplies the terminal rendering.

pub mod api;
pub mod chart;
pub mod config;
pub mod error;
pub mod forecast;
pub mod format;
pub mod model;
pub mod panel;
pub mod refresh;
pub mod theme;

pub use api::{DashboardApi, HttpDashboardApi};
pub use config::Config;
pub use error::{DashboardError, ErrorKind};
pub use forecast::{DailyBucket, ForecastAggregator};
pub use model::{ForecastReading, Prediction, PredictionReport, Recommendation, WeatherSnapshot};
pub use panel::{PanelContent, PanelId, PanelView};
pub use refresh::{ControlEvent, PanelSink, RefreshController, RefreshCycle, Trigger};
pub use theme::{
    FilePreferences, MemoryPreferences, PreferenceStore, RenderSettings, ThemeColors,
    ThemePreference, ThemeStore,
};
