//! The four dashboard panels and what each of them shows.
//!
//! Builders are pure: payload + [`RenderSettings`] in, [`PanelContent`] out.
//! Fetching and publishing live in [`crate::refresh`].

use std::fmt;

use crate::{chart::ChartSpec, theme::RenderSettings};

pub mod current;
pub mod forecast;
pub mod predictions;
pub mod recommendations;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PanelId {
    CurrentWeather,
    Forecast,
    Predictions,
    Recommendations,
}

impl PanelId {
    pub const fn all() -> [PanelId; 4] {
        [PanelId::CurrentWeather, PanelId::Forecast, PanelId::Predictions, PanelId::Recommendations]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PanelId::CurrentWeather => "current-weather",
            PanelId::Forecast => "forecast",
            PanelId::Predictions => "predictions",
            PanelId::Recommendations => "recommendations",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PanelId::CurrentWeather => "Current Weather",
            PanelId::Forecast => "Forecast",
            PanelId::Predictions => "Temperature Predictions",
            PanelId::Recommendations => "Travel Recommendations",
        }
    }

    /// Shown in place of the panel when its load fails.
    pub fn error_message(&self) -> &'static str {
        match self {
            PanelId::CurrentWeather => "Unable to load weather data",
            PanelId::Forecast => "Unable to load forecast data",
            PanelId::Predictions => "Unable to load prediction data",
            PanelId::Recommendations => "Unable to load recommendations. Please try again later.",
        }
    }

    /// Placeholder published while the request is in flight, if any.
    pub fn loading_message(&self) -> Option<&'static str> {
        match self {
            PanelId::Predictions => Some("Loading predictions..."),
            _ => None,
        }
    }

    pub fn is_city_specific(&self) -> bool {
        !matches!(self, PanelId::Recommendations)
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelContent {
    pub lines: Vec<String>,
    pub charts: Vec<ChartSpec>,
    /// Theme the content was built with.
    pub settings: RenderSettings,
}

impl PanelContent {
    pub fn new(settings: &RenderSettings) -> Self {
        Self { lines: Vec::new(), charts: Vec::new(), settings: settings.clone() }
    }

    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn chart(mut self, chart: ChartSpec) -> Self {
        self.charts.push(chart);
        self
    }
}

/// What a panel region currently holds.
#[derive(Debug, Clone, PartialEq)]
pub enum PanelView {
    Loading(&'static str),
    Ready(PanelContent),
    Failed(&'static str),
}

impl PanelView {
    pub fn failed(panel: PanelId) -> Self {
        PanelView::Failed(panel.error_message())
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, PanelView::Ready(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_recommendations_ignore_city() {
        let city_specific: Vec<_> =
            PanelId::all().into_iter().filter(PanelId::is_city_specific).collect();
        assert_eq!(city_specific.len(), 3);
        assert!(!PanelId::Recommendations.is_city_specific());
    }

    #[test]
    fn failure_view_uses_static_message() {
        assert_eq!(
            PanelView::failed(PanelId::Forecast),
            PanelView::Failed("Unable to load forecast data")
        );
        assert!(!PanelView::failed(PanelId::Forecast).is_ready());
    }

    #[test]
    fn only_predictions_show_a_loading_placeholder() {
        assert_eq!(PanelId::Predictions.loading_message(), Some("Loading predictions..."));
        assert!(PanelId::CurrentWeather.loading_message().is_none());
    }
}
