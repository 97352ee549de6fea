//! Terminal rendering of panels and chart specs.

use std::fmt::Write;

use dashboard_core::{
    PanelId, PanelView,
    chart::{ChartKind, ChartSpec, Color, Gauge, Trace, TraceStyle},
};

const GAUGE_WIDTH: usize = 30;
const BAR_WIDTH: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn panel(&self, panel: PanelId, view: &PanelView) -> String {
        let mut out = String::new();

        match view {
            PanelView::Loading(message) => {
                let _ = writeln!(out, "── {} ──", panel.title());
                let _ = writeln!(out, "  {message}");
            }
            PanelView::Failed(message) => {
                let _ = writeln!(out, "── {} ──", panel.title());
                let _ = writeln!(out, "  ⚠ {message}");
            }
            PanelView::Ready(content) => {
                let heading = format!("── {} ──", panel.title());
                let _ = writeln!(out, "{}", self.paint(&heading, &content.settings.colors.primary));
                for line in &content.lines {
                    let _ = writeln!(out, "  {line}");
                }
                for chart in &content.charts {
                    out.push_str(&self.chart(chart));
                }
            }
        }

        out
    }

    pub fn chart(&self, chart: &ChartSpec) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "  {}", self.paint(&chart.title, &chart.title_color));

        match &chart.kind {
            ChartKind::Gauge(gauge) => out.push_str(&self.gauge(gauge)),
            ChartKind::Series(traces) => {
                if chart.is_empty() {
                    let _ = writeln!(out, "    (no data)");
                }
                let ticks = chart.x_axis.as_ref().and_then(|a| a.tick_text.as_deref());
                for trace in traces.iter().filter(|t| !t.y.is_empty()) {
                    out.push_str(&self.trace(trace, ticks));
                }
            }
        }

        for note in &chart.annotations {
            let _ = writeln!(out, "    {note}");
        }

        out
    }

    fn gauge(&self, gauge: &Gauge) -> String {
        let filled = (gauge.fraction() * GAUGE_WIDTH as f64).round() as usize;
        let marker = gauge.threshold.map(|t| {
            let span = gauge.max - gauge.min;
            if span <= 0.0 {
                0
            } else {
                (((t - gauge.min) / span).clamp(0.0, 1.0) * GAUGE_WIDTH as f64).round() as usize
            }
        });

        let cells: String = (0..GAUGE_WIDTH)
            .map(|i| match (i < filled, Some(i) == marker) {
                (_, true) => '|',
                (true, false) => '█',
                (false, false) => '░',
            })
            .collect();

        let band_color = gauge.step_for(gauge.value).map(|s| &s.color).unwrap_or(&gauge.bar_color);
        format!(
            "    [{}] {}{}\n",
            self.paint(&cells, band_color),
            format_number(gauge.value),
            gauge.suffix
        )
    }

    fn trace(&self, trace: &Trace, ticks: Option<&[String]>) -> String {
        let mut out = String::new();
        let label = |i: usize| x_label(trace, ticks, i);

        match trace.style {
            TraceStyle::Bar => {
                // Bars grow with magnitude so sub-zero days still show up.
                let max = trace.y.iter().map(|v| v.abs()).fold(1.0, f64::max);
                for (i, value) in trace.y.iter().enumerate() {
                    let len = ((value.abs() / max) * BAR_WIDTH as f64).round() as usize;
                    let text = trace.text.get(i).cloned().unwrap_or_else(|| format_number(*value));
                    let _ = writeln!(
                        out,
                        "    {:<12} {} {}",
                        label(i),
                        self.paint(&"█".repeat(len), &trace.color),
                        text
                    );
                }
            }
            TraceStyle::LineMarkers => {
                let _ = writeln!(out, "    {}", self.paint(&trace.name, &trace.color));
                for (i, value) in trace.y.iter().enumerate() {
                    let _ = writeln!(out, "    {:<12} ● {}°C", label(i), format_number(*value));
                }
            }
            TraceStyle::FilledBand => {
                let _ = writeln!(out, "    {}", self.paint(&trace.name, &trace.color));
                for (x, upper, lower) in trace.band_rows() {
                    let _ = writeln!(
                        out,
                        "    {:<12} {}..{}°C",
                        x,
                        format_number(lower),
                        format_number(upper)
                    );
                }
            }
        }

        out
    }

    fn paint(&self, text: &str, color: &Color) -> String {
        match (self.color, color.rgb()) {
            (true, Some((r, g, b))) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
            _ => text.to_string(),
        }
    }
}

fn x_label<'a>(trace: &'a Trace, ticks: Option<&'a [String]>, i: usize) -> &'a str {
    ticks
        .and_then(|t| t.get(i))
        .or_else(|| trace.x.get(i))
        .map(String::as_str)
        .unwrap_or("")
}

fn format_number(value: f64) -> String {
    if value.fract() == 0.0 { format!("{value:.0}") } else { format!("{value:.1}") }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::{
        ForecastAggregator, PanelContent, PredictionReport, RenderSettings, panel,
        model::{Prediction, WeatherSnapshot},
    };

    fn snapshot() -> WeatherSnapshot {
        WeatherSnapshot {
            temperature: 24.0,
            description: "mist".into(),
            humidity: 90.0,
            wind_speed: 12.0,
            wind_deg: 180,
            visibility: 2000,
            pressure: 1011,
            clouds: 75,
            timestamp: None,
        }
    }

    fn current_panel() -> PanelContent {
        let aggregator = ForecastAggregator::default();
        panel::current::build(&snapshot(), &aggregator, &RenderSettings::default())
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let content = current_panel();
        let out = Renderer::new(false).panel(PanelId::CurrentWeather, &PanelView::Ready(content));

        assert!(!out.contains('\x1b'));
        assert!(out.contains("── Current Weather ──"));
        assert!(out.contains("🌫️  24°C  mist"));
        assert!(out.contains("90%"));
        assert!(out.contains("12 m/s"));
    }

    #[test]
    fn colored_output_uses_theme_primary() {
        let content = current_panel();
        let out = Renderer::new(true).panel(PanelId::CurrentWeather, &PanelView::Ready(content));
        assert!(out.contains("\x1b[38;2;33;150;243m"));
    }

    #[test]
    fn gauge_marks_threshold() {
        let content = current_panel();
        let out = Renderer::new(false).chart(&content.charts[0]);
        assert!(out.contains('|'));
        assert!(out.contains("Humidity %"));
    }

    #[test]
    fn failed_and_loading_views() {
        let renderer = Renderer::new(false);
        let failed = renderer.panel(PanelId::Forecast, &PanelView::failed(PanelId::Forecast));
        assert!(failed.contains("Unable to load forecast data"));

        let loading =
            renderer.panel(PanelId::Predictions, &PanelView::Loading("Loading predictions..."));
        assert!(loading.contains("Loading predictions..."));
    }

    #[test]
    fn empty_forecast_says_no_data() {
        let content =
            panel::forecast::build(&[], &ForecastAggregator::default(), &RenderSettings::default());
        let out = Renderer::new(false).panel(PanelId::Forecast, &PanelView::Ready(content));
        assert!(out.contains("(no data)"));
    }

    #[test]
    fn sub_zero_days_still_get_bars() {
        let trace = Trace {
            name: "Temperature (°C)".into(),
            style: TraceStyle::Bar,
            x: vec!["a".into(), "b".into()],
            y: vec![-10.0, -5.0],
            text: vec!["-10°C".into(), "-5°C".into()],
            color: Color::new("#2196F3"),
        };

        let out = Renderer::new(false).trace(&trace, None);
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0].matches('█').count(), BAR_WIDTH);
        assert_eq!(lines[1].matches('█').count(), BAR_WIDTH / 2);
        assert!(lines[1].ends_with("-5°C"));
    }

    #[test]
    fn band_is_rendered_as_ranges() {
        let report = PredictionReport {
            predictions: vec![Prediction {
                date: chrono::NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
                temperature: 28.0,
                temperature_upper: Some(30.0),
                temperature_lower: Some(26.0),
            }],
            accuracy: 88.0,
            error_margin: 1.5,
        };
        let content = panel::predictions::build(&report, &RenderSettings::default());
        let out = Renderer::new(false).panel(PanelId::Predictions, &PanelView::Ready(content));

        assert!(out.contains("Prediction Interval"));
        assert!(out.contains("26..30°C"));
        assert!(out.contains("Error Margin: ±1.5°C"));
    }
}
