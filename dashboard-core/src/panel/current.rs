use crate::{
    chart::{ChartKind, ChartSpec, Color, Gauge, GaugeStep},
    forecast::{ForecastAggregator, round_half_up},
    format::{emoji_for_description, wind_direction_label, wind_emoji},
    model::WeatherSnapshot,
    theme::RenderSettings,
};

use super::PanelContent;

const HUMIDITY_THRESHOLD: f64 = 80.0;
const WIND_THRESHOLD: f64 = 15.0;
const WIND_GAUGE_MAX: f64 = 20.0;

pub fn build(
    snapshot: &WeatherSnapshot,
    aggregator: &ForecastAggregator,
    settings: &RenderSettings,
) -> PanelContent {
    let wind_speed = round_tenth(snapshot.wind_speed);

    let content = PanelContent::new(settings)
        .line(format!(
            "{}  {}°C  {}",
            emoji_for_description(&snapshot.description),
            round_half_up(snapshot.temperature),
            snapshot.description,
        ))
        .line(format!("💧 Humidity: {}%", round_half_up(snapshot.humidity)))
        .line(format!(
            "{} Wind Speed: {:.1} m/s",
            wind_emoji(snapshot.wind_speed),
            snapshot.wind_speed,
        ))
        .line(format!(
            "🧭 Wind Direction: {} ({}°)",
            wind_direction_label(snapshot.wind_deg as f64),
            snapshot.wind_deg,
        ))
        .line(format!("👁️ Visibility: {:.1} km", snapshot.visibility as f64 / 1000.0))
        .line(format!("⏱️ Pressure: {} hPa", snapshot.pressure))
        .line(format!("☁️ Cloudiness: {}%", snapshot.clouds))
        .chart(humidity_gauge(round_half_up(snapshot.humidity) as f64, settings))
        .chart(wind_gauge(wind_speed, settings));

    match snapshot.timestamp {
        Some(at) => content.line(format!(
            "🕒 Updated: {} {}",
            at.with_timezone(&aggregator.offset()).format("%-d %b %H:%M"),
            aggregator.zone_label(),
        )),
        None => content,
    }
}

fn humidity_gauge(value: f64, settings: &RenderSettings) -> ChartSpec {
    gauge_chart(
        "Humidity %",
        Gauge {
            value,
            min: 0.0,
            max: 100.0,
            steps: steps(&[
                (0.0, 30.0, "#B4E1FF"),
                (30.0, 70.0, "#82CFFF"),
                (70.0, 100.0, "#1E90FF"),
            ]),
            threshold: Some(HUMIDITY_THRESHOLD),
            bar_color: settings.colors.primary.clone(),
            suffix: "%".to_string(),
        },
        settings,
    )
}

fn wind_gauge(value: f64, settings: &RenderSettings) -> ChartSpec {
    gauge_chart(
        "Wind Speed (m/s)",
        Gauge {
            value,
            min: 0.0,
            max: WIND_GAUGE_MAX,
            steps: steps(&[(0.0, 5.0, "#B4FFB4"), (5.0, 10.0, "#82FF82"), (10.0, 20.0, "#1E901E")]),
            threshold: Some(WIND_THRESHOLD),
            bar_color: settings.colors.primary.clone(),
            suffix: " m/s".to_string(),
        },
        settings,
    )
}

fn gauge_chart(title: &str, gauge: Gauge, settings: &RenderSettings) -> ChartSpec {
    ChartSpec {
        title: title.to_string(),
        title_color: settings.colors.text.clone(),
        kind: ChartKind::Gauge(gauge),
        x_axis: None,
        y_axis: None,
        annotations: Vec::new(),
    }
}

fn steps(ranges: &[(f64, f64, &str)]) -> Vec<GaugeStep> {
    ranges
        .iter()
        .map(|&(from, to, color)| GaugeStep { from, to, color: Color::new(color) })
        .collect()
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
