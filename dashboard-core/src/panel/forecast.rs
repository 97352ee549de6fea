use crate::{
    chart::{Axis, ChartKind, ChartSpec, Trace, TraceStyle},
    forecast::{DailyBucket, ForecastAggregator, round_half_up},
    format::emoji_for_description,
    model::ForecastReading,
    theme::RenderSettings,
};

use super::PanelContent;

/// Daily-average bar chart. No readings gives an empty chart, not an error.
pub fn build(
    readings: &[ForecastReading],
    aggregator: &ForecastAggregator,
    settings: &RenderSettings,
) -> PanelContent {
    let buckets = aggregator.aggregate(readings);
    let colors = &settings.colors;

    let dates: Vec<String> = buckets.iter().map(|b| b.label()).collect();
    let temperatures: Vec<i64> = buckets.iter().map(|b| b.display_temperature()).collect();

    let bars = Trace {
        name: "Temperature (°C)".to_string(),
        style: TraceStyle::Bar,
        x: dates,
        y: temperatures.iter().map(|&t| t as f64).collect(),
        text: temperatures.iter().map(|t| format!("{t}°C")).collect(),
        color: colors.primary.clone(),
    };

    let chart = ChartSpec {
        title: format!("5-Day Weather Forecast ({})", aggregator.zone_label()),
        title_color: colors.text.clone(),
        kind: ChartKind::Series(vec![bars]),
        x_axis: Some(Axis {
            title: "Date".to_string(),
            grid_color: colors.border.clone(),
            tick_text: Some(buckets.iter().map(|b| b.tick_label()).collect()),
        }),
        y_axis: Some(Axis {
            title: "Temperature (°C)".to_string(),
            grid_color: colors.border.clone(),
            tick_text: None,
        }),
        annotations: Vec::new(),
    };

    let content = PanelContent::new(settings);
    let content = if buckets.is_empty() {
        content.line("No forecast readings available.")
    } else {
        buckets.iter().fold(content, |content, bucket| content.line(day_summary(bucket)))
    };
    content.chart(chart)
}

/// e.g. `Fri, 16 Oct  🌧️ 25°C  💧 50%  light rain`
fn day_summary(bucket: &DailyBucket) -> String {
    let description = bucket.description.as_deref().unwrap_or_default();
    let line = format!(
        "{}  {} {}°C  💧 {}%",
        bucket.tick_label(),
        emoji_for_description(description),
        bucket.display_temperature(),
        round_half_up(bucket.average_humidity()),
    );

    if description.is_empty() { line } else { format!("{line}  {description}") }
}
