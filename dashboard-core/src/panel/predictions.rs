use crate::{
    chart::{Axis, ChartKind, ChartSpec, Color, Trace, TraceStyle},
    forecast::round_half_up,
    model::{Prediction, PredictionReport},
    theme::RenderSettings,
};

use super::PanelContent;

const LINE_COLOR: &str = "#2196F3";
const BAND_COLOR: &str = "rgba(33, 150, 243, 0.2)";

pub fn build(report: &PredictionReport, settings: &RenderSettings) -> PanelContent {
    let colors = &settings.colors;
    let predictions = &report.predictions;
    let x: Vec<String> = predictions.iter().map(day_label).collect();

    let mut traces = vec![Trace {
        name: "Predicted Temperature".to_string(),
        style: TraceStyle::LineMarkers,
        x: x.clone(),
        y: predictions.iter().map(|p| round_half_up(p.temperature) as f64).collect(),
        text: Vec::new(),
        color: Color::new(LINE_COLOR),
    }];

    // The first record decides whether the series carries bounds at all.
    // An empty list has no first record and still renders: an empty chart
    // plus the model annotations, not the failure view.
    if predictions.first().and_then(Prediction::bounds).is_some() {
        traces.push(confidence_band(predictions, x));
    }

    let accuracy = format!("Model Accuracy: {}%", report.accuracy);
    let margin = format!("Error Margin: ±{}°C", report.error_margin);

    let chart = ChartSpec {
        title: "Temperature Predictions".to_string(),
        title_color: colors.text.clone(),
        kind: ChartKind::Series(traces),
        x_axis: Some(Axis {
            title: "Date".to_string(),
            grid_color: colors.border.clone(),
            tick_text: None,
        }),
        y_axis: Some(Axis {
            title: "Temperature (°C)".to_string(),
            grid_color: colors.border.clone(),
            tick_text: None,
        }),
        annotations: vec![accuracy.clone(), margin.clone()],
    };

    PanelContent::new(settings).line(accuracy).line(margin).chart(chart)
}

/// Closed polygon: labels forward then reversed, upper bounds forward then
/// lower bounds reversed. A record without bounds pins the band to its point.
fn confidence_band(predictions: &[Prediction], x: Vec<String>) -> Trace {
    let edge = |pick: fn((f64, f64)) -> f64| -> Vec<f64> {
        predictions
            .iter()
            .map(|p| {
                let value = p.bounds().map(pick).unwrap_or(p.temperature);
                round_half_up(value) as f64
            })
            .collect()
    };

    let upper = edge(|(upper, _)| upper);
    let lower = edge(|(_, lower)| lower);

    let band_x = x.iter().chain(x.iter().rev()).cloned().collect();
    let band_y = upper.into_iter().chain(lower.into_iter().rev()).collect();

    Trace {
        name: "Prediction Interval".to_string(),
        style: TraceStyle::FilledBand,
        x: band_x,
        y: band_y,
        text: Vec::new(),
        color: Color::new(BAND_COLOR),
    }
}

fn day_label(prediction: &Prediction) -> String {
    prediction.date.format("%a, %-d %b").to_string()
}
