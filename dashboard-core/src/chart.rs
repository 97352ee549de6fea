//! Declarative chart descriptions.
//!
//! Panels describe *what* to draw (series, axes, thresholds, annotations) and
//! leave *how* to a rendering adapter. Nothing in here knows about terminals.

use std::fmt;

/// A CSS-style color: `#rgb`, `#rrggbb`, or `rgba(r, g, b, a)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Color(String);

impl Color {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// RGB components, or `None` for names like `red`, `transparent`.
    pub fn rgb(&self) -> Option<(u8, u8, u8)> {
        let value = self.0.trim();

        if let Some(hex) = value.strip_prefix('#') {
            return match hex.len() {
                6 => Some((
                    u8::from_str_radix(&hex[0..2], 16).ok()?,
                    u8::from_str_radix(&hex[2..4], 16).ok()?,
                    u8::from_str_radix(&hex[4..6], 16).ok()?,
                )),
                3 => {
                    let digit = |i: usize| u8::from_str_radix(&hex[i..=i], 16).ok().map(|d| d * 17);
                    Some((digit(0)?, digit(1)?, digit(2)?))
                }
                _ => None,
            };
        }

        let inner = value
            .strip_prefix("rgba(")
            .or_else(|| value.strip_prefix("rgb("))?
            .strip_suffix(')')?;
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>().ok());
        Some((parts.next()??, parts.next()??, parts.next()??))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: String,
    pub grid_color: Color,
    /// Overrides the category labels when present (same length as the series).
    pub tick_text: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeStep {
    pub from: f64,
    pub to: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub steps: Vec<GaugeStep>,
    pub threshold: Option<f64>,
    pub bar_color: Color,
    pub suffix: String,
}

impl Gauge {
    /// Position of `value` within the range, clamped to `0.0..=1.0`.
    pub fn fraction(&self) -> f64 {
        let span = self.max - self.min;
        if span <= 0.0 {
            return 0.0;
        }
        ((self.value - self.min) / span).clamp(0.0, 1.0)
    }

    pub fn step_for(&self, value: f64) -> Option<&GaugeStep> {
        self.steps.iter().find(|s| value >= s.from && value <= s.to)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceStyle {
    Bar,
    LineMarkers,
    /// Closed polygon: x runs forward then backward, y runs along the upper
    /// edge then back along the lower edge.
    FilledBand,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    pub style: TraceStyle,
    pub x: Vec<String>,
    pub y: Vec<f64>,
    /// Per-point text (bar labels); empty when unused.
    pub text: Vec<String>,
    pub color: Color,
}

impl Trace {
    /// Splits a band polygon back into `(x, upper, lower)` rows.
    pub fn band_rows(&self) -> Vec<(&str, f64, f64)> {
        if self.style != TraceStyle::FilledBand || self.x.len() != self.y.len() {
            return Vec::new();
        }

        let n = self.y.len() / 2;
        (0..n)
            .map(|i| (self.x[i].as_str(), self.y[i], self.y[self.y.len() - 1 - i]))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ChartKind {
    Gauge(Gauge),
    Series(Vec<Trace>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub title_color: Color,
    pub kind: ChartKind,
    pub x_axis: Option<Axis>,
    pub y_axis: Option<Axis>,
    pub annotations: Vec<String>,
}

impl ChartSpec {
    pub fn traces(&self) -> &[Trace] {
        match &self.kind {
            ChartKind::Series(traces) => traces,
            ChartKind::Gauge(_) => &[],
        }
    }

    pub fn is_empty(&self) -> bool {
        match &self.kind {
            ChartKind::Gauge(_) => false,
            ChartKind::Series(traces) => traces.iter().all(|t| t.y.is_empty()),
        }
    }
}
