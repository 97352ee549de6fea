use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Boundary check run on every decoded payload before it reaches a panel.
///
/// A payload that parses but breaks one of these rules is rejected as a whole,
/// the panel never renders partial output from it.
pub trait Validate {
    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

impl<T: Validate> Validate for Vec<T> {
    fn validate(&self) -> Result<(), String> {
        self.iter()
            .enumerate()
            .try_for_each(|(i, item)| item.validate().map_err(|e| format!("item {i}: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub description: String,
    pub humidity: f64,
    pub wind_speed: f64,
    pub wind_deg: i64,
    pub visibility: i64,
    pub pressure: i64,
    pub clouds: i64,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Validate for WeatherSnapshot {
    fn validate(&self) -> Result<(), String> {
        percentage("humidity", self.humidity)?;
        percentage("clouds", self.clouds as f64)?;

        if !(0..360).contains(&self.wind_deg) {
            return Err(format!("wind_deg {} outside [0, 360)", self.wind_deg));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastReading {
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub description: Option<String>,
}

impl Validate for ForecastReading {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub date: NaiveDate,
    pub temperature: f64,
    pub temperature_upper: Option<f64>,
    pub temperature_lower: Option<f64>,
}

impl Prediction {
    /// `(upper, lower)` when both bounds were sent.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        Some((self.temperature_upper?, self.temperature_lower?))
    }
}

impl Validate for Prediction {
    fn validate(&self) -> Result<(), String> {
        let date = self.date;
        match (self.temperature_upper, self.temperature_lower) {
            (Some(_), None) => Err(format!("{date}: temperature_upper without temperature_lower")),
            (None, Some(_)) => Err(format!("{date}: temperature_lower without temperature_upper")),
            _ => Ok(()),
        }
    }
}

/// Body of `/api/predictions/{city}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPredictionReport")]
pub struct PredictionReport {
    pub predictions: Vec<Prediction>,
    pub accuracy: f64,
    pub error_margin: f64,
}

impl Validate for PredictionReport {
    fn validate(&self) -> Result<(), String> {
        self.predictions.validate()
    }
}

#[derive(Debug, Deserialize)]
struct RawModelInfo {
    confidence_score: Option<f64>,
    mean_absolute_error: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RawPredictionReport {
    predictions: Vec<Prediction>,
    accuracy: Option<f64>,
    error_margin: Option<f64>,
    model_info: Option<RawModelInfo>,
}

impl TryFrom<RawPredictionReport> for PredictionReport {
    type Error = String;

    // Older backends only report `model_info`.
    fn try_from(raw: RawPredictionReport) -> Result<Self, Self::Error> {
        let info = raw.model_info.as_ref();

        let accuracy = raw
            .accuracy
            .or_else(|| info.and_then(|i| i.confidence_score))
            .ok_or("missing field `accuracy`")?;
        let error_margin = raw
            .error_margin
            .or_else(|| info.and_then(|i| i.mean_absolute_error))
            .ok_or("missing field `error_margin`")?;

        Ok(Self { predictions: raw.predictions, accuracy, error_margin })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRecommendation")]
pub struct Recommendation {
    pub city: String,
    pub reason: String,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub score: Option<f64>,
}

impl Recommendation {
    /// `(temperature, humidity)` when the backend reported current conditions.
    pub fn conditions(&self) -> Option<(f64, f64)> {
        Some((self.temperature?, self.humidity?))
    }
}

impl Validate for Recommendation {
    fn validate(&self) -> Result<(), String> {
        match self.humidity {
            Some(humidity) => {
                percentage("humidity", humidity).map_err(|e| format!("{}: {e}", self.city))
            }
            None => Ok(()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRecommendation {
    city: String,
    reason: String,
    temperature: Option<f64>,
    humidity: Option<f64>,
    score: Option<f64>,
}

impl TryFrom<RawRecommendation> for Recommendation {
    type Error = String;

    // Score-only entries come from backends that rank cities without
    // reporting conditions. Half a pair of conditions is never accepted.
    fn try_from(raw: RawRecommendation) -> Result<Self, Self::Error> {
        match (raw.temperature, raw.humidity, raw.score) {
            (Some(_), Some(_), _) | (None, None, Some(_)) => Ok(Self {
                city: raw.city,
                reason: raw.reason,
                temperature: raw.temperature,
                humidity: raw.humidity,
                score: raw.score,
            }),
            (_, None, _) => Err(format!("{}: missing field `humidity`", raw.city)),
            (None, _, _) => Err(format!("{}: missing field `temperature`", raw.city)),
        }
    }
}

fn percentage(field: &str, value: f64) -> Result<(), String> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} {value} outside [0, 100]"))
    }
}

/// Backend timestamps arrive either as RFC 3339 or as naive UTC
/// (`2024-05-01 09:00:00`).
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, de::Error};

    const NAIVE_FORMATS: &[&str] =
        &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"];

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }

        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`")))
    }

    pub fn deserialize_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(raw) => parse(&raw)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp `{raw}`"))),
        }
    }
}
