use std::{fmt::Debug, time::Duration};

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    error::DashboardError,
    model::{ForecastReading, PredictionReport, Recommendation, Validate, WeatherSnapshot},
};

/// The four read-only resources the dashboard consumes.
#[async_trait]
pub trait DashboardApi: Send + Sync + Debug {
    async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, DashboardError>;

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastReading>, DashboardError>;

    async fn predictions(&self, city: &str) -> Result<PredictionReport, DashboardError>;

    async fn recommendations(&self) -> Result<Vec<Recommendation>, DashboardError>;
}

#[derive(Debug, Clone)]
pub struct HttpDashboardApi {
    base_url: Url,
    http: Client,
}

impl HttpDashboardApi {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let base_url =
            Url::parse(base_url).with_context(|| format!("Invalid backend URL '{base_url}'"))?;

        if base_url.cannot_be_a_base() {
            return Err(anyhow!("Backend URL '{base_url}' cannot have API paths appended"));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { base_url, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `base_url` + `segments`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T>(&self, segments: &[&str]) -> Result<T, DashboardError>
    where
        T: DeserializeOwned + Validate,
    {
        let url = self.endpoint(segments);
        let endpoint = url.path().to_string();

        let res = self.http.get(url.clone()).send().await.map_err(|source| {
            DashboardError::Network { url: url.to_string(), source }
        })?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|source| DashboardError::Network { url: url.to_string(), source })?;

        if !status.is_success() {
            return Err(DashboardError::Status {
                url: url.to_string(),
                status: status.as_u16(),
                body: truncate_body(&body),
            });
        }

        let parsed: T = serde_json::from_str(&body)
            .map_err(|e| DashboardError::malformed(&endpoint, e.to_string()))?;
        parsed.validate().map_err(|reason| DashboardError::malformed(&endpoint, reason))?;

        debug!(%endpoint, bytes = body.len(), "fetched");
        Ok(parsed)
    }
}

#[async_trait]
impl DashboardApi for HttpDashboardApi {
    async fn current_weather(&self, city: &str) -> Result<WeatherSnapshot, DashboardError> {
        self.get_json(&["api", "weather", city]).await
    }

    async fn forecast(&self, city: &str) -> Result<Vec<ForecastReading>, DashboardError> {
        self.get_json(&["api", "forecast", city]).await
    }

    async fn predictions(&self, city: &str) -> Result<PredictionReport, DashboardError> {
        self.get_json(&["api", "predictions", city]).await
    }

    async fn recommendations(&self) -> Result<Vec<Recommendation>, DashboardError> {
        self.get_json(&["api", "recommendations"]).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(base: &str) -> HttpDashboardApi {
        HttpDashboardApi::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn endpoint_appends_segments() {
        let url = api("http://localhost:5000").endpoint(&["api", "weather", "Delhi"]);
        assert_eq!(url.as_str(), "http://localhost:5000/api/weather/Delhi");
    }

    #[test]
    fn endpoint_keeps_base_path_and_encodes_city() {
        let url =
            api("http://localhost:5000/dashboard/").endpoint(&["api", "forecast", "New Delhi"]);
        assert_eq!(url.as_str(), "http://localhost:5000/dashboard/api/forecast/New%20Delhi");
    }

    #[test]
    fn rejects_unusable_base_url() {
        assert!(HttpDashboardApi::new("not a url", Duration::from_secs(1)).is_err());
        let timeout = Duration::from_secs(1);
        assert!(HttpDashboardApi::new("mailto:someone@example.com", timeout).is_err());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let long = "é".repeat(150);
        let out = truncate_body(&long);
        assert!(out.ends_with("..."));
        assert!(out.len() <= 203);
        assert_eq!(truncate_body("short"), "short");
    }
}
