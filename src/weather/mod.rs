//! Current weather, shown alongside the scan screen.
//!
//! Same shape as classification: try the remote forecast API, and on any
//! failure (including a missing API key) return a fixed reading so the
//! caller always has something to show.

use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// A current-weather reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherData {
    /// Temperature in degrees Celsius, rounded.
    pub temperature: i64,
    pub description: String,
    /// Relative humidity in percent.
    pub humidity: u8,
    pub icon: String,
    pub city: String,
}

impl WeatherData {
    /// Reading returned whenever the API cannot be used.
    pub fn fallback(city: &str) -> Self {
        Self {
            temperature: 32,
            description: "Partly cloudy".to_string(),
            humidity: 65,
            icon: "02d".to_string(),
            city: city.to_string(),
        }
    }
}

#[derive(Debug, Error)]
enum WeatherError {
    #[error("no weather API key configured")]
    MissingApiKey,
    #[error("weather request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("weather API returned HTTP {0}")]
    Status(u16),
    #[error("malformed weather response: {0}")]
    Malformed(String),
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: ApiMain,
    weather: Vec<ApiCondition>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct ApiCondition {
    description: String,
    icon: String,
}

/// Weather lookups with a fixed fallback.
pub struct WeatherService {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl WeatherService {
    /// Create a service for the current-weather endpoint at `url`.
    pub fn new(url: impl Into<String>, api_key: Option<String>) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;
        Ok(Self {
            client,
            url: url.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    /// Current weather in `city`; never fails.
    pub async fn current(&self, city: &str) -> WeatherData {
        match self.fetch(city).await {
            Ok(data) => data,
            Err(e) => {
                warn!(city, error = %e, "weather lookup failed, using fallback");
                WeatherData::fallback(city)
            }
        }
    }

    async fn fetch(&self, city: &str) -> Result<WeatherData, WeatherError> {
        let api_key = self.api_key.as_deref().ok_or(WeatherError::MissingApiKey)?;
        debug!(city, url = %self.url, "requesting weather");

        let response = self
            .client
            .get(&self.url)
            .query(&[("q", city), ("appid", api_key), ("units", "metric")])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(WeatherError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let api: ApiResponse =
            serde_json::from_slice(&body).map_err(|e| WeatherError::Malformed(e.to_string()))?;
        let condition = api
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::Malformed("empty weather list".to_string()))?;

        Ok(WeatherData {
            temperature: api.main.temp.round() as i64,
            description: condition.description,
            humidity: api.main.humidity,
            icon: condition.icon,
            city: api.name,
        })
    }
}
