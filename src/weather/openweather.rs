use super::types::*;
use crate::config::Config;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),
    #[error("Upstream request timed out")]
    Timeout,
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("JSON parsing failed: {0}")]
    JsonParsing(#[from] serde_json::Error),
    #[error("City not found: {0}")]
    CityNotFound(String),
}

#[derive(Debug, Deserialize)]
struct UpstreamErrorBody {
    message: Option<String>,
}

/// Thin OpenWeather client: one upstream call per method, metric units, no
/// retries. Every call is bounded by the configured upstream timeout.
pub struct OpenWeatherClient {
    client: Client,
    config: Config,
}

impl OpenWeatherClient {
    pub fn new(config: Config) -> Result<Self, OpenWeatherError> {
        let client = Client::builder()
            .user_agent("WeatherBackend/1.0")
            .timeout(config.upstream_timeout())
            .build()?;

        Ok(Self { client, config })
    }

    /// Resolve a city name to its single best match.
    pub async fn geocode(&self, city: &str) -> Result<Place, OpenWeatherError> {
        let city = city.trim();
        let matches: Vec<GeocodeResponse> = self
            .make_request(&self.config.openweather_geocode_direct_path, &[
                ("q", city),
                ("limit", "1"),
            ])
            .await?;

        matches
            .into_iter()
            .next()
            .map(Place::from)
            .ok_or_else(|| OpenWeatherError::CityNotFound(city.to_string()))
    }

    pub async fn get_current(&self, lat: f64, lon: f64) -> Result<CurrentResponse, OpenWeatherError> {
        self.make_request(&self.config.openweather_current_path, &[
            ("lat", &lat.to_string()),
            ("lon", &lon.to_string()),
            ("units", "metric"),
        ])
        .await
    }

    pub async fn get_forecast(&self, lat: f64, lon: f64) -> Result<ForecastResponse, OpenWeatherError> {
        self.make_request(&self.config.openweather_forecast_path, &[
            ("lat", &lat.to_string()),
            ("lon", &lon.to_string()),
            ("units", "metric"),
        ])
        .await
    }

    async fn make_request<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, &str)],
    ) -> Result<T, OpenWeatherError> {
        let url = format!("{}{}", self.config.openweather_base_url, path);

        let mut request = self.client.get(&url).query(params);
        if let Some(api_key) = &self.config.openweather_api_key {
            request = request.query(&[("appid", api_key.as_str())]);
        }

        tracing::debug!("GET {}", url);
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                tracing::warn!("OpenWeather request to {} timed out", path);
                OpenWeatherError::Timeout
            } else {
                tracing::warn!("OpenWeather request to {} failed: {}", path, e);
                OpenWeatherError::RequestFailed(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<UpstreamErrorBody>(&body)
                .ok()
                .and_then(|b| b.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| format!("Request failed with status code {}", status.as_u16()));

            tracing::warn!("OpenWeather {} responded {}: {}", path, status, message);
            return Err(OpenWeatherError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
