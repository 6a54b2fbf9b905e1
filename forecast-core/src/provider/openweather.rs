use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    WeatherError,
    config::{ClientSettings, DEFAULT_ICON_BASE_URL},
    model::{Condition, Coordinate, WeatherSnapshot},
};

use super::WeatherClient;

const ICON_SUFFIX: &str = "@2x.png";

/// Icon URL on the public OpenWeather CDN, e.g. `10d` ->
/// `https://openweathermap.org/img/wn/10d@2x.png`.
pub fn resolve_icon_url(icon_code: &str) -> String {
    icon_url_with_base(DEFAULT_ICON_BASE_URL, icon_code)
}

pub(crate) fn icon_url_with_base(base: &str, icon_code: &str) -> String {
    format!("{base}{icon_code}{ICON_SUFFIX}")
}

/// Client for the OpenWeather current-weather endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    base_url: String,
    icon_base_url: String,
    http: Client,
}

impl OpenWeatherClient {
    /// Client with default endpoints. Fails if `api_key` is blank.
    pub fn new(api_key: impl Into<String>) -> Result<Self, WeatherError> {
        Self::with_settings(api_key, &ClientSettings::default())
    }

    pub fn with_settings(
        api_key: impl Into<String>,
        settings: &ClientSettings,
    ) -> Result<Self, WeatherError> {
        let api_key = api_key.into().trim().to_string();
        if api_key.is_empty() {
            return Err(WeatherError::configuration("OpenWeather API key is empty"));
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| WeatherError::configuration(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            api_key,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            icon_base_url: settings.icon_base_url.clone(),
            http,
        })
    }

    fn current_weather_url(&self, coordinate: &Coordinate) -> Result<Url, WeatherError> {
        let endpoint = format!("{}/weather", self.base_url);

        Url::parse_with_params(
            &endpoint,
            &[
                ("lat", coordinate.latitude().to_string()),
                ("lon", coordinate.longitude().to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ],
        )
        .map_err(|e| WeatherError::invalid_request(format!("Invalid weather URL {endpoint}: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: f64,
    temp_max: f64,
    pressure: i32,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
    #[serde(default)]
    deg: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    wind: OwWind,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

impl From<OwCurrentResponse> for WeatherSnapshot {
    fn from(parsed: OwCurrentResponse) -> Self {
        Self {
            location_name: parsed.name,
            temperature_c: parsed.main.temp,
            feels_like_c: parsed.main.feels_like,
            temp_min_c: parsed.main.temp_min,
            temp_max_c: parsed.main.temp_max,
            humidity_pct: parsed.main.humidity,
            pressure_hpa: parsed.main.pressure,
            wind_speed_ms: parsed.wind.speed,
            wind_direction_deg: parsed.wind.deg,
            conditions: parsed
                .weather
                .into_iter()
                .map(|w| Condition { summary: w.main, description: w.description, icon_code: w.icon })
                .collect(),
        }
    }
}

/// Decode a current-weather body. Blank bodies are reported as empty, not as a decode failure.
fn decode_current(body: &[u8]) -> Result<WeatherSnapshot, WeatherError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(WeatherError::EmptyResponse);
    }

    let parsed: OwCurrentResponse = serde_json::from_slice(body)?;
    Ok(parsed.into())
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn current_weather(&self, coordinate: &Coordinate) -> Result<WeatherSnapshot, WeatherError> {
        let url = self.current_weather_url(coordinate)?;

        tracing::debug!(%coordinate, "requesting current weather");

        let res = self.http.get(url).send().await?;

        let status = res.status();
        let body = res.bytes().await?;

        if !status.is_success() {
            let body = String::from_utf8_lossy(&body);
            tracing::warn!(%status, "OpenWeather current request failed");
            return Err(WeatherError::Api { status: status.as_u16(), body: truncate_body(&body) });
        }

        let snapshot = decode_current(&body).inspect_err(|e| {
            tracing::warn!(error = %e, "could not decode OpenWeather response");
        })?;

        tracing::debug!(location = snapshot.display_name(), temp = snapshot.temperature_c, "weather received");
        Ok(snapshot)
    }

    fn icon_url(&self, icon_code: &str) -> String {
        icon_url_with_base(&self.icon_base_url, icon_code)
    }

    async fn fetch_icon(&self, url: &str) -> Option<Vec<u8>> {
        let res = match self.http.get(url).send().await {
            Ok(res) => res,
            Err(e) => {
                tracing::debug!("Icon request failed: {}", e);
                return None;
            }
        };

        if !res.status().is_success() {
            tracing::debug!("Icon request returned status {}", res.status());
            return None;
        }

        match res.bytes().await {
            Ok(bytes) if !bytes.is_empty() => Some(bytes.to_vec()),
            Ok(_) => {
                tracing::debug!("Icon response was empty");
                None
            }
            Err(e) => {
                tracing::debug!("Icon body read failed: {}", e);
                None
            }
        }
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
