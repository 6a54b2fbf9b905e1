use crate::{
    Config, WeatherError,
    model::{Coordinate, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current-weather readings.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    /// One fresh round-trip per call; nothing is cached or retried.
    async fn current_weather(&self, coordinate: &Coordinate) -> Result<WeatherSnapshot, WeatherError>;

    /// URL of the pictogram for `icon_code`.
    fn icon_url(&self, icon_code: &str) -> String;

    /// Best-effort icon download. Failures are logged and yield `None`.
    async fn fetch_icon(&self, url: &str) -> Option<Vec<u8>>;
}

/// Construct the weather client described by `config`.
pub fn provider_from_config(config: &Config) -> Result<Box<dyn WeatherClient>, WeatherError> {
    let api_key = config.api_key().ok_or_else(|| {
        WeatherError::configuration(
            "No API key configured.\n\
             Hint: run `forecast configure` or set FORECAST_API_KEY.",
        )
    })?;

    let client = OpenWeatherClient::with_settings(api_key, &config.client)?;
    Ok(Box::new(client))
}
