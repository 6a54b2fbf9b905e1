//! Core library for the `forecast` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather current-weather client
//! - The locally persisted forecast history
//! - Shared domain models and presentation helpers
//!
//! It is used by `forecast-cli`, but can also be reused by other front ends.

pub mod cities;
pub mod config;
pub mod error;
pub mod history;
pub mod model;
pub mod provider;
pub mod units;

pub use cities::{CITIES, City, find_city};
pub use config::{ClientSettings, Config, HistorySettings};
pub use error::{HistoryError, WeatherError};
pub use history::{ForecastHistoryStore, HistoryEvent, SqliteHistoryStore};
pub use model::{Condition, Coordinate, ForecastRecord, NewForecast, RecordId, WeatherSnapshot};
pub use provider::{
    WeatherClient,
    openweather::{OpenWeatherClient, resolve_icon_url},
    provider_from_config,
};
pub use units::{TemperatureUnit, celsius_to_fahrenheit};
