use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{HistoryError, WeatherError};

/// Shown when the API returns a blank location name.
pub const UNKNOWN_CITY: &str = "Unknown City";

/// A validated geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Latitude must be within -90..=90 and longitude within -180..=180.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, WeatherError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(WeatherError::invalid_request(format!(
                "latitude {latitude} is outside -90..=90"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(WeatherError::invalid_request(format!(
                "longitude {longitude} is outside -180..=180"
            )));
        }

        Ok(Self { latitude, longitude })
    }

    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// One weather condition entry, e.g. `Rain / light rain / 10d`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub summary: String,
    pub description: String,
    pub icon_code: String,
}

/// Current weather for a coordinate, in metric units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location_name: String,
    pub temperature_c: f64,
    pub feels_like_c: f64,
    pub temp_min_c: f64,
    pub temp_max_c: f64,
    pub humidity_pct: u8,
    pub pressure_hpa: i32,
    pub wind_speed_ms: f64,
    pub wind_direction_deg: Option<f64>,
    /// In API order; the first entry is the primary condition.
    pub conditions: Vec<Condition>,
}

impl WeatherSnapshot {
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.conditions.first()
    }

    /// Location name, or [`UNKNOWN_CITY`] when the API left it blank.
    pub fn display_name(&self) -> &str {
        if self.location_name.trim().is_empty() {
            UNKNOWN_CITY
        } else {
            &self.location_name
        }
    }
}

/// Storage-assigned identifier of a saved forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecordId(pub i64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// A saved lookup in the local history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub id: RecordId,
    pub city_name: String,
    pub temperature_c: f64,
    pub wind_speed_ms: Option<f64>,
    pub saved_at: DateTime<Utc>,
}

/// Input for saving a new history entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewForecast {
    pub city_name: String,
    pub temperature_c: f64,
    pub wind_speed_ms: Option<f64>,
    pub saved_at: DateTime<Utc>,
}

impl NewForecast {
    pub fn new(
        city_name: impl Into<String>,
        temperature_c: f64,
        wind_speed_ms: Option<f64>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self { city_name: city_name.into(), temperature_c, wind_speed_ms, saved_at }
    }

    /// Summary of `snapshot` filed under `city_name`.
    pub fn from_snapshot(
        snapshot: &WeatherSnapshot,
        city_name: impl Into<String>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self::new(city_name, snapshot.temperature_c, Some(snapshot.wind_speed_ms), saved_at)
    }

    /// Readings must be finite and `saved_at` within years 0000..=9999, the
    /// range the store writes as fixed-width RFC 3339.
    pub fn validate(&self) -> Result<(), HistoryError> {
        if !self.temperature_c.is_finite() {
            return Err(HistoryError::invalid_record(format!(
                "temperature {} is not a finite number",
                self.temperature_c
            )));
        }
        if let Some(wind) = self.wind_speed_ms.filter(|w| !w.is_finite()) {
            return Err(HistoryError::invalid_record(format!("wind speed {wind} is not a finite number")));
        }
        if !(0..=9999).contains(&self.saved_at.year()) {
            return Err(HistoryError::invalid_record(format!(
                "saved_at {} is outside years 0000-9999",
                self.saved_at
            )));
        }
        Ok(())
    }

    pub(crate) fn into_record(self, id: RecordId) -> ForecastRecord {
        ForecastRecord {
            id,
            city_name: self.city_name,
            temperature_c: self.temperature_c,
            wind_speed_ms: self.wind_speed_ms,
            saved_at: self.saved_at,
        }
    }
}
