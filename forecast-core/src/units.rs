//! Presentation helpers: unit conversion and the short text forms used when
//! printing a snapshot or a history row.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Temperature unit used for display. Stored values are always Celsius.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Celsius => "°C",
            Self::Fahrenheit => "°F",
        }
    }

    /// Convert a Celsius reading into this unit.
    pub fn convert(&self, celsius: f64) -> f64 {
        match self {
            Self::Celsius => celsius,
            Self::Fahrenheit => celsius_to_fahrenheit(celsius),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Celsius => "celsius",
            Self::Fahrenheit => "fahrenheit",
        })
    }
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 9.0 / 5.0 + 32.0
}

/// `12.3°C` / `54.1°F`
pub fn format_temperature(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.1}{}", unit.convert(celsius), unit.symbol())
}

pub fn format_wind(speed_ms: f64) -> String {
    format!("Wind: {speed_ms:.1} m/s")
}

pub fn format_humidity(pct: u8) -> String {
    format!("Humidity: {pct}%")
}

/// Uppercase the first letter of every word ("light rain" -> "Light Rain").
pub fn capitalize_words(text: &str) -> String {
    text.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fahrenheit_fixed_points() {
        assert_eq!(celsius_to_fahrenheit(0.0), 32.0);
        assert_eq!(celsius_to_fahrenheit(100.0), 212.0);
        assert_eq!(celsius_to_fahrenheit(-40.0), -40.0);
    }

    #[test]
    fn formats_temperature_in_both_units() {
        assert_eq!(format_temperature(15.5, TemperatureUnit::Celsius), "15.5°C");
        assert_eq!(format_temperature(100.0, TemperatureUnit::Fahrenheit), "212.0°F");
    }

    #[test]
    fn formats_wind_and_humidity() {
        assert_eq!(format_wind(3.24), "Wind: 3.2 m/s");
        assert_eq!(format_humidity(81), "Humidity: 81%");
    }

    #[test]
    fn capitalizes_each_word() {
        assert_eq!(capitalize_words("light intensity drizzle"), "Light Intensity Drizzle");
        assert_eq!(capitalize_words(""), "");
    }

    #[test]
    fn unit_serializes_lowercase() {
        let s = serde_json::to_string(&TemperatureUnit::Fahrenheit).unwrap();
        assert_eq!(s, "\"fahrenheit\"");
    }
}
