use chrono::{DateTime, Local, Utc};
use forecast_core::{
    City, ForecastRecord, TemperatureUnit, WeatherSnapshot,
    units::{capitalize_words, format_humidity, format_temperature, format_wind},
};

/// Multi-line view of a snapshot. `label` is the name the user asked for, if any.
pub fn format_snapshot(snapshot: &WeatherSnapshot, label: Option<&str>, unit: TemperatureUnit) -> String {
    let name = match label {
        Some(label) if !label.trim().is_empty() => label,
        _ => snapshot.display_name(),
    };

    let mut output = format!("{name}\n");
    output.push_str(&format!("  {}\n", format_temperature(snapshot.temperature_c, unit)));

    if let Some(condition) = snapshot.primary_condition() {
        output.push_str(&format!("  {}\n", capitalize_words(&condition.description)));
    }

    output.push_str(&format!(
        "  Feels like: {}\n  Low / High: {} / {}\n",
        format_temperature(snapshot.feels_like_c, unit),
        format_temperature(snapshot.temp_min_c, unit),
        format_temperature(snapshot.temp_max_c, unit),
    ));
    output.push_str(&format!("  {}", format_wind(snapshot.wind_speed_ms)));
    if let Some(deg) = snapshot.wind_direction_deg {
        output.push_str(&format!(" from {deg:.0}\u{00b0}"));
    }
    output.push('\n');
    output.push_str(&format!("  {}\n", format_humidity(snapshot.humidity_pct)));
    output.push_str(&format!("  Pressure: {} hPa\n", snapshot.pressure_hpa));
    output
}

pub fn format_history(records: &[ForecastRecord], unit: TemperatureUnit) -> String {
    if records.is_empty() {
        return "No saved forecasts yet.\n".to_string();
    }

    let mut output = String::new();
    for record in records {
        output.push_str(&format!(
            "#{:<5} {:<20} {:>9}  {}",
            record.id,
            record.city_name,
            format_temperature(record.temperature_c, unit),
            format_saved_at(&record.saved_at),
        ));
        if let Some(wind) = record.wind_speed_ms {
            output.push_str(&format!("  {}", format_wind(wind)));
        }
        output.push('\n');
    }
    output
}

pub fn format_cities(cities: &[City]) -> String {
    cities
        .iter()
        .map(|c| format!("{:<10} {:>9.4} {:>9.4}\n", c.name, c.latitude, c.longitude))
        .collect()
}

fn format_saved_at(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%b %e, %Y %H:%M").to_string()
}
