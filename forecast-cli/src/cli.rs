use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, anyhow};
use chrono::Utc;
use clap::{Parser, Subcommand};
use forecast_core::{
    CITIES, Config, Coordinate, ForecastHistoryStore, HistoryEvent, NewForecast, RecordId,
    TemperatureUnit, WeatherClient, find_city, provider_from_config,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "forecast", version, about = "Weather lookups with a saved history")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and preferred unit.
    Configure,

    /// List the preset cities.
    Cities,

    /// Show current weather for a preset city or a coordinate.
    Show {
        /// City name from `forecast cities`.
        #[arg(conflicts_with_all = ["lat", "lon"], required_unless_present_all = ["lat", "lon"])]
        city: Option<String>,

        /// Latitude of your location.
        #[arg(long, requires = "lon", allow_negative_numbers = true)]
        lat: Option<f64>,

        /// Longitude of your location.
        #[arg(long, requires = "lat", allow_negative_numbers = true)]
        lon: Option<f64>,

        /// Show temperatures in Fahrenheit.
        #[arg(short, long)]
        fahrenheit: bool,

        /// Add the reading to the history.
        #[arg(long)]
        save: bool,

        /// Download the condition icon to this file.
        #[arg(long, value_name = "FILE")]
        icon: Option<PathBuf>,
    },

    /// List saved forecasts, newest first.
    History {
        #[arg(short, long)]
        fahrenheit: bool,
    },

    /// Delete a saved forecast by its id.
    Delete { id: i64 },

    /// Print the URL of a condition icon, optionally downloading it.
    Icon {
        /// Icon code, e.g. "10d".
        code: String,

        #[arg(long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Cities => print!("{}", render::format_cities(CITIES)),
            Command::Show { city, lat, lon, fahrenheit, save, icon } => {
                let config = Config::load()?;
                let target = Target::resolve(city.as_deref(), lat, lon)?;
                let unit = display_unit(&config, fahrenheit);
                show(&config, target, unit, save, icon).await?;
            }
            Command::History { fahrenheit } => {
                let config = Config::load()?;
                let history = open_history(&config)?;
                let records = history.list_all().await?;
                print!("{}", render::format_history(&records, display_unit(&config, fahrenheit)));
            }
            Command::Delete { id } => {
                let config = Config::load()?;
                delete(&open_history(&config)?, RecordId(id)).await?;
            }
            Command::Icon { code, output } => {
                let config = Config::load()?;
                let url = config.client.icon_url(&code);
                println!("{url}");
                if let Some(path) = output {
                    let client = provider_from_config(&config)?;
                    download_icon(client.as_ref(), &url, &path).await?;
                }
            }
        }

        Ok(())
    }
}

/// What to look up: a preset city or a raw coordinate.
#[derive(Debug)]
struct Target {
    label: Option<String>,
    coordinate: Coordinate,
}

impl Target {
    fn resolve(city: Option<&str>, lat: Option<f64>, lon: Option<f64>) -> anyhow::Result<Self> {
        match (city, lat, lon) {
            (Some(name), _, _) => {
                let city = find_city(name).ok_or_else(|| {
                    anyhow!("Unknown city '{name}'.\nHint: run `forecast cities` to see the list.")
                })?;
                Ok(Self { label: Some(city.name.to_string()), coordinate: city.coordinate() })
            }
            (None, Some(lat), Some(lon)) => Ok(Self { label: None, coordinate: Coordinate::new(lat, lon)? }),
            _ => Err(anyhow!("Give a city name or both --lat and --lon.")),
        }
    }
}

fn display_unit(config: &Config, fahrenheit: bool) -> TemperatureUnit {
    if fahrenheit { TemperatureUnit::Fahrenheit } else { config.unit }
}

fn open_history(config: &Config) -> anyhow::Result<ForecastHistoryStore> {
    let path = config.database_path()?;
    tracing::debug!(path = %path.display(), "opening forecast history");
    ForecastHistoryStore::open(&path)
        .with_context(|| format!("Failed to open forecast history at {}", path.display()))
}

fn configure() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = inquire::Password::new("OpenWeather API key:")
        .without_confirmation()
        .with_help_message("Create one at https://home.openweathermap.org/api_keys")
        .prompt()
        .context("Failed to read API key")?;
    if api_key.trim().is_empty() {
        return Err(anyhow!("API key must not be empty"));
    }
    config.set_api_key(api_key);

    let units = vec![TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
    let cursor = units.iter().position(|u| *u == config.unit).unwrap_or(0);
    config.unit = inquire::Select::new("Temperature unit:", units)
        .with_starting_cursor(cursor)
        .prompt()
        .context("Failed to read temperature unit")?;

    config.save()?;
    println!("Configuration saved to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(
    config: &Config,
    target: Target,
    unit: TemperatureUnit,
    save: bool,
    icon: Option<PathBuf>,
) -> anyhow::Result<()> {
    let client = provider_from_config(config)?;
    tracing::debug!(?target, ?unit, "looking up current weather");
    let snapshot = client
        .current_weather(&target.coordinate)
        .await
        .with_context(|| format!("Failed to fetch weather for {}", target.coordinate))?;

    print!("{}", render::format_snapshot(&snapshot, target.label.as_deref(), unit));

    if let Some(path) = icon {
        match snapshot.primary_condition() {
            Some(condition) => {
                let url = client.icon_url(&condition.icon_code);
                download_icon(client.as_ref(), &url, &path).await?;
            }
            None => eprintln!("No condition reported; no icon to download."),
        }
    }

    if save {
        let history = open_history(config)?;
        let city = target.label.unwrap_or_else(|| snapshot.display_name().to_string());
        let record = history
            .save(NewForecast::from_snapshot(&snapshot, city, Utc::now()))
            .await
            .context("Failed to save weather data")?;
        println!("Weather saved as #{}.", record.id);
    }

    Ok(())
}

async fn delete(history: &ForecastHistoryStore, id: RecordId) -> anyhow::Result<()> {
    let mut events = history.subscribe();
    history.delete_by_id(id).await?;

    match events.try_recv() {
        Ok(HistoryEvent::Deleted(deleted)) => println!("Deleted #{deleted}."),
        _ => println!("No saved forecast #{id}; nothing to delete."),
    }
    Ok(())
}

async fn download_icon(client: &dyn WeatherClient, url: &str, path: &Path) -> anyhow::Result<()> {
    // A missing icon is cosmetic; only a failed write is an error.
    let Some(bytes) = client.fetch_icon(url).await else {
        eprintln!("Icon unavailable: {url}");
        return Ok(());
    };

    fs::write(path, bytes).with_context(|| format!("Failed to write icon to {}", path.display()))?;
    println!("Icon written to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn show_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from(["forecast", "show", "--lat", "40.7128", "--lon", "-74.006"])
            .expect("args must parse");

        match cli.command {
            Command::Show { city, lat, lon, .. } => {
                assert!(city.is_none());
                assert_eq!(lat, Some(40.7128));
                assert_eq!(lon, Some(-74.006));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn show_requires_city_or_coordinates() {
        assert!(Cli::try_parse_from(["forecast", "show"]).is_err());
        assert!(Cli::try_parse_from(["forecast", "show", "--lat", "1.0"]).is_err());
        assert!(Cli::try_parse_from(["forecast", "show", "Split", "--lat", "1", "--lon", "2"]).is_err());
    }

    #[test]
    fn target_resolves_catalog_city() {
        let target = Target::resolve(Some("split"), None, None).expect("known city");
        assert_eq!(target.label.as_deref(), Some("Split"));
        assert_eq!(target.coordinate.latitude(), 43.5081);
    }

    #[test]
    fn target_rejects_unknown_city_and_bad_coordinates() {
        let err = Target::resolve(Some("Atlantis"), None, None).unwrap_err();
        assert!(err.to_string().contains("Unknown city"));

        assert!(Target::resolve(None, Some(91.0), Some(0.0)).is_err());
    }

    #[test]
    fn fahrenheit_flag_overrides_config() {
        let config = Config::default();
        assert_eq!(display_unit(&config, true), TemperatureUnit::Fahrenheit);
        assert_eq!(display_unit(&config, false), TemperatureUnit::Celsius);
    }

    #[test]
    fn icon_url_matches_client_for_custom_base() {
        let mut config = Config::default();
        config.set_api_key("KEY".into());
        config.client.icon_base_url = "http://localhost:8080/icons/".into();

        let client = provider_from_config(&config).expect("key is set");
        assert_eq!(config.client.icon_url("04d"), "http://localhost:8080/icons/04d@2x.png");
        assert_eq!(config.client.icon_url("04d"), client.icon_url("04d"));
    }

    #[tokio::test]
    async fn delete_reports_both_outcomes() {
        let history = ForecastHistoryStore::in_memory().unwrap();
        let record = history.save(NewForecast::new("Rijeka", 8.0, None, Utc::now())).await.unwrap();

        delete(&history, record.id).await.unwrap();
        delete(&history, record.id).await.unwrap();

        assert!(history.list_all().await.unwrap().is_empty());
    }
}
