use std::fs;
use log::LevelFilter;
use serde::Deserialize;
use crate::errors::ConfigError;

#[derive(Deserialize)]
pub struct OpenWeatherParameters {
    pub api_key: String,
    #[serde(default = "default_geo_url")]
    pub geo_url: String,
    #[serde(default = "default_pollution_url")]
    pub pollution_url: String,
    #[serde(default = "default_weather_url")]
    pub weather_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize)]
pub struct Cities {
    pub names: Vec<String>,
}

#[derive(Deserialize)]
pub struct SheetsParameters {
    pub spreadsheet: String,
    pub credentials_file: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Deserialize)]
pub struct Files {
    pub history_file: String,
}

#[derive(Deserialize)]
pub struct General {
    pub log_path: String,
    pub log_level: LevelFilter,
    pub log_to_stdout: bool,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_save_attempts")]
    pub save_attempts: u32,
    #[serde(default = "default_save_backoff_secs")]
    pub save_backoff_secs: u64,
}

#[derive(Deserialize)]
pub struct Config {
    pub open_weather: OpenWeatherParameters,
    pub cities: Cities,
    pub sheets: SheetsParameters,
    pub files: Files,
    pub general: General,
}

fn default_geo_url() -> String { "https://api.openweathermap.org/geo/1.0/direct".to_string() }
fn default_pollution_url() -> String { "https://api.openweathermap.org/data/2.5/air_pollution".to_string() }
fn default_weather_url() -> String { "https://api.openweathermap.org/data/2.5/weather".to_string() }
fn default_timeout_secs() -> u64 { 30 }
fn default_poll_interval_secs() -> u64 { 900 }
fn default_save_attempts() -> u32 { 3 }
fn default_save_backoff_secs() -> u64 { 2 }

/// Loads the configuration file and returns a struct with all configuration items
///
/// # Arguments
///
/// * 'config_path' - path to the configuration file
pub fn load_config(config_path: &str) -> Result<Config, ConfigError> {
    let toml = fs::read_to_string(config_path)?;
    parse_config(&toml)
}

/// Parses and validates configuration from a toml string
///
/// # Arguments
///
/// * 'toml' - the configuration document
fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(toml)?;

    if config.cities.names.is_empty() {
        return Err(ConfigError::from("at least one city must be configured"));
    }
    if config.cities.names.iter().any(|c| c.trim().is_empty()) {
        return Err(ConfigError::from("city names must not be blank"));
    }
    if config.general.poll_interval_secs == 0 {
        return Err(ConfigError::from("poll interval must be greater than zero"));
    }
    if config.general.save_attempts == 0 {
        return Err(ConfigError::from("save attempts must be greater than zero"));
    }

    Ok(config)
}
