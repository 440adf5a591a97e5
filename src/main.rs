use std::env;
use std::time::Duration;
use anyhow::{Context, Result};
use log::info;
use crate::config::load_config;
use crate::history::{CsvFile, HistoryStore};
use crate::logging::setup_logger;
use crate::manager_open_weather::OpenWeather;
use crate::manager_sheets::GoogleSheets;
use crate::scheduler::SystemClock;
use crate::worker::Worker;

mod advisory;
mod config;
mod errors;
mod fetcher;
mod forecaster;
mod history;
mod logging;
mod manager_open_weather;
mod manager_sheets;
mod models;
mod publisher;
mod scheduler;
mod worker;

fn main() -> Result<()> {
    let config_path = env::var("CONFIG_FILE").unwrap_or("config.toml".to_string());
    let config = load_config(&config_path)
        .with_context(|| format!("loading configuration from {}", config_path))?;

    let _handle = setup_logger(&config.general).context("setting up logging")?;
    info!("airwatch version: {}", env!("CARGO_PKG_VERSION"));
    info!("Tracking {} cities: {}", config.cities.names.len(), config.cities.names.join(", "));

    let history = HistoryStore::new(
        CsvFile::new(&config.files.history_file),
        config.general.save_attempts,
        Duration::from_secs(config.general.save_backoff_secs));

    let mut worker = Worker::new(
        &config,
        OpenWeather::new(&config.open_weather),
        GoogleSheets::new(&config.sheets),
        history,
        SystemClock,
        rand::rng());

    worker.run()
}
