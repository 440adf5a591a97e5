pub mod errors;

use std::time::Duration;
use serde::de::DeserializeOwned;
use ureq::Agent;
use crate::config::OpenWeatherParameters;
use crate::fetcher::WeatherProvider;
use crate::manager_open_weather::errors::OpenWeatherError;
use crate::models::open_weather::{AirPollution, CurrentWeather, GeoLocation};

/// Struct for fetching geocoding, air pollution and current weather from OpenWeatherMap
pub struct OpenWeather {
    agent: Agent,
    api_key: String,
    geo_url: String,
    pollution_url: String,
    weather_url: String,
}

impl OpenWeather {
    /// Returns an OpenWeather struct ready for requests
    ///
    /// All requests share one agent with a global timeout, so a stalled upstream
    /// shows up as a request error instead of blocking the cycle
    ///
    /// # Arguments
    ///
    /// * 'config' - OpenWeatherMap configuration
    pub fn new(config: &OpenWeatherParameters) -> OpenWeather {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let agent = agent_config.into();

        OpenWeather {
            agent,
            api_key: config.api_key.clone(),
            geo_url: config.geo_url.clone(),
            pollution_url: config.pollution_url.clone(),
            weather_url: config.weather_url.clone(),
        }
    }

    /// Sends a get request with the given query and the api key appended, and parses the
    /// response body as json
    ///
    /// # Arguments
    ///
    /// * 'url' - endpoint url
    /// * 'query' - query parameters besides the api key
    fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, String)]) -> Result<T, OpenWeatherError> {
        let mut request = self.agent.get(url);
        for (key, value) in query {
            request = request.query(*key, value);
        }

        let json = request
            .query("appid", &self.api_key)
            .call()?
            .body_mut()
            .read_to_string()?;

        Ok(serde_json::from_str(&json)?)
    }
}

impl WeatherProvider for OpenWeather {
    /// Resolves a city name to its best matching location
    ///
    /// See https://openweathermap.org/api/geocoding-api
    fn geocode(&self, city: &str) -> Result<Vec<GeoLocation>, OpenWeatherError> {
        self.get_json(&self.geo_url, &[("q", city.to_string()), ("limit", "1".to_string())])
    }

    /// See https://openweathermap.org/api/air-pollution
    fn air_pollution(&self, lat: f64, lon: f64) -> Result<AirPollution, OpenWeatherError> {
        self.get_json(&self.pollution_url, &[("lat", lat.to_string()), ("lon", lon.to_string())])
    }

    /// Current weather in metric units
    ///
    /// See https://openweathermap.org/current
    fn current_weather(&self, lat: f64, lon: f64) -> Result<CurrentWeather, OpenWeatherError> {
        self.get_json(&self.weather_url, &[
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("units", "metric".to_string()),
        ])
    }
}
