use chrono::NaiveDateTime;
use log::warn;
use crate::advisory::health_advice;
use crate::manager_open_weather::errors::OpenWeatherError;
use crate::models::observation::Reading;
use crate::models::open_weather::{AirPollution, CurrentWeather, GeoLocation};

/// Upstream capabilities needed to produce a fused reading
pub trait WeatherProvider {
    fn geocode(&self, city: &str) -> Result<Vec<GeoLocation>, OpenWeatherError>;
    fn air_pollution(&self, lat: f64, lon: f64) -> Result<AirPollution, OpenWeatherError>;
    fn current_weather(&self, lat: f64, lon: f64) -> Result<CurrentWeather, OpenWeatherError>;
}

/// Resolves a city name to latitude and longitude.
///
/// Any failure, including an empty match list, is logged and reported as None
/// which means the city is skipped this cycle.
///
/// # Arguments
///
/// * 'provider' - upstream provider
/// * 'city' - name of the city
pub fn resolve_coordinates<P: WeatherProvider + ?Sized>(provider: &P, city: &str) -> Option<(f64, f64)> {
    match provider.geocode(city) {
        Ok(locations) => match locations.first() {
            Some(loc) => Some((loc.lat, loc.lon)),
            None => {
                warn!("No geocoding match for {}", city);
                None
            }
        },
        Err(e) => {
            warn!("Geocoding failed for {}: {}", city, e);
            None
        }
    }
}

/// Fetches air pollution and current weather for a location and joins them into one reading.
///
/// Both lookups must succeed and the pollution list must hold at least one entry, otherwise
/// no reading is produced. There is no retry here, a failed city is simply tried again next cycle.
///
/// # Arguments
///
/// * 'provider' - upstream provider
/// * 'city' - name of the city the coordinates belong to
/// * 'lat' - latitude
/// * 'lon' - longitude
/// * 'timestamp' - capture time to stamp on the reading
pub fn fetch_reading<P: WeatherProvider + ?Sized>(
    provider: &P,
    city: &str,
    lat: f64,
    lon: f64,
    timestamp: NaiveDateTime) -> Option<Reading> {

    let pollution = provider.air_pollution(lat, lon)
        .map_err(|e| warn!("Air pollution lookup failed for {}: {}", city, e))
        .ok()?;
    let weather = provider.current_weather(lat, lon)
        .map_err(|e| warn!("Weather lookup failed for {}: {}", city, e))
        .ok()?;

    let Some(entry) = pollution.list.first() else {
        warn!("Air pollution response for {} has an empty list", city);
        return None;
    };

    Some(Reading {
        city: city.to_string(),
        latitude: lat,
        longitude: lon,
        timestamp,
        aqi_level: entry.main.aqi,
        pm2_5: entry.components.pm2_5,
        pm10: entry.components.pm10,
        co: entry.components.co,
        no2: entry.components.no2,
        temperature: weather.main.temp,
        humidity: weather.main.humidity,
        wind_speed: weather.wind.speed,
        health_advice: health_advice(entry.main.aqi as i64).to_string(),
    })
}

/// Resolves coordinates and fetches a reading for a city in one go
///
/// # Arguments
///
/// * 'provider' - upstream provider
/// * 'city' - name of the city
/// * 'timestamp' - capture time to stamp on the reading
pub fn fetch_city<P: WeatherProvider + ?Sized>(provider: &P, city: &str, timestamp: NaiveDateTime) -> Option<Reading> {
    let (lat, lon) = resolve_coordinates(provider, city)?;
    fetch_reading(provider, city, lat, lon, timestamp)
}
