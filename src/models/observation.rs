use std::fmt::Display;
use std::str::FromStr;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde::de::Error;
use serde_json::Value;

/// Format used for timestamps in both the local history file and the spreadsheet
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Canonical column order shared by every sink
pub const HEADERS: [&str; 14] = [
    "City", "Latitude", "Longitude", "Timestamp",
    "AQI_Level", "PM2_5", "PM10", "CO", "NO2",
    "Temperature", "Humidity", "Wind_Speed",
    "Health_Advice", "Predicted_PM2_5",
];

/// A fused pollution and weather reading for one city, not yet forecasted
#[derive(Clone, Debug, PartialEq)]
pub struct Reading {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: NaiveDateTime,
    pub aqi_level: u8,
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    pub health_advice: String,
}

impl Reading {
    /// Finalizes the reading into an observation by binding the forecasted next PM2.5 value
    ///
    /// # Arguments
    ///
    /// * 'predicted_pm2_5' - forecast for the next cycle, rounded to two decimals on binding
    pub fn with_prediction(self, predicted_pm2_5: f64) -> Observation {
        Observation {
            city: self.city,
            latitude: self.latitude,
            longitude: self.longitude,
            timestamp: self.timestamp,
            aqi_level: self.aqi_level,
            pm2_5: self.pm2_5,
            pm10: self.pm10,
            co: self.co,
            no2: self.no2,
            temperature: self.temperature,
            humidity: self.humidity,
            wind_speed: self.wind_speed,
            health_advice: self.health_advice,
            predicted_pm2_5: (predicted_pm2_5 * 100.0).round() / 100.0,
        }
    }
}

/// One finalized row of history, with fields in canonical order.
///
/// Every field is backfilled with its zero value when the stored column is absent or empty,
/// so a loaded observation is always fully populated.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Observation {
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Latitude", deserialize_with = "zero_if_empty")]
    pub latitude: f64,
    #[serde(rename = "Longitude", deserialize_with = "zero_if_empty")]
    pub longitude: f64,
    #[serde(rename = "Timestamp", serialize_with = "serialize_timestamp", deserialize_with = "deserialize_timestamp")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "AQI_Level", deserialize_with = "zero_if_empty")]
    pub aqi_level: u8,
    #[serde(rename = "PM2_5", deserialize_with = "zero_if_empty")]
    pub pm2_5: f64,
    #[serde(rename = "PM10", deserialize_with = "zero_if_empty")]
    pub pm10: f64,
    #[serde(rename = "CO", deserialize_with = "zero_if_empty")]
    pub co: f64,
    #[serde(rename = "NO2", deserialize_with = "zero_if_empty")]
    pub no2: f64,
    #[serde(rename = "Temperature", deserialize_with = "zero_if_empty")]
    pub temperature: f64,
    #[serde(rename = "Humidity", deserialize_with = "zero_if_empty")]
    pub humidity: f64,
    #[serde(rename = "Wind_Speed", deserialize_with = "zero_if_empty")]
    pub wind_speed: f64,
    #[serde(rename = "Health_Advice")]
    pub health_advice: String,
    #[serde(rename = "Predicted_PM2_5", deserialize_with = "zero_if_empty")]
    pub predicted_pm2_5: f64,
}

impl Observation {
    /// Returns the observation as a row of json values in canonical column order
    pub fn row_values(&self) -> Vec<Value> {
        vec![
            Value::from(self.city.as_str()),
            Value::from(self.latitude),
            Value::from(self.longitude),
            Value::from(self.timestamp.format(TIMESTAMP_FORMAT).to_string()),
            Value::from(self.aqi_level),
            Value::from(self.pm2_5),
            Value::from(self.pm10),
            Value::from(self.co),
            Value::from(self.no2),
            Value::from(self.temperature),
            Value::from(self.humidity),
            Value::from(self.wind_speed),
            Value::from(self.health_advice.as_str()),
            Value::from(self.predicted_pm2_5),
        ]
    }
}

/// Parses a numeric field where an empty cell counts as zero
fn zero_if_empty<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Default,
    T::Err: Display,
{
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    if s.is_empty() {
        Ok(T::default())
    } else {
        s.parse::<T>().map_err(D::Error::custom)
    }
}

fn serialize_timestamp<S: Serializer>(timestamp: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&timestamp.format(TIMESTAMP_FORMAT).to_string())
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
    let s = String::deserialize(deserializer)?;
    let s = s.trim();
    if s.is_empty() {
        Ok(NaiveDateTime::default())
    } else {
        NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).map_err(D::Error::custom)
    }
}
