use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AqiIndex {
    pub aqi: u8,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Components {
    pub pm2_5: f64,
    pub pm10: f64,
    pub co: f64,
    pub no2: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PollutionEntry {
    pub main: AqiIndex,
    pub components: Components,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AirPollution {
    pub list: Vec<PollutionEntry>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct WeatherMain {
    pub temp: f64,
    pub humidity: f64,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CurrentWeather {
    pub main: WeatherMain,
    pub wind: Wind,
}
