use thiserror::Error;

#[derive(Error, Debug)]
pub enum OpenWeatherError {
    #[error("OpenWeatherError::Request: {0}")]
    Request(String),
    #[error("OpenWeatherError::Document: {0}")]
    Document(String),
}

impl From<ureq::Error> for OpenWeatherError {
    fn from(e: ureq::Error) -> Self {
        OpenWeatherError::Request(e.to_string())
    }
}
impl From<serde_json::Error> for OpenWeatherError {
    fn from(e: serde_json::Error) -> Self {
        OpenWeatherError::Document(e.to_string())
    }
}
