use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetsError {
    #[error("SheetsError::Credentials: {0}")]
    Credentials(String),
    #[error("SheetsError::Request: {0}")]
    Request(String),
    #[error("SheetsError::Document: {0}")]
    Document(String),
    #[error("SheetsError::NotFound: {0}")]
    NotFound(String),
}

impl From<ureq::Error> for SheetsError {
    fn from(e: ureq::Error) -> Self {
        SheetsError::Request(e.to_string())
    }
}
impl From<serde_json::Error> for SheetsError {
    fn from(e: serde_json::Error) -> Self {
        SheetsError::Document(e.to_string())
    }
}
impl From<std::io::Error> for SheetsError {
    fn from(e: std::io::Error) -> Self {
        SheetsError::Credentials(e.to_string())
    }
}
impl From<jsonwebtoken::errors::Error> for SheetsError {
    fn from(e: jsonwebtoken::errors::Error) -> Self {
        SheetsError::Credentials(e.to_string())
    }
}
