pub mod errors;

use std::fs;
use std::time::Duration;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;
use ureq::Agent;
use crate::config::SheetsParameters;
use crate::manager_sheets::errors::SheetsError;
use crate::models::google_sheets::{AccessToken, Claims, DriveFileList, ServiceAccountKey, ValueRange};
use crate::publisher::{SheetService, Spreadsheet};

const SCOPES: &str = "https://www.googleapis.com/auth/spreadsheets https://www.googleapis.com/auth/drive";
const DRIVE_FILES_URL: &str = "https://www.googleapis.com/drive/v3/files";
const SHEETS_URL: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Values are stored as given, so timestamps stay text and nothing is parsed as a formula
const APPEND_QUERY: [(&str, &str); 2] = [("valueInputOption", "RAW"), ("insertDataOption", "INSERT_ROWS")];

/// Struct for opening Google spreadsheets with a service account
pub struct GoogleSheets {
    agent: Agent,
    credentials_file: String,
}

impl GoogleSheets {
    /// Returns a new GoogleSheets struct. Credentials are read when a spreadsheet is opened,
    /// so a missing or broken key file only disables the sheet for that cycle.
    ///
    /// # Arguments
    ///
    /// * 'config' - spreadsheet configuration
    pub fn new(config: &SheetsParameters) -> GoogleSheets {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(config.timeout_secs)))
            .build();

        let agent = agent_config.into();

        GoogleSheets { agent, credentials_file: config.credentials_file.clone() }
    }

    /// Exchanges a signed service account assertion for a bearer token
    ///
    /// See https://developers.google.com/identity/protocols/oauth2/service-account#httprest
    fn access_token(&self) -> Result<String, SheetsError> {
        let json = fs::read_to_string(&self.credentials_file)?;
        let key: ServiceAccountKey = serde_json::from_str(&json)
            .map_err(|e| SheetsError::Credentials(e.to_string()))?;

        let iat = Utc::now().timestamp();
        let claims = Claims {
            iss: key.client_email.clone(),
            scope: SCOPES.to_string(),
            aud: key.token_uri.clone(),
            iat,
            exp: iat + 3600,
        };
        let assertion = encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &EncodingKey::from_rsa_pem(key.private_key.as_bytes())?)?;

        let json = self.agent
            .post(&key.token_uri)
            .send_form([
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])?
            .body_mut()
            .read_to_string()?;

        let token: AccessToken = serde_json::from_str(&json)?;
        Ok(token.access_token)
    }

    /// Looks up a spreadsheet id by document name
    ///
    /// # Arguments
    ///
    /// * 'token' - bearer token
    /// * 'name' - spreadsheet document name
    fn find_spreadsheet(&self, token: &str, name: &str) -> Result<String, SheetsError> {
        let query = format!(
            "name = '{}' and mimeType = 'application/vnd.google-apps.spreadsheet' and trashed = false",
            name.replace('\\', "\\\\").replace('\'', "\\'"));

        let json = self.agent
            .get(DRIVE_FILES_URL)
            .query("q", &query)
            .query("fields", "files(id)")
            .header("Authorization", format!("Bearer {}", token))
            .call()?
            .body_mut()
            .read_to_string()?;

        let list: DriveFileList = serde_json::from_str(&json)?;
        list.files.into_iter()
            .next()
            .map(|f| f.id)
            .ok_or(SheetsError::NotFound(name.to_string()))
    }
}

impl SheetService for GoogleSheets {
    type Sheet = Worksheet;

    fn open(&self, name: &str) -> Result<Worksheet, SheetsError> {
        let token = self.access_token()?;
        let spreadsheet_id = self.find_spreadsheet(&token, name)?;

        Ok(Worksheet { agent: self.agent.clone(), token, spreadsheet_id })
    }
}

/// The first worksheet of an opened spreadsheet.
///
/// Ranges are given without a sheet name, which the Sheets API resolves to the first sheet.
pub struct Worksheet {
    agent: Agent,
    token: String,
    spreadsheet_id: String,
}

impl Spreadsheet for Worksheet {
    /// See https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/get
    fn read_first_row(&self) -> Result<Vec<String>, SheetsError> {
        let url = format!("{}/{}/values/1:1", SHEETS_URL, self.spreadsheet_id);

        let json = self.agent
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .call()?
            .body_mut()
            .read_to_string()?;

        let range: ValueRange = serde_json::from_str(&json)?;
        let row = range.values.into_iter().next().unwrap_or_default();

        Ok(row.into_iter()
            .map(|v| match v {
                Value::String(s) => s,
                other => other.to_string(),
            })
            .collect())
    }

    /// See https://developers.google.com/sheets/api/reference/rest/v4/spreadsheets.values/append
    fn append_row(&self, values: &[Value]) -> Result<(), SheetsError> {
        let url = format!("{}/{}/values/A1:append", SHEETS_URL, self.spreadsheet_id);
        let body = ValueRange { values: vec![values.to_vec()] };
        let json = serde_json::to_string(&body)?;

        self.agent
            .post(&url)
            .query_pairs(APPEND_QUERY)
            .header("Authorization", format!("Bearer {}", self.token))
            .content_type("application/json")
            .send(json)?;

        Ok(())
    }
}
