use log::{info, warn};
use serde_json::Value;
use crate::manager_sheets::errors::SheetsError;
use crate::models::observation::{Observation, HEADERS};

/// A remote sheet that rows can be appended to
pub trait Spreadsheet {
    fn read_first_row(&self) -> Result<Vec<String>, SheetsError>;
    fn append_row(&self, values: &[Value]) -> Result<(), SheetsError>;
}

/// Opens remote sheets by document name
pub trait SheetService {
    type Sheet: Spreadsheet;
    fn open(&self, name: &str) -> Result<Self::Sheet, SheetsError>;
}

/// Mirrors finalized observations to a remote sheet.
///
/// Every failure is logged and swallowed, the local history never depends on the sheet.
pub struct SheetPublisher<S: Spreadsheet> {
    sheet: Option<S>,
}

impl<S: Spreadsheet> SheetPublisher<S> {
    /// Opens the named sheet, a failure leaves the publisher disabled for this cycle
    ///
    /// # Arguments
    ///
    /// * 'service' - sheet service to open from
    /// * 'name' - spreadsheet document name
    pub fn connect<V: SheetService<Sheet = S> + ?Sized>(service: &V, name: &str) -> SheetPublisher<S> {
        match service.open(name) {
            Ok(sheet) => SheetPublisher { sheet: Some(sheet) },
            Err(e) => {
                warn!("Could not connect to spreadsheet '{}': {}", name, e);
                SheetPublisher { sheet: None }
            }
        }
    }

    pub fn is_connected(&self) -> bool {
        self.sheet.is_some()
    }

    /// Appends the header row if the sheet is empty
    pub fn ensure_header(&self) {
        let Some(sheet) = &self.sheet else { return };

        match sheet.read_first_row() {
            Ok(row) if row.iter().all(|c| c.trim().is_empty()) => {
                info!("Spreadsheet is empty, adding headers");
                let headers = HEADERS.iter().map(|&h| Value::from(h)).collect::<Vec<Value>>();
                if let Err(e) = sheet.append_row(&headers) {
                    warn!("Failed to add spreadsheet headers: {}", e);
                }
            }
            Ok(_) => (),
            Err(e) => warn!("Error checking spreadsheet headers: {}", e),
        }
    }

    /// Appends one observation as a row in canonical column order, returns true on success
    ///
    /// # Arguments
    ///
    /// * 'observation' - the observation to publish
    pub fn publish(&self, observation: &Observation) -> bool {
        let Some(sheet) = &self.sheet else { return false };

        match sheet.append_row(&observation.row_values()) {
            Ok(()) => {
                info!("Uploaded {} to spreadsheet", observation.city);
                true
            }
            Err(e) => {
                warn!("Failed to upload {} to spreadsheet: {}", observation.city, e);
                false
            }
        }
    }
}
