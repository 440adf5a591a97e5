use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::Duration;
use log::{error, info, warn};
use crate::errors::HistoryError;
use crate::models::observation::Observation;
use crate::scheduler::Clock;

/// Durable tabular storage for observations
pub trait TabularStore {
    /// Reads every stored record, an absent store reads as empty
    fn read_all(&self) -> Result<Vec<Observation>, HistoryError>;

    /// Appends records, writing a header row first if the store is new
    fn append_records(&self, records: &[Observation]) -> Result<(), HistoryError>;
}

/// A csv file with a header row in canonical column order
pub struct CsvFile {
    path: PathBuf,
}

impl CsvFile {
    pub fn new<P: AsRef<Path>>(path: P) -> CsvFile {
        CsvFile { path: path.as_ref().to_path_buf() }
    }

    /// True if the file is missing or holds no bytes
    fn is_new(&self) -> bool {
        self.path.metadata().map_or(true, |m| m.len() == 0)
    }
}

impl TabularStore for CsvFile {
    /// Reads the file by header name. Columns missing from the file are backfilled with zero
    /// values and unknown columns are ignored. Rows that can't be parsed are skipped.
    fn read_all(&self) -> Result<Vec<Observation>, HistoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(File::open(&self.path)?);

        let mut records = Vec::new();
        for (row, result) in reader.deserialize::<Observation>().enumerate() {
            match result {
                Ok(obs) => records.push(obs),
                Err(e) if e.is_io_error() => return Err(e.into()),
                Err(e) => warn!("Skipping history row {}: {}", row + 1, e),
            }
        }

        Ok(records)
    }

    fn append_records(&self, records: &[Observation]) -> Result<(), HistoryError> {
        let write_header = self.is_new();
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(write_header)
            .from_writer(file);

        for record in records {
            writer.serialize(record)?;
        }
        writer.flush()?;

        Ok(())
    }
}

/// All past observations across all cities, in arrival order
#[derive(Default, Debug, Clone)]
pub struct History {
    observations: Vec<Observation>,
}

impl History {
    pub fn new(observations: Vec<Observation>) -> History {
        History { observations }
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Returns the most recent PM2.5 values for a city, oldest first
    ///
    /// # Arguments
    ///
    /// * 'city' - city to filter on
    /// * 'pending' - a value not yet in history that is treated as the latest arrival
    /// * 'limit' - max number of values to return
    pub fn pm2_5_series(&self, city: &str, pending: Option<f64>, limit: usize) -> Vec<f64> {
        let mut series: Vec<f64> = self.observations.iter()
            .filter(|o| o.city == city)
            .map(|o| o.pm2_5)
            .chain(pending)
            .collect();

        let skip = series.len().saturating_sub(limit);
        series.drain(..skip);
        series
    }
}

/// Loads and persists history, retrying appends while the store is locked by another process
pub struct HistoryStore<T: TabularStore> {
    store: T,
    attempts: u32,
    backoff: Duration,
}

impl<T: TabularStore> HistoryStore<T> {
    /// Returns a new HistoryStore
    ///
    /// # Arguments
    ///
    /// * 'store' - the durable store
    /// * 'attempts' - max append attempts per save
    /// * 'backoff' - fixed wait between attempts
    pub fn new(store: T, attempts: u32, backoff: Duration) -> HistoryStore<T> {
        HistoryStore { store, attempts, backoff }
    }

    /// Loads history, or an empty history if nothing has been stored yet
    pub fn load(&self) -> Result<History, HistoryError> {
        Ok(History::new(self.store.read_all()?))
    }

    /// Appends a batch of finalized observations.
    ///
    /// Contention errors are retried with a fixed backoff up to the configured number of
    /// attempts. When attempts run out, or on any other error, the batch is dropped and false
    /// is returned. Nothing is carried over to the next cycle.
    ///
    /// # Arguments
    ///
    /// * 'batch' - observations to append
    /// * 'clock' - used for sleeping between attempts
    pub fn save<C: Clock + ?Sized>(&self, batch: &[Observation], clock: &C) -> bool {
        if batch.is_empty() {
            return true;
        }

        for attempt in 1..=self.attempts {
            match self.store.append_records(batch) {
                Ok(()) => {
                    info!("Saved {} observations to history", batch.len());
                    return true;
                }
                Err(e) if e.is_contention() => {
                    warn!("History locked (attempt {} of {}): {}", attempt, self.attempts, e);
                    if attempt < self.attempts {
                        clock.sleep(self.backoff);
                    }
                }
                Err(e) => {
                    error!("Failed to save history, dropping {} observations: {}", batch.len(), e);
                    return false;
                }
            }
        }

        error!("History still locked after {} attempts, dropping {} observations", self.attempts, batch.len());
        false
    }
}
