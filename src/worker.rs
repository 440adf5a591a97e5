use std::time::Duration;
use log::{info, warn};
use rand::Rng;
use crate::advisory::{advisory, Severity};
use crate::config::Config;
use crate::fetcher::{fetch_city, WeatherProvider};
use crate::forecaster::forecast;
use crate::history::{History, HistoryStore, TabularStore};
use crate::models::observation::Observation;
use crate::publisher::{SheetPublisher, SheetService};
use crate::scheduler::{Clock, JobState};

/// Outcome of one polling cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub fetched: usize,
    pub skipped: usize,
    pub published: usize,
    pub saved: bool,
}

/// Drives the polling job, one cycle over all configured cities per tick
pub struct Worker<'a, P, V, T, C, R>
where
    P: WeatherProvider,
    V: SheetService,
    T: TabularStore,
    C: Clock,
    R: Rng,
{
    config: &'a Config,
    provider: P,
    sheets: V,
    history: HistoryStore<T>,
    clock: C,
    rng: R,
    state: JobState,
}

impl<'a, P, V, T, C, R> Worker<'a, P, V, T, C, R>
where
    P: WeatherProvider,
    V: SheetService,
    T: TabularStore,
    C: Clock,
    R: Rng,
{
    /// Returns a new worker in idle state
    ///
    /// # Arguments
    ///
    /// * 'config' - static configuration
    /// * 'provider' - upstream pollution and weather provider
    /// * 'sheets' - remote spreadsheet service
    /// * 'history' - local history store
    /// * 'clock' - wall clock and sleeper
    /// * 'rng' - random source for cold start forecasts
    pub fn new(config: &'a Config, provider: P, sheets: V, history: HistoryStore<T>, clock: C, rng: R) -> Self {
        Worker { config, provider, sheets, history, clock, rng, state: JobState::Idle }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Runs forever, the first cycle starts immediately
    pub fn run(&mut self) -> ! {
        info!("Scheduler started, running every {} seconds", self.config.general.poll_interval_secs);
        loop {
            self.tick();
        }
    }

    /// Runs one cycle and then waits out the poll interval
    pub fn tick(&mut self) -> CycleReport {
        let report = self.run_cycle();

        self.state = JobState::Idle;
        info!("State: {} next cycle in {} seconds", self.state, self.config.general.poll_interval_secs);
        self.clock.sleep(Duration::from_secs(self.config.general.poll_interval_secs));

        report
    }

    /// Runs one full cycle: connect the sheet, load history, then for every city fetch,
    /// forecast and publish, and finally append the batch to history.
    pub fn run_cycle(&mut self) -> CycleReport {
        let config = self.config;
        self.state = JobState::Running;
        info!("State: {} fetching data at {}", self.state, self.clock.now());

        let publisher = SheetPublisher::connect(&self.sheets, &config.sheets.spreadsheet);
        if publisher.is_connected() {
            publisher.ensure_header();
        } else {
            warn!("Spreadsheet disabled for this cycle");
        }

        let history = self.history.load().unwrap_or_else(|e| {
            warn!("Could not load history, forecasting without it: {}", e);
            History::default()
        });
        if history.is_empty() {
            info!("No history found, forecasts start cold");
        } else {
            info!("Loaded {} historical observations", history.len());
        }

        let mut report = CycleReport { fetched: 0, skipped: 0, published: 0, saved: false };
        let mut batch: Vec<Observation> = Vec::with_capacity(config.cities.names.len());

        for city in &config.cities.names {
            let Some(reading) = fetch_city(&self.provider, city, self.clock.now()) else {
                report.skipped += 1;
                continue;
            };

            let predicted = forecast(&history, &reading, &mut self.rng);
            let observation = reading.with_prediction(predicted);

            info!("Fetched {}: AQI={} | Temp={}°C | Wind={}m/s | Predicted PM2.5={}",
                observation.city, observation.aqi_level, observation.temperature,
                observation.wind_speed, observation.predicted_pm2_5);
            if advisory(observation.aqi_level as i64).1 == Severity::Warning {
                warn!("{}: {}", observation.city, observation.health_advice);
            }

            if publisher.publish(&observation) {
                report.published += 1;
            }

            report.fetched += 1;
            batch.push(observation);
        }

        report.saved = self.history.save(&batch, &self.clock);
        info!("Cycle done: {} fetched, {} skipped, {} published, saved: {}",
            report.fetched, report.skipped, report.published, report.saved);

        report
    }
}

#[cfg(test)]
mod tests {
    use std::io::ErrorKind;
    use log::LevelFilter;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::Value;
    use crate::config::{Cities, Files, General, OpenWeatherParameters, SheetsParameters};
    use crate::fetcher::tests::FakeProvider;
    use crate::history::tests::FakeStore;
    use crate::publisher::tests::{FakeSheet, FakeSheets};
    use crate::scheduler::tests::FakeClock;
    use super::*;

    fn config() -> Config {
        Config {
            open_weather: OpenWeatherParameters {
                api_key: "key".to_string(),
                geo_url: String::new(),
                pollution_url: String::new(),
                weather_url: String::new(),
                timeout_secs: 30,
            },
            cities: Cities { names: vec!["Mumbai".to_string(), "Thane".to_string(), "Navi Mumbai".to_string()] },
            sheets: SheetsParameters {
                spreadsheet: "Weather_SDP_Data".to_string(),
                credentials_file: "credentials.json".to_string(),
                timeout_secs: 30,
            },
            files: Files { history_file: "aqi_live_data.csv".to_string() },
            general: General {
                log_path: "airwatch.log".to_string(),
                log_level: LevelFilter::Info,
                log_to_stdout: false,
                poll_interval_secs: 900,
                save_attempts: 3,
                save_backoff_secs: 2,
            },
        }
    }

    fn store(fake: &FakeStore) -> HistoryStore<&FakeStore> {
        HistoryStore::new(fake, 3, Duration::from_secs(2))
    }

    #[test]
    fn cycle_fetches_publishes_and_saves_every_city() {
        let config = config();
        let fake = FakeStore::failing(0, ErrorKind::PermissionDenied);
        let sheet = FakeSheet::new();
        let mut worker = Worker::new(&config, FakeProvider::mumbai(),
            FakeSheets { sheet: &sheet, reachable: true }, store(&fake), FakeClock::new(), StdRng::seed_from_u64(1));

        assert_eq!(worker.state(), JobState::Idle);
        let report = worker.run_cycle();
        assert_eq!(worker.state(), JobState::Running);
        assert_eq!(report, CycleReport { fetched: 3, skipped: 0, published: 3, saved: true });

        let records = fake.records.borrow();
        let cities: Vec<&str> = records.iter().map(|o| o.city.as_str()).collect();
        assert_eq!(cities, vec!["Mumbai", "Thane", "Navi Mumbai"]);

        let mumbai = &records[0];
        assert_eq!(mumbai.aqi_level, 2);
        assert_eq!(mumbai.pm2_5, 35.0);
        assert_eq!(mumbai.temperature, 28.5);
        assert_eq!(mumbai.humidity, 70.0);
        assert_eq!(mumbai.wind_speed, 3.2);
        assert_eq!(mumbai.health_advice, "Safe. Enjoy outdoor activities.");
        assert!((31.5..=38.5).contains(&mumbai.predicted_pm2_5));

        let rows = sheet.rows.borrow();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0][0], Value::from("City"));
        assert_eq!(rows[1], mumbai.row_values());
    }

    #[test]
    fn failed_city_does_not_stop_the_others() {
        let config = config();
        let fake = FakeStore::failing(0, ErrorKind::PermissionDenied);
        let sheet = FakeSheet::new();
        let mut provider = FakeProvider::mumbai();
        provider.fail_pollution_for("Thane");
        let mut worker = Worker::new(&config, provider,
            FakeSheets { sheet: &sheet, reachable: true }, store(&fake), FakeClock::new(), StdRng::seed_from_u64(2));

        let report = worker.run_cycle();
        assert_eq!(report, CycleReport { fetched: 2, skipped: 1, published: 2, saved: true });
        let records = fake.records.borrow();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|o| o.city != "Thane"));
    }

    #[test]
    fn unreachable_sheet_does_not_block_history() {
        let config = config();
        let fake = FakeStore::failing(0, ErrorKind::PermissionDenied);
        let sheet = FakeSheet::new();
        let mut worker = Worker::new(&config, FakeProvider::mumbai(),
            FakeSheets { sheet: &sheet, reachable: false }, store(&fake), FakeClock::new(), StdRng::seed_from_u64(3));

        let report = worker.run_cycle();
        assert_eq!(report, CycleReport { fetched: 3, skipped: 0, published: 0, saved: true });
        assert_eq!(fake.records.borrow().len(), 3);
        assert!(sheet.rows.borrow().is_empty());
    }

    #[test]
    fn exhausted_retries_drop_the_batch_and_the_next_cycle_proceeds() {
        let config = config();
        let fake = FakeStore::failing(3, ErrorKind::PermissionDenied);
        let sheet = FakeSheet::new();
        let clock = FakeClock::new();
        let mut worker = Worker::new(&config, FakeProvider::mumbai(),
            FakeSheets { sheet: &sheet, reachable: true }, store(&fake), &clock, StdRng::seed_from_u64(4));

        let first = worker.tick();
        assert!(!first.saved);
        assert!(fake.records.borrow().is_empty());
        assert_eq!(worker.state(), JobState::Idle);

        let second = worker.tick();
        assert!(second.saved);
        assert_eq!(fake.records.borrow().len(), 3);
        assert_eq!(clock.sleeps(), vec![
            Duration::from_secs(2), Duration::from_secs(2), Duration::from_secs(900),
            Duration::from_secs(900),
        ]);
    }

    #[test]
    fn warm_history_gives_flat_forecast() {
        let config = config();
        let fake = FakeStore::failing(0, ErrorKind::PermissionDenied);
        let sheet = FakeSheet::new();
        let clock = FakeClock::new();
        let mut worker = Worker::new(&config, FakeProvider::mumbai(),
            FakeSheets { sheet: &sheet, reachable: true }, store(&fake), &clock, StdRng::seed_from_u64(5));

        for _ in 0..6 {
            assert!(worker.tick().saved);
        }

        let records = fake.records.borrow();
        assert_eq!(records.len(), 18);
        // from the fifth cycle on each city has at least five identical points
        for obs in &records[12..] {
            assert_eq!(obs.predicted_pm2_5, 35.0);
        }
        let first = records.first().unwrap().timestamp;
        let last = records.last().unwrap().timestamp;
        assert_eq!((last - first).num_seconds(), 5 * 900);
    }
}
