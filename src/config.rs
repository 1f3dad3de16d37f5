use std::path::PathBuf;
use std::time::Duration;

use chrono::{Local, NaiveDate};

use crate::{
    BASE_URL, DATE_INPUT_SELECTOR, FILE_PATH, FILTER_BUTTON_SELECTOR, NAVIGATION_SETTLE_MS,
    POLL_INTERVAL_MS, RESULTS_TABLE_SELECTOR, SAVE_EVERY_N_DAYS, START_DATE, SUBMIT_SETTLE_MS,
    WAIT_TIMEOUT_MS,
};

/// Everything a run needs to know. `Default` gives the production setup:
/// the CBR page, the backup TSV in the working directory and every day from
/// the first published curve up to today.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub base_url: String,
    pub output_path: PathBuf,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub save_every: usize,

    pub date_input_selector: String,
    pub filter_button_selector: String,
    pub results_table_selector: String,

    pub wait_timeout: Duration,
    pub poll_interval: Duration,
    pub navigation_settle: Duration,
    pub submit_settle: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        let (y, m, d) = START_DATE;
        Self {
            base_url: BASE_URL.to_string(),
            output_path: PathBuf::from(FILE_PATH),
            start_date: NaiveDate::from_ymd_opt(y, m, d).unwrap_or(NaiveDate::MIN),
            end_date: Local::now().date_naive(),
            save_every: SAVE_EVERY_N_DAYS,
            date_input_selector: DATE_INPUT_SELECTOR.to_string(),
            filter_button_selector: FILTER_BUTTON_SELECTOR.to_string(),
            results_table_selector: RESULTS_TABLE_SELECTOR.to_string(),
            wait_timeout: Duration::from_millis(WAIT_TIMEOUT_MS),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            navigation_settle: Duration::from_millis(NAVIGATION_SETTLE_MS),
            submit_settle: Duration::from_millis(SUBMIT_SETTLE_MS),
        }
    }
}

impl FetchConfig {
    /// Same selectors and cadence as the default, with every delay shortened
    /// so a scripted session runs instantly.
    pub fn without_delays(mut self) -> Self {
        self.wait_timeout = Duration::from_millis(50);
        self.poll_interval = Duration::from_millis(5);
        self.navigation_settle = Duration::ZERO;
        self.submit_settle = Duration::ZERO;
        self
    }
}
