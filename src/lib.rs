//! ZERO-COUPON YIELD CURVE SCRAPER
//! Walks the CBR yield curve history one day at a time and keeps a resumable TSV backup.

mod error;
#[doc(hidden)]
pub mod macros;

pub mod config;
mod http;
mod parse;
pub mod process;
pub mod record;
pub mod session;
pub mod store;

pub use config::FetchConfig;
pub use error::{Error, Result};
pub use http::{HttpSession, HttpSessionFactory};
pub use parse::{parse_day, DayOutcome};
pub use process::{fetch_range, RunSummary};
pub use record::YieldCurvePoint;

const BASE_URL: &str = "https://www.cbr.ru/hd_base/zcyc_params/zcyc/";
const FILE_PATH: &str = "all_zcyc_cbr_backup.tsv";
/// First day the CBR publishes the curve for.
const START_DATE: (i32, u32, u32) = (2005, 5, 24);
/// Flush the buffered points every this many attempted dates.
const SAVE_EVERY_N_DAYS: usize = 20;

const DATE_INPUT_SELECTOR: &str = "input[name='UniDbQuery.To']";
const FILTER_BUTTON_SELECTOR: &str = ".datepicker-filter_button";
const RESULTS_TABLE_SELECTOR: &str = "table.data";

const WAIT_TIMEOUT_MS: u64 = 10_000;
const POLL_INTERVAL_MS: u64 = 250;
const NAVIGATION_SETTLE_MS: u64 = 1_000;
const SUBMIT_SETTLE_MS: u64 = 500;
