use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Column order of the backing file.
pub const HEADERS: [&str; 3] = ["date", "term_years", "yield_percent"];

/// One observation of the curve: on `date`, a bond maturing in `term_years`
/// yields `yield_percent`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldCurvePoint {
    pub date: NaiveDate,
    pub term_years: f64,
    pub yield_percent: f64,
}

/// (date, term) identifies a point. The term is keyed by its bit pattern so
/// the pair can live in a `HashSet`.
pub type PointKey = (NaiveDate, u64);

impl YieldCurvePoint {
    pub fn new(date: NaiveDate, term_years: f64, yield_percent: f64) -> Self {
        Self {
            date,
            term_years,
            yield_percent,
        }
    }

    pub fn key(&self) -> PointKey {
        // 0.0 and -0.0 are the same term.
        (self.date, (self.term_years + 0.0).to_bits())
    }
}

/// Parses a finite number written with a decimal comma ("7,25") or a
/// decimal point. "NaN" and "inf" are rejected.
pub fn parse_locale_f64(cell: &str) -> Result<f64> {
    let normalized = cell.trim().replace(',', ".");
    normalized
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or_else(|| Error::ParseNumber(cell.to_string()))
}

/// A maturity: like [`parse_locale_f64`], and strictly positive.
pub fn parse_term_years(cell: &str) -> Result<f64> {
    let term = parse_locale_f64(cell)?;
    if term > 0.0 {
        Ok(term)
    } else {
        Err(Error::ParseNumber(cell.to_string()))
    }
}
