use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

use crate::record::{parse_locale_f64, parse_term_years, YieldCurvePoint};
use crate::{Error, Result};

/// Cells the site shows for days without a published curve.
const PLACEHOLDERS: [&str; 3] = ["–", "-", ""];

/// What one results table says about one date.
#[derive(Debug, Clone, PartialEq)]
pub enum DayOutcome {
    Points(Vec<YieldCurvePoint>),
    /// Weekend or holiday: the data row is all placeholders.
    NoData,
}

impl DayOutcome {
    pub fn into_points(self) -> Vec<YieldCurvePoint> {
        match self {
            DayOutcome::Points(points) => points,
            DayOutcome::NoData => Vec::new(),
        }
    }
}

/// Reads the results table out of `html`.
/// Row 0 holds the terms in its `th` cells, row 1 the yields in its `td`
/// cells; the first cell of each row is a label and is dropped.
pub fn parse_day(date: NaiveDate, html: &str, table_selector: &str) -> Result<DayOutcome> {
    let doc = Html::parse_document(html);

    let table_sel = create_selector(table_selector)?;
    let row_sel = create_selector("tr")?;
    let th_sel = create_selector("th")?;
    let td_sel = create_selector("td")?;

    let table = doc
        .select(&table_sel)
        .next()
        .ok_or_else(|| Error::ElementNotFound(table_selector.to_string()))?;

    let mut rows = table.select(&row_sel);
    let (header, data) = match (rows.next(), rows.next()) {
        (Some(header), Some(data)) => (header, data),
        _ => {
            return Err(Error::MalformedTable(format!(
                "expected a header row and a data row in {table_selector}"
            )))
        }
    };

    let terms = cell_texts(header, &th_sel);
    let values = cell_texts(data, &td_sel);

    points_from_cells(date, &terms, &values)
}

/// Pairs terms with values positionally. Surplus cells on either side are
/// ignored.
pub(crate) fn points_from_cells(
    date: NaiveDate,
    terms: &[String],
    values: &[String],
) -> Result<DayOutcome> {
    if values.iter().all(|v| PLACEHOLDERS.contains(&v.as_str())) {
        return Ok(DayOutcome::NoData);
    }

    let points = terms
        .iter()
        .zip(values)
        .map(|(term, value)| {
            Ok(YieldCurvePoint::new(
                date,
                parse_term_years(term)?,
                parse_locale_f64(value)?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(DayOutcome::Points(points))
}

fn cell_texts(row: ElementRef<'_>, cell_sel: &Selector) -> Vec<String> {
    row.select(cell_sel)
        .skip(1)
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .collect()
}

#[inline]
pub(crate) fn create_selector(sel_str: &str) -> Result<Selector> {
    Selector::parse(sel_str).map_err(|_| Error::Selector(sel_str.into()))
}
