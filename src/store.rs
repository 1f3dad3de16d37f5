use std::collections::HashSet;
use std::path::Path;

use chrono::NaiveDate;
use tempfile::NamedTempFile;

use crate::record::{PointKey, YieldCurvePoint, HEADERS};
use crate::{Error, Result};

/// Everything persisted so far, in file order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Dataset {
    pub points: Vec<YieldCurvePoint>,
}

impl Dataset {
    /// Reads the backing file. A missing file is an empty dataset; a row that
    /// doesn't parse is an error, so a damaged backup is never overwritten.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(b'\t')
            .from_path(path)?;

        let points = rdr
            .deserialize::<YieldCurvePoint>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { points })
    }

    /// Dates that already have at least one point.
    pub fn resume_set(&self) -> HashSet<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Appends `new_points` and drops every row whose (date, term) was seen
    /// earlier. Returns how many rows were actually added.
    pub fn merge(&mut self, new_points: Vec<YieldCurvePoint>) -> usize {
        let before = self.points.len();
        self.points.extend(new_points);

        let mut seen: HashSet<PointKey> = HashSet::with_capacity(self.points.len());
        let mut kept_existing = 0;
        let mut index = 0;
        self.points.retain(|p| {
            let keep = seen.insert(p.key());
            if keep && index < before {
                kept_existing += 1;
            }
            index += 1;
            keep
        });

        self.points.len() - kept_existing
    }

    /// Rewrites the whole file. The header is always written, even for an
    /// empty dataset. Rows go to a temp file next to `path` that then
    /// replaces it, so an interrupted save leaves the previous file intact.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let tmp = NamedTempFile::new_in(dir)?;

        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .from_writer(tmp);

        wtr.write_record(HEADERS)?;
        for point in &self.points {
            wtr.serialize(point)?;
        }
        let tmp = wtr
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
