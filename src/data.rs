//! CSV intake: raw table, column checks, and conversion into typed bars.
//!
//! Checks run in a fixed order: the `Date` column first, then date parsing,
//! then the OHLCV columns, then numeric parsing. The dashboard shows the
//! preview between the first and second column checks.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::{DataError, REQUIRED_COLUMNS};
use crate::model::bar::Bar;

pub const DATE_COLUMN: &str = "Date";
pub const DEFAULT_PREVIEW_ROWS: usize = 5;
pub const MAX_PREVIEW_ROWS: usize = 500;

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];
const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%:z",
    "%Y-%m-%d %H:%M:%S%z",
];
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// Parse the date formats found in broker and yfinance exports.
///
/// Offset-bearing timestamps keep their local wall-clock time.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt.naive_local());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Render a parsed date the way the preview shows it: day only at midnight.
pub fn format_date(dt: &NaiveDateTime) -> String {
    if dt.time() == chrono::NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Some(f64::NAN);
    }
    s.parse::<f64>().ok()
}

/// Header plus raw string cells, as read from the file.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

/// First rows of a table, Date column normalized where it parses.
#[derive(Debug, Clone, PartialEq)]
pub struct Preview {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub total_rows: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub columns: Vec<String>,
    pub bars: Vec<Bar>,
}

impl PriceTable {
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut records = Vec::new();
        for record in rdr.records() {
            let record = record?;
            records.push(record.iter().map(str::to_string).collect());
        }
        Ok(Self { headers, records })
    }

    pub fn from_path(path: &Path) -> Result<Self, DataError> {
        let file = File::open(path)?;
        let table = Self::from_reader(file)?;
        tracing::debug!(
            path = %path.display(),
            columns = table.headers.len(),
            rows = table.records.len(),
            "Read CSV table"
        );
        Ok(table)
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn ensure_date_column(&self) -> Result<usize, DataError> {
        self.column_index(DATE_COLUMN).ok_or(DataError::MissingDate)
    }

    pub fn missing_columns(&self) -> Vec<String> {
        REQUIRED_COLUMNS
            .iter()
            .filter(|c| self.column_index(c).is_none())
            .map(|c| c.to_string())
            .collect()
    }

    pub fn ensure_required_columns(&self) -> Result<[usize; 5], DataError> {
        let missing = self.missing_columns();
        if !missing.is_empty() {
            return Err(DataError::MissingColumns { missing });
        }
        let mut idx = [0usize; 5];
        for (slot, name) in idx.iter_mut().zip(REQUIRED_COLUMNS) {
            *slot = self.column_index(name).unwrap_or_default();
        }
        Ok(idx)
    }

    fn cell(&self, row: usize, col: usize) -> &str {
        self.records[row].get(col).map(String::as_str).unwrap_or("")
    }

    /// Parse every Date cell. Rows are 1-based in errors, matching the file's data lines.
    pub fn parse_dates(&self) -> Result<Vec<NaiveDateTime>, DataError> {
        let col = self.ensure_date_column()?;
        (0..self.records.len())
            .map(|row| {
                let raw = self.cell(row, col);
                parse_date(raw).ok_or_else(|| DataError::InvalidDate {
                    row: row + 1,
                    value: raw.to_string(),
                })
            })
            .collect()
    }

    pub fn preview(&self, n: usize) -> Preview {
        let date_col = self.column_index(DATE_COLUMN);
        let rows = self
            .records
            .iter()
            .take(n)
            .map(|record| {
                let mut row: Vec<String> = (0..self.headers.len())
                    .map(|i| record.get(i).cloned().unwrap_or_default())
                    .collect();
                if let Some(col) = date_col {
                    if let Some(dt) = row.get(col).and_then(|raw| parse_date(raw)) {
                        row[col] = format_date(&dt);
                    }
                }
                row
            })
            .collect();
        Preview {
            headers: self.headers.clone(),
            rows,
            total_rows: self.records.len(),
        }
    }

    pub fn into_dataset(self) -> Result<Dataset, DataError> {
        let dates = self.parse_dates()?;
        let [open, high, low, close, volume] = self.ensure_required_columns()?;

        let mut bars = Vec::with_capacity(self.records.len());
        for (row, date) in dates.into_iter().enumerate() {
            let num = |col: usize| -> Result<f64, DataError> {
                let raw = self.cell(row, col);
                parse_number(raw).ok_or_else(|| DataError::InvalidNumber {
                    row: row + 1,
                    column: self.headers[col].clone(),
                    value: raw.to_string(),
                })
            };
            bars.push(Bar {
                date,
                open: num(open)?,
                high: num(high)?,
                low: num(low)?,
                close: num(close)?,
                volume: num(volume)?,
            });
        }
        Ok(Dataset {
            columns: self.headers,
            bars,
        })
    }
}

impl Dataset {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.volume).collect()
    }

    pub fn date_labels(&self) -> Vec<String> {
        self.bars.iter().map(Bar::date_label).collect()
    }
}

/// Read, validate, and convert a CSV file in one step.
pub fn load_dataset(path: &Path) -> Result<Dataset, DataError> {
    PriceTable::from_path(path)?.into_dataset()
}
