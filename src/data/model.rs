use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the dataset
// ---------------------------------------------------------------------------

/// A dynamically-typed cell, as produced by the loaders' type guessing.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(NaiveDate),
    Null,
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v:.4}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => write!(f, "<null>"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell; `None` for anything that is not a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Record – one row of the dataset
// ---------------------------------------------------------------------------

/// One row. `date` is the parsed date column; `values` holds every other
/// column keyed by header name.
#[derive(Debug, Clone)]
pub struct Record {
    pub date: NaiveDate,
    pub values: BTreeMap<String, CellValue>,
}

// ---------------------------------------------------------------------------
// TimeSeriesDataset – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset, rows kept in file order.
#[derive(Debug, Clone)]
pub struct TimeSeriesDataset {
    /// Name of the column the dates were read from.
    pub date_column: String,
    /// Metric column names in header order (excludes the date column).
    pub columns: Vec<String>,
    pub records: Vec<Record>,
}

impl TimeSeriesDataset {
    pub fn new(date_column: impl Into<String>, columns: Vec<String>, records: Vec<Record>) -> Self {
        TimeSeriesDataset {
            date_column: date_column.into(),
            columns,
            records,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Column names a user may pick as metrics.
    pub fn metric_names(&self) -> &[String] {
        &self.columns
    }

    pub fn has_metric(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c == name)
    }

    /// Earliest and latest date, or `None` for an empty dataset.
    pub fn date_bounds(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.records.first()?.date;
        Some(self.records.iter().fold((first, first), |(lo, hi), r| {
            (lo.min(r.date), hi.max(r.date))
        }))
    }

    /// Dates of the given rows, in the order given.
    pub fn dates(&self, indices: &[usize]) -> Vec<NaiveDate> {
        indices.iter().map(|&i| self.records[i].date).collect()
    }

    /// Values of `metric` at the given rows. Missing or non-numeric cells
    /// become NaN so the result stays index-aligned with [`Self::dates`].
    pub fn values(&self, metric: &str, indices: &[usize]) -> Vec<f64> {
        indices
            .iter()
            .map(|&i| {
                self.records[i]
                    .values
                    .get(metric)
                    .and_then(CellValue::as_f64)
                    .unwrap_or(f64::NAN)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Series – a date-aligned numeric sequence
// ---------------------------------------------------------------------------

/// A metric column restricted to some rows, paired with the rows' dates.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub name: String,
    pub dates: Vec<NaiveDate>,
    pub values: Vec<f64>,
}
