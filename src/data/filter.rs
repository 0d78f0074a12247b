use chrono::NaiveDate;

use super::model::{Series, TimeSeriesDataset};

// ---------------------------------------------------------------------------
// Date range predicate
// ---------------------------------------------------------------------------

/// Inclusive `[start, end]` date bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range, swapping the bounds if they arrive reversed.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            DateRange { start, end }
        } else {
            DateRange { start: end, end: start }
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Return indices of records whose date falls inside `range`, in file order.
pub fn filtered_indices(dataset: &TimeSeriesDataset, range: &DateRange) -> Vec<usize> {
    dataset
        .records
        .iter()
        .enumerate()
        .filter(|(_, rec)| range.contains(rec.date))
        .map(|(i, _)| i)
        .collect()
}

/// Extract one metric over the given rows. `None` if the dataset has no such
/// metric column.
pub fn extract_series(
    dataset: &TimeSeriesDataset,
    indices: &[usize],
    metric: &str,
) -> Option<Series> {
    if !dataset.has_metric(metric) {
        return None;
    }
    Some(Series {
        name: metric.to_string(),
        dates: dataset.dates(indices),
        values: dataset.values(metric, indices),
    })
}
