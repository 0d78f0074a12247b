use chrono::NaiveDate;
use thiserror::Error;

use super::rolling::{CorrelationError, pearson_complete_pairs};
use crate::data::model::TimeSeriesDataset;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("base metric '{0}' not found in dataset")]
    UnknownMetric(String),
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

/// A window in which a metric tracked the base metric closely.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationHit {
    pub metric: String,
    pub value: f64,
    /// First date inside the window.
    pub start_date: NaiveDate,
    /// Last date inside the window.
    pub end_date: NaiveDate,
}

/// Correlate `base_metric` against every other metric over rolling windows of
/// `window` rows and keep each window with `|r| >= threshold`.
///
/// Every full window `[start, start + window)` is visited, the most recent
/// one included. Rows where either metric is missing are left out of that
/// window's correlation rather than discarding the window. Hits are grouped
/// by metric in column order, then by window position.
pub fn scan(
    dataset: &TimeSeriesDataset,
    base_metric: &str,
    window: usize,
    threshold: f64,
) -> Result<Vec<CorrelationHit>, ScanError> {
    if window == 0 {
        return Err(CorrelationError::InvalidWindow.into());
    }
    if !dataset.has_metric(base_metric) {
        return Err(ScanError::UnknownMetric(base_metric.to_string()));
    }

    let rows: Vec<usize> = (0..dataset.len()).collect();
    let dates = dataset.dates(&rows);
    let base = dataset.values(base_metric, &rows);

    let mut hits = Vec::new();
    for metric in dataset.metric_names() {
        if metric == base_metric {
            continue;
        }
        if metric.trim().is_empty() {
            log::warn!("skipping metric column with an empty name");
            continue;
        }

        let other = dataset.values(metric, &rows);
        let before = hits.len();
        let starts = (dates.len() + 1).saturating_sub(window);
        for start in 0..starts {
            let end = start + window;
            let Some(r) = pearson_complete_pairs(&base[start..end], &other[start..end]) else {
                continue;
            };
            if r.abs() < threshold {
                continue;
            }
            hits.push(CorrelationHit {
                metric: metric.clone(),
                value: r,
                start_date: dates[start],
                end_date: dates[end - 1],
            });
        }
        log::debug!("{base_metric} vs {metric}: {} windows over threshold", hits.len() - before);
    }

    Ok(hits)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::data::model::tests::date;
    use crate::data::model::{CellValue, Record};

    fn dataset() -> TimeSeriesDataset {
        let base = [1.0, 3.0, 2.0, 5.0, 4.0, 6.0, 8.0];
        let noise = [0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0];
        let records = (0..base.len())
            .map(|i| {
                let mut values = BTreeMap::new();
                values.insert("base".to_string(), CellValue::Float(base[i]));
                values.insert("twin".to_string(), CellValue::Float(base[i] * 2.0 + 1.0));
                values.insert("mirror".to_string(), CellValue::Float(-base[i]));
                values.insert("noise".to_string(), CellValue::Float(noise[i]));
                Record {
                    date: date(2024, 1, 1 + i as u32),
                    values,
                }
            })
            .collect();
        TimeSeriesDataset::new(
            "Date",
            vec!["base".into(), "twin".into(), "mirror".into(), "noise".into()],
            records,
        )
    }

    #[test]
    fn test_scan_reports_strong_windows_only() {
        let hits = scan(&dataset(), "base", 3, 0.8).unwrap();
        // 7 rows, window 3 → 5 windows each for twin and mirror
        assert_eq!(hits.iter().filter(|h| h.metric == "twin").count(), 5);
        assert_eq!(hits.iter().filter(|h| h.metric == "mirror").count(), 5);
        assert!(hits.iter().all(|h| h.value.abs() >= 0.8));
        assert!(hits.iter().filter(|h| h.metric == "mirror").all(|h| h.value < 0.0));
    }

    #[test]
    fn test_scan_window_dates() {
        let hits = scan(&dataset(), "base", 3, 0.99).unwrap();
        let first = hits.iter().find(|h| h.metric == "twin").unwrap();
        assert_eq!(first.start_date, date(2024, 1, 1));
        assert_eq!(first.end_date, date(2024, 1, 3));
        let last = hits.iter().filter(|h| h.metric == "twin").last().unwrap();
        assert_eq!(last.start_date, date(2024, 1, 5));
        assert_eq!(last.end_date, date(2024, 1, 7));
    }

    #[test]
    fn test_scan_skips_blank_rows_inside_window() {
        let mut ds = dataset();
        ds.records[3].values.insert("twin".to_string(), CellValue::Null);
        let hits = scan(&ds, "base", 3, 0.8).unwrap();
        let twin: Vec<_> = hits.iter().filter(|h| h.metric == "twin").collect();
        // windows touching row 3 still correlate their remaining two rows
        assert_eq!(twin.len(), 5);
        assert!(twin.iter().all(|h| (h.value - 1.0).abs() < 1e-9));
        assert_eq!(twin[4].start_date, date(2024, 1, 5));
        assert_eq!(twin[4].end_date, date(2024, 1, 7));
    }

    #[test]
    fn test_scan_window_equal_to_length() {
        let hits = scan(&dataset(), "base", 7, 0.99).unwrap();
        let twin = hits.iter().find(|h| h.metric == "twin").unwrap();
        assert_eq!(twin.start_date, date(2024, 1, 1));
        assert_eq!(twin.end_date, date(2024, 1, 7));
    }

    #[test]
    fn test_scan_zero_window() {
        let err = scan(&dataset(), "base", 0, 0.8).unwrap_err();
        assert!(matches!(err, ScanError::Correlation(CorrelationError::InvalidWindow)));
    }

    #[test]
    fn test_scan_unknown_base() {
        let err = scan(&dataset(), "nope", 3, 0.8).unwrap_err();
        assert!(matches!(err, ScanError::UnknownMetric(m) if m == "nope"));
    }

    #[test]
    fn test_scan_window_too_large() {
        assert!(scan(&dataset(), "base", 50, 0.0).unwrap().is_empty());
    }
}
