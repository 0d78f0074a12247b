use std::path::Path;

use chrono::NaiveDate;
use thiserror::Error;

use crate::analysis::rolling::{CorrelationError, align_with_dates, rolling_correlation};
use crate::analysis::scan::{CorrelationHit, scan};
use crate::chart::{ChartSpec, ChartStyle, CorrelationOverlay, build_chart};
use crate::color::SeriesColors;
use crate::config::ViewerConfig;
use crate::data::filter::{DateRange, extract_series, filtered_indices};
use crate::data::loader;
use crate::data::model::TimeSeriesDataset;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("No dataset loaded")]
    NoDataset,
    #[error("Select two metrics to plot")]
    NoMetric,
    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),
    #[error("No records between {start} and {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
    #[error(transparent)]
    Correlation(#[from] CorrelationError),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: ViewerConfig,

    pub colors: SeriesColors,

    /// Loaded dataset (None until a file is loaded).
    pub dataset: Option<TimeSeriesDataset>,

    /// Metric drawn on the left axis.
    pub metric_a: Option<String>,

    /// Metric drawn on the right axis.
    pub metric_b: Option<String>,

    /// Inclusive date range to plot.
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,

    /// Whether to overlay the rolling correlation of A and B.
    pub show_correlation: bool,

    /// Rolling window, in rows.
    pub window_size: usize,

    /// Chart built by the last successful plot action.
    pub chart: Option<ChartSpec>,

    /// Windows found by the last scan against metric A.
    pub scan_hits: Vec<CorrelationHit>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl AppState {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            colors: SeriesColors::from_config(&config.colors),
            window_size: config.window_size.max(1),
            config,
            dataset: None,
            metric_a: None,
            metric_b: None,
            start_date: NaiveDate::default(),
            end_date: NaiveDate::default(),
            show_correlation: false,
            chart: None,
            scan_hits: Vec::new(),
            status_message: None,
        }
    }

    /// Load a dataset file, reporting failures in the status line.
    pub fn load_path(&mut self, path: &Path) {
        match loader::load_file(path, &self.config.date_column) {
            Ok(dataset) => {
                log::info!(
                    "Loaded {} records with metrics {:?}",
                    dataset.len(),
                    dataset.columns
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Ingest a newly loaded dataset: default metric choices and the full
    /// date range.
    pub fn set_dataset(&mut self, dataset: TimeSeriesDataset) {
        let metrics = dataset.metric_names();
        self.metric_a = metrics.first().cloned();
        self.metric_b = metrics.get(1).or(metrics.first()).cloned();

        if let Some((start, end)) = dataset.date_bounds() {
            self.start_date = start;
            self.end_date = end;
            self.status_message = None;
        } else {
            log::error!("No data available for initializing controls.");
            self.status_message = Some("Dataset has no records".to_string());
        }

        self.chart = None;
        self.scan_hits.clear();
        self.dataset = Some(dataset);
    }

    /// Rebuild the chart from the current selections.
    pub fn plot(&mut self) {
        match self.build_chart() {
            Ok(chart) => {
                self.chart = Some(chart);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Plot failed: {e}");
                self.chart = None;
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Correlate metric A against every other metric over the whole dataset
    /// and keep the windows at or above the configured threshold.
    pub fn run_scan(&mut self) {
        let (Some(dataset), Some(base)) = (&self.dataset, &self.metric_a) else {
            self.status_message = Some(PlotError::NoMetric.to_string());
            return;
        };
        match scan(dataset, base, self.window_size, self.config.correlation_threshold) {
            Ok(hits) => {
                log::info!(
                    "Scan of {base}: {} windows at |r| >= {}",
                    hits.len(),
                    self.config.correlation_threshold
                );
                self.scan_hits = hits;
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Scan failed: {e}");
                self.scan_hits.clear();
                self.status_message = Some(e.to_string());
            }
        }
    }

    /// Filter, extract both series, optionally correlate, and describe the
    /// chart. Does not touch the state.
    pub fn build_chart(&self) -> Result<ChartSpec, PlotError> {
        let dataset = self.dataset.as_ref().ok_or(PlotError::NoDataset)?;
        let (Some(metric_a), Some(metric_b)) = (&self.metric_a, &self.metric_b) else {
            return Err(PlotError::NoMetric);
        };

        let range = DateRange::new(self.start_date, self.end_date);
        let indices = filtered_indices(dataset, &range);
        if indices.is_empty() {
            return Err(PlotError::EmptyRange {
                start: range.start,
                end: range.end,
            });
        }

        let a = extract_series(dataset, &indices, metric_a)
            .ok_or_else(|| PlotError::UnknownMetric(metric_a.clone()))?;
        let b = extract_series(dataset, &indices, metric_b)
            .ok_or_else(|| PlotError::UnknownMetric(metric_b.clone()))?;

        let correlation = if self.show_correlation {
            let values = rolling_correlation(&a.values, &b.values, self.window_size)?;
            log::debug!(
                "{} correlation points ({} rows, window {})",
                values.len(),
                a.values.len(),
                self.window_size
            );
            Some(align_with_dates(&a.dates, self.window_size, values))
        } else {
            None
        };

        let style = ChartStyle {
            title: self.config.title.clone(),
            colors: self.colors,
        };
        let overlay = correlation.as_deref().map(|points| CorrelationOverlay {
            window: self.window_size,
            points,
        });
        Ok(build_chart(&a, &b, overlay, &style))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::load_csv_reader;
    use crate::data::model::tests::{date, sample_dataset};

    const CSV: &str = "\
Date,x,y
2024-01-01,1,2
2024-01-02,2,4
2024-01-03,3,6
2024-01-04,4,8
2024-01-05,5,10
2024-01-06,6,12
";

    fn loaded() -> AppState {
        let mut state = AppState::default();
        state.set_dataset(load_csv_reader(CSV.as_bytes(), "Date").unwrap());
        state
    }

    #[test]
    fn test_set_dataset_defaults() {
        let state = loaded();
        assert_eq!(state.metric_a.as_deref(), Some("x"));
        assert_eq!(state.metric_b.as_deref(), Some("y"));
        assert_eq!(state.start_date, date(2024, 1, 1));
        assert_eq!(state.end_date, date(2024, 1, 6));
        assert!(state.chart.is_none());
    }

    #[test]
    fn test_single_metric_dataset_selects_it_twice() {
        let mut state = AppState::default();
        state.set_dataset(load_csv_reader("Date,x\n2024-01-01,1\n".as_bytes(), "Date").unwrap());
        assert_eq!(state.metric_a, state.metric_b);
    }

    #[test]
    fn test_plot_without_correlation() {
        let mut state = loaded();
        state.plot();
        let chart = state.chart.as_ref().unwrap();
        assert_eq!(chart.traces.len(), 2);
        assert_eq!(chart.traces[0].points.len(), 6);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn test_plot_with_correlation_aligns_dates() {
        let mut state = loaded();
        state.show_correlation = true;
        state.window_size = 3;
        state.plot();
        let chart = state.chart.as_ref().unwrap();
        let corr = &chart.traces[2];
        assert_eq!(corr.points.len(), 3);
        assert_eq!(corr.points[0], (date(2024, 1, 4), Some(1.0)));
        assert_eq!(corr.points[2].0, date(2024, 1, 6));
    }

    #[test]
    fn test_plot_respects_date_range() {
        let mut state = loaded();
        state.start_date = date(2024, 1, 2);
        state.end_date = date(2024, 1, 4);
        let chart = state.build_chart().unwrap();
        assert_eq!(chart.traces[1].points.len(), 3);
        assert_eq!(chart.traces[1].points[0], (date(2024, 1, 2), Some(4.0)));
    }

    #[test]
    fn test_empty_range_sets_status() {
        let mut state = loaded();
        state.start_date = date(2025, 1, 1);
        state.end_date = date(2025, 2, 1);
        state.plot();
        assert!(state.chart.is_none());
        assert!(state.status_message.as_deref().unwrap().starts_with("No records"));
    }

    #[test]
    fn test_scan_uses_metric_a_and_threshold() {
        let mut state = loaded();
        state.window_size = 3;
        state.config.correlation_threshold = 0.9;
        state.run_scan();
        // y = 2x, so every window of x vs y is a hit, the last one included
        assert_eq!(state.scan_hits.len(), 4);
        assert!(state.scan_hits.iter().all(|h| h.metric == "y"));
        assert_eq!(state.scan_hits[0].start_date, date(2024, 1, 1));
        assert_eq!(state.scan_hits[3].end_date, date(2024, 1, 6));
    }

    #[test]
    fn test_plot_without_dataset() {
        assert!(matches!(AppState::default().build_chart(), Err(PlotError::NoDataset)));
    }

    #[test]
    fn test_unknown_metric() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());
        state.metric_b = Some("gone".to_string());
        assert!(matches!(state.build_chart(), Err(PlotError::UnknownMetric(m)) if m == "gone"));
    }

    #[test]
    fn test_missing_cells_yield_absent_correlation() {
        let mut state = AppState::default();
        state.set_dataset(sample_dataset());
        state.show_correlation = true;
        state.window_size = 2;
        let chart = state.build_chart().unwrap();
        // file order: a = 3, 1, 2, 4 and b = 30, 10, null, 40
        let points = &chart.traces[2].points;
        assert_eq!(points.len(), 2);
        assert!((points[0].1.unwrap() - 1.0).abs() < 1e-12);
        assert_eq!(points[1].1, None);
    }
}
