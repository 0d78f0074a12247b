//! Renderer-independent description of a chart: named traces of
//! `(date, value)` pairs, each bound to a value axis.
//!
//! `None` values are gaps. The egui sink lives in `ui::plot`.

use chrono::{Datelike, NaiveDate};
use eframe::egui::Color32;

use crate::analysis::CorrelationPoint;
use crate::color::SeriesColors;
use crate::data::model::Series;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSide {
    Left,
    Right,
    /// Drawn on top of the other two with its own scale.
    Overlay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    pub title: String,
    pub side: AxisSide,
    pub color: Color32,
    /// Fixed value range; `None` means fit to the traces on this axis.
    pub range: Option<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub name: String,
    /// Index into [`ChartSpec::axes`].
    pub axis: usize,
    pub color: Color32,
    pub points: Vec<(NaiveDate, Option<f64>)>,
}

impl Trace {
    fn from_series(series: &Series, axis: usize, color: Color32) -> Self {
        let points = series
            .dates
            .iter()
            .zip(&series.values)
            .map(|(&d, &v)| (d, v.is_finite().then_some(v)))
            .collect();
        Trace {
            name: series.name.clone(),
            axis,
            color,
            points,
        }
    }

    /// Contiguous runs of present values; a `None` ends a run.
    pub fn segments(&self) -> Vec<Vec<(NaiveDate, f64)>> {
        let mut segments = Vec::new();
        let mut current = Vec::new();
        for &(date, value) in &self.points {
            match value {
                Some(v) => current.push((date, v)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }
        segments
    }

    fn value_range(&self) -> Option<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|(_, v)| *v)
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub title: String,
    pub x_title: String,
    pub axes: Vec<Axis>,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    /// Value range used to scale `axis`: its fixed range, or the extent of
    /// its traces widened by 0.5 on each side when flat. `(0, 1)` for an
    /// axis without data.
    pub fn axis_range(&self, axis: usize) -> (f64, f64) {
        if let Some(range) = self.axes.get(axis).and_then(|a| a.range) {
            return range;
        }
        let extent = self
            .traces
            .iter()
            .filter(|t| t.axis == axis)
            .filter_map(Trace::value_range)
            .reduce(|(lo1, hi1), (lo2, hi2)| (lo1.min(lo2), hi1.max(hi2)));
        match extent {
            None => (0.0, 1.0),
            Some((lo, hi)) if (hi - lo).abs() < f64::EPSILON => (lo - 0.5, hi + 0.5),
            Some(range) => range,
        }
    }
}

/// Style knobs for [`build_chart`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStyle {
    pub title: String,
    pub colors: SeriesColors,
}

/// Rolling correlation to overlay, with the window it was computed over.
#[derive(Debug, Clone, Copy)]
pub struct CorrelationOverlay<'a> {
    pub window: usize,
    pub points: &'a [CorrelationPoint],
}

/// Metric A on the left axis, metric B on the right axis, and the optional
/// correlation on a third overlay axis fixed to [-1, 1].
pub fn build_chart(
    a: &Series,
    b: &Series,
    correlation: Option<CorrelationOverlay<'_>>,
    style: &ChartStyle,
) -> ChartSpec {
    let colors = style.colors;
    let mut axes = vec![
        Axis {
            title: a.name.clone(),
            side: AxisSide::Left,
            color: colors.metric_a,
            range: None,
        },
        Axis {
            title: b.name.clone(),
            side: AxisSide::Right,
            color: colors.metric_b,
            range: None,
        },
    ];
    let mut traces = vec![
        Trace::from_series(a, 0, colors.metric_a),
        Trace::from_series(b, 1, colors.metric_b),
    ];

    if let Some(overlay) = correlation {
        axes.push(Axis {
            title: "Correlation".to_string(),
            side: AxisSide::Overlay,
            color: colors.correlation,
            range: Some((-1.0, 1.0)),
        });
        traces.push(Trace {
            name: format!("Rolling correlation ({})", overlay.window),
            axis: 2,
            color: colors.correlation,
            points: overlay.points.iter().map(|p| (p.date, p.value)).collect(),
        });
    }

    ChartSpec {
        title: style.title.clone(),
        x_title: "Date".to_string(),
        axes,
        traces,
    }
}

// ---------------------------------------------------------------------------
// Date <-> plot coordinate
// ---------------------------------------------------------------------------

pub fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

pub fn x_to_date(x: f64) -> Option<NaiveDate> {
    if !x.is_finite() || x.abs() > i32::MAX as f64 {
        return None;
    }
    NaiveDate::from_num_days_from_ce_opt(x.round() as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::date;

    fn series(name: &str, values: &[f64]) -> Series {
        Series {
            name: name.to_string(),
            dates: (0..values.len()).map(|i| date(2024, 1, 1 + i as u32)).collect(),
            values: values.to_vec(),
        }
    }

    fn style() -> ChartStyle {
        ChartStyle {
            title: "Time Series Data".to_string(),
            colors: SeriesColors::default(),
        }
    }

    #[test]
    fn test_two_axes_without_correlation() {
        let chart = build_chart(&series("a", &[1.0, 2.0]), &series("b", &[3.0, 4.0]), None, &style());
        assert_eq!(chart.axes.len(), 2);
        assert_eq!(chart.axes[0].side, AxisSide::Left);
        assert_eq!(chart.axes[1].side, AxisSide::Right);
        assert_eq!(chart.traces[1].name, "b");
        assert_eq!(chart.traces[1].axis, 1);
    }

    #[test]
    fn test_correlation_on_overlay_axis() {
        let points = [
            CorrelationPoint { date: date(2024, 1, 3), value: Some(0.5) },
            CorrelationPoint { date: date(2024, 1, 4), value: None },
        ];
        let overlay = CorrelationOverlay { window: 2, points: &points };
        let a = series("a", &[1.0, 2.0, 3.0, 4.0]);
        let chart = build_chart(&a, &a, Some(overlay), &style());
        assert_eq!(chart.axes[2].side, AxisSide::Overlay);
        assert_eq!(chart.axis_range(2), (-1.0, 1.0));
        let trace = &chart.traces[2];
        assert_eq!(trace.name, "Rolling correlation (2)");
        assert_eq!(trace.points[1], (date(2024, 1, 4), None));
    }

    #[test]
    fn test_nan_values_become_gaps() {
        let chart = build_chart(
            &series("a", &[1.0, f64::NAN, 3.0, 4.0]),
            &series("b", &[]),
            None,
            &style(),
        );
        let segments = chart.traces[0].segments();
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0], vec![(date(2024, 1, 1), 1.0)]);
        assert_eq!(segments[1].len(), 2);
    }

    #[test]
    fn test_axis_range_fits_data() {
        let chart = build_chart(
            &series("a", &[3.0, -1.0, f64::NAN, 7.0]),
            &series("b", &[2.0, 2.0]),
            None,
            &style(),
        );
        assert_eq!(chart.axis_range(0), (-1.0, 7.0));
        assert_eq!(chart.axis_range(1), (1.5, 2.5));
        assert_eq!(chart.axis_range(5), (0.0, 1.0));
    }

    #[test]
    fn test_date_coordinate_round_trip() {
        let d = date(2024, 2, 29);
        assert_eq!(x_to_date(date_to_x(d) + 0.3), Some(d));
        assert_eq!(x_to_date(f64::NAN), None);
    }
}
