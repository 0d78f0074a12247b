use eframe::egui::{RichText, Ui};
use egui_plot::{AxisHints, HPlacement, Legend, Line, Plot, PlotPoints};

use corrview::chart::{AxisSide, ChartSpec, date_to_x, x_to_date};
use corrview::state::AppState;

// ---------------------------------------------------------------------------
// Time-series plot (central panel)
// ---------------------------------------------------------------------------

/// Render the current chart in the central panel.
///
/// egui_plot has a single value space, so every axis is mapped onto [0, 1]
/// by its own range and the custom y axes label marks with real values.
pub fn time_series_plot(ui: &mut Ui, state: &AppState) {
    let chart = match (&state.dataset, &state.chart) {
        (_, Some(chart)) => chart,
        (None, None) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to view time series  (File → Open…)");
            });
            return;
        }
        (Some(_), None) => {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Pick two metrics and a date range, then press Plot");
            });
            return;
        }
    };

    ui.vertical_centered(|ui: &mut Ui| ui.heading(&chart.title));

    let ranges: Vec<(f64, f64)> = (0..chart.axes.len()).map(|i| chart.axis_range(i)).collect();

    Plot::new("time_series_plot")
        .legend(Legend::default())
        .x_axis_label(chart.x_title.clone())
        .x_axis_formatter(|mark, _range| {
            x_to_date(mark.value)
                .map(|d| d.to_string())
                .unwrap_or_default()
        })
        .custom_y_axes(y_axes(chart, &ranges))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for trace in &chart.traces {
                let (lo, hi) = ranges[trace.axis];
                // gaps split a trace into several lines sharing one legend entry
                for segment in trace.segments() {
                    let points: PlotPoints = segment
                        .iter()
                        .map(|&(date, v)| [date_to_x(date), normalize(v, lo, hi)])
                        .collect();

                    let line = Line::new(points)
                        .name(&trace.name)
                        .color(trace.color)
                        .width(1.5);

                    plot_ui.line(line);
                }
            }
        });
}

fn y_axes<'a>(chart: &ChartSpec, ranges: &[(f64, f64)]) -> Vec<AxisHints<'a>> {
    chart
        .axes
        .iter()
        .zip(ranges)
        .map(|(axis, &(lo, hi))| {
            let placement = match axis.side {
                AxisSide::Left => HPlacement::Left,
                AxisSide::Right | AxisSide::Overlay => HPlacement::Right,
            };
            AxisHints::new_y()
                .label(RichText::new(&axis.title).color(axis.color))
                .placement(placement)
                .formatter(move |mark, _range| format_value(lo + mark.value * (hi - lo)))
        })
        .collect()
}

fn normalize(v: f64, lo: f64, hi: f64) -> f64 {
    (v - lo) / (hi - lo)
}

fn format_value(v: f64) -> String {
    if v.abs() >= 1000.0 {
        format!("{v:.0}")
    } else if v.abs() >= 1.0 {
        format!("{v:.2}")
    } else {
        format!("{v:.3}")
    }
}
