use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use corrview::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – metric, date and correlation controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Controls");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the closures.
    let metrics = dataset.metric_names().to_vec();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Metric selectors ----
            metric_combo(ui, "metric_a", "Metric 1", &metrics, &mut state.metric_a);
            metric_combo(ui, "metric_b", "Metric 2", &metrics, &mut state.metric_b);
            ui.separator();

            // ---- Date range ----
            ui.strong("Date range");
            egui::Grid::new("date_range").num_columns(2).show(ui, |ui: &mut Ui| {
                ui.label("Start");
                ui.add(DatePickerButton::new(&mut state.start_date).id_salt("start_date"));
                ui.end_row();
                ui.label("End");
                ui.add(DatePickerButton::new(&mut state.end_date).id_salt("end_date"));
                ui.end_row();
            });
            ui.separator();

            // ---- Correlation ----
            ui.checkbox(&mut state.show_correlation, "Rolling correlation");
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Window");
                ui.add(egui::DragValue::new(&mut state.window_size).range(1..=5000));
            });
            ui.separator();

            if ui.button("Plot").clicked() {
                state.plot();
            }

            ui.add_space(8.0);
            scan_section(ui, state);
        });
}

fn metric_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    metrics: &[String],
    selected: &mut Option<String>,
) {
    ui.strong(label);
    let current = selected.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(&current)
        .width(ui.available_width() * 0.9)
        .show_ui(ui, |ui: &mut Ui| {
            for metric in metrics {
                ui.selectable_value(selected, Some(metric.clone()), metric.as_str());
            }
        });
}

fn scan_section(ui: &mut Ui, state: &mut AppState) {
    let threshold = state.config.correlation_threshold;
    egui::CollapsingHeader::new(RichText::new("Correlation scan").strong())
        .id_salt("scan")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.label(format!("Windows with |r| ≥ {threshold:.2} against Metric 1"));
            if ui.small_button("Scan").clicked() {
                state.run_scan();
            }
            for hit in &state.scan_hits {
                let color = if hit.value < 0.0 {
                    state.colors.metric_b
                } else {
                    state.colors.metric_a
                };
                ui.label(
                    RichText::new(format!(
                        "{:+.2} {}  {} → {}",
                        hit.value, hit.metric, hit.start_date, hit.end_date
                    ))
                    .color(color),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} records, {} metrics",
                ds.len(),
                ds.metric_names().len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open time-series data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
