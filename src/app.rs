use eframe::egui;

use corrview::config::ViewerConfig;
use corrview::state::AppState;

use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct CorrViewApp {
    pub state: AppState,
}

impl CorrViewApp {
    /// Build the app and open the configured dataset if it is on disk.
    pub fn new(config: ViewerConfig) -> Self {
        let data_path = config.data_path.clone();
        let mut state = AppState::new(config);
        if data_path.exists() {
            state.load_path(&data_path);
        } else {
            log::info!("{} not found, waiting for File → Open", data_path.display());
        }
        Self { state }
    }
}

impl eframe::App for CorrViewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: metric and date controls ----
        egui::SidePanel::left("controls_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::time_series_plot(ui, &self.state);
        });
    }
}
