use eframe::egui;

use crate::state::{AppState, View};
use crate::ui::{charts, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    /// File name shown in the top bar.
    source: String,
}

impl DashboardApp {
    pub fn new(state: AppState, source: String) -> Self {
        Self { state, source }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.refresh_reference_year();

        // ---- Top panel: view switch and counts ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state, &self.source);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics and charts, or the article table ----
        egui::CentralPanel::default().show(ctx, |ui| match self.state.view {
            View::Charts => {
                ui.heading("Scientific articles published by the graduate program");
                ui.add_space(4.0);
                panels::metrics_row(ui, &self.state);
                ui.separator();
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| charts::dashboard(ui, &self.state));
            }
            View::Articles => panels::articles_table(ui, &self.state),
        });
    }
}
