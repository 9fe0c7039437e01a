use eframe::egui;

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct IdealMatchApp {
    pub state: AppState,
}

impl IdealMatchApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for IdealMatchApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: fits and filters ----
        egui::SidePanel::left("match_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Bottom panel: result table ----
        if self.state.outcome.is_some() {
            egui::TopBottomPanel::bottom("results_panel")
                .default_height(180.0)
                .resizable(true)
                .show(ctx, |ui| {
                    panels::results_panel(ui, &self.state);
                });
        }

        // ---- Central panel: plot ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::match_plot(ui, &self.state);
        });
    }
}
