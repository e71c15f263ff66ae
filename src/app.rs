use eframe::egui;

use crate::state::AppState;
use crate::ui::panels;

/// Window wrapper around [`AppState`]; all work happens in the panels.
pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Ctrl/Cmd+O opens a dataset, Ctrl/Cmd+M a model.
    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let open_data = ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::O));
        let open_model = ctx.input_mut(|i| i.consume_key(egui::Modifiers::COMMAND, egui::Key::M));
        if open_data {
            panels::open_dataset_dialog(&mut self.state);
        } else if open_model {
            panels::open_model_dialog(&mut self.state);
        }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("menu").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // Filter, breakdown tables and lookup
        egui::SidePanel::left("controls")
            .default_width(320.0)
            .min_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            panels::central_panel(ui, &self.state);
        });
    }
}
