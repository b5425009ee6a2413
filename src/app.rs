use eframe::egui;

use crate::editor::EditorSession;
use crate::state::DashboardState;
use crate::ui::editor::{self as editor_ui, CellEdit};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// Sales dashboard
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct DashboardApp {
    pub state: DashboardState,
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, data ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui| {
                    ui.heading("Open a sales CSV to start  (File → Open…)");
                });
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                panels::kpi_row(ui, &self.state);
                ui.separator();
                plot::charts(ui, &mut self.state);
                ui.separator();
                panels::data_section(ui, &mut self.state);
                ui.add_space(8.0);
                ui.small("Filter in the sidebar; click a bar to focus the charts on it.");
            });
        });
    }
}

// ---------------------------------------------------------------------------
// Table editor
// ---------------------------------------------------------------------------

pub struct TableEditorApp {
    pub session: EditorSession,
    editing: Option<CellEdit>,
}

impl TableEditorApp {
    pub fn new(session: EditorSession) -> Self {
        Self {
            session,
            editing: None,
        }
    }
}

impl eframe::App for TableEditorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            editor_ui::toolbar(ui, &mut self.session, &mut self.editing);
        });

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            editor_ui::status_line(ui, &self.session);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            editor_ui::grid(ui, &mut self.session, &mut self.editing);
        });
    }
}
