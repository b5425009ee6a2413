use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, DatePickerButton, TableBuilder};

use crate::data::export::FILTERED_FILE_NAME;
use crate::state::{DashboardState, LabelKind};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut DashboardState) {
    ui.heading("Filters");
    ui.separator();

    let (Some(dataset), Some(filter)) = (state.dataset.clone(), state.filter.clone()) else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Date range ----
            ui.strong("Date range");
            if let Some((min, max)) = dataset.date_bounds {
                let mut start = filter.start;
                let mut end = filter.end;
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("From");
                    ui.add(DatePickerButton::new(&mut start).id_salt("date_start"));
                });
                ui.horizontal(|ui: &mut Ui| {
                    ui.label("To");
                    ui.add(DatePickerButton::new(&mut end).id_salt("date_end"));
                });
                let start = start.clamp(min, max);
                let end = end.clamp(min, max);
                if (start, end) != (filter.start, filter.end) {
                    log::debug!("date range changed to {start}..={end}");
                    state.set_date_range(start, end);
                }
                if start > end {
                    ui.label(RichText::new("Start is after end.").color(Color32::YELLOW));
                }
            } else {
                ui.label("No dates in data.");
            }
            ui.separator();

            // ---- Multi-selects (collapsible) ----
            label_filter(ui, state, LabelKind::Category, "Category", &dataset.categories);
            label_filter(ui, state, LabelKind::Region, "Region", &dataset.regions);
        });
}

fn label_filter(ui: &mut Ui, state: &mut DashboardState, kind: LabelKind, title: &str, labels: &[String]) {
    let Some(filter) = state.filter.as_ref() else {
        return;
    };
    let selected = match kind {
        LabelKind::Category => filter.categories.clone(),
        LabelKind::Region => filter.regions.clone(),
    };

    // Show count of selected / total in the header
    let header_text = format!("{title}  ({}/{})", selected.len(), labels.len());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(title)
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(kind);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(kind);
                }
            });

            let colors = match kind {
                LabelKind::Category => state.category_colors.as_ref(),
                LabelKind::Region => state.region_colors.as_ref(),
            };
            let mut toggled = None;
            for label in labels {
                let mut text = RichText::new(label);
                if let Some(cm) = colors {
                    text = text.color(cm.color_for(label));
                }
                let mut checked = selected.contains(label);
                if ui.checkbox(&mut checked, text).changed() {
                    toggled = Some(label.clone());
                }
            }
            if let Some(label) = toggled {
                state.toggle_label(kind, &label);
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut DashboardState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.source.is_some(), egui::Button::new("Reload"))
                .clicked()
            {
                if let Err(e) = state.reload() {
                    log::error!("reload failed: {e:#}");
                }
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                state.view.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI tiles
// ---------------------------------------------------------------------------

pub fn kpi_row(ui: &mut Ui, state: &DashboardState) {
    let tiles = [
        ("Total revenue", state.kpis.revenue_label()),
        ("Total units", state.kpis.units_label()),
        ("Average price", state.kpis.price_label()),
    ];
    ui.columns(tiles.len(), |cols| {
        for (col, (title, value)) in cols.iter_mut().zip(tiles) {
            col.group(|ui: &mut Ui| {
                ui.label(title);
                ui.heading(RichText::new(value).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// Filtered data table and download
// ---------------------------------------------------------------------------

pub fn data_section(ui: &mut Ui, state: &mut DashboardState) {
    egui::CollapsingHeader::new("Show filtered data")
        .id_salt("filtered_data")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let view = &state.view;
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(300.0)
                .columns(Column::auto().at_least(60.0).resizable(true), view.columns.len())
                .header(20.0, |mut header| {
                    for name in &view.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(18.0, view.len(), |mut row| {
                        let i = row.index();
                        for c in 0..view.columns.len() {
                            row.col(|ui: &mut Ui| {
                                ui.label(view.cell(i, c).to_string());
                            });
                        }
                    });
                });
        });

    if ui.button("Download filtered data (CSV)").clicked() {
        save_download(state);
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut DashboardState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        // Errors are logged and shown by the state.
        let _ = state.load(&path);
    }
}

fn save_download(state: &mut DashboardState) {
    let bytes = match state.download_bytes() {
        Ok(b) => b,
        Err(e) => {
            log::error!("encoding filtered data failed: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
            return;
        }
    };
    let Some(path) = rfd::FileDialog::new()
        .set_title("Download filtered data")
        .set_file_name(FILTERED_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file()
    else {
        return;
    };
    match std::fs::write(&path, bytes) {
        Ok(()) => log::info!("wrote {} rows to {}", state.view.len(), path.display()),
        Err(e) => {
            log::error!("writing {} failed: {e}", path.display());
            state.status_message = Some(format!("Error writing {}: {e}", path.display()));
        }
    }
}
