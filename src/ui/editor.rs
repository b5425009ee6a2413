use eframe::egui::{self, Color32, RichText, Sense, Ui};
use egui_extras::{Column, TableBuilder};

use crate::editor::{EditorSession, StatusMessage};

/// Text of the cell being edited; committed when it loses focus.
#[derive(Debug, Clone, PartialEq)]
pub struct CellEdit {
    pub row: usize,
    pub col: usize,
    pub text: String,
    focus_requested: bool,
}

enum GridAction {
    StartEdit(usize, usize, String),
    Commit,
    DeleteRow(usize),
}

// ---------------------------------------------------------------------------
// Toolbar
// ---------------------------------------------------------------------------

pub fn toolbar(ui: &mut Ui, session: &mut EditorSession, editing: &mut Option<CellEdit>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.strong(format!("Table: {}", session.table()));
        if session.is_halted() {
            return;
        }
        ui.separator();
        ui.label(format!("{} rows", session.records().len()));
        ui.separator();

        if ui.button("Add row").clicked() {
            commit(session, editing);
            session.add_row();
        }
        if ui
            .add_enabled(session.is_dirty(), egui::Button::new("Reset"))
            .clicked()
        {
            *editing = None;
            session.reset();
        }
        if ui
            .add_enabled(session.is_dirty(), egui::Button::new("Save changes"))
            .clicked()
        {
            commit(session, editing);
            // The session records the outcome as its status.
            let _ = session.save();
        }
    });
}

pub fn status_line(ui: &mut Ui, session: &EditorSession) {
    if let Some(status) = session.status() {
        let color = match status {
            StatusMessage::Success(_) => Color32::from_rgb(80, 170, 80),
            StatusMessage::Error(_) => Color32::RED,
        };
        ui.label(RichText::new(status.text()).color(color));
    }
}

fn commit(session: &mut EditorSession, editing: &mut Option<CellEdit>) {
    if let Some(edit) = editing.take() {
        session.set_cell(edit.row, edit.col, &edit.text);
    }
}

// ---------------------------------------------------------------------------
// Editable grid
// ---------------------------------------------------------------------------

/// Render the table. Click a cell to edit it; the edit is applied when the
/// text field loses focus.
pub fn grid(ui: &mut Ui, session: &mut EditorSession, editing: &mut Option<CellEdit>) {
    if session.is_halted() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("The table could not be loaded.");
        });
        return;
    }

    let records = session.records();
    let n_cols = records.columns.len();
    let mut action = None;

    ui.label("Edit values directly in the table:");
    TableBuilder::new(ui)
        .striped(true)
        .column(Column::exact(28.0))
        .columns(Column::auto().at_least(80.0).resizable(true), n_cols)
        .header(20.0, |mut header| {
            header.col(|_ui: &mut Ui| {});
            for name in &records.columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(20.0, records.len(), |mut row| {
                let r = row.index();
                row.col(|ui: &mut Ui| {
                    if ui.small_button("✕").on_hover_text("Delete row").clicked() {
                        action = Some(GridAction::DeleteRow(r));
                    }
                });
                for c in 0..n_cols {
                    row.col(|ui: &mut Ui| match editing.as_mut() {
                        Some(edit) if edit.row == r && edit.col == c => {
                            let resp = ui.text_edit_singleline(&mut edit.text);
                            if !edit.focus_requested {
                                resp.request_focus();
                                edit.focus_requested = true;
                            } else if resp.lost_focus() {
                                action = Some(GridAction::Commit);
                            }
                        }
                        _ => {
                            let text = records.cell(r, c).to_string();
                            let shown = if text.is_empty() { "∅".to_string() } else { text.clone() };
                            let resp = ui.add(egui::Label::new(shown).sense(Sense::click()));
                            if resp.clicked() {
                                action = Some(GridAction::StartEdit(r, c, text));
                            }
                        }
                    });
                }
            });
        });

    match action {
        Some(GridAction::StartEdit(row, col, text)) => {
            commit(session, editing);
            *editing = Some(CellEdit {
                row,
                col,
                text,
                focus_requested: false,
            });
        }
        Some(GridAction::Commit) => commit(session, editing),
        Some(GridAction::DeleteRow(row)) => {
            *editing = None;
            session.delete_row(row);
        }
        None => {}
    }
}
