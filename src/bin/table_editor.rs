use clap::Parser;
use eframe::egui;

use tabledash::app::TableEditorApp;
use tabledash::cli::EditorArgs;
use tabledash::db::open_store;
use tabledash::editor::EditorSession;

fn main() -> eframe::Result {
    env_logger::init();
    let args = EditorArgs::parse();

    let session = match args.connection().and_then(|c| open_store(&c)) {
        Ok(store) => EditorSession::open(store, &args.table),
        Err(e) => EditorSession::failed(&args.table, &e),
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 760.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        &format!("Tabledash – {}", args.table),
        options,
        Box::new(|_cc| Ok(Box::new(TableEditorApp::new(session)))),
    )
}
