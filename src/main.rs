use clap::Parser;
use eframe::egui;

use tabledash::app::DashboardApp;
use tabledash::cli::DashboardArgs;

fn main() -> eframe::Result {
    env_logger::init();
    let args = DashboardArgs::parse();

    let mut app = DashboardApp::default();
    // A failed load is shown in the top bar; File → Open… still works.
    let _ = app.state.load(&args.data);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Tabledash – Sales Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
