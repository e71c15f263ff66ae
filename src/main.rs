mod app;
mod color;
mod state;
mod ui;

use app::DashboardApp;
use clap::Parser;
use eframe::egui;
use retention_dashboard::DashboardContext;
use retention_dashboard::cli::Args;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();
    let args = Args::parse();

    // Both inputs are required; there is no partial dashboard.
    let loaded = args.into_config().and_then(|config| {
        let context = DashboardContext::load(&config)?;
        Ok((config, context))
    });
    let (config, context) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            log::error!("Startup failed: {e}");
            eprintln!("Startup failed: {e}");
            std::process::exit(e.exit_code().unwrap_or(1));
        }
    };

    let state = AppState::new(config, context);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Client Retention Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(DashboardApp::new(state)))),
    )
}
