mod app;
mod assets;
mod color;
mod config;
mod data;
mod state;
mod ui;

use std::path::Path;

use app::DomoticPanelApp;
use config::{DashboardConfig, CONFIG_FILE};
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match DashboardConfig::load_or_default(Path::new(CONFIG_FILE)) {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e:#}");
            std::process::exit(1);
        }
    };

    let mut viewport = egui::ViewportBuilder::default()
        .with_inner_size([config.window_width, config.window_height])
        .with_min_inner_size([640.0, 480.0]);
    match assets::window_icon(&config.asset("icon.png")) {
        Ok(icon) => viewport = viewport.with_icon(icon),
        Err(e) => log::warn!("No window icon: {e:#}"),
    }

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        "Dashboard",
        options,
        Box::new(|cc| {
            // Install image loaders so egui can render the svg lamp icons.
            egui_extras::install_image_loaders(&cc.egui_ctx);
            Ok(Box::new(DomoticPanelApp::new(AppState::new(config))))
        }),
    )
}
