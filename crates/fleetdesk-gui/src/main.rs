//! GUI entry point for Fleetdesk

mod active_routes_panel;
mod analytics_panel;
mod app;
mod edit_routes_panel;
mod login_view;
mod map_panel;
mod new_routes_panel;
mod overview_panel;
mod theme;

use app::FleetdeskApp;
use eframe::egui;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([1000.0, 600.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Fleetdesk - Transportation Management",
        options,
        Box::new(|cc| Ok(Box::new(FleetdeskApp::new(cc)))),
    )
}
