use auto_dashboard::config::DashboardConfig;
use auto_dashboard::AutoDashboardApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match DashboardConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::warn!("Ignoring configuration: {e:#}");
            DashboardConfig::default()
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 420.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Auto Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(AutoDashboardApp::new(config)))),
    )
}
