//! Native galaxy viewer
//!
//! Run with: cargo run --features native --bin galaxy [-- --use-cpu]
//! A tuning preset can be supplied as JSON via GALAXY_PARAMS=<path>.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> eframe::Result<()> {
    use galaxy_vis::app::GalaxyApp;
    use tracing::info;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,galaxy_vis=debug"));
    fmt().with_env_filter(filter).with_target(true).init();

    let use_cpu = std::env::args().any(|a| a == "--use-cpu");
    info!(use_cpu, "Starting galaxy viewer");

    let options = eframe::NativeOptions {
        renderer: eframe::Renderer::Wgpu,
        viewport: eframe::egui::ViewportBuilder::default()
            .with_title("galaxy")
            .with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "galaxy",
        options,
        Box::new(move |cc| Ok(Box::new(GalaxyApp::new(cc, use_cpu)))),
    )
}

#[cfg(target_arch = "wasm32")]
fn main() {}
