mod annotation;
mod app;
mod config;
mod engine;
mod error;
mod logging;
mod navigation;
mod overlay;

use anyhow::{Result, anyhow};
use clap::Parser;
use eframe::egui;
use log::info;

use crate::app::ViewerApp;
use crate::config::Args;

fn main() -> Result<()> {
    logging::setup_logger();
    let args = Args::parse();
    info!(
        "images from {}, labels from {}",
        args.image_dir.display(),
        args.label_dir.display()
    );

    let mut app = ViewerApp::new(&args)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "License Plate Character Break Detection",
        native_options,
        Box::new(move |cc| {
            cc.egui_ctx.set_visuals(egui::Visuals::dark());
            // first image needs a ctx for its texture
            app.load_current(&cc.egui_ctx);
            Box::new(app)
        }),
    )
    .map_err(|e| anyhow!("window failed: {e}"))?;

    Ok(())
}
