//! Proyecta - academic project document generator
//!
//! A desktop application that collects academic project data through a
//! form, validates it (APA references, citations, content completeness)
//! and generates a formatted Word document.

mod app;
mod core;
mod docx;
mod ui;

use app::ProyectaApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> eframe::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Proyecta...");

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 720.0])
            .with_min_inner_size([1000.0, 600.0])
            .with_title("Generador de Proyectos Académicos"),
        ..Default::default()
    };

    eframe::run_native(
        "Generador de Proyectos Académicos",
        native_options,
        Box::new(|cc| Ok(Box::new(ProyectaApp::new(cc)))),
    )
}
