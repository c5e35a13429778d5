//! HabitBoard - Student Habits vs Exam Performance Dashboard
//!
//! Cleans a student habits CSV and displays filterable summary statistics
//! and charts.

mod config;
mod data;
mod stats;
mod charts;
mod gui;

use eframe::egui;
use gui::HabitBoardApp;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Configure native options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 800.0])
            .with_min_inner_size([1200.0, 700.0])
            .with_title("HabitBoard"),
        ..Default::default()
    };

    // Run the application
    eframe::run_native(
        "HabitBoard",
        options,
        Box::new(|cc| Ok(Box::new(HabitBoardApp::new(cc)))),
    )
}
