//! Bottom status bar

use eframe::egui;

use crate::app::ProyectaApp;

/// Status strip: file, counters, autosave countdown and last action
pub struct StatusBar;

impl StatusBar {
    /// Show the status bar contents
    pub fn show(ui: &mut egui::Ui, app: &ProyectaApp) {
        ui.horizontal(|ui| {
            let name = app
                .project_path
                .as_ref()
                .and_then(|p| p.file_name())
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Sin guardar".to_string());
            let marker = if app.dirty { "*" } else { "" };
            ui.label(format!("{}{}", name, marker));

            ui.separator();
            let stats = app.project.stats();
            ui.label(format!(
                "{} palabras | {}/{} secciones | {} referencias",
                stats.total_words,
                stats.sections_completed,
                stats.sections_active,
                stats.reference_count
            ));

            if let Some(seconds) = app.autosave.seconds_until(&app.config.autosave) {
                ui.separator();
                ui.label(
                    egui::RichText::new(format!("Autoguardado en {} s", seconds)).weak(),
                );
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some((message, at)) = &app.status {
                    ui.label(
                        egui::RichText::new(format!("{} ({})", message, at.format("%H:%M:%S")))
                            .weak(),
                    );
                }
            });
        });
    }
}
