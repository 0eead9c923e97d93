//! Validation report view

use eframe::egui;

use crate::app::ProyectaApp;
use crate::core::validate::{ValidationLevel, ValidationReport};

const ERROR_COLOR: egui::Color32 = egui::Color32::from_rgb(220, 80, 80);
const WARNING_COLOR: egui::Color32 = egui::Color32::from_rgb(230, 180, 60);
const PASS_COLOR: egui::Color32 = egui::Color32::from_rgb(120, 190, 120);

/// Validation controls and the latest report
pub struct ValidationPanel;

impl ValidationPanel {
    /// Show the validation tab
    pub fn show(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        ui.heading("Validación del Proyecto");
        ui.separator();

        ui.horizontal(|ui| {
            ui.label("Nivel de exigencia:");
            let mut level = app.config.validation_level;
            egui::ComboBox::from_id_salt("validation_level")
                .selected_text(level.label())
                .show_ui(ui, |ui| {
                    for candidate in ValidationLevel::ALL {
                        ui.selectable_value(&mut level, candidate, candidate.label());
                    }
                });
            if level != app.config.validation_level {
                app.config.validation_level = level;
                if let Err(e) = app.config.save() {
                    tracing::error!("Failed to save config: {:#}", e);
                }
            }

            if ui.button("Validar (F5)").clicked() {
                app.run_validation();
            }
        });

        ui.add_space(8.0);
        let Some(report) = app.report.clone() else {
            ui.label(
                egui::RichText::new(
                    "Todavía no se validó el proyecto. Presione Validar o F5.",
                )
                .weak(),
            );
            return;
        };

        Self::show_report(ui, &report);
    }

    fn show_report(ui: &mut egui::Ui, report: &ValidationReport) {
        let verdict = if report.passed {
            egui::RichText::new(format!(
                "APROBADO en el nivel {} ({:.1}%)",
                report.level.label(),
                report.score
            ))
            .color(PASS_COLOR)
            .strong()
        } else {
            egui::RichText::new(format!(
                "NO APROBADO en el nivel {} ({:.1}%, se requiere {:.0}%)",
                report.level.label(),
                report.score,
                report.level.threshold()
            ))
            .color(ERROR_COLOR)
            .strong()
        };
        ui.label(verdict);
        ui.add(
            egui::ProgressBar::new(report.score / 100.0)
                .desired_width(360.0)
                .show_percentage(),
        );

        ui.add_space(8.0);
        egui::Grid::new("validation_categories")
            .num_columns(3)
            .spacing([16.0, 4.0])
            .show(ui, |ui| {
                for category in &report.categories {
                    ui.label(category.name);
                    ui.label(format!("{:.1} / {:.0}", category.points, category.max));
                    ui.add(
                        egui::ProgressBar::new(category.ratio())
                            .desired_width(140.0),
                    );
                    ui.end_row();
                }
            });

        ui.add_space(8.0);
        egui::ScrollArea::vertical()
            .id_salt("validation_report_scroll")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                if !report.errors.is_empty() {
                    ui.strong(format!("Errores ({})", report.errors.len()));
                    for error in &report.errors {
                        ui.label(
                            egui::RichText::new(format!("\u{2716} {}", error))
                                .color(ERROR_COLOR),
                        );
                    }
                    ui.add_space(6.0);
                }

                if !report.warnings.is_empty() {
                    ui.strong(format!("Advertencias ({})", report.warnings.len()));
                    for warning in &report.warnings {
                        ui.label(
                            egui::RichText::new(format!("\u{26A0} {}", warning))
                                .color(WARNING_COLOR),
                        );
                    }
                    ui.add_space(6.0);
                }

                if !report.suggestions.is_empty() {
                    ui.strong("Sugerencias");
                    for suggestion in &report.suggestions {
                        ui.label(egui::RichText::new(format!("\u{2022} {}", suggestion)).weak());
                    }
                    ui.add_space(6.0);
                }

                if !report.recommendations.is_empty() {
                    ui.strong("Recomendaciones");
                    for recommendation in &report.recommendations {
                        ui.label(recommendation);
                    }
                }
            });
    }
}
