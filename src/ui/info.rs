//! Project information form

use eframe::egui;

use crate::app::ProyectaApp;

/// Metadata form for the cover page fields
pub struct InfoPanel;

impl InfoPanel {
    /// Show the information form
    pub fn show(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        ui.heading("Información del Proyecto");
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("info_scroll")
            .show(ui, |ui| {
                let mut changed = false;

                egui::Grid::new("info_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        let meta = &mut app.project.meta;
                        changed |= Self::field(ui, "Título:", &mut meta.title, "");
                        changed |= Self::field(ui, "Institución:", &mut meta.institution, "");
                        changed |= Self::field(ui, "Ciclo:", &mut meta.cycle, "");
                        changed |= Self::field(ui, "Curso:", &mut meta.course, "");
                        changed |= Self::field(ui, "Énfasis:", &mut meta.emphasis, "");
                        changed |= Self::field(ui, "Área de Desarrollo:", &mut meta.area, "");
                        changed |= Self::field(ui, "Categoría:", &mut meta.category, "");
                        changed |= Self::field(ui, "Director:", &mut meta.director, "");
                        changed |= Self::field(ui, "Responsable:", &mut meta.responsible, "");
                        changed |= Self::field(
                            ui,
                            "Estudiantes:",
                            &mut meta.students,
                            "Nombres separados por comas",
                        );
                        changed |= Self::field(
                            ui,
                            "Tutores:",
                            &mut meta.tutors,
                            "Nombres separados por comas",
                        );
                    });

                if changed {
                    app.dirty = true;
                }

                ui.add_space(8.0);
                let students = app.project.meta.student_list().len();
                let tutors = app.project.meta.tutor_list().len();
                ui.label(
                    egui::RichText::new(format!(
                        "{} estudiante(s), {} tutor(es)",
                        students, tutors
                    ))
                    .weak(),
                );
            });
    }

    /// One labeled row of the form grid
    fn field(ui: &mut egui::Ui, label: &str, value: &mut String, hint: &str) -> bool {
        ui.label(label);
        let response = ui.add(
            egui::TextEdit::singleline(value)
                .hint_text(hint)
                .desired_width(420.0),
        );
        ui.end_row();
        response.changed()
    }
}
