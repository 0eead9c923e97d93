//! Section content editor

use eframe::egui;

use crate::app::ProyectaApp;
use crate::core::sections;

/// Section list plus the editor for the selected section
pub struct ContentPanel;

/// Owned snapshot of one section list entry, so the list can be drawn
/// while the project is mutated.
struct SectionRow {
    id: String,
    title: String,
    required: bool,
    custom: bool,
    active: bool,
    has_content: bool,
}

impl ContentPanel {
    /// Show the content editor
    pub fn show(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        let available_width = ui.available_width();
        ui.horizontal(|ui| {
            ui.set_min_width(available_width);

            ui.vertical(|ui| {
                ui.set_width(280.0);
                Self::show_section_list(ui, app);
            });

            ui.separator();

            ui.vertical(|ui| {
                ui.set_width(available_width - 300.0);
                Self::show_editor(ui, app);
            });
        });
    }

    fn collect_rows(app: &ProyectaApp) -> Vec<SectionRow> {
        let mut rows: Vec<SectionRow> = sections::CATALOG
            .iter()
            .map(|s| SectionRow {
                id: s.id.to_string(),
                title: s.title.to_string(),
                required: s.required,
                custom: false,
                active: app.project.is_active(s.id),
                has_content: !app.project.section_content(s.id).trim().is_empty(),
            })
            .collect();
        for s in &app.project.custom_sections {
            rows.push(SectionRow {
                id: s.id.clone(),
                title: s.title.clone(),
                required: false,
                custom: true,
                active: app.project.is_active(&s.id),
                has_content: !app.project.section_content(&s.id).trim().is_empty(),
            });
        }
        rows
    }

    fn show_section_list(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        ui.heading("Secciones");
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("section_list_scroll")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for row in Self::collect_rows(app) {
                    ui.horizontal(|ui| {
                        let mut active = row.active;
                        // Required sections always render; their checkbox is locked
                        let checkbox = ui.add_enabled(
                            !row.required,
                            egui::Checkbox::without_text(&mut active),
                        );
                        if checkbox.changed() {
                            app.project.set_active(&row.id, active);
                            app.dirty = true;
                        }

                        let mark = if row.has_content { " \u{2713}" } else { "" };
                        let selected = app.selected_section == row.id;
                        if ui
                            .selectable_label(selected, format!("{}{}", row.title, mark))
                            .clicked()
                        {
                            app.selected_section = row.id.clone();
                        }

                        if row.custom {
                            ui.with_layout(
                                egui::Layout::right_to_left(egui::Align::Center),
                                |ui| {
                                    if ui.button("\u{2715}").on_hover_text("Quitar sección").clicked()
                                    {
                                        app.project.remove_custom_section(&row.id);
                                        if app.selected_section == row.id {
                                            app.selected_section = "introduccion".to_string();
                                        }
                                        app.dirty = true;
                                    }
                                },
                            );
                        }
                    });
                }
            });

        ui.separator();
        ui.label("Agregar sección propia:");
        ui.horizontal(|ui| {
            ui.add(
                egui::TextEdit::singleline(&mut app.new_section_title)
                    .hint_text("Título")
                    .desired_width(150.0),
            );
            ui.checkbox(&mut app.new_section_chapter, "Capítulo");
        });
        if ui.button("Agregar").clicked() {
            let title = app.new_section_title.clone();
            if let Some(id) = app
                .project
                .add_custom_section(&title, app.new_section_chapter)
            {
                app.selected_section = id;
                app.new_section_title.clear();
                app.new_section_chapter = false;
                app.dirty = true;
            }
        }
    }

    fn show_editor(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        let selected = app.selected_section.clone();
        let Some(section) = app
            .project
            .ordered_sections()
            .into_iter()
            .find(|s| s.id() == selected)
            .map(|s| (s.title().to_string(), s.instruction().to_string()))
        else {
            ui.label("Seleccione una sección activa de la lista.");
            return;
        };
        let (title, instruction) = section;

        ui.heading(sections::clean_title(&title));
        if !instruction.is_empty() {
            ui.label(egui::RichText::new(instruction).weak().italics());
        }
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("section_editor_scroll")
            .show(ui, |ui| {
                let output = egui::TextEdit::multiline(app.project.section_content_mut(&selected))
                    .desired_width(f32::INFINITY)
                    .desired_rows(24)
                    .hint_text("Escriba el contenido de la sección...")
                    .show(ui);
                if output.response.changed() {
                    app.dirty = true;
                }
            });

        let words = app
            .project
            .section_content(&selected)
            .split_whitespace()
            .count();
        ui.label(egui::RichText::new(format!("{} palabras", words)).weak());
        ui.label(
            egui::RichText::new(
                "Citas: [CITA:textual:Autor:2020:15], [CITA:parafraseo:Autor:2020]",
            )
            .weak()
            .small(),
        );
    }
}
