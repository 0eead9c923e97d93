//! APA reference manager

use eframe::egui;

use crate::app::ProyectaApp;
use crate::core::references::{self, Reference, ReferenceError, ReferenceKind, SortKey};

/// Form state for the reference being added or edited
pub struct ReferenceDraft {
    pub kind: ReferenceKind,
    pub author: String,
    pub year: String,
    pub title: String,
    pub source: String,
}

impl Default for ReferenceDraft {
    fn default() -> Self {
        Self {
            kind: ReferenceKind::Book,
            author: String::new(),
            year: String::new(),
            title: String::new(),
            source: String::new(),
        }
    }
}

impl ReferenceDraft {
    /// Build a validated reference from the form fields.
    pub fn to_reference(&self) -> Result<Reference, ReferenceError> {
        let year = self
            .year
            .trim()
            .parse::<i32>()
            .map_err(|_| ReferenceError::MissingField("año"))?;
        let reference = Reference {
            kind: self.kind,
            author: self.author.trim().to_string(),
            year,
            title: self.title.trim().to_string(),
            source: self.source.trim().to_string(),
        };
        references::validate(&reference)?;
        Ok(reference)
    }

    pub fn from_reference(reference: &Reference) -> Self {
        Self {
            kind: reference.kind,
            author: reference.author.clone(),
            year: reference.year.to_string(),
            title: reference.title.clone(),
            source: reference.source.clone(),
        }
    }
}

/// Reference list with add/edit form, search and sorting
pub struct ReferencesPanel;

impl ReferencesPanel {
    /// Show the reference manager
    pub fn show(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        ui.heading("Referencias APA");
        ui.separator();

        Self::show_form(ui, app);
        ui.separator();
        Self::show_toolbar(ui, app);
        ui.add_space(4.0);
        Self::show_list(ui, app);
    }

    fn show_form(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        egui::Grid::new("reference_form")
            .num_columns(2)
            .spacing([12.0, 6.0])
            .show(ui, |ui| {
                ui.label("Tipo:");
                egui::ComboBox::from_id_salt("reference_kind")
                    .selected_text(app.reference_draft.kind.label())
                    .show_ui(ui, |ui| {
                        for kind in ReferenceKind::ALL {
                            ui.selectable_value(
                                &mut app.reference_draft.kind,
                                kind,
                                kind.label(),
                            );
                        }
                    });
                ui.end_row();

                ui.label("Autor:");
                ui.add(
                    egui::TextEdit::singleline(&mut app.reference_draft.author)
                        .hint_text("Apellido, N.")
                        .desired_width(300.0),
                );
                ui.end_row();

                ui.label("Año:");
                ui.add(
                    egui::TextEdit::singleline(&mut app.reference_draft.year)
                        .hint_text("2020")
                        .desired_width(80.0),
                );
                ui.end_row();

                ui.label("Título:");
                ui.add(
                    egui::TextEdit::singleline(&mut app.reference_draft.title)
                        .desired_width(300.0),
                );
                ui.end_row();

                ui.label("Fuente:");
                ui.add(
                    egui::TextEdit::singleline(&mut app.reference_draft.source)
                        .hint_text("Editorial, revista o URL")
                        .desired_width(300.0),
                );
                ui.end_row();
            });

        ui.horizontal(|ui| {
            let save_label = if app.editing_reference.is_some() {
                "Actualizar"
            } else {
                "Agregar referencia"
            };
            if ui.button(save_label).clicked() {
                Self::commit_draft(app);
            }
            if app.editing_reference.is_some() && ui.button("Cancelar edición").clicked() {
                app.editing_reference = None;
                app.reference_draft = ReferenceDraft::default();
                app.reference_error = None;
            }
        });

        if let Some(error) = &app.reference_error {
            ui.label(
                egui::RichText::new(error.clone()).color(egui::Color32::from_rgb(220, 80, 80)),
            );
        }
    }

    fn commit_draft(app: &mut ProyectaApp) {
        match app.reference_draft.to_reference() {
            Ok(reference) => {
                match app.editing_reference {
                    Some(index) if index < app.project.references.len() => {
                        app.project.references[index] = reference;
                        app.set_status("Referencia actualizada");
                    }
                    _ => {
                        app.project.references.push(reference);
                        app.set_status("Referencia agregada");
                    }
                }
                app.editing_reference = None;
                app.reference_draft = ReferenceDraft::default();
                app.reference_error = None;
                app.dirty = true;
            }
            Err(e) => {
                app.reference_error = Some(e.to_string());
            }
        }
    }

    fn show_toolbar(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        ui.horizontal(|ui| {
            ui.label("Buscar:");
            ui.add(
                egui::TextEdit::singleline(&mut app.reference_query).desired_width(180.0),
            );

            ui.separator();
            ui.label("Ordenar:");
            let mut sorted = None;
            if ui.button("Autor").clicked() {
                sorted = Some(SortKey::Author);
            }
            if ui.button("Año").clicked() {
                sorted = Some(SortKey::YearDesc);
            }
            if ui.button("Título").clicked() {
                sorted = Some(SortKey::Title);
            }
            if ui.button("Tipo").clicked() {
                sorted = Some(SortKey::Kind);
            }
            if let Some(key) = sorted {
                references::sort_by(&mut app.project.references, key);
                app.editing_reference = None;
                app.dirty = true;
            }

            ui.separator();
            if ui.button("Importar BibTeX...").clicked() {
                Self::import_bibtex(app);
            }
        });

        let stats = references::statistics(&app.project.references);
        if stats.total > 0 {
            ui.label(
                egui::RichText::new(format!(
                    "{} referencia(s), {} autor(es), {} de los últimos 5 años",
                    stats.total, stats.unique_authors, stats.recent_count
                ))
                .weak(),
            );
        }
    }

    fn import_bibtex(app: &mut ProyectaApp) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("BibTeX", &["bib"])
            .pick_file()
        else {
            return;
        };

        match std::fs::read_to_string(&path) {
            Ok(text) => {
                let (imported, skipped) = references::import_bibtex(&text);
                let count = imported.len();
                app.project.references.extend(imported);
                if count > 0 {
                    app.dirty = true;
                }
                app.set_status(format!(
                    "BibTeX: {} importada(s), {} omitida(s)",
                    count, skipped
                ));
            }
            Err(e) => {
                tracing::error!("Failed to read BibTeX file: {}", e);
                app.reference_error = Some(format!("No se pudo leer el archivo: {}", e));
            }
        }
    }

    fn show_list(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        let indices = references::search(&app.project.references, &app.reference_query);
        if indices.is_empty() {
            ui.label(egui::RichText::new("Sin referencias que mostrar.").weak());
            return;
        }

        let rows: Vec<(usize, String, String)> = indices
            .into_iter()
            .map(|i| {
                let r = &app.project.references[i];
                (i, r.kind.label().to_string(), r.apa_text())
            })
            .collect();

        let mut remove = None;
        egui::ScrollArea::vertical()
            .id_salt("reference_list_scroll")
            .auto_shrink([false, true])
            .show(ui, |ui| {
                for (index, kind, text) in rows {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(format!("[{}]", kind)).weak());
                        ui.label(text);
                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                if ui.button("Eliminar").clicked() {
                                    remove = Some(index);
                                }
                                if ui.button("Editar").clicked() {
                                    app.reference_draft =
                                        ReferenceDraft::from_reference(&app.project.references[index]);
                                    app.editing_reference = Some(index);
                                    app.reference_error = None;
                                }
                            },
                        );
                    });
                }
            });

        if let Some(index) = remove {
            app.project.references.remove(index);
            app.dirty = true;
            match app.editing_reference {
                Some(editing) if editing == index => app.editing_reference = None,
                Some(editing) if editing > index => app.editing_reference = Some(editing - 1),
                _ => {}
            }
            app.set_status("Referencia eliminada");
        }
    }
}
