//! Cover image selection

use std::path::PathBuf;

use eframe::egui;

use crate::app::ProyectaApp;
use crate::core::assets::{self, SizeEnvelope, BADGE_ENVELOPE, HEADER_ENVELOPE, IMAGE_EXTENSIONS};

/// Which image slot a control refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Header,
    Badge,
}

impl ImageSlot {
    fn label(self) -> &'static str {
        match self {
            ImageSlot::Header => "Encabezado de página",
            ImageSlot::Badge => "Insignia",
        }
    }

    fn envelope(self) -> SizeEnvelope {
        match self {
            ImageSlot::Header => HEADER_ENVELOPE,
            ImageSlot::Badge => BADGE_ENVELOPE,
        }
    }
}

/// Image slots, previews and the watermark options
pub struct ImagesPanel;

impl ImagesPanel {
    /// Show the images tab
    pub fn show(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        ui.heading("Imágenes del Documento");
        ui.separator();

        egui::ScrollArea::vertical()
            .id_salt("images_scroll")
            .show(ui, |ui| {
                Self::show_slot(ui, app, ImageSlot::Header);
                ui.separator();
                Self::show_slot(ui, app, ImageSlot::Badge);
                ui.separator();
                Self::show_header_options(ui, app);

                if let Some(feedback) = &app.image_feedback {
                    ui.add_space(8.0);
                    let color = if feedback.is_error {
                        egui::Color32::from_rgb(220, 80, 80)
                    } else {
                        egui::Color32::from_rgb(120, 190, 120)
                    };
                    ui.label(egui::RichText::new(feedback.message.clone()).color(color));
                }
            });
    }

    fn resolved_path(app: &ProyectaApp, slot: ImageSlot) -> Option<PathBuf> {
        match slot {
            ImageSlot::Header => app.assets.header_image(&app.project.images),
            ImageSlot::Badge => app.assets.badge_image(&app.project.images),
        }
    }

    fn override_path(app: &ProyectaApp, slot: ImageSlot) -> Option<&PathBuf> {
        match slot {
            ImageSlot::Header => app.project.images.header.as_ref(),
            ImageSlot::Badge => app.project.images.badge.as_ref(),
        }
    }

    fn show_slot(ui: &mut egui::Ui, app: &mut ProyectaApp, slot: ImageSlot) {
        ui.strong(slot.label());

        let resolved = Self::resolved_path(app, slot);
        let has_override = Self::override_path(app, slot).is_some();

        match &resolved {
            Some(path) => {
                let origin = if has_override { "personalizada" } else { "base" };
                ui.label(format!("Imagen {}: {}", origin, path.display()));
                let rec = slot.envelope().recommended;
                ui.label(
                    egui::RichText::new(format!("Tamaño recomendado: {}x{} px", rec.0, rec.1))
                        .weak(),
                );
                ui.add(
                    egui::Image::new(format!("file://{}", path.display()))
                        .max_width(320.0)
                        .max_height(140.0),
                );
            }
            None => {
                ui.label(
                    egui::RichText::new(
                        "Sin imagen. El documento usará un encabezado de texto.",
                    )
                    .weak(),
                );
            }
        }

        ui.horizontal(|ui| {
            if ui.button("Seleccionar...").clicked() {
                Self::pick_image(app, slot);
            }
            if has_override && ui.button("Restaurar imagen base").clicked() {
                match slot {
                    ImageSlot::Header => app.project.images.header = None,
                    ImageSlot::Badge => app.project.images.badge = None,
                }
                app.image_feedback = None;
                app.dirty = true;
            }
        });
    }

    fn pick_image(app: &mut ProyectaApp, slot: ImageSlot) {
        let Some(path) = rfd::FileDialog::new()
            .add_filter("Imágenes", IMAGE_EXTENSIONS)
            .pick_file()
        else {
            return;
        };

        match assets::analyze_image(&path, slot.envelope()) {
            Ok(info) => {
                let message = if info.warnings.is_empty() {
                    format!("Imagen aceptada ({}x{} px)", info.width, info.height)
                } else {
                    info.warnings.join(". ")
                };
                app.image_feedback = Some(ImageFeedback {
                    message,
                    is_error: false,
                });
                match slot {
                    ImageSlot::Header => app.project.images.header = Some(path),
                    ImageSlot::Badge => app.project.images.badge = Some(path),
                }
                app.dirty = true;
            }
            Err(e) => {
                tracing::warn!("Rejected image {}: {}", path.display(), e);
                app.image_feedback = Some(ImageFeedback {
                    message: e.to_string(),
                    is_error: true,
                });
            }
        }
    }

    fn show_header_options(ui: &mut egui::Ui, app: &mut ProyectaApp) {
        ui.strong("Opciones del encabezado");

        let fmt = &mut app.project.format;
        let mut changed = false;
        changed |= ui
            .checkbox(
                &mut fmt.stretch_header,
                "Estirar el encabezado al ancho de la página",
            )
            .changed();
        changed |= ui
            .checkbox(&mut fmt.watermark_header, "Usar como marca de agua")
            .changed();
        if fmt.watermark_header {
            changed |= ui
                .add(
                    egui::Slider::new(&mut fmt.watermark_opacity, 0.05..=1.0)
                        .text("Opacidad"),
                )
                .changed();
        }
        if changed {
            app.dirty = true;
        }
    }
}

/// Result message shown after picking an image
pub struct ImageFeedback {
    pub message: String,
    pub is_error: bool,
}
