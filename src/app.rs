//! Main application state and UI coordination

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local};
use eframe::egui;

use crate::core::assets::AssetLibrary;
use crate::core::autosave::{self, AutosaveState};
use crate::core::config::AppConfig;
use crate::core::project::{FormatConfig, Project};
use crate::core::validate::{ValidationReport, Validator};
use crate::docx::worker::{self, GenerationJob, Progress};
use crate::ui::{
    content::ContentPanel,
    images::{ImageFeedback, ImagesPanel},
    info::InfoPanel,
    references::{ReferenceDraft, ReferencesPanel},
    status_bar::StatusBar,
    validation::ValidationPanel,
};

/// Tabs of the central area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Info,
    Content,
    References,
    Images,
    Validation,
}

impl Tab {
    pub const ALL: [Tab; 5] = [
        Tab::Info,
        Tab::Content,
        Tab::References,
        Tab::Images,
        Tab::Validation,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Info => "Información",
            Tab::Content => "Contenido",
            Tab::References => "Referencias",
            Tab::Images => "Imágenes",
            Tab::Validation => "Validación",
        }
    }
}

/// Action deferred until unsaved changes are resolved
#[derive(Debug, Clone)]
pub enum PendingAction {
    NewProject,
    OpenProject,
    OpenRecent(PathBuf),
}

/// Main application state
pub struct ProyectaApp {
    /// Project being edited
    pub project: Project,
    /// Where the project was last saved
    pub project_path: Option<PathBuf>,
    /// Application configuration
    pub config: AppConfig,
    /// Image asset resolution
    pub assets: AssetLibrary,
    /// Selected tab of the central area
    pub tab: Tab,
    /// Section shown in the content editor
    pub selected_section: String,
    /// Unsaved changes
    pub dirty: bool,
    /// Reference form state
    pub reference_draft: ReferenceDraft,
    /// Index of the reference being edited, if any
    pub editing_reference: Option<usize>,
    /// Reference list search box
    pub reference_query: String,
    /// Last reference form error
    pub reference_error: Option<String>,
    /// Latest validation report
    pub report: Option<ValidationReport>,
    /// Running document generation, if any
    pub job: Option<GenerationJob>,
    /// Stage label and fraction of the running job
    pub job_progress: (String, f32),
    /// Last generated document, shown in the result window
    pub generated_path: Option<PathBuf>,
    /// Autosave timer and change tracking
    pub autosave: AutosaveState,
    /// Last status message with its timestamp
    pub status: Option<(String, DateTime<Local>)>,
    /// Feedback from the last image pick
    pub image_feedback: Option<ImageFeedback>,
    /// New custom section form state
    pub new_section_title: String,
    pub new_section_chapter: bool,
    pending_action: Option<PendingAction>,
    show_about: bool,
    show_format: bool,
}

impl ProyectaApp {
    /// Create a new application instance
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);

        let config = AppConfig::load().unwrap_or_default();
        Self::apply_theme(&cc.egui_ctx, &config);

        // Reopen the last project when possible
        let mut project = Project::new();
        let mut project_path = None;
        if let Some(ref path) = config.last_project {
            match Project::load(path) {
                Ok(loaded) => {
                    project = loaded;
                    project_path = Some(path.clone());
                }
                Err(e) => tracing::warn!("Could not reopen last project: {:#}", e),
            }
        }

        let autosave = AutosaveState::new(project.content_hash());

        Self {
            project,
            project_path,
            config,
            assets: AssetLibrary::discover(),
            tab: Tab::Info,
            selected_section: "introduccion".to_string(),
            dirty: false,
            reference_draft: ReferenceDraft::default(),
            editing_reference: None,
            reference_query: String::new(),
            reference_error: None,
            report: None,
            job: None,
            job_progress: (String::new(), 0.0),
            generated_path: None,
            autosave,
            status: None,
            image_feedback: None,
            new_section_title: String::new(),
            new_section_chapter: false,
            pending_action: None,
            show_about: false,
            show_format: false,
        }
    }

    fn apply_theme(ctx: &egui::Context, config: &AppConfig) {
        match config.ui.theme.as_str() {
            "light" => ctx.set_visuals(egui::Visuals::light()),
            _ => ctx.set_visuals(egui::Visuals::dark()),
        }
    }

    /// Record a status bar message.
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status = Some((message.into(), Local::now()));
    }

    /// Run validation with the configured level and show the report.
    pub fn run_validation(&mut self) {
        let report = Validator::new(&self.project, self.config.validation_level).run(&self.assets);
        self.set_status(format!("Validación: {:.1}%", report.score));
        self.report = Some(report);
        self.tab = Tab::Validation;
    }

    /// Start a fresh project.
    pub fn new_project(&mut self) {
        self.project = Project::new();
        self.project_path = None;
        self.reset_editing_state();
        self.set_status("Proyecto nuevo");
    }

    /// Load a project from disk.
    pub fn open_project(&mut self, path: PathBuf) {
        match Project::load(&path) {
            Ok(project) => {
                self.project = project;
                self.project_path = Some(path.clone());
                self.reset_editing_state();
                self.remember_project(path);
                self.set_status("Proyecto abierto");
            }
            Err(e) => {
                tracing::error!("Failed to open project: {:#}", e);
                self.set_status(format!("No se pudo abrir el proyecto: {:#}", e));
            }
        }
    }

    fn reset_editing_state(&mut self) {
        self.dirty = false;
        self.report = None;
        self.selected_section = "introduccion".to_string();
        self.reference_draft = ReferenceDraft::default();
        self.editing_reference = None;
        self.reference_error = None;
        self.image_feedback = None;
        self.autosave = AutosaveState::new(self.project.content_hash());
    }

    fn remember_project(&mut self, path: PathBuf) {
        self.config.last_project = Some(path.clone());
        self.config.add_recent_project(path);
        if let Err(e) = self.config.save() {
            tracing::error!("Failed to save config: {:#}", e);
        }
    }

    /// Save to the current path, or ask for one.
    pub fn save_project(&mut self) {
        match self.project_path.clone() {
            Some(path) => self.save_to(path),
            None => self.save_project_as(),
        }
    }

    /// Ask for a path and save.
    pub fn save_project_as(&mut self) {
        let dialog = rfd::FileDialog::new()
            .add_filter("Proyecto", &["json"])
            .set_file_name(self.project.suggested_file_name());
        if let Some(mut path) = dialog.save_file() {
            if path.extension().is_none() {
                path.set_extension("json");
            }
            self.save_to(path);
        }
    }

    fn save_to(&mut self, path: PathBuf) {
        if self.config.backups.enabled {
            let dir = self.config.backup_dir();
            if let Err(e) =
                autosave::write_backup(&self.project, &dir, self.config.backups.max_backups)
            {
                tracing::warn!("Backup before save failed: {:#}", e);
            }
        }

        match self.project.save(&path) {
            Ok(()) => {
                self.dirty = false;
                self.autosave.mark(self.project.content_hash());
                self.project_path = Some(path.clone());
                self.remember_project(path);
                self.set_status("Proyecto guardado");
            }
            Err(e) => {
                tracing::error!("Failed to save project: {:#}", e);
                self.set_status(format!("No se pudo guardar: {:#}", e));
            }
        }
    }

    /// New/open requests go through here so unsaved changes prompt first.
    pub fn request(&mut self, action: PendingAction) {
        if self.dirty {
            self.pending_action = Some(action);
        } else {
            self.perform(action);
        }
    }

    fn perform(&mut self, action: PendingAction) {
        match action {
            PendingAction::NewProject => self.new_project(),
            PendingAction::OpenProject => {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("Proyecto", &["json"])
                    .pick_file()
                {
                    self.open_project(path);
                }
            }
            PendingAction::OpenRecent(path) => self.open_project(path),
        }
    }

    /// Ask for an output path and start generating on a worker thread.
    pub fn start_generation(&mut self) {
        if self.job.is_some() {
            return;
        }
        if self.project.meta.title.trim().is_empty() {
            self.set_status("Agregue un título antes de exportar");
            self.tab = Tab::Info;
            return;
        }

        let dialog = rfd::FileDialog::new()
            .add_filter("Documento de Word", &["docx"])
            .set_file_name(format!("{}.docx", self.project.suggested_stem()));
        let Some(mut path) = dialog.save_file() else {
            return;
        };
        if path.extension().map(|e| e != "docx").unwrap_or(true) {
            path.set_extension("docx");
        }

        self.job_progress = ("Iniciando".to_string(), 0.0);
        self.job = Some(worker::spawn(
            self.project.clone(),
            self.assets.clone(),
            path,
        ));
    }

    fn poll_job(&mut self, ctx: &egui::Context) {
        let events = match &self.job {
            Some(job) => job.poll(),
            None => Vec::new(),
        };
        for event in events {
            match event {
                Progress::Stage { label, fraction } => {
                    self.job_progress = (label.to_string(), fraction);
                }
                Progress::Done { path } => {
                    self.set_status(format!("Documento generado: {}", path.display()));
                    self.generated_path = Some(path);
                    self.job = None;
                }
                Progress::Failed { error } => {
                    self.set_status(format!("Error al generar: {}", error));
                    self.job = None;
                }
            }
        }
        if self.job.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }

    fn autosave_tick(&mut self, ctx: &egui::Context) {
        if self.config.autosave.enabled {
            // The timer must fire even when the app is idle
            ctx.request_repaint_after(Duration::from_secs(1));
        }
        if !self.autosave.due(&self.config.autosave) {
            return;
        }
        let hash = self.project.content_hash();
        if !self.autosave.changed_since(hash) {
            self.autosave.mark(hash);
            return;
        }

        let dir = self.config.autosave_dir();
        match autosave::write_autosave(&self.project, &dir, self.config.backups.max_backups) {
            Ok(path) => {
                self.autosave.mark(hash);
                self.set_status(format!("Autoguardado: {}", path.display()));
            }
            Err(e) => {
                tracing::error!("Autosave failed: {:#}", e);
                self.set_status(format!("Falló el autoguardado: {:#}", e));
                // Retries after the next change and interval
                self.autosave.mark(hash);
            }
        }
    }

    /// Render the top menu bar
    fn show_menu_bar(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
            egui::menu::bar(ui, |ui| {
                ui.menu_button("Proyecto", |ui| {
                    if ui.button("Nuevo").clicked() {
                        self.request(PendingAction::NewProject);
                        ui.close();
                    }
                    if ui.button("Abrir...").clicked() {
                        self.request(PendingAction::OpenProject);
                        ui.close();
                    }
                    ui.menu_button("Recientes", |ui| {
                        if self.config.recent_projects.is_empty() {
                            ui.label(egui::RichText::new("(vacío)").weak());
                        }
                        for path in self.config.recent_projects.clone() {
                            let name = path
                                .file_name()
                                .map(|n| n.to_string_lossy().into_owned())
                                .unwrap_or_else(|| path.display().to_string());
                            if ui.button(name).clicked() {
                                self.request(PendingAction::OpenRecent(path));
                                ui.close();
                            }
                        }
                    });
                    ui.separator();
                    if ui.button("Guardar").clicked() {
                        self.save_project();
                        ui.close();
                    }
                    if ui.button("Guardar como...").clicked() {
                        self.save_project_as();
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Exportar a Word...").clicked() {
                        self.start_generation();
                        ui.close();
                    }
                    if ui.button("Formato del documento...").clicked() {
                        self.show_format = true;
                        ui.close();
                    }
                    ui.separator();
                    if ui.button("Salir").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });

                ui.menu_button("Ver", |ui| {
                    for tab in Tab::ALL {
                        if ui.selectable_label(self.tab == tab, tab.label()).clicked() {
                            self.tab = tab;
                            ui.close();
                        }
                    }
                    ui.separator();
                    let dark = self.config.ui.theme == "dark";
                    if ui.selectable_label(dark, "Tema oscuro").clicked() {
                        self.config.ui.theme = if dark { "light" } else { "dark" }.to_string();
                        Self::apply_theme(ctx, &self.config);
                        if let Err(e) = self.config.save() {
                            tracing::error!("Failed to save config: {:#}", e);
                        }
                        ui.close();
                    }
                });

                ui.menu_button("Ayuda", |ui| {
                    if ui.button("Acerca de...").clicked() {
                        self.show_about = true;
                        ui.close();
                    }
                });
            });
        });
    }

    fn show_confirm_window(&mut self, ctx: &egui::Context) {
        let Some(action) = self.pending_action.clone() else {
            return;
        };
        egui::Window::new("Cambios sin guardar")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("El proyecto tiene cambios sin guardar.");
                ui.horizontal(|ui| {
                    if ui.button("Guardar").clicked() {
                        self.pending_action = None;
                        self.save_project();
                        // The save dialog may have been cancelled
                        if !self.dirty {
                            self.perform(action.clone());
                        }
                    }
                    if ui.button("Descartar").clicked() {
                        self.pending_action = None;
                        self.dirty = false;
                        self.perform(action.clone());
                    }
                    if ui.button("Cancelar").clicked() {
                        self.pending_action = None;
                    }
                });
            });
    }

    fn show_progress_window(&mut self, ctx: &egui::Context) {
        if self.job.is_none() {
            return;
        }
        egui::Window::new("Generando documento")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(&self.job_progress.0);
                ui.add(
                    egui::ProgressBar::new(self.job_progress.1)
                        .desired_width(260.0)
                        .animate(true),
                );
            });
    }

    fn show_result_window(&mut self, ctx: &egui::Context) {
        let Some(path) = self.generated_path.clone() else {
            return;
        };
        egui::Window::new("Documento generado")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label(format!("Se generó el documento:\n{}", path.display()));
                ui.horizontal(|ui| {
                    if ui.button("Abrir").clicked() {
                        if let Err(e) = open::that(&path) {
                            tracing::error!("Failed to open document: {}", e);
                        }
                        self.generated_path = None;
                    }
                    if ui.button("Cerrar").clicked() {
                        self.generated_path = None;
                    }
                });
            });
    }

    fn show_format_window(&mut self, ctx: &egui::Context) {
        if !self.show_format {
            return;
        }
        let mut open_flag = true;
        let mut changed = false;
        egui::Window::new("Formato del documento")
            .collapsible(false)
            .resizable(false)
            .open(&mut open_flag)
            .show(ctx, |ui| {
                let fmt = &mut self.project.format;
                egui::Grid::new("format_grid")
                    .num_columns(2)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        ui.label("Fuente del texto:");
                        egui::ComboBox::from_id_salt("body_font")
                            .selected_text(fmt.body_font.clone())
                            .show_ui(ui, |ui| {
                                for font in FONT_CHOICES {
                                    changed |= ui
                                        .selectable_value(&mut fmt.body_font, font.to_string(), font)
                                        .changed();
                                }
                            });
                        ui.end_row();

                        ui.label("Tamaño del texto:");
                        changed |= ui
                            .add(
                                egui::DragValue::new(&mut fmt.body_size_pt)
                                    .range(9..=16)
                                    .suffix(" pt"),
                            )
                            .changed();
                        ui.end_row();

                        ui.label("Fuente de títulos:");
                        egui::ComboBox::from_id_salt("heading_font")
                            .selected_text(fmt.heading_font.clone())
                            .show_ui(ui, |ui| {
                                for font in FONT_CHOICES {
                                    changed |= ui
                                        .selectable_value(
                                            &mut fmt.heading_font,
                                            font.to_string(),
                                            font,
                                        )
                                        .changed();
                                }
                            });
                        ui.end_row();

                        ui.label("Tamaño de títulos:");
                        changed |= ui
                            .add(
                                egui::DragValue::new(&mut fmt.heading_size_pt)
                                    .range(11..=20)
                                    .suffix(" pt"),
                            )
                            .changed();
                        ui.end_row();

                        ui.label("Interlineado:");
                        egui::ComboBox::from_id_salt("line_spacing")
                            .selected_text(format!("{:.1}", fmt.line_spacing))
                            .show_ui(ui, |ui| {
                                for spacing in [1.0_f32, 1.5, 2.0] {
                                    changed |= ui
                                        .selectable_value(
                                            &mut fmt.line_spacing,
                                            spacing,
                                            format!("{:.1}", spacing),
                                        )
                                        .changed();
                                }
                            });
                        ui.end_row();

                        ui.label("Márgenes:");
                        changed |= ui
                            .add(egui::Slider::new(&mut fmt.margin_cm, 1.5..=4.0).suffix(" cm"))
                            .changed();
                        ui.end_row();
                    });

                changed |= ui.checkbox(&mut fmt.justified, "Texto justificado").changed();
                changed |= ui
                    .checkbox(&mut fmt.first_line_indent, "Sangría en la primera línea")
                    .changed();
                changed |= ui
                    .checkbox(
                        &mut fmt.chapter_page_breaks,
                        "Salto de página entre capítulos",
                    )
                    .changed();
                changed |= ui
                    .checkbox(
                        &mut fmt.include_acknowledgements,
                        "Incluir página de agradecimientos",
                    )
                    .changed();
                changed |= ui.checkbox(&mut fmt.include_index, "Incluir índice").changed();

                if ui.button("Restablecer valores").clicked() {
                    *fmt = FormatConfig::default();
                    changed = true;
                }
            });

        if changed {
            self.dirty = true;
        }
        if !open_flag {
            self.show_format = false;
        }
    }

    fn show_about_window(&mut self, ctx: &egui::Context) {
        if !self.show_about {
            return;
        }
        let mut open_flag = true;
        egui::Window::new("Acerca de")
            .collapsible(false)
            .resizable(false)
            .open(&mut open_flag)
            .show(ctx, |ui| {
                ui.heading("Generador de Proyectos Académicos");
                ui.label(format!("Versión {}", env!("CARGO_PKG_VERSION")));
                ui.add_space(6.0);
                ui.label("Crea documentos de Word con formato académico,");
                ui.label("referencias APA y validación de contenido.");
                ui.add_space(6.0);
                ui.label("Atajos: Ctrl+S guardar, Ctrl+O abrir, Ctrl+N nuevo,");
                ui.label("F5 validar, F9 exportar a Word.");
            });
        if !open_flag {
            self.show_about = false;
        }
    }
}

const FONT_CHOICES: [&str; 4] = ["Times New Roman", "Arial", "Calibri", "Georgia"];

impl eframe::App for ProyectaApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_job(ctx);
        self.autosave_tick(ctx);

        // Collect shortcuts first; file dialogs must not run inside the
        // input closure.
        let mut save_requested = false;
        let mut open_requested = false;
        let mut new_requested = false;
        let mut validate_requested = false;
        let mut export_requested = false;
        ctx.input(|i| {
            if i.modifiers.ctrl && i.key_pressed(egui::Key::S) {
                save_requested = true;
            }
            if i.modifiers.ctrl && i.key_pressed(egui::Key::O) {
                open_requested = true;
            }
            if i.modifiers.ctrl && i.key_pressed(egui::Key::N) {
                new_requested = true;
            }
            if i.key_pressed(egui::Key::F5) {
                validate_requested = true;
            }
            if i.key_pressed(egui::Key::F9) {
                export_requested = true;
            }
        });
        if save_requested {
            self.save_project();
        }
        if open_requested {
            self.request(PendingAction::OpenProject);
        }
        if new_requested {
            self.request(PendingAction::NewProject);
        }
        if validate_requested {
            self.run_validation();
        }
        if export_requested {
            self.start_generation();
        }

        self.show_menu_bar(ctx);
        self.show_confirm_window(ctx);
        self.show_progress_window(ctx);
        self.show_result_window(ctx);
        self.show_format_window(ctx);
        self.show_about_window(ctx);

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            StatusBar::show(ui, self);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.horizontal(|ui| {
                for tab in Tab::ALL {
                    if ui.selectable_label(self.tab == tab, tab.label()).clicked() {
                        self.tab = tab;
                    }
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Generar Word (F9)").clicked() {
                        self.start_generation();
                    }
                });
            });
            ui.separator();

            match self.tab {
                Tab::Info => InfoPanel::show(ui, self),
                Tab::Content => ContentPanel::show(ui, self),
                Tab::References => ReferencesPanel::show(ui, self),
                Tab::Images => ImagesPanel::show(ui, self),
                Tab::Validation => ValidationPanel::show(ui, self),
            }
        });
    }
}
