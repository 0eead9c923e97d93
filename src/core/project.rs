//! Project model and persistence
//!
//! A project bundles the cover metadata, the per-section content, the
//! reference list, the format settings and the custom image overrides.
//! Projects are saved as pretty-printed JSON with a version field.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Local;
use serde::{Deserialize, Serialize};

use super::references::Reference;
use super::sections::{self, SectionDef};

/// Version written into every saved project file.
pub const PROJECT_VERSION: &str = "2.1.0";

/// Cover page metadata
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub title: String,
    pub institution: String,
    pub cycle: String,
    pub course: String,
    pub emphasis: String,
    pub area: String,
    pub category: String,
    pub director: String,
    pub responsible: String,
    /// Comma-separated list of students
    pub students: String,
    /// Comma-separated list of tutors
    pub tutors: String,
}

/// Split a comma-separated list of people into trimmed names.
pub fn split_people(list: &str) -> Vec<&str> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect()
}

impl ProjectMeta {
    pub fn student_list(&self) -> Vec<&str> {
        split_people(&self.students)
    }

    pub fn tutor_list(&self) -> Vec<&str> {
        split_people(&self.tutors)
    }
}

/// Typography and layout settings for the generated document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatConfig {
    pub body_font: String,
    pub body_size_pt: usize,
    pub heading_font: String,
    pub heading_size_pt: usize,
    /// Line spacing multiple (1.0, 1.5, 2.0)
    pub line_spacing: f32,
    pub margin_cm: f32,
    pub justified: bool,
    pub first_line_indent: bool,
    pub chapter_page_breaks: bool,
    pub include_acknowledgements: bool,
    pub include_index: bool,
    /// Render the page header image as a translucent watermark
    pub watermark_header: bool,
    pub watermark_opacity: f32,
    /// Stretch the header image to the full printable width
    pub stretch_header: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            body_font: "Times New Roman".to_string(),
            body_size_pt: 12,
            heading_font: "Times New Roman".to_string(),
            heading_size_pt: 14,
            line_spacing: 2.0,
            margin_cm: 2.54,
            justified: true,
            first_line_indent: true,
            chapter_page_breaks: true,
            include_acknowledgements: true,
            include_index: true,
            watermark_header: false,
            watermark_opacity: 0.3,
            stretch_header: true,
        }
    }
}

/// User-selected images that override the bundled base images
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageOverrides {
    pub header: Option<PathBuf>,
    pub badge: Option<PathBuf>,
}

/// A user-defined section added on top of the built-in catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomSection {
    pub id: String,
    pub title: String,
    /// Chapters render as top-level headings on a fresh page
    pub chapter: bool,
    pub order: u32,
}

/// Either a built-in catalog section or a user-defined one
#[derive(Debug, Clone, Copy)]
pub enum SectionRef<'a> {
    Builtin(&'static SectionDef),
    Custom(&'a CustomSection),
}

impl SectionRef<'_> {
    pub fn id(&self) -> &str {
        match self {
            SectionRef::Builtin(s) => s.id,
            SectionRef::Custom(s) => &s.id,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            SectionRef::Builtin(s) => s.title,
            SectionRef::Custom(s) => &s.title,
        }
    }

    pub fn instruction(&self) -> &str {
        match self {
            SectionRef::Builtin(s) => s.instruction,
            SectionRef::Custom(_) => "",
        }
    }

    pub fn required(&self) -> bool {
        match self {
            SectionRef::Builtin(s) => s.required,
            SectionRef::Custom(_) => false,
        }
    }

    pub fn chapter(&self) -> bool {
        match self {
            SectionRef::Builtin(_) => false,
            SectionRef::Custom(s) => s.chapter,
        }
    }

    pub fn order(&self) -> u32 {
        match self {
            SectionRef::Builtin(s) => s.order,
            SectionRef::Custom(s) => s.order,
        }
    }
}

/// Word and completion counters shown in the status bar
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectStats {
    pub total_words: usize,
    pub total_chars: usize,
    pub sections_completed: usize,
    pub sections_active: usize,
    pub reference_count: usize,
}

/// An academic project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub version: String,
    pub created_at: String,
    pub meta: ProjectMeta,
    /// Section id -> content
    pub sections: BTreeMap<String, String>,
    #[serde(default)]
    pub active_sections: Vec<String>,
    #[serde(default)]
    pub custom_sections: Vec<CustomSection>,
    #[serde(default)]
    pub references: Vec<Reference>,
    #[serde(default)]
    pub format: FormatConfig,
    #[serde(default)]
    pub images: ImageOverrides,
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}

impl Project {
    /// Create a fresh project with every built-in section active.
    pub fn new() -> Self {
        Self {
            version: PROJECT_VERSION.to_string(),
            created_at: Local::now().to_rfc3339(),
            meta: ProjectMeta::default(),
            sections: BTreeMap::new(),
            active_sections: sections::CATALOG.iter().map(|s| s.id.to_string()).collect(),
            custom_sections: Vec::new(),
            references: Vec::new(),
            format: FormatConfig::default(),
            images: ImageOverrides::default(),
        }
    }

    /// Load a project from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read project file: {}", path.display()))?;
        let project: Self = serde_json::from_str(&content)
            .with_context(|| format!("Invalid project file: {}", path.display()))?;

        if project.version != PROJECT_VERSION {
            tracing::warn!(
                "Project version {} differs from current {}",
                project.version,
                PROJECT_VERSION
            );
        }
        Ok(project)
    }

    /// Save the project as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(self).context("Failed to serialize project")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to save project file: {}", path.display()))?;
        tracing::info!("Saved project: {}", path.display());
        Ok(())
    }

    /// Content of a section, empty if never edited.
    pub fn section_content(&self, id: &str) -> &str {
        self.sections.get(id).map(String::as_str).unwrap_or("")
    }

    /// Mutable handle to a section's content, created on first edit.
    pub fn section_content_mut(&mut self, id: &str) -> &mut String {
        self.sections.entry(id.to_string()).or_default()
    }

    pub fn is_active(&self, id: &str) -> bool {
        self.active_sections.iter().any(|s| s == id)
    }

    /// Activate or deactivate a section by id.
    pub fn set_active(&mut self, id: &str, active: bool) {
        if active {
            if !self.is_active(id) {
                self.active_sections.push(id.to_string());
            }
        } else {
            self.active_sections.retain(|s| s != id);
        }
    }

    /// Active sections (built-in and custom) in document order.
    pub fn ordered_sections(&self) -> Vec<SectionRef<'_>> {
        let mut ordered: Vec<SectionRef<'_>> = sections::CATALOG
            .iter()
            .filter(|s| self.is_active(s.id))
            .map(SectionRef::Builtin)
            .chain(
                self.custom_sections
                    .iter()
                    .filter(|s| self.is_active(&s.id))
                    .map(SectionRef::Custom),
            )
            .collect();
        ordered.sort_by_key(|s| s.order());
        ordered
    }

    /// Add a user-defined section after the built-in ones.
    ///
    /// Returns the new section id, or `None` when the title is blank.
    pub fn add_custom_section(&mut self, title: &str, chapter: bool) -> Option<String> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }

        let mut id = slug(title);
        if id.is_empty() {
            id = "seccion".to_string();
        }
        while sections::by_id(&id).is_some() || self.custom_sections.iter().any(|s| s.id == id) {
            id.push('_');
        }

        let order = 100 + self.custom_sections.len() as u32;
        self.custom_sections.push(CustomSection {
            id: id.clone(),
            title: title.to_string(),
            chapter,
            order,
        });
        self.active_sections.push(id.clone());
        Some(id)
    }

    /// Remove a user-defined section together with its content.
    pub fn remove_custom_section(&mut self, id: &str) {
        self.custom_sections.retain(|s| s.id != id);
        self.active_sections.retain(|s| s != id);
        self.sections.remove(id);
    }

    /// Hash of the project content, ignoring the creation timestamp.
    ///
    /// Used to skip autosaves when nothing changed since the last write.
    pub fn content_hash(&self) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut value = match serde_json::to_value(self) {
            Ok(v) => v,
            Err(_) => return 0,
        };
        if let Some(obj) = value.as_object_mut() {
            obj.remove("created_at");
        }

        let mut hasher = DefaultHasher::new();
        value.to_string().hash(&mut hasher);
        hasher.finish()
    }

    /// File name stem derived from the title, or a timestamped fallback.
    pub fn suggested_stem(&self) -> String {
        let stem: String = self
            .meta
            .title
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == ' ' || *c == '-' || *c == '_')
            .take(50)
            .collect();
        let stem = stem.trim().to_string();
        if stem.is_empty() {
            format!("proyecto_academico_{}", Local::now().format("%Y%m%d_%H%M%S"))
        } else {
            stem
        }
    }

    /// Suggested project file name.
    pub fn suggested_file_name(&self) -> String {
        format!("{}.json", self.suggested_stem())
    }

    /// Word, character and completion counters over the active sections.
    pub fn stats(&self) -> ProjectStats {
        let mut stats = ProjectStats {
            reference_count: self.references.len(),
            ..Default::default()
        };
        for section in self.ordered_sections() {
            stats.sections_active += 1;
            let content = self.section_content(section.id());
            if !content.trim().is_empty() {
                stats.sections_completed += 1;
            }
            stats.total_words += content.split_whitespace().count();
            stats.total_chars += content.chars().count();
        }
        stats
    }
}

fn slug(title: &str) -> String {
    title
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .filter(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_project_defaults() {
        let project = Project::new();
        assert_eq!(project.version, PROJECT_VERSION);
        assert_eq!(project.active_sections.len(), 12);
        assert_eq!(project.format.body_font, "Times New Roman");
        assert_eq!(project.format.line_spacing, 2.0);
        assert!(project.references.is_empty());
    }

    #[test]
    fn test_split_people() {
        assert_eq!(
            split_people("Ana Pérez, Luis Gómez , ,Carla Díaz"),
            vec!["Ana Pérez", "Luis Gómez", "Carla Díaz"]
        );
        assert!(split_people("   ").is_empty());
    }

    #[test]
    fn test_suggested_file_name() {
        let mut project = Project::new();
        project.meta.title = "Robótica Educativa: Fase 1/2".to_string();
        assert_eq!(project.suggested_file_name(), "Robótica Educativa Fase 12.json");

        project.meta.title = String::new();
        assert!(project.suggested_file_name().starts_with("proyecto_academico_"));

        project.meta.title = "a".repeat(80);
        assert_eq!(project.suggested_stem().chars().count(), 50);
    }

    #[test]
    fn test_content_hash_ignores_created_at() {
        let mut a = Project::new();
        let mut b = a.clone();
        b.created_at = "2000-01-01T00:00:00+00:00".to_string();
        assert_eq!(a.content_hash(), b.content_hash());

        a.meta.title = "Distinto".to_string();
        assert_ne!(a.content_hash(), b.content_hash());
    }

    #[test]
    fn test_ordered_sections_and_custom() {
        let mut project = Project::new();
        project.set_active("resumen", false);

        let id = project.add_custom_section("Anexos", true).unwrap();
        let ordered = project.ordered_sections();
        assert_eq!(ordered.len(), 12);
        assert!(ordered.iter().all(|s| s.id() != "resumen"));

        let last = ordered.last().unwrap();
        assert_eq!(last.id(), id);
        assert!(last.chapter());
        assert!(!last.required());

        project.remove_custom_section(&id);
        assert_eq!(project.ordered_sections().len(), 11);
    }

    #[test]
    fn test_add_custom_section_rejects_blank() {
        let mut project = Project::new();
        assert!(project.add_custom_section("   ", false).is_none());
    }

    #[test]
    fn test_stats() {
        let mut project = Project::new();
        *project.section_content_mut("introduccion") = "Cuatro palabras de prueba".to_string();
        let stats = project.stats();
        assert_eq!(stats.sections_active, 12);
        assert_eq!(stats.sections_completed, 1);
        assert_eq!(stats.total_words, 4);
        assert_eq!(stats.reference_count, 0);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let mut project = Project::new();
        project.meta.title = "Proyecto de prueba".to_string();
        *project.section_content_mut("introduccion") = "Contenido de la introducción.".to_string();

        let path = std::env::temp_dir().join(format!("proyecta_roundtrip_{}.json", std::process::id()));
        project.save(&path).unwrap();

        let loaded = Project::load(&path).unwrap();
        assert_eq!(loaded, project);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_rejects_foreign_json() {
        let path = std::env::temp_dir().join(format!("proyecta_foreign_{}.json", std::process::id()));
        fs::write(&path, r#"{"nombre": "otro formato"}"#).unwrap();
        assert!(Project::load(&path).is_err());
        let _ = fs::remove_file(&path);
    }
}
