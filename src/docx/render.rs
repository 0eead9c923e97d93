//! Document assembly
//!
//! Builds the exported Word document: page geometry and styles, the page
//! header with the artwork and badge, the cover page with bold labels and
//! normal values, optional front matter (acknowledgements and index), the
//! active sections with rendered citations, and the APA reference list
//! with hanging indents.

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use docx_rs::{
    AlignmentType, BreakType, Docx, Header, LineSpacing, Paragraph, Pic, Run, RunFonts,
    SpecialIndentType,
};

use crate::core::assets::AssetLibrary;
use crate::core::citations;
use crate::core::project::{FormatConfig, Project};
use crate::core::references::Reference;
use crate::core::sections;

use super::styles;
use super::watermark;

/// Printable width when the header artwork is stretched.
const HEADER_STRETCH_IN: f32 = 7.5;
/// Printable width when the header artwork keeps its natural box.
const HEADER_NATURAL_IN: f32 = 6.5;
/// Badge size on the cover page.
const BADGE_COVER_IN: f32 = 1.5;
/// Badge size inside the page header.
const BADGE_HEADER_IN: f32 = 1.0;

/// An image loaded for embedding, with its pixel size for aspect scaling
struct EmbeddedImage {
    bytes: Vec<u8>,
    width: u32,
    height: u32,
}

impl EmbeddedImage {
    fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        let img = image::load_from_memory(&bytes).context("Failed to decode image")?;
        Ok(Self {
            width: img.width(),
            height: img.height(),
            bytes,
        })
    }

    fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image: {}", path.display()))?;
        Self::from_bytes(bytes)
    }

    /// EMU extents for a target width in inches, keeping the aspect ratio.
    fn emu_for_width(&self, inches: f32) -> (u32, u32) {
        let w = styles::inches_to_emu(inches);
        let h = (w as f64 * self.height as f64 / self.width.max(1) as f64).round() as u32;
        (w, h)
    }
}

/// Renders a project into a Word document
pub struct DocxRenderer<'a> {
    project: &'a Project,
    header_image: Option<EmbeddedImage>,
    badge_image: Option<EmbeddedImage>,
}

impl<'a> DocxRenderer<'a> {
    /// Resolve and load the cover images. A missing or unreadable image
    /// downgrades to a warning; the document renders without it.
    pub fn new(project: &'a Project, assets: &AssetLibrary) -> Self {
        let fmt = &project.format;

        let mut header_image = assets
            .header_image(&project.images)
            .and_then(|path| match EmbeddedImage::load(&path) {
                Ok(img) => Some(img),
                Err(e) => {
                    tracing::warn!("Skipping header image: {:#}", e);
                    None
                }
            });

        if fmt.watermark_header {
            if let Some(img) = header_image.take() {
                let width_in = if fmt.stretch_header {
                    HEADER_STRETCH_IN
                } else {
                    HEADER_NATURAL_IN
                };
                let target = Some(watermark::print_width_px(width_in));
                header_image =
                    match watermark::apply_opacity(&img.bytes, fmt.watermark_opacity, target)
                        .map_err(anyhow::Error::from)
                        .and_then(EmbeddedImage::from_bytes)
                    {
                        Ok(processed) => Some(processed),
                        Err(e) => {
                            tracing::warn!("Watermark processing failed: {:#}", e);
                            Some(img)
                        }
                    };
            }
        }

        let badge_image = assets
            .badge_image(&project.images)
            .and_then(|path| match EmbeddedImage::load(&path) {
                Ok(img) => Some(img),
                Err(e) => {
                    tracing::warn!("Skipping badge image: {:#}", e);
                    None
                }
            });

        Self {
            project,
            header_image,
            badge_image,
        }
    }

    /// Build the document and write the `.docx` package to disk.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        Self::pack(self.build_docx(), path)
    }

    /// Write an assembled document to disk as a `.docx` package.
    pub fn pack(docx: Docx, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        docx.build()
            .pack(file)
            .context("Failed to write document package")?;
        tracing::info!("Generated document: {}", path.display());
        Ok(())
    }

    /// Assemble the full document in memory.
    pub fn build_docx(&self) -> Docx {
        let fmt = &self.project.format;
        let mut paragraphs = Vec::new();

        self.cover(&mut paragraphs);
        if fmt.include_acknowledgements {
            self.acknowledgements(&mut paragraphs);
        }
        if fmt.include_index {
            self.index_page(&mut paragraphs);
        }
        self.body(&mut paragraphs);
        self.references_section(&mut paragraphs);

        let mut docx = Docx::new()
            .page_margin(styles::page_margin(fmt))
            .add_style(styles::normal_style(fmt))
            .header(self.page_header());
        for style in styles::heading_styles(fmt) {
            docx = docx.add_style(style);
        }
        for paragraph in paragraphs {
            docx = docx.add_paragraph(paragraph);
        }
        docx
    }

    fn text_run(&self, text: &str, size_pt: usize) -> Run {
        Run::new()
            .add_text(text)
            .size(styles::pt_to_half(size_pt))
            .color("000000")
            .fonts(RunFonts::new().ascii(self.project.format.body_font.as_str()))
    }

    fn bold_run(&self, text: &str, size_pt: usize) -> Run {
        self.text_run(text, size_pt).bold()
    }

    fn centered(&self, run: Run) -> Paragraph {
        Paragraph::new().align(AlignmentType::Center).add_run(run)
    }

    fn heading(&self, level: usize, text: &str) -> Paragraph {
        Paragraph::new()
            .style(&format!("Heading{}", level))
            .align(AlignmentType::Center)
            .line_spacing(LineSpacing::new().before(240).after(240))
            .add_run(Run::new().add_text(text))
    }

    fn page_break() -> Paragraph {
        Paragraph::new().add_run(Run::new().add_break(BreakType::Page))
    }

    fn blank_lines(paragraphs: &mut Vec<Paragraph>, count: usize) {
        for _ in 0..count {
            paragraphs.push(Paragraph::new());
        }
    }

    /// Cover page: badge, institution, quoted title, info rows with bold
    /// labels and normal values, people lists and the year.
    fn cover(&self, paragraphs: &mut Vec<Paragraph>) {
        let meta = &self.project.meta;
        let body_pt = self.project.format.body_size_pt;

        if let Some(badge) = &self.badge_image {
            let (w, h) = badge.emu_for_width(BADGE_COVER_IN);
            paragraphs.push(self.centered(
                Run::new().add_image(Pic::new(badge.bytes.as_slice()).size(w, h)),
            ));
        }
        Self::blank_lines(paragraphs, 3);

        if !meta.institution.trim().is_empty() {
            paragraphs.push(self.centered(self.bold_run(&meta.institution.to_uppercase(), 16)));
        }
        Self::blank_lines(paragraphs, 1);

        if !meta.title.trim().is_empty() {
            paragraphs.push(self.centered(self.bold_run(&format!("\"{}\"", meta.title.trim()), 18)));
        }
        Self::blank_lines(paragraphs, 3);

        let info_rows = [
            ("Ciclo", &meta.cycle),
            ("Curso", &meta.course),
            ("Énfasis", &meta.emphasis),
            ("Área de Desarrollo", &meta.area),
            ("Categoría", &meta.category),
            ("Director", &meta.director),
            ("Responsable", &meta.responsible),
        ];
        for (label, value) in info_rows {
            if value.trim().is_empty() {
                continue;
            }
            paragraphs.push(
                Paragraph::new()
                    .align(AlignmentType::Center)
                    .add_run(self.bold_run(&format!("{}: ", label), body_pt))
                    .add_run(self.text_run(value.trim(), body_pt)),
            );
        }
        Self::blank_lines(paragraphs, 2);

        self.people_block(paragraphs, "Estudiantes:", &meta.student_list());
        Self::blank_lines(paragraphs, 1);
        self.people_block(paragraphs, "Tutores:", &meta.tutor_list());
        Self::blank_lines(paragraphs, 3);

        paragraphs.push(
            Paragraph::new()
                .align(AlignmentType::Center)
                .add_run(self.bold_run("Año: ", body_pt))
                .add_run(self.text_run(&Local::now().year().to_string(), body_pt)),
        );
        paragraphs.push(Self::page_break());
    }

    fn people_block(&self, paragraphs: &mut Vec<Paragraph>, label: &str, people: &[&str]) {
        if people.is_empty() {
            return;
        }
        paragraphs.push(self.centered(self.bold_run(label, 13)));
        for person in people {
            paragraphs.push(self.centered(self.text_run(person, self.project.format.body_size_pt)));
        }
    }

    fn acknowledgements(&self, paragraphs: &mut Vec<Paragraph>) {
        paragraphs.push(self.heading(1, "AGRADECIMIENTOS"));
        Self::blank_lines(paragraphs, 1);
        paragraphs.push(
            Paragraph::new().add_run(
                self.text_run(
                    "(Agregar agradecimientos personalizados aquí)",
                    self.project.format.body_size_pt,
                ),
            ),
        );
        paragraphs.push(Self::page_break());
    }

    fn index_page(&self, paragraphs: &mut Vec<Paragraph>) {
        let body_pt = self.project.format.body_size_pt;
        paragraphs.push(self.heading(1, "ÍNDICE"));
        Self::blank_lines(paragraphs, 1);
        paragraphs.push(
            Paragraph::new()
                .add_run(self.text_run("El índice se genera automáticamente en Word.", body_pt)),
        );
        paragraphs.push(Paragraph::new().add_run(self.text_run(
            "Para actualizarlo: Referencias > Tabla de contenido > Tabla automática.",
            body_pt,
        )));
        Self::blank_lines(paragraphs, 1);
        paragraphs.push(self.heading(2, "TABLA DE ILUSTRACIONES"));
        paragraphs.push(Paragraph::new().add_run(self.text_run(
            "(Se completará al insertar ilustraciones con título en Word)",
            body_pt,
        )));
        paragraphs.push(Self::page_break());
    }

    /// Active sections in catalog order. Chapters open on a fresh page as
    /// top-level headings; content sections render as level-2 headings.
    /// Content sections without text are skipped.
    fn body(&self, paragraphs: &mut Vec<Paragraph>) {
        let fmt = &self.project.format;
        let mut first_block = true;

        for section in self.project.ordered_sections() {
            let content = self.project.section_content(section.id()).trim().to_string();
            // Chapters act as dividers, so their heading renders even
            // when no content was written under them.
            if content.is_empty() && !section.chapter() {
                continue;
            }

            let title = sections::heading_title(section.title());
            if section.chapter() {
                if !first_block && fmt.chapter_page_breaks {
                    paragraphs.push(Self::page_break());
                }
                paragraphs.push(self.heading(1, &title));
            } else {
                paragraphs.push(self.heading(2, &title));
            }

            let rendered = citations::render(&content);
            for block in rendered.split("\n\n") {
                let block = block.trim_end();
                if block.trim().is_empty() {
                    continue;
                }
                paragraphs.push(self.body_paragraph(block, fmt));
            }
            first_block = false;
        }
    }

    fn body_paragraph(&self, text: &str, fmt: &FormatConfig) -> Paragraph {
        let mut paragraph = Paragraph::new()
            .align(styles::body_alignment(fmt))
            .line_spacing(styles::body_spacing(fmt));
        if fmt.first_line_indent {
            paragraph = paragraph.indent(
                None,
                Some(SpecialIndentType::FirstLine(styles::INDENT_TWIPS)),
                None,
                None,
            );
        }
        paragraph.add_run(self.text_run(&text.replace('\n', " "), fmt.body_size_pt))
    }

    /// APA reference list sorted by author surname, with hanging indents.
    fn references_section(&self, paragraphs: &mut Vec<Paragraph>) {
        if self.project.references.is_empty() {
            return;
        }
        let fmt = &self.project.format;

        let mut refs: Vec<&Reference> = self.project.references.iter().collect();
        refs.sort_by_key(|r| r.surname().to_lowercase());

        paragraphs.push(self.heading(1, "REFERENCIAS"));
        Self::blank_lines(paragraphs, 1);
        for reference in refs {
            paragraphs.push(
                Paragraph::new()
                    .line_spacing(styles::body_spacing(fmt))
                    .indent(
                        Some(styles::INDENT_TWIPS),
                        Some(SpecialIndentType::Hanging(styles::INDENT_TWIPS)),
                        None,
                        None,
                    )
                    .add_run(self.text_run(&reference.apa_text(), fmt.body_size_pt)),
            );
        }
    }

    /// Page header: artwork centered, badge right-aligned, or a plain
    /// text line when no image resolves.
    fn page_header(&self) -> Header {
        let fmt = &self.project.format;
        let mut header = Header::new();

        if let Some(img) = &self.header_image {
            let width_in = if fmt.stretch_header {
                HEADER_STRETCH_IN
            } else {
                HEADER_NATURAL_IN
            };
            let (w, h) = img.emu_for_width(width_in);
            header = header.add_paragraph(self.centered(
                Run::new().add_image(Pic::new(img.bytes.as_slice()).size(w, h)),
            ));
        }

        if let Some(badge) = &self.badge_image {
            let (w, h) = badge.emu_for_width(BADGE_HEADER_IN);
            header = header.add_paragraph(
                Paragraph::new()
                    .align(AlignmentType::Right)
                    .add_run(Run::new().add_image(Pic::new(badge.bytes.as_slice()).size(w, h))),
            );
        }

        if self.header_image.is_none() && self.badge_image.is_none() {
            let text = if self.project.meta.institution.trim().is_empty() {
                "Proyecto Académico"
            } else {
                self.project.meta.institution.trim()
            };
            header = header.add_paragraph(self.centered(self.text_run(text, 10)));
        }

        header
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::references::ReferenceKind;

    fn no_assets() -> AssetLibrary {
        AssetLibrary::with_root(std::env::temp_dir().join("proyecta_render_no_assets"))
    }

    fn sample_project() -> Project {
        let mut project = Project::new();
        project.meta.title = "Robótica Educativa".to_string();
        project.meta.institution = "Colegio Técnico".to_string();
        project.meta.cycle = "Tercer ciclo".to_string();
        project.meta.students = "Ana Pérez, Luis Gómez".to_string();
        project.meta.tutors = "María Rodríguez".to_string();

        *project.section_content_mut("introduccion") =
            "Primer párrafo de la introducción.\n\nSegundo párrafo.".to_string();
        *project.section_content_mut("marco_teorico") =
            "La literatura lo respalda[CITA:parafraseo:García:2020].".to_string();

        project.references.push(Reference {
            kind: ReferenceKind::Book,
            author: "García, J.".to_string(),
            year: 2020,
            title: "Metodología".to_string(),
            source: "Paidós".to_string(),
        });
        project.references.push(Reference {
            kind: ReferenceKind::Web,
            author: "Arias, F.".to_string(),
            year: 2022,
            title: "Guía".to_string(),
            source: "https://x.org".to_string(),
        });
        project
    }

    fn render_xml(project: &Project) -> String {
        let renderer = DocxRenderer::new(project, &no_assets());
        let xml = renderer.build_docx().build();
        String::from_utf8_lossy(&xml.document).into_owned()
    }

    #[test]
    fn test_cover_fields_present() {
        let doc = render_xml(&sample_project());
        assert!(doc.contains("COLEGIO TÉCNICO"));
        assert!(doc.contains("Robótica Educativa"));
        assert!(doc.contains("Ciclo: "));
        assert!(doc.contains("Tercer ciclo"));
        assert!(doc.contains("Estudiantes:"));
        assert!(doc.contains("Ana Pérez"));
        assert!(doc.contains("Tutores:"));
        assert!(doc.contains("Año: "));
    }

    #[test]
    fn test_empty_info_rows_skipped() {
        let doc = render_xml(&sample_project());
        assert!(!doc.contains("Curso: "));
        assert!(!doc.contains("Director: "));
    }

    #[test]
    fn test_sections_and_citations() {
        let doc = render_xml(&sample_project());
        assert!(doc.contains("INTRODUCCIÓN"));
        assert!(doc.contains("MARCO TEÓRICO"));
        assert!(doc.contains("(García, 2020)"));
        assert!(!doc.contains("[CITA:"));
        // empty sections leave no heading behind
        assert!(!doc.contains("RESULTADOS"));
    }

    #[test]
    fn test_references_sorted_with_hanging_indent() {
        let doc = render_xml(&sample_project());
        assert!(doc.contains("REFERENCIAS"));
        let arias = doc.find("Arias, F. (2022)").unwrap();
        let garcia = doc.find("García, J. (2020)").unwrap();
        assert!(arias < garcia);
        assert!(doc.contains("hanging"));
    }

    #[test]
    fn test_front_matter_can_be_disabled() {
        let mut project = sample_project();
        project.format.include_acknowledgements = false;
        project.format.include_index = false;
        let doc = render_xml(&project);
        assert!(!doc.contains("AGRADECIMIENTOS"));
        assert!(!doc.contains("ÍNDICE"));

        let with_front = render_xml(&sample_project());
        assert!(with_front.contains("AGRADECIMIENTOS"));
        assert!(with_front.contains("TABLA DE ILUSTRACIONES"));
    }

    #[test]
    fn test_custom_chapter_renders_as_heading() {
        let mut project = sample_project();
        let id = project.add_custom_section("Anexos Finales", true).unwrap();
        *project.section_content_mut(&id) = "Contenido del anexo.".to_string();
        // A second chapter left empty still shows up as a divider title.
        project.add_custom_section("Apéndices", true).unwrap();
        let doc = render_xml(&project);
        assert!(doc.contains("ANEXOS FINALES"));
        assert!(doc.contains("APÉNDICES"));
    }

    #[test]
    fn test_write_to_creates_package() {
        let project = sample_project();
        let path = std::env::temp_dir().join(format!("proyecta_render_{}.docx", std::process::id()));
        let renderer = DocxRenderer::new(&project, &no_assets());
        renderer.write_to(&path).unwrap();

        let size = std::fs::metadata(&path).unwrap().len();
        assert!(size > 0);
        let _ = std::fs::remove_file(&path);
    }
}
