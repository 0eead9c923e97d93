//! Weighted project validation
//!
//! Scores the project across five categories (general information,
//! section content, references, citations, coherence), gathers errors,
//! warnings and suggestions, and decides pass/fail against the chosen
//! strictness level. Image presence is reported as warnings so an export
//! without cover artwork never goes unnoticed.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::assets::AssetLibrary;
use super::citations;
use super::project::{split_people, Project};
use super::references;
use super::sections;

/// Infinitive verbs expected in the objectives section.
const INFINITIVE_VERBS: &[&str] = &[
    "analizar", "identificar", "determinar", "evaluar", "comparar", "describir",
    "explicar", "demostrar", "proponer", "desarrollar", "establecer", "verificar",
    "investigar", "examinar", "estudiar", "conocer", "comprender",
];

/// Methodological terms expected in the methodology section.
const METHOD_TERMS: &[&str] = &["método", "técnica", "instrumento", "población", "muestra", "análisis"];

/// Spanish stopwords excluded from the coherence analysis.
const STOPWORDS: &[&str] = &[
    "ante", "antes", "algo", "algunas", "algunos", "aquel", "aquella", "como",
    "contra", "cual", "cuales", "cuando", "cada", "desde", "donde", "durante",
    "ella", "ellas", "ellos", "entre", "esta", "estas", "este", "estos", "esto",
    "hacia", "hasta", "misma", "mismo", "mucho", "muchos", "nada", "nosotros",
    "otra", "otras", "otro", "otros", "para", "pero", "poco", "porque", "según",
    "sido", "siendo", "sin", "sobre", "solo", "sólo", "también", "tanto", "tiene",
    "tienen", "toda", "todas", "todo", "todos", "una", "unas", "unos", "usted",
    "ser", "son", "está", "están", "fueron", "hace", "hacen", "puede", "pueden",
];

/// Strictness level for the validation pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    Basico,
    #[default]
    Estandar,
    Estricto,
}

impl ValidationLevel {
    pub const ALL: [ValidationLevel; 3] = [
        ValidationLevel::Basico,
        ValidationLevel::Estandar,
        ValidationLevel::Estricto,
    ];

    /// Minimum score (percent) required to pass.
    pub fn threshold(self) -> f32 {
        match self {
            ValidationLevel::Basico => 60.0,
            ValidationLevel::Estandar => 80.0,
            ValidationLevel::Estricto => 95.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ValidationLevel::Basico => "Básico",
            ValidationLevel::Estandar => "Estándar",
            ValidationLevel::Estricto => "Estricto",
        }
    }
}

/// Points earned in one validation category
#[derive(Debug, Clone)]
pub struct CategoryScore {
    pub name: &'static str,
    pub points: f32,
    pub max: f32,
}

impl CategoryScore {
    pub fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            self.points / self.max
        } else {
            1.0
        }
    }
}

/// Outcome of a validation pass
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    pub level: ValidationLevel,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
    pub categories: Vec<CategoryScore>,
    /// Overall score in percent
    pub score: f32,
    pub passed: bool,
    pub recommendations: Vec<String>,
}

/// Runs the weighted checks over a project
pub struct Validator<'a> {
    project: &'a Project,
    level: ValidationLevel,
}

impl<'a> Validator<'a> {
    pub fn new(project: &'a Project, level: ValidationLevel) -> Self {
        Self { project, level }
    }

    /// Run every check and assemble the report.
    pub fn run(&self, assets: &AssetLibrary) -> ValidationReport {
        let mut report = ValidationReport {
            level: self.level,
            ..Default::default()
        };

        let general = self.check_general(&mut report);
        let content = self.check_sections(&mut report);
        let refs = self.check_references(&mut report);
        let cites = self.check_citations(&mut report);
        let coherence = self.check_coherence(&mut report);
        self.check_images(assets, &mut report);

        report.categories = vec![general, content, refs, cites, coherence];

        let max: f32 = report.categories.iter().map(|c| c.max).sum();
        let points: f32 = report.categories.iter().map(|c| c.points).sum();
        report.score = if max > 0.0 { points / max * 100.0 } else { 0.0 };
        report.passed = report.errors.is_empty() && report.score >= self.level.threshold();

        self.recommend(&mut report);
        report
    }

    /// Title, students, tutors and institution (31 points).
    fn check_general(&self, report: &mut ValidationReport) -> CategoryScore {
        let meta = &self.project.meta;
        let mut points = 0.0;

        let title = meta.title.trim();
        let title_words = title.split_whitespace().count();
        if title.is_empty() {
            report.errors.push("El título es obligatorio".to_string());
        } else if title_words < 3 {
            report
                .errors
                .push("El título es demasiado corto (mínimo 3 palabras)".to_string());
        } else {
            if title_words > 20 {
                report
                    .warnings
                    .push("El título es muy largo (máximo recomendado: 20 palabras)".to_string());
            }
            points += 10.0;
        }

        points += self.check_people(report, &meta.students, "estudiante", "estudiantes");
        points += self.check_people(report, &meta.tutors, "tutor", "tutores");

        if meta.institution.trim().is_empty() {
            report
                .warnings
                .push("No se indicó la institución".to_string());
        } else {
            points += 5.0;
        }

        CategoryScore {
            name: "Información general",
            points,
            max: 31.0,
        }
    }

    fn check_people(
        &self,
        report: &mut ValidationReport,
        list: &str,
        singular: &str,
        plural: &str,
    ) -> f32 {
        if list.trim().is_empty() {
            report
                .errors
                .push(format!("Debe indicar al menos un {}", singular));
            return 0.0;
        }
        if list.trim().chars().count() < 5 {
            report
                .errors
                .push(format!("El campo de {} es demasiado corto", plural));
            return 0.0;
        }
        for person in split_people(list) {
            if person.split_whitespace().count() < 2 {
                report.warnings.push(format!(
                    "Nombre de {} posiblemente incompleto: \"{}\"",
                    singular, person
                ));
            }
        }
        8.0
    }

    /// Active section content (15 points per section).
    fn check_sections(&self, report: &mut ValidationReport) -> CategoryScore {
        let mut points = 0.0;
        let mut max = 0.0;

        for section in self.project.ordered_sections() {
            max += 15.0;
            let title = sections::clean_title(section.title());
            let content = self.project.section_content(section.id());
            let content = content.trim();
            let chars = content.chars().count();
            let words = content.split_whitespace().count();

            if section.required() {
                if content.is_empty() {
                    report.errors.push(format!(
                        "La sección \"{}\" es obligatoria y está vacía",
                        title
                    ));
                } else if chars < 100 || words < 20 {
                    report.errors.push(format!(
                        "La sección \"{}\" necesita más desarrollo (mínimo 100 caracteres y 20 palabras)",
                        title
                    ));
                    points += 7.5;
                } else {
                    points += 15.0;
                }
            } else if content.is_empty() {
                report.warnings.push(format!(
                    "La sección opcional \"{}\" está activa pero vacía",
                    title
                ));
            } else if words < 10 {
                report.warnings.push(format!(
                    "La sección \"{}\" tiene muy poco contenido",
                    title
                ));
                points += 7.5;
            } else {
                points += 15.0;
            }

            if !content.is_empty() {
                self.check_section_specifics(report, section.id(), content);
            }
        }

        CategoryScore {
            name: "Contenido de secciones",
            points,
            max,
        }
    }

    fn check_section_specifics(&self, report: &mut ValidationReport, id: &str, content: &str) {
        let lower = content.to_lowercase();
        match id {
            "objetivos" => {
                if !INFINITIVE_VERBS.iter().any(|v| lower.contains(v)) {
                    report.warnings.push(
                        "Los objetivos deben redactarse con verbos en infinitivo (analizar, identificar, proponer...)"
                            .to_string(),
                    );
                    report.suggestions.push(
                        "Comience cada objetivo con un verbo en infinitivo".to_string(),
                    );
                }
            }
            "marco_teorico" => {
                let count = citations::find_markers(content).len();
                if count == 0 {
                    report.warnings.push(
                        "El marco teórico no incluye citas con el formato [CITA:tipo:autor:año]"
                            .to_string(),
                    );
                } else if count < 2 {
                    report
                        .suggestions
                        .push("Se recomiendan al menos 2 citas en el marco teórico".to_string());
                }
            }
            "metodologia" => {
                let mentioned = METHOD_TERMS.iter().filter(|t| lower.contains(*t)).count();
                if mentioned < 2 {
                    report.warnings.push(
                        "La metodología debería mencionar al menos dos elementos metodológicos \
                         (método, técnica, instrumento, población, muestra, análisis)"
                            .to_string(),
                    );
                }
            }
            _ => {}
        }
    }

    /// Reference list completeness (20 points, proportional).
    fn check_references(&self, report: &mut ValidationReport) -> CategoryScore {
        let refs = &self.project.references;
        let mut points = 0.0;

        if refs.is_empty() {
            report
                .errors
                .push("Debe agregar referencias bibliográficas".to_string());
        } else {
            let mut valid = 0usize;
            for (i, reference) in refs.iter().enumerate() {
                match references::validate(reference) {
                    Ok(()) => valid += 1,
                    Err(e) => report.errors.push(format!("Referencia {}: {}", i + 1, e)),
                }
            }

            let count_factor = (refs.len() as f32 / 3.0).min(1.0);
            points = 20.0 * (valid as f32 / refs.len() as f32) * count_factor;

            if refs.len() < 3 {
                report.warnings.push(format!(
                    "Se recomiendan al menos 3 referencias (hay {})",
                    refs.len()
                ));
            }
            if references::statistics(refs).recent_count == 0 {
                report
                    .suggestions
                    .push("Incluya referencias de los últimos 5 años".to_string());
            }
        }

        CategoryScore {
            name: "Referencias",
            points,
            max: 20.0,
        }
    }

    /// Citation markers and their match against the reference list
    /// (15 points, proportional).
    fn check_citations(&self, report: &mut ValidationReport) -> CategoryScore {
        let mut markers = Vec::new();
        for section in self.project.ordered_sections() {
            markers.extend(citations::find_markers(
                self.project.section_content(section.id()),
            ));
        }

        let expected = sections::CITATION_SECTIONS
            .iter()
            .any(|id| self.project.is_active(id));

        let points = if markers.is_empty() {
            if expected {
                report
                    .warnings
                    .push("No se encontraron citas en el texto".to_string());
                0.0
            } else {
                15.0
            }
        } else {
            let valid = markers.iter().filter(|m| m.is_valid()).count();
            for marker in markers.iter().filter(|m| !m.is_valid()) {
                report.warnings.push(format!(
                    "Cita no válida: [CITA:{}:{}:{}]",
                    marker.kind, marker.author, marker.year
                ));
            }
            self.check_orphans(report, &markers);
            15.0 * valid as f32 / markers.len() as f32
        };

        CategoryScore {
            name: "Citas",
            points,
            max: 15.0,
        }
    }

    fn check_orphans(&self, report: &mut ValidationReport, markers: &[citations::CitationMarker]) {
        let surnames: Vec<String> = self
            .project
            .references
            .iter()
            .map(|r| r.surname().to_lowercase())
            .collect();

        let mut cited: Vec<String> = Vec::new();
        for marker in markers {
            let author = marker.author.to_lowercase();
            if !cited.contains(&author) {
                cited.push(author);
            }
        }

        for author in &cited {
            let matched = surnames
                .iter()
                .any(|s| s.contains(author.as_str()) || author.contains(s.as_str()));
            if !matched {
                report.warnings.push(format!(
                    "La cita de \"{}\" no tiene referencia correspondiente",
                    author
                ));
            }
        }

        for (surname, reference) in surnames.iter().zip(&self.project.references) {
            let used = cited
                .iter()
                .any(|c| c.contains(surname.as_str()) || surname.contains(c.as_str()));
            if !used {
                report.suggestions.push(format!(
                    "La referencia de \"{}\" no se cita en el texto",
                    reference.surname()
                ));
            }
        }
    }

    /// Word repetition and vocabulary variety (10 points).
    fn check_coherence(&self, report: &mut ValidationReport) -> CategoryScore {
        let mut words: Vec<String> = Vec::new();
        for section in self.project.ordered_sections() {
            let content = self.project.section_content(section.id());
            for token in content.split_whitespace() {
                let token: String = token
                    .trim_matches(|c: char| !c.is_alphanumeric())
                    .to_lowercase();
                if token.chars().count() > 3 && !STOPWORDS.contains(&token.as_str()) {
                    words.push(token);
                }
            }
        }

        let total = words.len();
        if total < 50 {
            report
                .suggestions
                .push("Contenido aún insuficiente para el análisis de coherencia".to_string());
            return CategoryScore {
                name: "Coherencia",
                points: 10.0,
                max: 10.0,
            };
        }

        let mut freq: BTreeMap<&str, usize> = BTreeMap::new();
        for word in &words {
            *freq.entry(word.as_str()).or_insert(0) += 1;
        }

        let repetition_floor = (total * 2 / 100).max(3);
        let repeated: Vec<(&str, usize)> = freq
            .iter()
            .filter(|(_, count)| **count > repetition_floor)
            .map(|(word, count)| (*word, *count))
            .collect();

        let mut penalty = (repeated.len() as f32 * 2.0).min(5.0);
        for (word, count) in repeated.iter().take(3) {
            report.warnings.push(format!(
                "La palabra \"{}\" se repite mucho ({} veces)",
                word, count
            ));
        }

        let variety = freq.len() as f32 / total as f32;
        if variety < 0.2 {
            report
                .warnings
                .push("Vocabulario poco variado; reformule las ideas repetidas".to_string());
            penalty += 2.0;
        }

        CategoryScore {
            name: "Coherencia",
            points: (10.0 - penalty).max(0.0),
            max: 10.0,
        }
    }

    /// Cover artwork availability, reported as warnings.
    fn check_images(&self, assets: &AssetLibrary, report: &mut ValidationReport) {
        if assets.header_image(&self.project.images).is_none() {
            report.warnings.push(format!(
                "No se encontró imagen de encabezado ({})",
                assets.resources_dir().join(super::assets::HEADER_FILE).display()
            ));
        }
        if assets.badge_image(&self.project.images).is_none() {
            report.warnings.push(format!(
                "No se encontró la insignia para la portada ({})",
                assets.resources_dir().join(super::assets::BADGE_FILE).display()
            ));
        }
    }

    fn recommend(&self, report: &mut ValidationReport) {
        for category in &report.categories {
            if category.ratio() < 0.6 {
                report.recommendations.push(format!(
                    "Refuerce la categoría \"{}\" ({:.0}%)",
                    category.name,
                    category.ratio() * 100.0
                ));
            }
        }

        let closing = if report.score < 50.0 {
            "El proyecto necesita un desarrollo sustancial antes de exportarse."
        } else if report.score < 70.0 {
            "El proyecto va tomando forma; atienda los errores señalados."
        } else if report.score < 90.0 {
            "Buen avance; pulir las advertencias mejorará el resultado."
        } else {
            "El proyecto está listo para generar el documento."
        };
        report.recommendations.push(closing.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::references::{Reference, ReferenceKind};

    fn assets() -> AssetLibrary {
        AssetLibrary::with_root(std::env::temp_dir().join("proyecta_validate_no_assets"))
    }

    fn reference(author: &str, year: i32) -> Reference {
        Reference {
            kind: ReferenceKind::Book,
            author: author.to_string(),
            year,
            title: "Título de prueba".to_string(),
            source: "Editorial".to_string(),
        }
    }

    /// A long filler paragraph that satisfies the length checks.
    fn filler(topic: &str) -> String {
        format!(
            "Este apartado describe con detalle {} dentro del proyecto. \
             Se presentan argumentos, ejemplos y explicaciones que superan \
             con claridad los mínimos exigidos de extensión para una sección \
             obligatoria del documento académico.",
            topic
        )
    }

    fn complete_project() -> Project {
        let mut project = Project::new();
        project.meta.title = "Robótica educativa en secundaria".to_string();
        project.meta.institution = "Colegio Técnico Nacional".to_string();
        project.meta.students = "Ana Pérez, Luis Gómez".to_string();
        project.meta.tutors = "María Rodríguez".to_string();

        for id in ["introduccion", "planteamiento", "preguntas", "justificacion", "conclusiones"] {
            *project.section_content_mut(id) = filler("el tema correspondiente");
        }
        *project.section_content_mut("objetivos") =
            format!("{} Se busca analizar y proponer mejoras concretas.", filler("los objetivos"));
        *project.section_content_mut("marco_teorico") = format!(
            "{} Como señala la literatura[CITA:parafraseo:García:2020] y \
             también[CITA:textual:López:2021:14].",
            filler("el marco teórico")
        );
        *project.section_content_mut("metodologia") = format!(
            "{} El método combina una técnica de observación con una muestra reducida.",
            filler("la metodología")
        );

        for id in ["resumen", "desarrollo", "resultados", "discusion"] {
            project.set_active(id, false);
        }

        project.references.push(reference("García, J.", 2020));
        project.references.push(reference("López, M.", 2021));
        project.references.push(reference("Arias, F.", 2023));
        project
    }

    #[test]
    fn test_empty_project_fails() {
        let project = Project::new();
        let report = Validator::new(&project, ValidationLevel::Basico).run(&assets());

        assert!(!report.passed);
        assert!(report.errors.iter().any(|e| e.contains("título")));
        assert!(report.errors.iter().any(|e| e.contains("estudiante")));
        assert!(report.errors.iter().any(|e| e.contains("referencias")));
        assert!(report.score < 50.0);
    }

    #[test]
    fn test_complete_project_passes_basico() {
        let project = complete_project();
        let report = Validator::new(&project, ValidationLevel::Basico).run(&assets());

        assert!(report.errors.is_empty(), "errores inesperados: {:?}", report.errors);
        assert!(report.passed, "score {} con {:?}", report.score, report.warnings);
        assert_eq!(report.categories.len(), 5);
    }

    #[test]
    fn test_missing_infinitive_verbs_warns() {
        let mut project = complete_project();
        *project.section_content_mut("objetivos") = filler("metas sin redacción correcta");
        let report = Validator::new(&project, ValidationLevel::Basico).run(&assets());
        assert!(report.warnings.iter().any(|w| w.contains("infinitivo")));
    }

    #[test]
    fn test_reference_scoring_is_proportional() {
        let mut project = complete_project();
        project.references.push(reference("sin formato", 2020));
        let report = Validator::new(&project, ValidationLevel::Estricto).run(&assets());

        let refs = report
            .categories
            .iter()
            .find(|c| c.name == "Referencias")
            .unwrap();
        assert!((refs.points - 15.0).abs() < 0.01, "points = {}", refs.points);
        assert!(report.errors.iter().any(|e| e.starts_with("Referencia 4:")));
    }

    #[test]
    fn test_orphan_citation_warns() {
        let mut project = complete_project();
        *project.section_content_mut("marco_teorico") = format!(
            "{} Apoyado en[CITA:parafraseo:Quesada:2019].",
            filler("el marco teórico")
        );
        let report = Validator::new(&project, ValidationLevel::Basico).run(&assets());
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("quesada") && w.contains("referencia")));
    }

    #[test]
    fn test_missing_images_warn() {
        let project = complete_project();
        let report = Validator::new(&project, ValidationLevel::Basico).run(&assets());
        assert!(report.warnings.iter().any(|w| w.contains("encabezado")));
        assert!(report.warnings.iter().any(|w| w.contains("insignia")));
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(ValidationLevel::Basico.threshold(), 60.0);
        assert_eq!(ValidationLevel::Estandar.threshold(), 80.0);
        assert_eq!(ValidationLevel::Estricto.threshold(), 95.0);
    }
}
