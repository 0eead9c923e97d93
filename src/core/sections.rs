//! Built-in section catalog for academic projects
//!
//! Twelve standard sections (resumen through conclusiones) with their
//! ordering, editor instructions and required/optional status. Projects
//! can also carry user-defined sections; see `core::project`.

/// Definition of a built-in project section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionDef {
    /// Stable identifier used as the content map key
    pub id: &'static str,
    /// Display title, may carry a leading pictogram
    pub title: &'static str,
    /// Short instruction shown above the editor
    pub instruction: &'static str,
    /// Required sections must be filled before export passes validation
    pub required: bool,
    /// Position in the generated document
    pub order: u32,
}

/// The built-in catalog, in document order.
pub const CATALOG: &[SectionDef] = &[
    SectionDef {
        id: "resumen",
        title: "\u{1F4C4} Resumen",
        instruction: "Síntesis del proyecto en 150 a 300 palabras. Se redacta al final.",
        required: false,
        order: 1,
    },
    SectionDef {
        id: "introduccion",
        title: "\u{1F4D6} Introducción",
        instruction: "Presente el tema, el contexto y la estructura del documento.",
        required: true,
        order: 2,
    },
    SectionDef {
        id: "planteamiento",
        title: "\u{2753} Planteamiento del Problema",
        instruction: "Describa el problema que motiva el proyecto y su relevancia.",
        required: true,
        order: 3,
    },
    SectionDef {
        id: "preguntas",
        title: "\u{1F50D} Preguntas de Investigación",
        instruction: "Formule las preguntas que el proyecto busca responder.",
        required: true,
        order: 4,
    },
    SectionDef {
        id: "justificacion",
        title: "\u{1F4A1} Justificación",
        instruction: "Explique por qué el proyecto es necesario y a quién beneficia.",
        required: true,
        order: 5,
    },
    SectionDef {
        id: "objetivos",
        title: "\u{1F3AF} Objetivos",
        instruction: "Redacte el objetivo general y los específicos con verbos en infinitivo.",
        required: true,
        order: 6,
    },
    SectionDef {
        id: "marco_teorico",
        title: "\u{1F4DA} Marco Teórico",
        instruction: "Fundamente el proyecto con literatura. INCLUIR CITAS con el formato [CITA:tipo:autor:año].",
        required: true,
        order: 7,
    },
    SectionDef {
        id: "metodologia",
        title: "\u{2699} Metodología",
        instruction: "Describa el método, las técnicas, los instrumentos y la población o muestra.",
        required: true,
        order: 8,
    },
    SectionDef {
        id: "desarrollo",
        title: "\u{1F528} Desarrollo",
        instruction: "Documente la ejecución del proyecto.",
        required: false,
        order: 9,
    },
    SectionDef {
        id: "resultados",
        title: "\u{1F4CA} Resultados",
        instruction: "Presente los hallazgos obtenidos.",
        required: false,
        order: 10,
    },
    SectionDef {
        id: "discusion",
        title: "\u{1F4AC} Discusión",
        instruction: "Contraste los resultados con el marco teórico.",
        required: false,
        order: 11,
    },
    SectionDef {
        id: "conclusiones",
        title: "\u{2705} Conclusiones",
        instruction: "Responda a los objetivos y señale líneas de trabajo futuro.",
        required: true,
        order: 12,
    },
];

/// Section ids where inline citations are expected.
pub const CITATION_SECTIONS: &[&str] = &["marco_teorico", "introduccion", "desarrollo", "discusion"];

/// Look up a built-in section by id.
pub fn by_id(id: &str) -> Option<&'static SectionDef> {
    CATALOG.iter().find(|s| s.id == id)
}

/// Ids of all required built-in sections.
pub fn required_ids() -> impl Iterator<Item = &'static str> {
    CATALOG.iter().filter(|s| s.required).map(|s| s.id)
}

/// Strip pictograms and decoration from a section title.
///
/// Keeps letters, digits, whitespace and hyphens so accented Spanish
/// titles survive intact.
pub fn clean_title(title: &str) -> String {
    let cleaned: String = title
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace() || *c == '-')
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Heading text for a section: cleaned title in uppercase.
pub fn heading_title(title: &str) -> String {
    clean_title(title).to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_integrity() {
        assert_eq!(CATALOG.len(), 12);

        let mut orders: Vec<u32> = CATALOG.iter().map(|s| s.order).collect();
        orders.sort_unstable();
        assert_eq!(orders, (1..=12).collect::<Vec<u32>>());

        for section in CATALOG {
            assert!(!section.id.is_empty());
            assert!(by_id(section.id).is_some());
        }
    }

    #[test]
    fn test_required_sections() {
        let required: Vec<&str> = required_ids().collect();
        assert!(required.contains(&"introduccion"));
        assert!(required.contains(&"objetivos"));
        assert!(required.contains(&"conclusiones"));
        assert!(!required.contains(&"resumen"));
        assert!(!required.contains(&"resultados"));
    }

    #[test]
    fn test_clean_title_strips_pictograms() {
        assert_eq!(clean_title("\u{1F4DA} Marco Teórico"), "Marco Teórico");
        assert_eq!(heading_title("\u{1F4C4} Resumen"), "RESUMEN");
    }

    #[test]
    fn test_clean_title_keeps_accents_and_hyphens() {
        assert_eq!(clean_title("Énfasis Técnico-Práctico"), "Énfasis Técnico-Práctico");
    }
}
