//! Inline citation markers
//!
//! Section text carries citations as `[CITA:tipo:autor:año]` markers, with
//! an optional page field (`[CITA:textual:García:2020:45]`). At export
//! time the markers are rendered to APA text; the validator uses the same
//! parser to cross-check cited authors against the reference list.

use regex_lite::Regex;

/// Recognized citation kinds.
pub const VALID_KINDS: &[&str] = &["textual", "parafraseo", "larga", "web", "multiple"];

/// A parsed citation marker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CitationMarker {
    pub kind: String,
    pub author: String,
    pub year: String,
    pub page: Option<String>,
}

impl CitationMarker {
    /// Whether the marker has a known kind, an author and a numeric year.
    pub fn is_valid(&self) -> bool {
        VALID_KINDS.contains(&self.kind.as_str())
            && !self.author.trim().is_empty()
            && self.year.trim().parse::<i32>().is_ok()
    }

    /// APA rendering of this citation.
    ///
    /// Inline forms carry a leading space so they glue onto the text that
    /// precedes the marker; the block form ("larga") stands on its own
    /// indented line.
    pub fn apa_text(&self) -> String {
        let page = self
            .page
            .as_ref()
            .map(|p| format!(", p. {}", p))
            .unwrap_or_default();

        match self.kind.as_str() {
            "larga" => format!("\n\n     ({}, {}{})\n\n", self.author, self.year, page),
            "textual" if self.page.is_some() => {
                format!(" ({}, {}{})", self.author, self.year, page)
            }
            _ => format!(" ({}, {})", self.author, self.year),
        }
    }
}

fn marker_regex() -> Regex {
    Regex::new(r"\[CITA:([^:\[\]]+):([^:\[\]]+):([^:\[\]]+)(?::([^:\[\]]+))?\]").unwrap()
}

fn marker_from_captures(cap: &regex_lite::Captures<'_>) -> CitationMarker {
    CitationMarker {
        kind: cap[1].trim().to_string(),
        author: cap[2].trim().to_string(),
        year: cap[3].trim().to_string(),
        page: cap.get(4).map(|m| m.as_str().trim().to_string()),
    }
}

/// Parse every citation marker in the text, in order of appearance.
///
/// Markers with fewer than three fields do not match and are ignored,
/// the same way `render` leaves them verbatim.
pub fn find_markers(text: &str) -> Vec<CitationMarker> {
    marker_regex()
        .captures_iter(text)
        .map(|cap| marker_from_captures(&cap))
        .collect()
}

/// Replace every citation marker with its APA rendering.
pub fn render(text: &str) -> String {
    marker_regex()
        .replace_all(text, |cap: &regex_lite::Captures<'_>| {
            marker_from_captures(cap).apa_text()
        })
        .into_owned()
}

/// Distinct cited authors, in order of first appearance.
pub fn cited_authors(text: &str) -> Vec<String> {
    let mut authors: Vec<String> = Vec::new();
    for marker in find_markers(text) {
        if !authors.contains(&marker.author) {
            authors.push(marker.author);
        }
    }
    authors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_parafraseo() {
        let out = render("Según estudios[CITA:parafraseo:García:2020].");
        assert_eq!(out, "Según estudios (García, 2020).");
    }

    #[test]
    fn test_render_textual_with_page() {
        let out = render("Como se afirma[CITA:textual:López:2019:45], el método funciona.");
        assert_eq!(out, "Como se afirma (López, 2019, p. 45), el método funciona.");
    }

    #[test]
    fn test_render_larga_block() {
        let out = render("Texto previo.[CITA:larga:Pérez:2018:12]Texto posterior.");
        assert_eq!(
            out,
            "Texto previo.\n\n     (Pérez, 2018, p. 12)\n\nTexto posterior."
        );
    }

    #[test]
    fn test_malformed_marker_left_verbatim() {
        let text = "Incompleto [CITA:textual:García] aquí.";
        assert_eq!(render(text), text);
        assert!(find_markers(text).is_empty());
    }

    #[test]
    fn test_find_markers_and_validity() {
        let text = "Uno[CITA:parafraseo:García:2020] y dos[CITA:rara:López:s.f.].";
        let markers = find_markers(text);
        assert_eq!(markers.len(), 2);
        assert!(markers[0].is_valid());
        assert!(!markers[1].is_valid());
        assert_eq!(markers[1].kind, "rara");
    }

    #[test]
    fn test_cited_authors_dedup() {
        let text = "[CITA:parafraseo:García:2020] luego [CITA:textual:García:2021] y [CITA:web:López:2022]";
        assert_eq!(cited_authors(text), vec!["García".to_string(), "López".to_string()]);
    }
}
