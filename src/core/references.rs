//! APA reference management
//!
//! Holds the reference model, the validation rules applied when a
//! reference is added (author format, year range, required fields), the
//! APA text rendering used both in the UI list and in the generated
//! document, plus search/sort helpers, a basic BibTeX importer and
//! aggregate statistics.

use std::collections::BTreeMap;

use chrono::{Datelike, Local};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Oldest publication year accepted by validation.
pub const MIN_YEAR: i32 = 1800;

/// References within this many years count as recent.
pub const RECENT_YEARS: i32 = 5;

/// Kind of bibliographic reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceKind {
    #[default]
    Book,
    Article,
    Web,
    Thesis,
}

impl ReferenceKind {
    pub const ALL: [ReferenceKind; 4] = [
        ReferenceKind::Book,
        ReferenceKind::Article,
        ReferenceKind::Web,
        ReferenceKind::Thesis,
    ];

    /// Display label in Spanish
    pub fn label(&self) -> &'static str {
        match self {
            ReferenceKind::Book => "Libro",
            ReferenceKind::Article => "Artículo",
            ReferenceKind::Web => "Web",
            ReferenceKind::Thesis => "Tesis",
        }
    }
}

/// A bibliographic reference
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub kind: ReferenceKind,
    pub author: String,
    pub year: i32,
    pub title: String,
    pub source: String,
}

impl Reference {
    /// Author surname, used for ordering the reference list.
    pub fn surname(&self) -> &str {
        self.author.split(',').next().unwrap_or("").trim()
    }

    /// Render the reference as APA text.
    pub fn apa_text(&self) -> String {
        let base = format!("{} ({}). {}", self.author, self.year, self.title);
        match self.kind {
            ReferenceKind::Book | ReferenceKind::Article => {
                if self.source.is_empty() {
                    format!("{}.", base)
                } else {
                    format!("{}. {}.", base, self.source)
                }
            }
            ReferenceKind::Web => {
                if self.source.is_empty() {
                    format!("{}.", base)
                } else {
                    format!("{}. Recuperado de {}", base, self.source)
                }
            }
            ReferenceKind::Thesis => {
                if self.source.is_empty() {
                    format!("{} [Tesis].", base)
                } else {
                    format!("{} [Tesis]. {}.", base, self.source)
                }
            }
        }
    }
}

/// Validation failures when adding or editing a reference
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReferenceError {
    #[error("falta el campo obligatorio: {0}")]
    MissingField(&'static str),
    #[error("año fuera de rango ({0}); se admite 1800 en adelante")]
    InvalidYear(i32),
    #[error("formato de autor no válido: \"{0}\". Use \"Apellido, N.\" o \"Apellido, N. M.\"")]
    InvalidAuthor(String),
}

/// Check an author string against the APA form "Apellido, N.".
///
/// Accepts a compound surname, a second initial and two authors joined
/// with " y " ("García, J. y López, M.").
pub fn is_valid_author(author: &str) -> bool {
    let re = Regex::new(
        r"^[A-ZÁÉÍÓÚÑÜ][a-záéíóúñü]+(?: [A-ZÁÉÍÓÚÑÜ][a-záéíóúñü]+)?, [A-ZÁÉÍÓÚÑÜ]\.(?: [A-ZÁÉÍÓÚÑÜ]\.)?$",
    )
    .unwrap();

    let author = author.trim();
    if author.is_empty() {
        return false;
    }
    author.split(" y ").all(|part| re.is_match(part.trim()))
}

/// Check that a publication year is plausible.
pub fn is_valid_year(year: i32) -> bool {
    (MIN_YEAR..=Local::now().year() + 1).contains(&year)
}

/// Validate a reference before it enters the list.
pub fn validate(reference: &Reference) -> Result<(), ReferenceError> {
    if reference.author.trim().is_empty() {
        return Err(ReferenceError::MissingField("autor"));
    }
    if reference.title.trim().is_empty() {
        return Err(ReferenceError::MissingField("título"));
    }
    if !is_valid_year(reference.year) {
        return Err(ReferenceError::InvalidYear(reference.year));
    }
    if !is_valid_author(&reference.author) {
        return Err(ReferenceError::InvalidAuthor(reference.author.clone()));
    }
    Ok(())
}

/// Validate and append a reference.
pub fn add(refs: &mut Vec<Reference>, reference: Reference) -> Result<(), ReferenceError> {
    validate(&reference)?;
    refs.push(reference);
    Ok(())
}

/// Sort key for the reference list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Author,
    YearDesc,
    Title,
    Kind,
}

/// Sort the list in place.
pub fn sort_by(refs: &mut [Reference], key: SortKey) {
    match key {
        SortKey::Author => refs.sort_by(|a, b| {
            a.author.to_lowercase().cmp(&b.author.to_lowercase())
        }),
        SortKey::YearDesc => refs.sort_by(|a, b| b.year.cmp(&a.year)),
        SortKey::Title => refs.sort_by(|a, b| {
            a.title.to_lowercase().cmp(&b.title.to_lowercase())
        }),
        SortKey::Kind => refs.sort_by_key(|r| r.kind.label()),
    }
}

/// Indices of references matching a case-insensitive query over author,
/// title and source.
pub fn search(refs: &[Reference], query: &str) -> Vec<usize> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return (0..refs.len()).collect();
    }
    refs.iter()
        .enumerate()
        .filter(|(_, r)| {
            r.author.to_lowercase().contains(&query)
                || r.title.to_lowercase().contains(&query)
                || r.source.to_lowercase().contains(&query)
        })
        .map(|(i, _)| i)
        .collect()
}

/// Parse references out of BibTeX text.
///
/// This is a deliberately small importer: it scans `@type{...}` entries
/// for `key = {value}` or `key = "value"` fields and maps author, year,
/// title and publisher/journal. Entries with fewer than three mapped
/// fields are skipped. Returns the parsed references and the number of
/// skipped entries.
pub fn import_bibtex(text: &str) -> (Vec<Reference>, usize) {
    let field_re = Regex::new(r#"(\w+)\s*=\s*[{"]([^}"]*)["}]"#).unwrap();

    let mut imported = Vec::new();
    let mut skipped = 0;

    for entry in text.split('@').skip(1) {
        let Some(brace) = entry.find('{') else {
            skipped += 1;
            continue;
        };
        let entry_kind = entry[..brace].trim().to_lowercase();

        let mut author = None;
        let mut year = None;
        let mut title = None;
        let mut source = None;
        for cap in field_re.captures_iter(&entry[brace..]) {
            let key = cap[1].to_lowercase();
            let value = cap[2].trim().to_string();
            match key.as_str() {
                "author" => author = Some(value),
                "year" => year = value.parse::<i32>().ok(),
                "title" => title = Some(value),
                "publisher" | "journal" | "howpublished" => source = Some(value),
                _ => {}
            }
        }

        let mapped = [author.is_some(), year.is_some(), title.is_some(), source.is_some()]
            .iter()
            .filter(|present| **present)
            .count();
        if mapped < 3 {
            skipped += 1;
            continue;
        }

        let kind = match entry_kind.as_str() {
            "article" => ReferenceKind::Article,
            "misc" | "online" | "www" => ReferenceKind::Web,
            "phdthesis" | "mastersthesis" => ReferenceKind::Thesis,
            _ => ReferenceKind::Book,
        };

        imported.push(Reference {
            kind,
            author: author.unwrap_or_default(),
            year: year.unwrap_or(0),
            title: title.unwrap_or_default(),
            source: source.unwrap_or_default(),
        });
    }

    (imported, skipped)
}

/// Aggregate statistics over the reference list
#[derive(Debug, Clone, Default)]
pub struct ReferenceStats {
    pub total: usize,
    pub unique_authors: usize,
    pub by_kind: BTreeMap<&'static str, usize>,
    pub by_year: BTreeMap<i32, usize>,
    pub oldest_year: Option<i32>,
    pub newest_year: Option<i32>,
    pub recent_count: usize,
}

/// Whether a publication year falls within the recent window.
pub fn is_recent(year: i32) -> bool {
    Local::now().year() - year <= RECENT_YEARS
}

/// Compute statistics for the reference list.
pub fn statistics(refs: &[Reference]) -> ReferenceStats {
    let mut stats = ReferenceStats {
        total: refs.len(),
        ..Default::default()
    };

    let mut authors = std::collections::BTreeSet::new();
    for r in refs {
        authors.insert(r.author.as_str());
        *stats.by_kind.entry(r.kind.label()).or_insert(0) += 1;
        *stats.by_year.entry(r.year).or_insert(0) += 1;
        if is_recent(r.year) {
            stats.recent_count += 1;
        }
    }
    stats.unique_authors = authors.len();
    stats.oldest_year = stats.by_year.keys().next().copied();
    stats.newest_year = stats.by_year.keys().next_back().copied();
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(kind: ReferenceKind, author: &str, year: i32, title: &str, source: &str) -> Reference {
        Reference {
            kind,
            author: author.to_string(),
            year,
            title: title.to_string(),
            source: source.to_string(),
        }
    }

    #[test]
    fn test_author_format() {
        assert!(is_valid_author("García, J."));
        assert!(is_valid_author("García Márquez, G."));
        assert!(is_valid_author("Pérez, M. A."));
        assert!(is_valid_author("García, J. y López, M."));
        assert!(is_valid_author("Ñañez, P."));

        assert!(!is_valid_author(""));
        assert!(!is_valid_author("garcía, j."));
        assert!(!is_valid_author("García J."));
        assert!(!is_valid_author("García, Juan"));
        assert!(!is_valid_author("J. García"));
    }

    #[test]
    fn test_year_range() {
        let current = Local::now().year();
        assert!(is_valid_year(2020));
        assert!(is_valid_year(MIN_YEAR));
        assert!(is_valid_year(current + 1));
        assert!(!is_valid_year(1799));
        assert!(!is_valid_year(current + 2));
    }

    #[test]
    fn test_apa_text_by_kind() {
        let book = sample(ReferenceKind::Book, "García, J.", 2020, "Metodología", "Paidós");
        assert_eq!(book.apa_text(), "García, J. (2020). Metodología. Paidós.");

        let web = sample(ReferenceKind::Web, "López, M.", 2021, "Guía APA", "https://apa.org");
        assert_eq!(web.apa_text(), "López, M. (2021). Guía APA. Recuperado de https://apa.org");

        let thesis = sample(ReferenceKind::Thesis, "Pérez, A.", 2019, "Robótica educativa", "UNA");
        assert_eq!(thesis.apa_text(), "Pérez, A. (2019). Robótica educativa [Tesis]. UNA.");

        let no_source = sample(ReferenceKind::Book, "García, J.", 2020, "Ensayos", "");
        assert_eq!(no_source.apa_text(), "García, J. (2020). Ensayos.");
    }

    #[test]
    fn test_add_rejects_invalid() {
        let mut refs = Vec::new();
        let missing_title = sample(ReferenceKind::Book, "García, J.", 2020, "  ", "X");
        assert_eq!(
            add(&mut refs, missing_title),
            Err(ReferenceError::MissingField("título"))
        );

        let bad_author = sample(ReferenceKind::Book, "garcía", 2020, "T", "X");
        assert!(matches!(
            add(&mut refs, bad_author),
            Err(ReferenceError::InvalidAuthor(_))
        ));

        let bad_year = sample(ReferenceKind::Book, "García, J.", 1500, "T", "X");
        assert_eq!(add(&mut refs, bad_year), Err(ReferenceError::InvalidYear(1500)));
        assert!(refs.is_empty());

        let ok = sample(ReferenceKind::Book, "García, J.", 2020, "T", "X");
        assert!(add(&mut refs, ok).is_ok());
        assert_eq!(refs.len(), 1);
    }

    #[test]
    fn test_sort_and_search() {
        let mut refs = vec![
            sample(ReferenceKind::Book, "Zapata, R.", 2018, "Bases", ""),
            sample(ReferenceKind::Web, "Arias, F.", 2022, "Proyectos", "https://x.org"),
            sample(ReferenceKind::Article, "García, J.", 2020, "Aulas", "Revista"),
        ];

        sort_by(&mut refs, SortKey::YearDesc);
        assert_eq!(refs[0].year, 2022);
        assert_eq!(refs[2].year, 2018);

        sort_by(&mut refs, SortKey::Author);
        assert_eq!(refs[0].author, "Arias, F.");

        let hits = search(&refs, "revista");
        assert_eq!(hits.len(), 1);
        assert_eq!(refs[hits[0]].author, "García, J.");

        assert_eq!(search(&refs, "").len(), 3);
    }

    #[test]
    fn test_bibtex_import() {
        let text = r#"
@book{garcia2020,
  author = {García, J.},
  year = {2020},
  title = {Metodología de la investigación},
  publisher = {Paidós}
}
@article{incompleto,
  author = {López, M.}
}
@phdthesis{perez2019,
  author = "Pérez, A.",
  year = "2019",
  title = "Robótica educativa"
}
"#;
        let (refs, skipped) = import_bibtex(text);
        assert_eq!(refs.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(refs[0].kind, ReferenceKind::Book);
        assert_eq!(refs[0].source, "Paidós");
        assert_eq!(refs[1].kind, ReferenceKind::Thesis);
        assert_eq!(refs[1].year, 2019);
    }

    #[test]
    fn test_statistics() {
        let current = Local::now().year();
        let refs = vec![
            sample(ReferenceKind::Book, "García, J.", current, "A", ""),
            sample(ReferenceKind::Book, "López, M.", 2000, "B", ""),
            sample(ReferenceKind::Web, "Arias, F.", current - 1, "C", ""),
            sample(ReferenceKind::Article, "García, J.", 2010, "D", "Revista"),
        ];
        let stats = statistics(&refs);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.unique_authors, 3);
        assert_eq!(stats.by_kind.get("Libro"), Some(&2));
        assert_eq!(stats.oldest_year, Some(2000));
        assert_eq!(stats.newest_year, Some(current));
        assert_eq!(stats.recent_count, 2);
    }
}
