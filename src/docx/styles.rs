//! Paragraph styles and unit conversions for the generated document
//!
//! Word measures margins and indents in twips (1/20 pt, 1440 per inch),
//! font sizes in half-points, image extents in EMU (914400 per inch) and
//! line spacing in 240ths of a line.

use docx_rs::{AlignmentType, LineSpacing, LineSpacingType, PageMargin, RunFonts, Style, StyleType};

use crate::core::project::FormatConfig;

/// Half an inch, used for first-line and hanging indents.
pub const INDENT_TWIPS: i32 = 720;

pub fn cm_to_twips(cm: f32) -> i32 {
    (cm * 1440.0 / 2.54).round() as i32
}

pub fn inches_to_emu(inches: f32) -> u32 {
    (inches * 914_400.0).round() as u32
}

pub fn pt_to_half(pt: usize) -> usize {
    pt * 2
}

/// Line spacing units for a multiple of single spacing.
pub fn spacing_units(multiple: f32) -> i32 {
    (multiple * 240.0).round() as i32
}

/// Page margins on all four sides.
pub fn page_margin(fmt: &FormatConfig) -> PageMargin {
    let m = cm_to_twips(fmt.margin_cm);
    PageMargin::new().top(m).bottom(m).left(m).right(m)
}

/// Line spacing for body paragraphs.
pub fn body_spacing(fmt: &FormatConfig) -> LineSpacing {
    LineSpacing::new()
        .line_rule(LineSpacingType::Auto)
        .line(spacing_units(fmt.line_spacing))
}

pub fn body_alignment(fmt: &FormatConfig) -> AlignmentType {
    if fmt.justified {
        AlignmentType::Both
    } else {
        AlignmentType::Left
    }
}

/// The Normal style carries the body font so runs without direct
/// formatting fall back to it.
pub fn normal_style(fmt: &FormatConfig) -> Style {
    Style::new("Normal", StyleType::Paragraph)
        .name("Normal")
        .size(pt_to_half(fmt.body_size_pt))
        .color("000000")
        .fonts(RunFonts::new().ascii(fmt.body_font.as_str()))
}

/// Heading styles 1 to 6: bold, black, centered, one point smaller per
/// level.
pub fn heading_styles(fmt: &FormatConfig) -> Vec<Style> {
    (1..=6usize)
        .map(|level| {
            let size_pt = fmt.heading_size_pt.saturating_sub(level - 1);
            Style::new(format!("Heading{}", level), StyleType::Paragraph)
                .name(format!("heading {}", level))
                .size(pt_to_half(size_pt))
                .bold()
                .color("000000")
                .fonts(RunFonts::new().ascii(fmt.heading_font.as_str()))
                .align(AlignmentType::Center)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_conversions() {
        assert_eq!(cm_to_twips(2.54), 1440);
        assert_eq!(cm_to_twips(1.27), 720);
        assert_eq!(inches_to_emu(1.0), 914_400);
        assert_eq!(inches_to_emu(1.5), 1_371_600);
        assert_eq!(pt_to_half(12), 24);
        assert_eq!(spacing_units(1.0), 240);
        assert_eq!(spacing_units(1.5), 360);
        assert_eq!(spacing_units(2.0), 480);
    }

    #[test]
    fn test_heading_styles_cover_six_levels() {
        let styles = heading_styles(&FormatConfig::default());
        assert_eq!(styles.len(), 6);
    }
}
