//! Export view of a script
//!
//! Produces what a PDF or DOC writer consumes: per-line styling, and for
//! fixed-page output the positioned rows of every page. Rows come from the
//! same wrap and pagination code the editor uses, so the exported page
//! count matches what the editor shows.

use alloc::string::String;
use alloc::vec::Vec;
use core::mem;

use crate::element::{ElementType, ScriptLine};
use crate::layout::{paginate, LayoutMetrics};
use crate::wrap::wrap_text;

/// Font style applied by the export writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FontStyle {
    Normal,
    Bold,
    Italic,
}

impl FontStyle {
    pub fn for_element(ty: ElementType) -> Self {
        match ty {
            ElementType::SceneHeading
            | ElementType::FadeIn
            | ElementType::FadeOut
            | ElementType::Character
            | ElementType::Transition => FontStyle::Bold,
            ElementType::Parenthetical => FontStyle::Italic,
            ElementType::Action | ElementType::Dialogue => FontStyle::Normal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Bold => "bold",
            FontStyle::Italic => "italic",
        }
    }
}

/// Element types printed in capitals regardless of how they were typed
pub fn is_uppercased(ty: ElementType) -> bool {
    matches!(
        ty,
        ElementType::SceneHeading
            | ElementType::Character
            | ElementType::Transition
            | ElementType::FadeIn
            | ElementType::FadeOut
    )
}

fn display_text(text: &str, ty: ElementType) -> String {
    if is_uppercased(ty) {
        text.to_uppercase()
    } else {
        String::from(text)
    }
}

/// One styled line in document order
#[derive(Debug, Clone, PartialEq)]
pub struct ExportLine {
    pub text: String,
    pub element_type: ElementType,
    pub style: FontStyle,
    pub x: f32,
}

pub fn export_lines(lines: &[ScriptLine], metrics: &LayoutMetrics) -> Vec<ExportLine> {
    lines
        .iter()
        .map(|line| ExportLine {
            text: display_text(line.text.trim(), line.element_type),
            element_type: line.element_type,
            style: FontStyle::for_element(line.element_type),
            x: metrics.x_position(line.element_type),
        })
        .collect()
}

/// A wrapped row at its final position
#[derive(Debug, Clone, PartialEq)]
pub struct PrintRow {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub style: FontStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PrintPage {
    /// 1-based page number
    pub number: usize,
    pub rows: Vec<PrintRow>,
}

impl PrintPage {
    fn new(number: usize) -> Self {
        Self {
            number,
            rows: Vec::new(),
        }
    }
}

/// Lay out every row of the script on fixed-size pages.
///
/// Follows the [`paginate`] partition. Rows of an element taller than a
/// whole page spill onto continuation pages.
pub fn plan_print(lines: &[ScriptLine], metrics: &LayoutMetrics) -> Vec<PrintPage> {
    let pagination = paginate(lines, metrics);
    let mut printed = Vec::with_capacity(pagination.page_count());

    for page in pagination.pages() {
        let mut current = PrintPage::new(printed.len() + 1);
        let mut y = metrics.top_margin;

        for line in &lines[page.lines.clone()] {
            let ty = line.element_type;
            let x = metrics.x_position(ty);
            let style = FontStyle::for_element(ty);

            // Wrap the typed text, then transform, so rows match the estimate
            for row in wrap_text(&line.text, metrics.chars_per_row(ty)) {
                if y > metrics.page_height && !current.rows.is_empty() {
                    let next = PrintPage::new(current.number + 1);
                    printed.push(mem::replace(&mut current, next));
                    y = metrics.top_margin;
                }
                current.rows.push(PrintRow {
                    text: display_text(&row, ty),
                    x,
                    y,
                    style,
                });
                y += metrics.line_height;
            }
            y += metrics.element_gap;
        }

        printed.push(current);
    }

    printed
}
