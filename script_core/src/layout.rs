//! Page layout simulation
//!
//! Partitions the line sequence into pages by replaying the vertical layout
//! of the PDF export: every line is indented by its element type, wrapped
//! with [`crate::wrap`], and stacked with a fixed line height and inter-element
//! gap under a fixed page budget.
//!
//! Pages are derived data. They are recomputed from the lines on every
//! change and never stored.

use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;
use log::debug;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::element::{ElementType, ScriptLine};
use crate::wrap::{estimate_wrapped_line_count, max_chars_per_line};

/// Layout constants, in PDF units.
///
/// The defaults are the reference values of the PDF export (A4, 12pt
/// Courier). They must stay in step with whatever renderer produces the
/// exported pages, otherwise editor and export disagree on page breaks.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(default))]
pub struct LayoutMetrics {
    pub top_margin: f32,
    pub left_margin: f32,
    pub content_width: f32,
    pub line_height: f32,
    pub page_height: f32,
    pub element_gap: f32,
    pub avg_char_width: f32,
    pub character_x: f32,
    pub dialogue_x: f32,
    pub parenthetical_x: f32,
    pub transition_x: f32,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self {
            top_margin: 20.0,
            left_margin: 20.0,
            content_width: 160.0,
            line_height: 6.0,
            page_height: 280.0,
            element_gap: 2.0,
            avg_char_width: 3.5,
            character_x: 100.0,
            dialogue_x: 60.0,
            parenthetical_x: 80.0,
            transition_x: 140.0,
        }
    }
}

impl LayoutMetrics {
    /// Horizontal start of an element
    pub fn x_position(&self, ty: ElementType) -> f32 {
        match ty {
            ElementType::Character => self.character_x,
            ElementType::Dialogue => self.dialogue_x,
            ElementType::Parenthetical => self.parenthetical_x,
            ElementType::Transition => self.transition_x,
            _ => self.left_margin,
        }
    }

    /// Width left for text once the element is indented
    pub fn usable_width(&self, ty: ElementType) -> f32 {
        self.content_width - (self.x_position(ty) - self.left_margin)
    }

    /// Character budget of one row for this element type
    pub fn chars_per_row(&self, ty: ElementType) -> usize {
        max_chars_per_line(self.usable_width(ty), self.avg_char_width)
    }

    pub fn wrapped_rows(&self, line: &ScriptLine) -> usize {
        estimate_wrapped_line_count(
            &line.text,
            self.usable_width(line.element_type),
            self.avg_char_width,
        )
    }

    /// Vertical space of a line, without the trailing gap
    pub fn element_height(&self, line: &ScriptLine) -> f32 {
        self.wrapped_rows(line) as f32 * self.line_height
    }

    /// Break predicate shared by the paginator and the auto-advance guard.
    ///
    /// `y` is the running cursor on a non-empty page, `height` the space the
    /// next element needs.
    pub fn would_overflow(&self, y: f32, height: f32) -> bool {
        y > self.page_height || y + height > self.page_height
    }

    /// Running cursor after stacking `range` of `lines` from the top margin
    pub fn page_fill(&self, lines: &[ScriptLine], range: Range<usize>) -> f32 {
        lines[range]
            .iter()
            .fold(self.top_margin, |y, line| y + self.element_height(line) + self.element_gap)
    }
}

/// One page: a contiguous run of line indices
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    pub lines: Range<usize>,
}

impl Page {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn contains(&self, line: usize) -> bool {
        self.lines.contains(&line)
    }

    pub fn first_line(&self) -> Option<usize> {
        (!self.is_empty()).then_some(self.lines.start)
    }

    pub fn last_line(&self) -> Option<usize> {
        (!self.is_empty()).then(|| self.lines.end - 1)
    }
}

/// Result of [`paginate`]. Always holds at least one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pages: Vec<Page>,
}

impl Pagination {
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page by 1-based number
    pub fn page(&self, number: usize) -> Option<&Page> {
        number.checked_sub(1).and_then(|idx| self.pages.get(idx))
    }

    /// 1-based number of the page holding `line`
    pub fn page_of(&self, line: usize) -> Option<usize> {
        let idx = self.pages.partition_point(|page| page.lines.end <= line);
        self.pages
            .get(idx)
            .filter(|page| page.contains(line))
            .map(|page| page.number)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            pages: vec![Page {
                number: 1,
                lines: 0..0,
            }],
        }
    }
}

/// Partition `lines` into pages.
///
/// A page is never closed while empty, so the first line of a page always
/// stays on it even if it alone exceeds the page budget.
pub fn paginate(lines: &[ScriptLine], metrics: &LayoutMetrics) -> Pagination {
    let mut pages = Vec::new();
    let mut start = 0;
    let mut y = metrics.top_margin;

    for (idx, line) in lines.iter().enumerate() {
        let height = metrics.element_height(line);
        if idx > start && metrics.would_overflow(y, height) {
            pages.push(Page {
                number: pages.len() + 1,
                lines: start..idx,
            });
            start = idx;
            y = metrics.top_margin;
        }
        y += height + metrics.element_gap;
    }

    if start < lines.len() {
        pages.push(Page {
            number: pages.len() + 1,
            lines: start..lines.len(),
        });
    }

    if pages.is_empty() {
        return Pagination::default();
    }

    debug!("paginated {} lines into {} pages", lines.len(), pages.len());
    Pagination { pages }
}
