//! Page navigation and the auto-advance guard

use log::debug;

use crate::buffer::Position;
use crate::editor::{CoreOutcome, ScriptEditorCore};
use crate::element::ScriptLine;

impl ScriptEditorCore {
    /// Show page `number` (1-based) with the cursor at the start of its
    /// first line. Out-of-range numbers are ignored.
    pub fn go_to_page(&mut self, number: usize) -> CoreOutcome {
        let Some(first) = self.pagination.page(number).and_then(|page| page.first_line()) else {
            return CoreOutcome::Continue;
        };
        let from = self.current_page;
        self.current_page = number;
        self.cursor = Position::new(first, 0);
        debug!("jumped from page {} to page {}", from, number);
        self.finish(from, true)
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.pagination.page_count()
    }

    pub fn can_go_prev(&self) -> bool {
        self.current_page > 1
    }

    /// Next page, cursor at the start of its first line
    pub fn next_page(&mut self) -> CoreOutcome {
        if !self.can_go_next() {
            return CoreOutcome::Continue;
        }
        self.go_to_page(self.current_page + 1)
    }

    /// Previous page, cursor at the end of its last line
    pub fn prev_page(&mut self) -> CoreOutcome {
        if !self.can_go_prev() {
            return CoreOutcome::Continue;
        }
        let number = self.current_page - 1;
        let Some(last) = self.pagination.page(number).and_then(|page| page.last_line()) else {
            return CoreOutcome::Continue;
        };
        let from = self.current_page;
        self.current_page = number;
        self.cursor = Position::new(last, self.buffer.line_length(last));
        debug!("jumped from page {} to page {}", from, number);
        self.finish(from, true)
    }

    /// Whether inserting `incoming` right after the cursor line would push
    /// it onto a new page.
    ///
    /// Measures the displayed page up to and including the cursor line with
    /// the paginator's own break predicate, so the answer always agrees with
    /// where [`crate::paginate`] will put the new line.
    pub fn enter_overflows_page(&self, incoming: &ScriptLine) -> bool {
        let Some(page) = self.pagination.page(self.current_page) else {
            return false;
        };
        let row = self.cursor.row;
        if !page.contains(row) {
            return false;
        }
        let y = self
            .metrics
            .page_fill(self.buffer.lines(), page.lines.start..row + 1);
        self.metrics
            .would_overflow(y, self.metrics.element_height(incoming))
    }

    /// Keep the view on the page holding the cursor after a movement
    pub(crate) fn follow_cursor(&mut self, page_before: usize) -> CoreOutcome {
        if let Some(page) = self.pagination.page_of(self.cursor.row) {
            self.current_page = page;
        }
        self.finish(page_before, true)
    }
}
