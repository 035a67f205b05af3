//! ScriptEditorCore state machine
//!
//! Owns the line sequence, the cursor and the page view. Every mutation
//! recomputes the page partition and resynchronises the view before it
//! returns, so callers never observe stale pages.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use log::debug;

use crate::{
    buffer::{Position, ScriptBuffer},
    classify::{classify, classify_live},
    element::{ElementType, ScriptLine},
    key::Key,
    layout::{paginate, LayoutMetrics, Pagination},
    snapshot::EditorSnapshot,
};

const MAX_UNDO_STACK: usize = 100;

/// Snapshot for undo/redo
#[derive(Debug, Clone)]
struct BufferSnapshot {
    buffer: ScriptBuffer,
    cursor: Position,
}

/// Outcome from applying a key or command to the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreOutcome {
    /// Nothing happened
    Continue,
    /// Content or cursor changed on the displayed page
    Changed,
    /// The displayed page changed (content may have changed too)
    PageChanged { from: usize, to: usize },
    /// Display a status message
    StatusMessage(String),
}

/// Editor core state machine
pub struct ScriptEditorCore {
    pub(crate) buffer: ScriptBuffer,
    pub(crate) cursor: Position,
    pub(crate) metrics: LayoutMetrics,
    pub(crate) pagination: Pagination,
    /// 1-based number of the displayed page
    pub(crate) current_page: usize,
    dirty: bool,
    /// Bumped on every content change
    revision: u64,
    undo_stack: Vec<BufferSnapshot>,
    redo_stack: Vec<BufferSnapshot>,
}

impl ScriptEditorCore {
    /// Create an editor holding a single empty action line
    pub fn new() -> Self {
        Self::with_metrics(LayoutMetrics::default())
    }

    pub fn with_metrics(metrics: LayoutMetrics) -> Self {
        let buffer = ScriptBuffer::new();
        let pagination = paginate(buffer.lines(), &metrics);
        Self {
            buffer,
            cursor: Position::zero(),
            metrics,
            pagination,
            current_page: 1,
            dirty: false,
            revision: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    /// Apply a key event and return the outcome
    pub fn apply_key(&mut self, key: Key) -> CoreOutcome {
        let page_before = self.current_page;
        match key {
            Key::Char(ch) => {
                let changed = self.insert_char(ch);
                self.finish(page_before, changed)
            }
            Key::Enter => self.handle_enter(),
            Key::Tab => self.cycle_element_type(),
            Key::Backspace => self.handle_backspace(),

            Key::Left => {
                self.move_cursor_left();
                self.follow_cursor(page_before)
            }
            Key::Right => {
                self.move_cursor_right();
                self.follow_cursor(page_before)
            }
            Key::Up => {
                self.move_cursor_up();
                self.follow_cursor(page_before)
            }
            Key::Down => {
                self.move_cursor_down();
                self.follow_cursor(page_before)
            }
            Key::Home => {
                self.cursor.col = 0;
                self.follow_cursor(page_before)
            }
            Key::End => {
                self.cursor.col = self.buffer.line_length(self.cursor.row);
                self.follow_cursor(page_before)
            }

            Key::PrevPage => self.prev_page(),
            Key::NextPage => self.next_page(),

            Key::Undo => {
                if self.undo() {
                    self.finish(page_before, true)
                } else {
                    CoreOutcome::StatusMessage("Already at oldest change".into())
                }
            }
            Key::Redo => {
                if self.redo() {
                    self.finish(page_before, true)
                } else {
                    CoreOutcome::StatusMessage("Already at newest change".into())
                }
            }
        }
    }

    /// Insert pasted text after the current line.
    ///
    /// Blank lines are dropped and every remaining line is classified on its
    /// own. The cursor ends at the end of the last inserted line.
    pub fn paste(&mut self, text: &str) -> CoreOutcome {
        let incoming: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        if incoming.is_empty() {
            return CoreOutcome::Continue;
        }

        let page_before = self.current_page;
        self.save_undo_snapshot();

        let mut row = self.cursor.row;
        for text in &incoming {
            let after_dialogue = self
                .buffer
                .line(row)
                .is_some_and(|line| line.element_type == ElementType::Dialogue);
            let ty = if after_dialogue && text.starts_with('(') {
                ElementType::Parenthetical
            } else {
                classify(text)
            };
            self.buffer.insert_line(row + 1, ScriptLine::new(*text, ty));
            row += 1;
        }

        debug!("pasted {} lines after row {}", incoming.len(), self.cursor.row);
        self.cursor = Position::new(row, self.buffer.line_length(row));
        self.touch();
        self.refresh_layout(row);
        self.finish(page_before, true)
    }

    /// Retype the current line by hand (type picker)
    pub fn set_element_type(&mut self, ty: ElementType) -> CoreOutcome {
        let page_before = self.current_page;
        let row = self.cursor.row;
        self.save_undo_snapshot();
        if let Some(line) = self.buffer.line_mut(row) {
            line.element_type = ty;
            line.explicitly_typed = true;
        }
        self.touch();
        self.refresh_layout(row);
        self.finish(page_before, true)
    }

    /// Replace the current line with a scene heading template, e.g. `INT`
    pub fn insert_scene_heading(&mut self, prefix: &str) -> CoreOutcome {
        self.replace_current_line(
            format!("{}. LOCATION - TIME", prefix.trim()),
            ElementType::SceneHeading,
        )
    }

    /// Replace the current line with a transition such as `CUT TO` or `FADE OUT`
    pub fn insert_transition(&mut self, label: &str) -> CoreOutcome {
        let label = label.trim();
        let text = if label.contains(':') {
            String::from(label)
        } else {
            format!("{label}:")
        };
        let upper = label.to_uppercase();
        let ty = if upper.starts_with("FADE IN") {
            ElementType::FadeIn
        } else if upper.starts_with("FADE OUT") {
            ElementType::FadeOut
        } else {
            ElementType::Transition
        };
        self.replace_current_line(text, ty)
    }

    fn replace_current_line(&mut self, text: String, ty: ElementType) -> CoreOutcome {
        let page_before = self.current_page;
        let row = self.cursor.row;
        self.save_undo_snapshot();
        self.buffer.set_text(row, text);
        self.buffer.set_element_type(row, ty);
        self.cursor.col = self.buffer.line_length(row);
        self.touch();
        self.refresh_layout(row);
        self.finish(page_before, true)
    }

    /// Get a complete snapshot of editor state (for parity testing)
    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            cursor: self.cursor,
            lines: self
                .buffer
                .lines()
                .iter()
                .map(|line| (line.text.clone(), line.element_type))
                .collect(),
            current_page: self.current_page,
            page_count: self.pagination.page_count(),
            dirty: self.dirty,
            undo_depth: self.undo_stack.len(),
            redo_depth: self.redo_stack.len(),
        }
    }

    // Public accessors for rendering/testing
    pub fn buffer(&self) -> &ScriptBuffer {
        &self.buffer
    }

    pub fn lines(&self) -> &[ScriptLine] {
        self.buffer.lines()
    }

    pub fn cursor(&self) -> Position {
        self.cursor
    }

    pub fn metrics(&self) -> &LayoutMetrics {
        &self.metrics
    }

    pub fn pagination(&self) -> &Pagination {
        &self.pagination
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn page_count(&self) -> usize {
        self.pagination.page_count()
    }

    pub fn dirty(&self) -> bool {
        self.dirty
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn word_count(&self) -> usize {
        self.buffer.word_count()
    }

    /// Type of the line under the cursor
    pub fn current_element_type(&self) -> ElementType {
        self.buffer
            .line(self.cursor.row)
            .map(|line| line.element_type)
            .unwrap_or(ElementType::Action)
    }

    /// Status bar text, 1-based
    pub fn cursor_label(&self) -> String {
        format!("Line {}, Column {}", self.cursor.row + 1, self.cursor.col + 1)
    }

    // Key handlers

    fn insert_char(&mut self, ch: char) -> bool {
        self.save_undo_snapshot();
        if !self.buffer.insert_char(self.cursor, ch) {
            self.undo_stack.pop();
            return false;
        }
        self.cursor.col += 1;
        self.touch();
        self.after_input(self.cursor.row);
        self.refresh_layout(self.cursor.row);
        true
    }

    fn handle_enter(&mut self) -> CoreOutcome {
        let page_before = self.current_page;
        let row = self.cursor.row;
        let new_line = ScriptLine::empty(self.current_element_type().next_on_enter());

        if self.enter_overflows_page(&new_line) {
            debug!("page {} full, advancing before new line", self.current_page);
            self.current_page += 1;
        }

        self.save_undo_snapshot();
        self.buffer.insert_line(row + 1, new_line);
        self.cursor = Position::new(row + 1, 0);
        self.touch();
        self.refresh_layout(row + 1);
        self.finish(page_before, true)
    }

    fn cycle_element_type(&mut self) -> CoreOutcome {
        let next = self.current_element_type().next_in_cycle();
        self.set_element_type(next)
    }

    fn handle_backspace(&mut self) -> CoreOutcome {
        let page_before = self.current_page;
        let row = self.cursor.row;
        let blank = self.buffer.line(row).is_some_and(ScriptLine::is_blank);

        if blank {
            // The first line is never deleted
            if row == 0 {
                return CoreOutcome::Continue;
            }
            self.save_undo_snapshot();
            self.buffer.remove_line(row);
            self.cursor = Position::new(row - 1, self.buffer.line_length(row - 1));
            self.touch();
            self.refresh_layout(row - 1);
            return self.finish(page_before, true);
        }

        if self.cursor.col > 0 {
            self.save_undo_snapshot();
            if let Some(new_pos) = self.buffer.delete_char_before(self.cursor) {
                self.cursor = new_pos;
                self.touch();
                self.after_input(row);
                self.refresh_layout(row);
                return self.finish(page_before, true);
            }
            self.undo_stack.pop();
            return CoreOutcome::Continue;
        }

        if row == 0 {
            return CoreOutcome::Continue;
        }
        self.save_undo_snapshot();
        match self.buffer.join_with_previous(row) {
            Some(new_pos) => {
                self.cursor = new_pos;
                self.touch();
                self.refresh_layout(new_pos.row);
                self.finish(page_before, true)
            }
            None => {
                self.undo_stack.pop();
                CoreOutcome::Continue
            }
        }
    }

    /// Input-event hook: auto-format the edited line, then clear the
    /// manual-type flag wherever it was set.
    fn after_input(&mut self, row: usize) {
        if let Some(line) = self.buffer.line_mut(row) {
            if !line.explicitly_typed {
                if line.element_type == ElementType::Dialogue && line.text.trim().starts_with('(') {
                    line.element_type = ElementType::Parenthetical;
                } else if let Some(ty) = classify_live(&line.text) {
                    line.element_type = ty;
                }
            }
        }
        self.buffer.clear_explicit_types();
    }

    // Layout

    /// Recompute pages and show the page holding `focus_row`
    pub(crate) fn refresh_layout(&mut self, focus_row: usize) {
        self.pagination = paginate(self.buffer.lines(), &self.metrics);
        let count = self.pagination.page_count();
        self.current_page = self.current_page.clamp(1, count);

        if let Some(page) = self.pagination.page_of(focus_row) {
            if page != self.current_page {
                debug!("row {} moved to page {}, following", focus_row, page);
                self.current_page = page;
            }
        }
    }

    pub(crate) fn finish(&self, page_before: usize, changed: bool) -> CoreOutcome {
        if self.current_page != page_before {
            CoreOutcome::PageChanged {
                from: page_before,
                to: self.current_page,
            }
        } else if changed {
            CoreOutcome::Changed
        } else {
            CoreOutcome::Continue
        }
    }

    /// Replace the layout constants and repaginate
    pub fn set_metrics(&mut self, metrics: LayoutMetrics) {
        self.metrics = metrics;
        self.refresh_layout(self.cursor.row);
    }

    // Undo/redo implementation

    fn save_undo_snapshot(&mut self) {
        let snapshot = BufferSnapshot {
            buffer: self.buffer.clone(),
            cursor: self.cursor,
        };
        self.undo_stack.push(snapshot);
        // Clear redo stack on new edit
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_STACK {
            self.undo_stack.remove(0);
        }
    }

    fn undo(&mut self) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        let current = BufferSnapshot {
            buffer: self.buffer.clone(),
            cursor: self.cursor,
        };
        self.redo_stack.push(current);
        self.restore(snapshot);
        true
    }

    fn redo(&mut self) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        let current = BufferSnapshot {
            buffer: self.buffer.clone(),
            cursor: self.cursor,
        };
        self.undo_stack.push(current);
        self.restore(snapshot);
        true
    }

    fn restore(&mut self, snapshot: BufferSnapshot) {
        self.buffer = snapshot.buffer;
        self.cursor = snapshot.cursor;
        self.touch();
        self.refresh_layout(self.cursor.row);
    }

    // Cursor movement

    fn move_cursor_up(&mut self) {
        if self.cursor.row > 0 {
            self.cursor.row -= 1;
            self.clamp_cursor();
        }
    }

    fn move_cursor_down(&mut self) {
        if self.cursor.row < self.buffer.line_count().saturating_sub(1) {
            self.cursor.row += 1;
            self.clamp_cursor();
        }
    }

    fn move_cursor_left(&mut self) {
        if self.cursor.col > 0 {
            self.cursor.col -= 1;
        }
    }

    fn move_cursor_right(&mut self) {
        let line_len = self.buffer.line_length(self.cursor.row);
        if self.cursor.col < line_len {
            self.cursor.col += 1;
        }
    }

    fn clamp_cursor(&mut self) {
        let line_len = self.buffer.line_length(self.cursor.row);
        if self.cursor.col > line_len {
            self.cursor.col = line_len;
        }
    }

    // Public API for loading content
    pub fn load_lines(&mut self, lines: Vec<ScriptLine>) {
        self.buffer = ScriptBuffer::from_lines(lines);
        self.cursor = Position::zero();
        self.dirty = false;
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.current_page = 1;
        self.refresh_layout(0);
    }

    pub fn mark_saved(&mut self) {
        self.dirty = false;
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.revision += 1;
    }
}

impl Default for ScriptEditorCore {
    fn default() -> Self {
        Self::new()
    }
}
