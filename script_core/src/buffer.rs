//! Script buffer and position types

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use crate::element::{ElementType, ScriptLine};

/// Cursor position in the buffer. `col` counts characters, not bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct Position {
    pub row: usize,
    pub col: usize,
}

impl Position {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    pub const fn zero() -> Self {
        Self { row: 0, col: 0 }
    }
}

/// Ordered script lines. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptBuffer {
    lines: Vec<ScriptLine>,
}

impl ScriptBuffer {
    pub fn new() -> Self {
        Self {
            lines: vec![ScriptLine::empty(ElementType::Action)],
        }
    }

    /// Canned opening of a new script
    pub fn starter() -> Self {
        Self {
            lines: vec![
                ScriptLine::new("FADE IN:", ElementType::FadeIn),
                ScriptLine::new("INT. LOCATION - TIME", ElementType::SceneHeading),
                ScriptLine::new("Enter your story description here.", ElementType::Action),
            ],
        }
    }

    pub fn from_lines(lines: Vec<ScriptLine>) -> Self {
        if lines.is_empty() {
            Self::new()
        } else {
            Self { lines }
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, row: usize) -> Option<&ScriptLine> {
        self.lines.get(row)
    }

    pub(crate) fn line_mut(&mut self, row: usize) -> Option<&mut ScriptLine> {
        self.lines.get_mut(row)
    }

    /// Drop the manual-type flag from every line
    pub(crate) fn clear_explicit_types(&mut self) {
        for line in &mut self.lines {
            line.explicitly_typed = false;
        }
    }

    /// Length of a line in characters
    pub fn line_length(&self, row: usize) -> usize {
        self.lines
            .get(row)
            .map(|line| line.text.chars().count())
            .unwrap_or(0)
    }

    pub fn lines(&self) -> &[ScriptLine] {
        &self.lines
    }

    /// Insert a character at position
    pub fn insert_char(&mut self, pos: Position, ch: char) -> bool {
        let Some(line) = self.lines.get_mut(pos.row) else {
            return false;
        };
        match byte_index(&line.text, pos.col) {
            Some(idx) => {
                line.text.insert(idx, ch);
                true
            }
            None => false,
        }
    }

    /// Delete the character before position within its line.
    /// Returns new cursor position if successful
    pub fn delete_char_before(&mut self, pos: Position) -> Option<Position> {
        if pos.col == 0 {
            return None;
        }
        let line = self.lines.get_mut(pos.row)?;
        let idx = byte_index(&line.text, pos.col - 1)?;
        line.text.remove(idx);
        Some(Position::new(pos.row, pos.col - 1))
    }

    /// Insert a whole line before `row` (`row == line_count()` appends)
    pub fn insert_line(&mut self, row: usize, line: ScriptLine) -> bool {
        if row > self.lines.len() {
            return false;
        }
        self.lines.insert(row, line);
        true
    }

    /// Remove a line. The only remaining line is never removed.
    pub fn remove_line(&mut self, row: usize) -> Option<ScriptLine> {
        if row >= self.lines.len() || self.lines.len() == 1 {
            return None;
        }
        Some(self.lines.remove(row))
    }

    /// Append line `row` to the previous line, which keeps its type.
    /// Returns the join point
    pub fn join_with_previous(&mut self, row: usize) -> Option<Position> {
        if row == 0 || row >= self.lines.len() {
            return None;
        }
        let current = self.lines.remove(row);
        let prev = &mut self.lines[row - 1];
        let col = prev.text.chars().count();
        prev.text.push_str(&current.text);
        Some(Position::new(row - 1, col))
    }

    pub fn set_text(&mut self, row: usize, text: impl Into<String>) -> bool {
        match self.lines.get_mut(row) {
            Some(line) => {
                line.text = text.into();
                true
            }
            None => false,
        }
    }

    pub fn set_element_type(&mut self, row: usize, ty: ElementType) -> bool {
        match self.lines.get_mut(row) {
            Some(line) => {
                line.element_type = ty;
                true
            }
            None => false,
        }
    }

    pub fn word_count(&self) -> usize {
        self.lines
            .iter()
            .map(|line| line.text.split_whitespace().count())
            .sum()
    }

    pub fn as_plain_text(&self) -> String {
        let texts: Vec<&str> = self.lines.iter().map(|line| line.text.as_str()).collect();
        texts.join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.lines.len() == 1 && self.lines[0].text.is_empty()
    }
}

impl Default for ScriptBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Byte offset of character `col`, allowing the end-of-line position
fn byte_index(text: &str, col: usize) -> Option<usize> {
    text.char_indices()
        .map(|(idx, _)| idx)
        .chain(core::iter::once(text.len()))
        .nth(col)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn buffer(texts: &[&str]) -> ScriptBuffer {
        ScriptBuffer::from_lines(
            texts
                .iter()
                .map(|t| ScriptLine::new(*t, ElementType::Action))
                .collect(),
        )
    }

    #[test]
    fn test_position() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.row, 5);
        assert_eq!(pos.col, 10);
        assert_eq!(Position::zero(), Position::new(0, 0));
    }

    #[test]
    fn test_new_buffer_has_one_action_line() {
        let buffer = ScriptBuffer::new();
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(0).map(|l| l.element_type), Some(ElementType::Action));
        assert!(buffer.is_empty());
        assert_eq!(ScriptBuffer::from_lines(Vec::new()), buffer);
    }

    #[test]
    fn test_starter() {
        let buffer = ScriptBuffer::starter();
        let types: Vec<ElementType> = buffer.lines().iter().map(|l| l.element_type).collect();
        assert_eq!(
            types,
            [ElementType::FadeIn, ElementType::SceneHeading, ElementType::Action]
        );
    }

    #[test]
    fn test_insert_char() {
        let mut buffer = buffer(&["hello"]);
        assert!(buffer.insert_char(Position::new(0, 5), '!'));
        assert_eq!(buffer.line(0).unwrap().text, "hello!");
        assert!(!buffer.insert_char(Position::new(0, 9), '?'));
        assert!(!buffer.insert_char(Position::new(3, 0), '?'));
    }

    #[test]
    fn test_insert_char_after_multibyte() {
        let mut buffer = buffer(&["café"]);
        assert!(buffer.insert_char(Position::new(0, 4), 's'));
        assert_eq!(buffer.line(0).unwrap().text, "cafés");
        assert_eq!(buffer.line_length(0), 5);
    }

    #[test]
    fn test_delete_char_before() {
        let mut buffer = buffer(&["héllo"]);
        let new_pos = buffer.delete_char_before(Position::new(0, 2));
        assert_eq!(new_pos, Some(Position::new(0, 1)));
        assert_eq!(buffer.line(0).unwrap().text, "hllo");
        assert_eq!(buffer.delete_char_before(Position::new(0, 0)), None);
    }

    #[test]
    fn test_insert_and_remove_line() {
        let mut buffer = buffer(&["one", "three"]);
        assert!(buffer.insert_line(1, ScriptLine::new("two", ElementType::Dialogue)));
        assert_eq!(buffer.as_plain_text(), "one\ntwo\nthree");
        assert!(!buffer.insert_line(9, ScriptLine::empty(ElementType::Action)));

        let removed = buffer.remove_line(1).unwrap();
        assert_eq!(removed.element_type, ElementType::Dialogue);
        assert_eq!(buffer.line_count(), 2);
    }

    #[test]
    fn test_remove_last_line_refused() {
        let mut buffer = buffer(&["only"]);
        assert_eq!(buffer.remove_line(0), None);
        assert_eq!(buffer.line_count(), 1);
    }

    #[test]
    fn test_join_with_previous() {
        let mut buffer = buffer(&["hello", "world"]);
        buffer.set_element_type(0, ElementType::Character);
        let pos = buffer.join_with_previous(1);
        assert_eq!(pos, Some(Position::new(0, 5)));
        assert_eq!(buffer.line_count(), 1);
        assert_eq!(buffer.line(0).unwrap().text, "helloworld");
        assert_eq!(buffer.line(0).unwrap().element_type, ElementType::Character);
        assert_eq!(buffer.join_with_previous(0), None);
    }

    #[test]
    fn test_word_count() {
        let buffer = buffer(&["INT. HOUSE - DAY", "", "  He  sits. "]);
        assert_eq!(buffer.word_count(), 6);
    }
}
