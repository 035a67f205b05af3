//! Monospace word-wrap estimation
//!
//! Approximates the greedy word wrap of the fixed-width font used by the
//! PDF export: words are packed onto a row until the next word plus one
//! separating space would exceed the per-row character budget. Words are
//! never broken, so an overlong word simply occupies its own row.
//!
//! Counting and splitting share [`pack_words`], which keeps the editor's
//! page estimate and the exported rows in agreement.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use unicode_width::UnicodeWidthStr;

/// Character budget of one row, `floor(max_width_units / avg_char_width)`.
pub fn max_chars_per_line(max_width_units: f32, avg_char_width: f32) -> usize {
    if !(max_width_units > 0.0 && avg_char_width > 0.0) {
        return 0;
    }
    // Truncation is floor for positive values
    (max_width_units / avg_char_width) as usize
}

/// Number of visual rows `text` occupies in `max_width_units`. Always >= 1.
pub fn estimate_wrapped_line_count(text: &str, max_width_units: f32, avg_char_width: f32) -> usize {
    let max_chars = max_chars_per_line(max_width_units, avg_char_width);
    pack_words(text, max_chars, |_, _| {})
}

/// Split `text` into the rows counted by [`estimate_wrapped_line_count`].
///
/// Words on a row are joined by a single space. Empty text yields one
/// empty row.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut rows = vec![String::new()];
    pack_words(text, max_chars, |word, new_row| {
        if new_row {
            rows.push(String::new());
        }
        // Invariant: rows is never empty
        if let Some(row) = rows.last_mut() {
            if !row.is_empty() {
                row.push(' ');
            }
            row.push_str(word);
        }
    });
    rows
}

/// Greedy packer. Calls `place(word, starts_new_row)` for each word and
/// returns the row count. A zero budget never breaks.
fn pack_words<'a>(text: &'a str, max_chars: usize, mut place: impl FnMut(&'a str, bool)) -> usize {
    let mut rows = 1;
    let mut row_width = 0;
    let mut row_empty = true;

    for word in text.split_whitespace() {
        let width = word.width();
        let breaks = !row_empty && max_chars > 0 && row_width + 1 + width > max_chars;
        if breaks {
            rows += 1;
            row_width = width;
        } else if row_empty {
            row_width = width;
        } else {
            row_width += 1 + width;
        }
        row_empty = false;
        place(word, breaks);
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_from_width() {
        assert_eq!(max_chars_per_line(160.0, 3.5), 45);
        assert_eq!(max_chars_per_line(20.0, 3.5), 5);
        assert_eq!(max_chars_per_line(3.0, 3.5), 0);
        assert_eq!(max_chars_per_line(160.0, 0.0), 0);
        assert_eq!(max_chars_per_line(-1.0, 3.5), 0);
    }

    #[test]
    fn test_empty_text_is_one_row() {
        assert_eq!(estimate_wrapped_line_count("", 160.0, 3.5), 1);
        assert_eq!(estimate_wrapped_line_count("   ", 160.0, 3.5), 1);
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn test_greedy_packing() {
        // 10 chars per row
        assert_eq!(estimate_wrapped_line_count("aaaa bbbb", 35.0, 3.5), 1);
        assert_eq!(estimate_wrapped_line_count("aaaa bbbbb", 35.0, 3.5), 1);
        assert_eq!(estimate_wrapped_line_count("aaaa bbbbbb", 35.0, 3.5), 2);
        assert_eq!(
            wrap_text("the quick brown fox jumps", 10),
            vec!["the quick", "brown fox", "jumps"]
        );
    }

    #[test]
    fn test_first_row_gets_full_budget() {
        // First and later rows hold the same width
        assert_eq!(
            wrap_text("aaaa bbbbb cccc ddddd", 10),
            vec!["aaaa bbbbb", "cccc ddddd"]
        );
        assert_eq!(estimate_wrapped_line_count("aaaa bbbbb cccc ddddd", 35.0, 3.5), 2);
    }

    #[test]
    fn test_long_word_keeps_own_row() {
        assert_eq!(estimate_wrapped_line_count("supercalifragilistic", 35.0, 3.5), 1);
        assert_eq!(
            wrap_text("a supercalifragilistic b", 10),
            vec!["a", "supercalifragilistic", "b"]
        );
    }

    #[test]
    fn test_zero_budget_never_breaks() {
        assert_eq!(estimate_wrapped_line_count("many words in here", 1.0, 3.5), 1);
        assert_eq!(wrap_text("many words", 0), vec!["many words"]);
    }

    #[test]
    fn test_collapses_whitespace_runs() {
        assert_eq!(wrap_text("a   b\tc", 45), vec!["a b c"]);
    }

    #[test]
    fn test_wide_glyphs_count_two_cells() {
        // Each ideograph is two cells wide
        assert_eq!(estimate_wrapped_line_count("日本 語語語", 35.0, 3.5), 2);
    }

    #[test]
    fn test_rows_match_estimate() {
        let samples = [
            "",
            "short",
            "A considerably longer action line that should wrap across several rows of text.",
            "word word word word word word word word word word word word",
            "x",
        ];
        for text in samples {
            for chars in [0usize, 1, 5, 10, 45] {
                let width = chars as f32 * 3.5;
                assert_eq!(
                    wrap_text(text, chars).len(),
                    estimate_wrapped_line_count(text, width, 3.5),
                    "text={text:?} chars={chars}"
                );
            }
        }
    }
}
