//! Element classification
//!
//! Maps free text to a screenplay element type. Both functions are total:
//! any input, including empty or odd-character strings, yields a result.
//!
//! Comparisons against keywords always use the uppercased text, so
//! `"Later"` is a time transition. The character-cue rule runs first,
//! which makes the all-caps `"LATER"` a character cue instead.

use crate::element::ElementType;

const SCENE_PREFIXES: [&str; 2] = ["INT.", "EXT."];
const LONG_SCENE_PREFIXES: [&str; 2] = ["INTERIOR", "EXTERIOR"];
const CUT_TRANSITIONS: [&str; 5] = [
    "CUT TO:",
    "DISSOLVE TO:",
    "MATCH CUT:",
    "JUMP CUT:",
    "SMASH CUT:",
];
const FADE_SUFFIXES: [&str; 4] = [
    "FADE TO BLACK",
    "FADE TO WHITE",
    "FADE IN FROM BLACK",
    "FADE IN FROM WHITE",
];
const TIME_TRANSITIONS: [&str; 6] = [
    "LATER",
    "MEANWHILE",
    "EARLIER",
    "THE NEXT DAY",
    "MOMENTS LATER",
    "SUDDENLY",
];
const MAX_CHARACTER_CUE_LEN: usize = 50;

/// Classify a line of text with the full rule set.
///
/// Used for bulk ingestion, where every pasted line is classified on its own.
pub fn classify(text: &str) -> ElementType {
    let text = text.trim();
    let upper = text.to_uppercase();

    if let Some(ty) = classify_obvious(&upper) {
        return ty;
    }
    if is_wrapped_in_parens(text) {
        return ElementType::Parenthetical;
    }
    if is_character_cue(text, &upper) {
        return ElementType::Character;
    }
    if LONG_SCENE_PREFIXES.iter().any(|p| upper.starts_with(p)) {
        return ElementType::SceneHeading;
    }
    if FADE_SUFFIXES.iter().any(|s| upper.ends_with(s)) {
        return ElementType::Transition;
    }
    if TIME_TRANSITIONS.contains(&upper.as_str()) {
        return ElementType::Transition;
    }
    ElementType::Action
}

/// Conservative classification used while typing.
///
/// Only scene headings, fades and cut transitions are recognised; `None`
/// means the line keeps whatever type it already has.
pub fn classify_live(text: &str) -> Option<ElementType> {
    classify_obvious(&text.trim().to_uppercase())
}

fn classify_obvious(upper: &str) -> Option<ElementType> {
    if is_scene_heading(upper) {
        return Some(ElementType::SceneHeading);
    }
    match upper {
        "FADE IN:" => Some(ElementType::FadeIn),
        "FADE OUT." | "FADE OUT" => Some(ElementType::FadeOut),
        _ if CUT_TRANSITIONS.contains(&upper) => Some(ElementType::Transition),
        _ => None,
    }
}

fn is_scene_heading(upper: &str) -> bool {
    SCENE_PREFIXES.iter().any(|prefix| {
        upper
            .strip_prefix(prefix)
            .and_then(|rest| rest.chars().next())
            .is_some_and(char::is_whitespace)
    })
}

/// `(` ... `)` with no closing paren in between
fn is_wrapped_in_parens(text: &str) -> bool {
    text.len() >= 2
        && text.starts_with('(')
        && text.ends_with(')')
        && !text[1..text.len() - 1].contains(')')
}

/// All-caps speaker name, optionally followed by one parenthetical
/// extension. Sentence punctuation anywhere rejects the cue, so `(V.O.)`
/// fails while `(CONT'D)` passes.
fn is_character_cue(text: &str, upper: &str) -> bool {
    if text != upper || text.chars().count() > MAX_CHARACTER_CUE_LEN {
        return false;
    }
    if text.contains(|ch: char| matches!(ch, '.' | ',' | '!' | '?')) {
        return false;
    }

    match text.chars().next() {
        Some(first) if first.is_ascii_uppercase() => {}
        _ => return false,
    }

    let name_end = text
        .char_indices()
        .skip(1)
        .find(|(_, ch)| !(ch.is_ascii_uppercase() || ch.is_whitespace()))
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());
    let extension = &text[name_end..];
    extension.is_empty() || is_wrapped_in_parens(extension)
}
