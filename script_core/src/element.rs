//! Screenplay element types and script lines

use alloc::string::String;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Screenplay formatting category of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(rename_all = "kebab-case"))]
pub enum ElementType {
    SceneHeading,
    Action,
    Character,
    Dialogue,
    Parenthetical,
    Transition,
    FadeIn,
    FadeOut,
}

impl ElementType {
    /// Order used by Tab cycling and the default Enter transition.
    /// Fade-in and fade-out are not part of it.
    pub const CYCLE: [ElementType; 6] = [
        ElementType::SceneHeading,
        ElementType::Action,
        ElementType::Character,
        ElementType::Dialogue,
        ElementType::Parenthetical,
        ElementType::Transition,
    ];

    pub const ALL: [ElementType; 8] = [
        ElementType::SceneHeading,
        ElementType::Action,
        ElementType::Character,
        ElementType::Dialogue,
        ElementType::Parenthetical,
        ElementType::Transition,
        ElementType::FadeIn,
        ElementType::FadeOut,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::SceneHeading => "scene-heading",
            ElementType::Action => "action",
            ElementType::Character => "character",
            ElementType::Dialogue => "dialogue",
            ElementType::Parenthetical => "parenthetical",
            ElementType::Transition => "transition",
            ElementType::FadeIn => "fade-in",
            ElementType::FadeOut => "fade-out",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|ty| ty.as_str() == name)
    }

    /// Successor in [`Self::CYCLE`], wrapping to scene-heading after
    /// transition and for types outside the cycle.
    pub fn next_in_cycle(self) -> Self {
        match Self::CYCLE.iter().position(|ty| *ty == self) {
            Some(idx) if idx + 1 < Self::CYCLE.len() => Self::CYCLE[idx + 1],
            _ => ElementType::SceneHeading,
        }
    }

    /// Type of the line created by Enter after a line of this type
    pub fn next_on_enter(self) -> Self {
        match self {
            ElementType::Character => ElementType::Dialogue,
            ElementType::Dialogue => ElementType::Character,
            ElementType::Parenthetical => ElementType::Dialogue,
            other => other.next_in_cycle(),
        }
    }
}

/// One line of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptLine {
    pub text: String,
    pub element_type: ElementType,
    /// Set when the user picked the type by hand; suppresses auto-format
    /// for the next input event on this line only.
    pub explicitly_typed: bool,
}

impl ScriptLine {
    pub fn new(text: impl Into<String>, element_type: ElementType) -> Self {
        Self {
            text: text.into(),
            element_type,
            explicitly_typed: false,
        }
    }

    pub fn empty(element_type: ElementType) -> Self {
        Self::new(String::new(), element_type)
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
