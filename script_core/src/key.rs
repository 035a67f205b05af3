//! Platform-independent key representation

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Platform-independent key event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum Key {
    // Printable text
    Char(char),

    // Cursor movement
    Left,
    Right,
    Up,
    Down,
    Home,
    End,

    // Structural keys
    Enter,
    Backspace,
    Tab,

    // Page navigation (Ctrl+Left / Ctrl+Right in the desktop host)
    PrevPage,
    NextPage,

    // History
    Undo,
    Redo,
}

impl Key {
    /// Convert ASCII byte to Key (for scripted input traces)
    pub fn from_ascii(byte: u8) -> Option<Self> {
        match byte {
            0x08 | 0x7F => Some(Key::Backspace),
            b'\r' | b'\n' => Some(Key::Enter),
            b'\t' => Some(Key::Tab),
            ch if (0x20..0x7F).contains(&ch) => Some(Key::Char(ch as char)),
            _ => None,
        }
    }
}
