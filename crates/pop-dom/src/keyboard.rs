//! Keyboard Events
//!
//! Keyboard payload carried by key events, with key codes and modifiers.

/// Keyboard event payload
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyboardData {
    /// Symbolic key value (`"w"`, `"ArrowUp"`)
    pub key: String,
    /// Physical key code (`"KeyW"`)
    pub code: String,
    pub key_code: u32,
    pub char_code: u32,
    pub which: u32,
    pub location: u32,
    pub repeat: bool,
    pub modifiers: KeyModifiers,
}

impl KeyboardData {
    pub fn parsed_key(&self) -> Key {
        Key::parse(&self.key)
    }
}

/// Key value as seen by programs; keys nothing binds stay `Unidentified`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Character(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Space,
    Control,
    Unidentified(String),
}

impl Key {
    pub fn parse(s: &str) -> Self {
        match s {
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            " " | "Spacebar" => Self::Space,
            "Control" => Self::Control,
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Self::Character(c),
                    _ => Self::Unidentified(s.to_string()),
                }
            }
        }
    }
}

/// Modifier flags as recorded on the input event
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyModifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyModifiers {
    pub fn from_flags(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Self {
        Self { shift, ctrl, alt, meta }
    }
}
