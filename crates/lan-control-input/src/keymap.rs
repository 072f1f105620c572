//! Mapping between platform key identities and the host's key names.
//!
//! The host understands a small canonical name space: lower-case letters
//! and digits, glyph names for punctuation (`minus`, `leftbracket`, ...),
//! named special keys (`enter`, `esc`, `up`, ...), and modifier names
//! (`shift`, `ctrl`, `alt`, `command`). Shifted glyphs collapse onto the
//! unshifted key that produces them, so `!` is sent as `1`.

/// Map a single-character or legacy key identity to a canonical key name.
///
/// Returns `None` for anything that has no stable physical key (named keys,
/// non-ASCII characters, multi-character identities).
pub fn normalize(key: &str) -> Option<&'static str> {
    let mut chars = key.chars();
    let (Some(c), None) = (chars.next(), chars.next()) else {
        return (key == "Spacebar").then_some("space");
    };
    shifted_digit(c)
        .or_else(|| (c == ' ').then_some("space"))
        .or_else(|| punctuation(c))
        .or_else(|| alphanumeric(c))
}

fn shifted_digit(c: char) -> Option<&'static str> {
    let digit = match c {
        '!' => "1",
        '@' => "2",
        '#' => "3",
        '$' => "4",
        '%' => "5",
        '^' => "6",
        '&' => "7",
        '*' => "8",
        '(' => "9",
        ')' => "0",
        _ => return None,
    };
    Some(digit)
}

fn punctuation(c: char) -> Option<&'static str> {
    let name = match c {
        '-' | '_' => "minus",
        '=' | '+' => "equals",
        '[' | '{' => "leftbracket",
        ']' | '}' => "rightbracket",
        '\\' | '|' => "backslash",
        ';' | ':' => "semicolon",
        '\'' | '"' => "quote",
        ',' | '<' => "comma",
        '.' | '>' => "period",
        '/' | '?' => "slash",
        '`' | '~' => "grave",
        _ => return None,
    };
    Some(name)
}

const LETTERS: [&str; 26] = [
    "a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m", "n", "o", "p", "q", "r", "s",
    "t", "u", "v", "w", "x", "y", "z",
];
const DIGITS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

fn alphanumeric(c: char) -> Option<&'static str> {
    let lower = c.to_ascii_lowercase();
    match lower {
        'a'..='z' => Some(LETTERS[(lower as usize) - ('a' as usize)]),
        '0'..='9' => Some(DIGITS[(lower as usize) - ('0' as usize)]),
        _ => None,
    }
}

/// Named keys that are always sent as a single press.
const SPECIAL_KEYS: [(&str, &str); 13] = [
    ("Enter", "enter"),
    ("Backspace", "backspace"),
    ("Tab", "tab"),
    ("Escape", "esc"),
    ("ArrowUp", "up"),
    ("ArrowDown", "down"),
    ("ArrowLeft", "left"),
    ("ArrowRight", "right"),
    ("Delete", "delete"),
    ("Home", "home"),
    ("End", "end"),
    ("PageUp", "pageup"),
    ("PageDown", "pagedown"),
];

/// Canonical name of a special key, e.g. `ArrowUp` → `up`.
pub fn special_key(key: &str) -> Option<&'static str> {
    SPECIAL_KEYS
        .iter()
        .find(|(raw, _)| *raw == key)
        .map(|(_, name)| *name)
}

/// A modifier key the host can hold down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Modifier {
    Shift,
    Ctrl,
    Alt,
    Command,
}

impl Modifier {
    pub const ALL: [Modifier; 4] = [Self::Shift, Self::Ctrl, Self::Alt, Self::Command];

    /// Name on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shift => "shift",
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Command => "command",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl std::fmt::Display for Modifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Modifier for a platform modifier key identity (`Control` → [`Modifier::Ctrl`]).
pub fn modifier_key(key: &str) -> Option<Modifier> {
    match key {
        "Shift" => Some(Modifier::Shift),
        "Control" => Some(Modifier::Ctrl),
        "Alt" => Some(Modifier::Alt),
        "Meta" => Some(Modifier::Command),
        _ => None,
    }
}

/// Resolve either a platform key identity or an already-canonical name.
///
/// Accepts `ArrowUp` as well as `up`, `Control` as well as `ctrl`, and `!`
/// as well as `1`.
pub fn canonical_key_name(name: &str) -> Option<&'static str> {
    if let Some(special) = special_key(name) {
        return Some(special);
    }
    if let Some(modifier) = modifier_key(name) {
        return Some(modifier.as_str());
    }
    if let Some(normalized) = normalize(name) {
        return Some(normalized);
    }
    let lower = name.to_ascii_lowercase();
    if let Some(modifier) = Modifier::from_name(&lower) {
        return Some(modifier.as_str());
    }
    SPECIAL_KEYS
        .iter()
        .map(|(_, canonical)| *canonical)
        .chain([
            "space", "minus", "equals", "leftbracket", "rightbracket", "backslash",
            "semicolon", "quote", "comma", "period", "slash", "grave",
        ])
        .find(|canonical| *canonical == lower)
}
