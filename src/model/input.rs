// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Input vocabulary shared by events and the key table.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

/// A pointer button as numbered by the display server (1 is the primary).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Button(pub u8);

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Button{}", self.0)
    }
}

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Modifiers: u8 {
        const SHIFT     = 1 << 0;
        const CONTROL   = 1 << 1;
        const ALT       = 1 << 2;
        const SUPER     = 1 << 3;
        const CAPS_LOCK = 1 << 4;
        const NUM_LOCK  = 1 << 5;
    }
}

impl Modifiers {
    const LOCKS: Modifiers = Modifiers::CAPS_LOCK.union(Modifiers::NUM_LOCK);

    /// Drops lock modifiers, which never take part in matching.
    pub fn without_locks(self) -> Modifiers {
        self.difference(Self::LOCKS)
    }

    /// True if exactly the modifiers in `required` are held, ignoring locks.
    pub fn eq_ignoring_locks(self, required: Modifiers) -> bool {
        self.without_locks() == required.without_locks()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub enum Key {
    /// A printable key, stored lowercase.
    Char(char),
    Left,
    Right,
    Up,
    Down,
    Return,
    Escape,
    Tab,
    Space,
}

const NAMED_KEYS: &[(&str, Key)] = &[
    ("left", Key::Left),
    ("right", Key::Right),
    ("up", Key::Up),
    ("down", Key::Down),
    ("return", Key::Return),
    ("enter", Key::Return),
    ("escape", Key::Escape),
    ("esc", Key::Escape),
    ("tab", Key::Tab),
    ("space", Key::Space),
];

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Key::Char(c) = self {
            return write!(f, "{c}");
        }
        let (name, _) = NAMED_KEYS
            .iter()
            .find(|(_, key)| key == self)
            .expect("every named key is in the table");
        f.write_str(name)
    }
}

impl FromStr for Key {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next())
            && !c.is_whitespace()
            && !c.is_control()
        {
            return Ok(Key::Char(c.to_ascii_lowercase()));
        }
        NAMED_KEYS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|&(_, key)| key)
            .ok_or_else(|| HotkeyParseError::UnknownKey(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HotkeyParseError {
    #[error("empty hotkey")]
    Empty,
    #[error("unknown modifier {0:?}")]
    UnknownModifier(String),
    #[error("unknown key {0:?}")]
    UnknownKey(String),
}

/// A key together with the modifiers that must be held, like `alt + shift + q`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, SerializeDisplay, DeserializeFromStr)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl Hotkey {
    pub fn new(modifiers: Modifiers, key: Key) -> Self {
        Hotkey { modifiers: modifiers.without_locks(), key }
    }

    /// Whether a key press triggers this hotkey. Lock modifiers are ignored,
    /// but all other modifiers must match exactly.
    pub fn matches(&self, modifiers: Modifiers, key: Key) -> bool {
        self.key == key && self.modifiers == modifiers.without_locks()
    }
}

fn parse_modifier(s: &str) -> Result<Modifiers, HotkeyParseError> {
    Ok(match s.to_ascii_lowercase().as_str() {
        "shift" => Modifiers::SHIFT,
        "ctrl" | "control" => Modifiers::CONTROL,
        "alt" | "mod1" | "meta" => Modifiers::ALT,
        "super" | "mod4" | "win" => Modifiers::SUPER,
        _ => return Err(HotkeyParseError::UnknownModifier(s.to_owned())),
    })
}

impl FromStr for Hotkey {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A trailing "+" is the plus key itself, as in "alt + +".
        let (rest, key) = match s.trim_end().strip_suffix('+') {
            Some(rest) if rest.trim_end().ends_with('+') || rest.trim().is_empty() => {
                (rest.trim_end().strip_suffix('+').unwrap_or(""), "+")
            }
            _ => match s.rsplit_once('+') {
                Some((rest, key)) => (rest, key.trim()),
                None => ("", s.trim()),
            },
        };
        if key.is_empty() {
            return Err(HotkeyParseError::Empty);
        }
        let mut modifiers = Modifiers::empty();
        for part in rest.split('+').map(str::trim).filter(|p| !p.is_empty()) {
            modifiers |= parse_modifier(part)?;
        }
        Ok(Hotkey::new(modifiers, key.parse()?))
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (flag, name) in [
            (Modifiers::CONTROL, "ctrl"),
            (Modifiers::ALT, "alt"),
            (Modifiers::SUPER, "super"),
            (Modifiers::SHIFT, "shift"),
        ] {
            if self.modifiers.contains(flag) {
                write!(f, "{name} + ")?;
            }
        }
        write!(f, "{}", self.key)
    }
}
