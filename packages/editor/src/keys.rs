//! Keyboard events and hotkey matching
//!
//! Hotkeys are written as `+`-separated chords such as `mod+shift+b`, where
//! `mod` is Ctrl on most platforms and Cmd on macOS.

use std::fmt;
use std::str::FromStr;

use crate::{EditorError, EditorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Platform {
    Mac,
    #[default]
    Other,
}

/// A key press delivered to the editor
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
    default_prevented: bool,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    /// The event a chord like `mod+b` produces; `mod` maps to Ctrl
    pub fn chord(spec: &str) -> EditorResult<Self> {
        let hotkey: Hotkey = spec.parse()?;
        Ok(Self {
            key: hotkey.key,
            ctrl: hotkey.modifier,
            meta: false,
            shift: hotkey.shift,
            alt: hotkey.alt,
            default_prevented: false,
        })
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn is_mod(&self) -> bool {
        self.ctrl || self.meta
    }

    /// A single printable character without Ctrl/Cmd held
    pub fn is_printable(&self) -> bool {
        !self.is_mod() && self.key.chars().count() == 1
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn is_default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hotkey {
    /// Lowercased key name
    pub key: String,
    pub modifier: bool,
    pub shift: bool,
    pub alt: bool,
}

impl Hotkey {
    /// `mod+<key>`
    pub fn modified(key: &str) -> Self {
        Self {
            key: key.to_lowercase(),
            modifier: true,
            shift: false,
            alt: false,
        }
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn matches(&self, event: &KeyEvent) -> bool {
        self.modifier == event.is_mod()
            && self.shift == event.shift
            && self.alt == event.alt
            && self.key == event.key.to_lowercase()
    }

    /// Human readable form for tooltips and the shortcut listing
    pub fn label(&self, platform: Platform) -> String {
        let key = if self.key.chars().count() == 1 {
            self.key.to_uppercase()
        } else {
            let mut chars = self.key.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        };

        match platform {
            Platform::Mac => {
                let mut label = String::new();
                if self.modifier {
                    label.push('⌘');
                }
                if self.alt {
                    label.push('⌥');
                }
                if self.shift {
                    label.push('⇧');
                }
                label.push_str(&key);
                label
            }
            Platform::Other => {
                let mut parts = Vec::new();
                if self.modifier {
                    parts.push("Ctrl".to_string());
                }
                if self.alt {
                    parts.push("Alt".to_string());
                }
                if self.shift {
                    parts.push("Shift".to_string());
                }
                parts.push(key);
                parts.join("+")
            }
        }
    }
}

impl FromStr for Hotkey {
    type Err = EditorError;

    fn from_str(spec: &str) -> Result<Self, Self::Err> {
        let mut hotkey = Hotkey {
            key: String::new(),
            modifier: false,
            shift: false,
            alt: false,
        };

        let parts: Vec<&str> = spec.split('+').map(str::trim).collect();
        let Some((key, modifiers)) = parts.split_last() else {
            return Err(EditorError::InvalidHotkey(spec.to_string()));
        };

        for modifier in modifiers {
            match modifier.to_lowercase().as_str() {
                "mod" | "ctrl" | "cmd" | "meta" => hotkey.modifier = true,
                "shift" => hotkey.shift = true,
                "alt" | "option" => hotkey.alt = true,
                _ => return Err(EditorError::InvalidHotkey(spec.to_string())),
            }
        }

        if key.is_empty() {
            return Err(EditorError::InvalidHotkey(spec.to_string()));
        }
        hotkey.key = key.to_lowercase();
        Ok(hotkey)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label(Platform::Other))
    }
}
