//! Formatting marks carried by leaves

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ModelError;

/// A single formatting mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Underline,
    Subscript,
    Superscript,
}

impl Mark {
    pub const ALL: [Mark; 5] = [
        Mark::Bold,
        Mark::Italic,
        Mark::Underline,
        Mark::Subscript,
        Mark::Superscript,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Underline => "underline",
            Mark::Subscript => "subscript",
            Mark::Superscript => "superscript",
        }
    }

    /// Marks that can never share a leaf with this one
    pub fn exclusive_with(self) -> &'static [Mark] {
        match self {
            Mark::Subscript => &[Mark::Superscript],
            Mark::Superscript => &[Mark::Subscript],
            _ => &[],
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Mark {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Mark::ALL
            .into_iter()
            .find(|mark| mark.name() == s)
            .ok_or_else(|| ModelError::UnknownMark(s.to_string()))
    }
}

/// The set of marks on a leaf.
///
/// Persisted as optional boolean fields next to `text`; unset marks are omitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Marks {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub underline: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub subscript: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub superscript: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Marks {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn has(&self, mark: Mark) -> bool {
        match mark {
            Mark::Bold => self.bold,
            Mark::Italic => self.italic,
            Mark::Underline => self.underline,
            Mark::Subscript => self.subscript,
            Mark::Superscript => self.superscript,
        }
    }

    /// Set or clear a mark. Setting subscript clears superscript and vice versa.
    pub fn set(&mut self, mark: Mark, on: bool) {
        if on {
            for other in mark.exclusive_with() {
                self.set(*other, false);
            }
        }
        match mark {
            Mark::Bold => self.bold = on,
            Mark::Italic => self.italic = on,
            Mark::Underline => self.underline = on,
            Mark::Subscript => self.subscript = on,
            Mark::Superscript => self.superscript = on,
        }
    }

    pub fn with(mut self, mark: Mark) -> Self {
        self.set(mark, true);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    pub fn iter(&self) -> impl Iterator<Item = Mark> + '_ {
        Mark::ALL.into_iter().filter(move |mark| self.has(*mark))
    }
}

impl FromIterator<Mark> for Marks {
    fn from_iter<I: IntoIterator<Item = Mark>>(iter: I) -> Self {
        let mut marks = Marks::none();
        for mark in iter {
            marks.set(mark, true);
        }
        marks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscript_and_superscript_are_exclusive() {
        let mut marks = Marks::none().with(Mark::Subscript);
        marks.set(Mark::Superscript, true);

        assert!(marks.superscript);
        assert!(!marks.subscript);
    }

    #[test]
    fn test_marks_serialize_only_set_fields() {
        let marks = Marks::none().with(Mark::Bold);
        let json = serde_json::to_value(marks).unwrap();
        assert_eq!(json, serde_json::json!({ "bold": true }));
    }

    #[test]
    fn test_mark_from_str() {
        assert_eq!("italic".parse::<Mark>().unwrap(), Mark::Italic);
        assert!("strike".parse::<Mark>().is_err());
    }
}
