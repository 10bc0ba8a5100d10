//! Toolbar items contributed by plugins
//!
//! An item carries everything the host needs to draw a button (icon, label,
//! tooltip) and the [`ToolbarAction`] the editor runs when it is pressed or
//! when its hotkey matches.

use folio_model::{ElementType, Mark};
use serde::Serialize;

use crate::keys::{Hotkey, Platform};

#[derive(Debug, Clone, PartialEq)]
pub enum ToolbarAction {
    ToggleMark { mark: Mark, exclusive: Vec<Mark> },
    ToggleList(ElementType),
    InsertTable { rows: usize, columns: usize },
    InsertSubSection,
    ShowLink,
    ShowEquation { inline: bool },
    ShowReference,
    ShowShortcuts,
}

impl ToolbarAction {
    pub fn toggle_mark(mark: Mark) -> Self {
        ToolbarAction::ToggleMark {
            mark,
            exclusive: mark.exclusive_with().to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarItem {
    pub id: &'static str,
    pub icon: &'static str,
    pub label: &'static str,
    pub hotkey: Option<Hotkey>,
    pub action: ToolbarAction,
}

impl ToolbarItem {
    pub fn new(id: &'static str, icon: &'static str, label: &'static str, action: ToolbarAction) -> Self {
        Self {
            id,
            icon,
            label,
            hotkey: None,
            action,
        }
    }

    pub fn with_hotkey(mut self, hotkey: Hotkey) -> Self {
        self.hotkey = Some(hotkey);
        self
    }

    /// "Bold (Ctrl+B)"
    pub fn tooltip(&self, platform: Platform) -> String {
        match &self.hotkey {
            Some(hotkey) => format!("{} ({})", self.label, hotkey.label(platform)),
            None => self.label.to_string(),
        }
    }
}

/// One row of the keyboard shortcut listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Shortcut {
    pub label: String,
    pub keys: String,
}

/// Every item with a hotkey, in toolbar order
pub fn shortcut_listing(items: &[ToolbarItem], platform: Platform) -> Vec<Shortcut> {
    items
        .iter()
        .filter_map(|item| {
            let hotkey = item.hotkey.as_ref()?;
            Some(Shortcut {
                label: item.label.to_string(),
                keys: hotkey.label(platform),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tooltip_includes_hotkey() {
        let item = ToolbarItem::new("bold", "bold", "Bold", ToolbarAction::toggle_mark(Mark::Bold))
            .with_hotkey(Hotkey::modified("b"));
        assert_eq!(item.tooltip(Platform::Other), "Bold (Ctrl+B)");
        assert_eq!(item.tooltip(Platform::Mac), "Bold (⌘B)");
    }

    #[test]
    fn test_listing_skips_items_without_hotkey() {
        let items = vec![
            ToolbarItem::new("table", "table", "Table", ToolbarAction::InsertTable { rows: 2, columns: 2 }),
            ToolbarItem::new("italic", "italic", "Italic", ToolbarAction::toggle_mark(Mark::Italic))
                .with_hotkey(Hotkey::modified("i")),
        ];
        assert_eq!(
            shortcut_listing(&items, Platform::Other),
            vec![Shortcut {
                label: "Italic".to_string(),
                keys: "Ctrl+I".to_string(),
            }]
        );
    }

    #[test]
    fn test_subscript_excludes_superscript() {
        assert_eq!(
            ToolbarAction::toggle_mark(Mark::Subscript),
            ToolbarAction::ToggleMark {
                mark: Mark::Subscript,
                exclusive: vec![Mark::Superscript],
            }
        );
    }
}
