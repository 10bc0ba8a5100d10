//! The keyboard shortcut help modal. Its content is the editor's
//! [`shortcuts`](crate::Editor::shortcuts) listing.

use tracing::debug;

use crate::keys::Hotkey;
use crate::plugin::Plugin;
use crate::side_channel::{ModalKind, Modals, Origin, SideChannel};
use crate::toolbar::{ToolbarAction, ToolbarItem};
use crate::{Editor, EditorResult};

pub struct ShortcutsPlugin;

impl Plugin for ShortcutsPlugin {
    fn name(&self) -> &'static str {
        "shortcuts"
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        vec![ToolbarItem::new("shortcuts", "keyboard", "Keyboard shortcuts", ToolbarAction::ShowShortcuts)
            .with_hotkey(Hotkey::modified("/"))]
    }

    fn attach(&self, modals: &mut Modals) {
        modals.shortcuts = Some(SideChannel::new(ModalKind::Shortcuts));
    }
}

pub fn show_shortcuts(editor: &mut Editor) -> EditorResult<bool> {
    let selection = editor.selection().cloned();
    let Some(channel) = editor.modals_mut().shortcuts_mut() else {
        debug!("Shortcuts modal is not installed");
        return Ok(false);
    };
    channel.show(selection, (), Origin::User);
    Ok(true)
}

pub fn dismiss_shortcuts(editor: &mut Editor) {
    if let Some(channel) = editor.modals_mut().shortcuts_mut() {
        channel.reset();
    }
    editor.focus();
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::Document;

    use crate::keys::{KeyEvent, Platform};

    #[test]
    fn test_hotkey_opens_help() {
        let mut editor = Editor::new(Document::default()).unwrap();
        editor.handle_key_down(&mut KeyEvent::chord("mod+/").unwrap()).unwrap();
        editor.flush();
        assert_eq!(editor.modals().visible(), Some(ModalKind::Shortcuts));

        dismiss_shortcuts(&mut editor);
        editor.flush();
        assert_eq!(editor.modals().visible(), None);
    }

    #[test]
    fn test_listing_covers_standard_hotkeys() {
        let editor = Editor::new(Document::default()).unwrap();
        let listing = editor.shortcuts(Platform::Mac);
        assert!(listing.iter().any(|shortcut| shortcut.label == "Bold" && shortcut.keys == "⌘B"));
        assert!(listing.iter().any(|shortcut| shortcut.label == "Keyboard shortcuts"));
    }
}
