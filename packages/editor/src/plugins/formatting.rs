//! Bold, italic, underline, subscript and superscript

use folio_model::Mark;

use crate::keys::Hotkey;
use crate::plugin::Plugin;
use crate::toolbar::{ToolbarAction, ToolbarItem};

pub struct FormattingPlugin;

impl Plugin for FormattingPlugin {
    fn name(&self) -> &'static str {
        "formatting"
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        vec![
            mark_item("bold", "Bold", Mark::Bold, "b"),
            mark_item("italic", "Italic", Mark::Italic, "i"),
            mark_item("underline", "Underline", Mark::Underline, "u"),
            mark_item("subscript", "Subscript", Mark::Subscript, ","),
            mark_item("superscript", "Superscript", Mark::Superscript, "."),
        ]
    }
}

fn mark_item(id: &'static str, label: &'static str, mark: Mark, key: &str) -> ToolbarItem {
    ToolbarItem::new(id, id, label, ToolbarAction::toggle_mark(mark)).with_hotkey(Hotkey::modified(key))
}

#[cfg(test)]
mod tests {
    use folio_model::{Document, Element, Node, Point, Range};

    use crate::keys::KeyEvent;
    use crate::Editor;

    #[test]
    fn test_mod_b_bolds_the_selection() {
        let mut editor = Editor::new(Document::new(vec![Node::Element(Element::paragraph("word"))])).unwrap();
        editor
            .select(Range::new(Point::new([0, 0], 0), Point::new([0, 0], 4)))
            .unwrap();

        let mut event = KeyEvent::chord("mod+b").unwrap();
        editor.handle_key_down(&mut event).unwrap();

        assert!(event.is_default_prevented());
        let (_, leaf) = editor.document().leaves().next().unwrap();
        assert!(leaf.marks.has(folio_model::Mark::Bold));
    }
}
