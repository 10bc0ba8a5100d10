//! Bulleted and numbered lists.
//!
//! Lists hold list items, list items hold blocks. Adjacent lists of the same
//! kind are merged so toggling a list next to an existing one extends it.

use std::rc::Rc;

use folio_model::{Element, ElementType, Path, Range};
use tracing::debug;

use crate::keys::{Hotkey, KeyEvent};
use crate::normalize::{Fix, NodeRef, NormalizeContext, Normalizer};
use crate::operations::NodeProperties;
use crate::plugin::{run_matching_hotkey, Plugin};
use crate::render::{ElementRenderer, TagRenderer};
use crate::toolbar::{ToolbarAction, ToolbarItem};
use crate::transforms::{is_empty_text_block, split_path};
use crate::{Editor, EditorResult};

pub struct ListsPlugin;

impl Plugin for ListsPlugin {
    fn name(&self) -> &'static str {
        "lists"
    }

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        Some(Rc::new(ListsNormalizer))
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        vec![
            (ElementType::BulletedList, Rc::new(TagRenderer::new("ul"))),
            (ElementType::NumberedList, Rc::new(TagRenderer::new("ol"))),
            (ElementType::ListItem, Rc::new(TagRenderer::new("li"))),
        ]
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        vec![
            ToolbarItem::new(
                "bulleted-list",
                "list-bulleted",
                "Bulleted list",
                ToolbarAction::ToggleList(ElementType::BulletedList),
            )
            .with_hotkey(Hotkey::modified("8").shift()),
            ToolbarItem::new(
                "numbered-list",
                "list-numbered",
                "Numbered list",
                ToolbarAction::ToggleList(ElementType::NumberedList),
            )
            .with_hotkey(Hotkey::modified("7").shift()),
        ]
    }

    fn on_key_down(&self, event: &mut KeyEvent, editor: &mut Editor) -> EditorResult<()> {
        run_matching_hotkey(&self.toolbar(), event, editor)?;
        if event.is_default_prevented() || event.is_mod() || event.shift {
            return Ok(());
        }

        let Some(point) = editor
            .selection()
            .filter(|selection| selection.is_collapsed())
            .map(|selection| selection.anchor.clone())
        else {
            return Ok(());
        };
        let document = editor.document();
        let Some((item_path, item)) = list_item_above(editor, &point.path) else {
            return Ok(());
        };
        let Some((block_path, block)) = document.text_block_above(&point.path) else {
            return Ok(());
        };
        let lone_empty_block = item.children.len() == 1 && is_empty_text_block(block);
        let at_item_start =
            block_path == item_path.child(0) && document.start_of(&block_path).as_ref() == Some(&point);

        match event.key.as_str() {
            "Enter" => {
                event.prevent_default();
                if lone_empty_block {
                    debug!(path = %item_path, "Enter on an empty list item; lifting it");
                    lift_item(editor, &item_path)
                } else {
                    editor.split_up_to(&point, &item_path).map(drop)
                }
            }
            "Backspace" if at_item_start => {
                event.prevent_default();
                lift_item(editor, &item_path)
            }
            _ => Ok(()),
        }
    }
}

pub struct ListsNormalizer;

impl Normalizer for ListsNormalizer {
    fn name(&self) -> &'static str {
        "lists"
    }

    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        if entry.holds_blocks() {
            let children = entry.children();
            let adjacent = children.windows(2).position(|pair| match (&pair[0], &pair[1]) {
                (folio_model::Node::Element(left), folio_model::Node::Element(right)) => {
                    left.kind.is_list() && left.kind == right.kind
                }
                _ => false,
            });
            if let Some(index) = adjacent {
                return cx.fix(Fix::MergeNode {
                    path: path.child(index + 1),
                });
            }
        }

        match entry.kind() {
            Some(kind) if kind.is_list() => {
                let stray = entry
                    .children()
                    .iter()
                    .position(|child| !child.is_type(&ElementType::ListItem));
                match stray {
                    Some(index) => cx.fix(Fix::WrapNodes {
                        parent: path.clone(),
                        start: index,
                        end: index + 1,
                        wrapper: Element::new(ElementType::ListItem, Vec::new()),
                    }),
                    None => false,
                }
            }
            Some(ElementType::ListItem) => {
                let in_list = path
                    .parent()
                    .and_then(|parent| cx.document().type_at(&parent))
                    .is_some_and(ElementType::is_list);
                if in_list {
                    return false;
                }
                cx.fix(Fix::UnwrapNode { path: path.clone() })
            }
            _ => false,
        }
    }
}

/// Turn the block at the caret into a list item of `kind`, switch the
/// enclosing list to `kind`, or lift the item out when it already is one
pub fn toggle_list(editor: &mut Editor, kind: &ElementType) -> EditorResult<()> {
    let Some(anchor) = editor.selection().map(|selection| selection.anchor.path.clone()) else {
        return Ok(());
    };
    let Some((block_path, block)) = editor.document().text_block_above(&anchor) else {
        return Ok(());
    };
    if block.kind == ElementType::Caption {
        return Ok(());
    }

    if let Some((item_path, _)) = list_item_above(editor, &anchor) {
        let (list_path, _) = split_path(&item_path)?;
        if editor.document().type_at(&list_path) == Some(kind) {
            return lift_item(editor, &item_path);
        }
        return editor.set_node(&list_path, NodeProperties::kind(kind.clone()));
    }

    let (parent, index) = split_path(&block_path)?;
    editor.without_normalizing(|editor| {
        editor.wrap_nodes(&parent, index..index + 1, Element::new(ElementType::ListItem, Vec::new()))?;
        editor.wrap_nodes(&parent, index..index + 1, Element::new(kind.clone(), Vec::new()))
    })
}

/// Move a list item's blocks out of the list, splitting the list around it
pub fn lift_item(editor: &mut Editor, item_path: &Path) -> EditorResult<()> {
    let (list_path, index) = split_path(item_path)?;
    let len = editor
        .document()
        .children_at(&list_path)
        .map_or(0, <[folio_model::Node]>::len);
    let selection = editor.selection().cloned();

    editor.without_normalizing(|editor| {
        if index + 1 < len {
            editor.split_node(&list_path, index + 1)?;
        }
        let list_path = if index > 0 {
            editor.split_node(&list_path, index)?;
            let (parent, list_index) = split_path(&list_path)?;
            parent.child(list_index + 1)
        } else {
            list_path.clone()
        };
        editor.unwrap_node(&list_path.child(0))?;
        editor.unwrap_node(&list_path)?;
        restore_selection(editor, selection)
    })
}

fn restore_selection(editor: &mut Editor, selection: Option<Range>) -> EditorResult<()> {
    // Moves keep the caret attached; only re-select if it was lost
    if editor.selection().is_none() {
        if let Some(point) = selection.and_then(|selection| editor.document().point_near(&selection.anchor.path)) {
            editor.select(Range::collapsed(point))?;
        }
    }
    Ok(())
}

fn list_item_above<'a>(editor: &'a Editor, path: &Path) -> Option<(Path, &'a Element)> {
    editor
        .document()
        .above(path, |element| element.kind == ElementType::ListItem)
}
