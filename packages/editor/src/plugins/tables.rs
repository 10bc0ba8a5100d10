//! Tables: a `table-block` wraps the table and its caption.
//!
//! ```text
//! table-block
//! ├── table
//! │   └── table-row*
//! │       └── table-cell*
//! │           └── blocks
//! └── caption
//! ```

use std::rc::Rc;

use folio_model::{Element, ElementType, Node, Path, Range};

use crate::keys::KeyEvent;
use crate::normalize::{normalize_composite, Fix, NodeRef, NormalizeContext, Normalizer};
use crate::plugin::{run_matching_hotkey, Plugin};
use crate::render::{ElementRenderer, TagRenderer};
use crate::toolbar::{ToolbarAction, ToolbarItem};
use crate::{Editor, EditorResult};

pub const DEFAULT_ROWS: usize = 3;
pub const DEFAULT_COLUMNS: usize = 3;

pub struct TablesPlugin;

impl Plugin for TablesPlugin {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        Some(Rc::new(TablesNormalizer))
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        vec![
            (ElementType::TableBlock, Rc::new(TagRenderer::new("figure"))),
            (ElementType::Table, Rc::new(TagRenderer::new("table"))),
            (ElementType::TableRow, Rc::new(TagRenderer::new("tr"))),
            (ElementType::TableCell, Rc::new(TagRenderer::new("td"))),
        ]
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        vec![ToolbarItem::new(
            "table",
            "table",
            "Table",
            ToolbarAction::InsertTable {
                rows: DEFAULT_ROWS,
                columns: DEFAULT_COLUMNS,
            },
        )]
    }

    /// Tab and Shift+Tab move between cells
    fn on_key_down(&self, event: &mut KeyEvent, editor: &mut Editor) -> EditorResult<()> {
        run_matching_hotkey(&self.toolbar(), event, editor)?;
        if event.is_default_prevented() || event.key != "Tab" || event.is_mod() {
            return Ok(());
        }
        let Some(anchor) = editor.selection().map(|selection| selection.anchor.path.clone()) else {
            return Ok(());
        };
        let Some((table_path, _)) = editor.document().above(&anchor, |element| element.kind == ElementType::Table)
        else {
            return Ok(());
        };
        event.prevent_default();

        let cells: Vec<Path> = editor
            .document()
            .descendants_of(&table_path)
            .filter(|(_, node)| node.is_type(&ElementType::TableCell))
            .map(|(path, _)| path)
            .collect();
        let Some(current) = cells.iter().position(|cell| cell.is_ancestor_of(&anchor)) else {
            return Ok(());
        };
        let target = match event.shift {
            true => current.checked_sub(1),
            false => Some(current + 1),
        };
        match target.and_then(|index| cells.get(index)).and_then(|cell| editor.document().start_of(cell)) {
            Some(start) => editor.select(Range::collapsed(start)),
            None => Ok(()),
        }
    }
}

pub struct TablesNormalizer;

impl Normalizer for TablesNormalizer {
    fn name(&self) -> &'static str {
        "tables"
    }

    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        let Some(element) = entry.element() else {
            return false;
        };
        let Some((parent_path, parent)) = path
            .parent()
            .and_then(|parent_path| Some((parent_path.clone(), NodeRef::at(cx.document(), &parent_path)?)))
        else {
            return false;
        };

        match element.kind {
            ElementType::TableBlock => normalize_composite(element, path, cx),
            ElementType::Table if parent.kind() == Some(&ElementType::TableBlock) => {
                wrap_strays(element, path, ElementType::TableRow, cx)
            }
            ElementType::Table if parent.holds_blocks() => {
                let Some(index) = path.index() else {
                    return false;
                };
                cx.fix(Fix::WrapNodes {
                    parent: parent_path,
                    start: index,
                    end: index + 1,
                    wrapper: Element::new(ElementType::TableBlock, Vec::new()),
                })
            }
            ElementType::TableRow if parent.kind() == Some(&ElementType::Table) => {
                wrap_strays(element, path, ElementType::TableCell, cx)
            }
            ElementType::TableCell if parent.kind() == Some(&ElementType::TableRow) => false,
            ElementType::TableRow | ElementType::TableCell => {
                cx.fix(Fix::UnwrapNode { path: path.clone() })
            }
            _ => false,
        }
    }
}

/// Wrap the first child that is not a `kind` into a new `kind` element
fn wrap_strays(element: &Element, path: &Path, kind: ElementType, cx: &mut NormalizeContext<'_>) -> bool {
    let Some(index) = element.children.iter().position(|child| !child.is_type(&kind)) else {
        return false;
    };
    cx.fix(Fix::WrapNodes {
        parent: path.clone(),
        start: index,
        end: index + 1,
        wrapper: Element::new(kind, Vec::new()),
    })
}

/// A `rows` × `columns` table of empty cells with an empty caption
pub fn table_block(rows: usize, columns: usize) -> Element {
    let row = || {
        let cells = (0..columns.max(1))
            .map(|_| Node::element(ElementType::TableCell, vec![Node::Element(Element::paragraph(""))]))
            .collect();
        Node::element(ElementType::TableRow, cells)
    };
    let table = Element::new(ElementType::Table, (0..rows.max(1)).map(|_| row()).collect());
    Element::new(
        ElementType::TableBlock,
        vec![Node::Element(table), Node::Element(Element::caption())],
    )
}

/// Insert a table at the caret and put the caret in its first cell
pub fn insert_table(editor: &mut Editor, rows: usize, columns: usize) -> EditorResult<Path> {
    editor.insert_block(table_block(rows, columns))
}
