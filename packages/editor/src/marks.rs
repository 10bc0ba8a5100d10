//! Mark toggling.
//!
//! A collapsed selection only changes the pending marks used for the next
//! typed text. An expanded selection splits the edge leaves so the marks land
//! exactly on the selected characters.

use folio_model::{Mark, Marks, Path, Point};
use tracing::debug;

use crate::operations::NodeProperties;
use crate::transforms::split_path;
use crate::{Editor, EditorResult};

/// Whether `mark` is active at the selection: pending marks or the caret's
/// leaf when collapsed, any selected leaf when expanded
pub fn is_mark_active(editor: &Editor, mark: Mark) -> bool {
    let Some(selection) = editor.selection() else {
        return false;
    };
    if selection.is_collapsed() {
        if let Some(marks) = editor.marks() {
            return marks.has(mark);
        }
        return editor
            .document()
            .leaf(&selection.anchor.path)
            .is_ok_and(|leaf| leaf.marks.has(mark));
    }

    let (start, end) = selection.edges();
    selected_leaves(editor, start, end)
        .iter()
        .filter_map(|path| editor.document().leaf(path).ok())
        .any(|leaf| leaf.marks.has(mark))
}

/// Toggle `mark` over the selection, clearing `exclusive` marks when turning it
/// on. Returns whether anything was toggled; selections touching a void are
/// left alone.
pub fn toggle_mark(editor: &mut Editor, mark: Mark, exclusive: &[Mark]) -> EditorResult<bool> {
    let Some(selection) = editor.selection().cloned() else {
        return Ok(false);
    };
    let touches_void = [selection.start(), selection.end()]
        .iter()
        .any(|point| editor.document().void_above(&point.path).is_some());
    if touches_void {
        debug!(mark = %mark, "Not toggling a mark inside a void");
        return Ok(false);
    }

    let active = is_mark_active(editor, mark);

    if selection.is_collapsed() {
        let current = editor
            .marks()
            .or_else(|| editor.document().leaf(&selection.anchor.path).ok().map(|leaf| leaf.marks))
            .unwrap_or_default();
        editor.set_pending_marks(Some(toggled(current, mark, exclusive, active)));
        return Ok(true);
    }

    editor.without_normalizing(|editor| {
        let (start, end) = (selection.start().clone(), selection.end().clone());

        let end_len = editor.document().leaf(&end.path)?.len();
        if end.offset > 0 && end.offset < end_len {
            editor.split_node(&end.path, end.offset)?;
        }

        let start_len = editor.document().leaf(&start.path)?.len();
        let (start, end) = if start.offset > 0 && start.offset < start_len {
            let since = editor.operations.len();
            editor.split_node(&start.path, start.offset)?;
            let (parent, index) = split_path(&start.path)?;
            let moved = Point::new(parent.child(index + 1), 0);
            let end = if end.path == start.path {
                Point::new(moved.path.clone(), end.offset - start.offset)
            } else {
                // Later siblings shift right by one after the split
                let path = editor.rebase_path(&end.path, since).unwrap_or(end.path);
                Point::new(path, end.offset)
            };
            (moved, end)
        } else {
            (start, end)
        };

        let targets: Vec<Path> = selected_leaves(editor, &start, &end)
            .into_iter()
            .filter(|path| editor.document().void_above(path).is_none())
            .collect();

        for path in targets {
            let Ok(leaf) = editor.document().leaf(&path) else {
                continue;
            };
            let marks = toggled(leaf.marks, mark, exclusive, active);
            editor.set_node(&path, NodeProperties::marks(marks))?;
        }
        Ok(true)
    })
}

fn toggled(mut marks: Marks, mark: Mark, exclusive: &[Mark], active: bool) -> Marks {
    if active {
        marks.set(mark, false);
    } else {
        for other in exclusive {
            marks.set(*other, false);
        }
        marks.set(mark, true);
    }
    marks
}

/// Leaves that hold at least one selected character
fn selected_leaves(editor: &Editor, start: &Point, end: &Point) -> Vec<Path> {
    let document = editor.document();
    document
        .leaf_paths_between(start, end)
        .into_iter()
        .filter(|path| {
            let Ok(leaf) = document.leaf(path) else {
                return false;
            };
            let skip_start = *path == start.path && start.offset == leaf.len() && !leaf.is_empty();
            let skip_end = *path == end.path && end.offset == 0 && !leaf.is_empty();
            !(skip_start || skip_end)
        })
        .collect()
}
