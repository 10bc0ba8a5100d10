//! Links.
//!
//! The link modal opens two ways: from the toolbar or `mod+k` (user origin),
//! or on its own when the caret lands inside a link (caret origin). A
//! caret-opened modal follows the caret: it closes when the caret leaves the
//! link and moves when the caret enters another one. Dismissing it is
//! remembered until the caret leaves that link, so it does not pop straight
//! back up.

use std::rc::Rc;

use folio_model::{Element, ElementType, Node, Path, Range};
use tracing::debug;

use crate::keys::Hotkey;
use crate::normalize::{Fix, NodeRef, NormalizeContext, Normalizer};
use crate::operations::{rebase_path, NodeProperties, Operation};
use crate::plugin::Plugin;
use crate::render::{ElementRenderer, RenderContext, RenderProps, VNode};
use crate::side_channel::{confirm, LinkPayload, ModalKind, Modals, Origin, SideChannel};
use crate::toolbar::{ToolbarAction, ToolbarItem};
use crate::{Editor, EditorResult};

pub struct LinksPlugin;

impl Plugin for LinksPlugin {
    fn name(&self) -> &'static str {
        "links"
    }

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        Some(Rc::new(LinksNormalizer))
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        vec![(ElementType::Link, Rc::new(LinkRenderer))]
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        vec![ToolbarItem::new("link", "link", "Link", ToolbarAction::ShowLink).with_hotkey(Hotkey::modified("k"))]
    }

    fn attach(&self, modals: &mut Modals) {
        modals.link = Some(SideChannel::new(ModalKind::Link));
    }

    fn on_change(&self, editor: &mut Editor, operations: &[Operation]) {
        follow_caret(editor, operations);
    }
}

pub struct LinksNormalizer;

impl Normalizer for LinksNormalizer {
    fn name(&self) -> &'static str {
        "links"
    }

    /// A link needs a URL and some text
    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        let Some(element) = entry.element().filter(|element| element.kind == ElementType::Link) else {
            return false;
        };
        let has_url = element.url().is_some_and(|url| !url.trim().is_empty());
        let has_text = element.children.iter().any(|child| !child.string().is_empty());
        if has_url && has_text {
            return false;
        }
        debug!(path = %path, has_url, has_text, "Unwrapping incomplete link");
        cx.fix(Fix::UnwrapNode { path: path.clone() })
    }
}

pub struct LinkRenderer;

impl ElementRenderer for LinkRenderer {
    fn render(&self, props: RenderProps<'_>, cx: &RenderContext<'_>) -> VNode {
        let url = props.element.url().unwrap_or_default();
        let anchor = VNode::element("a")
            .with_attr("href", url)
            .with_attr("class", cx.collaborators.class_name(&props.element.kind))
            .with_children(props.children);
        cx.collaborators.tooltip(url, anchor)
    }
}

fn link_above<'a>(editor: &'a Editor, path: &Path) -> Option<(Path, &'a Element)> {
    editor.document().above(path, |element| element.kind == ElementType::Link)
}

fn payload_for(editor: &Editor, path: Path, link: &Element) -> LinkPayload {
    let text = editor.document().node(&path).map(Node::string).unwrap_or_default();
    LinkPayload {
        url: link.url().unwrap_or_default().to_string(),
        text,
        link_path: Some(path),
    }
}

/// Open the link modal for the link at the caret, or for a new link over the
/// selected text
pub fn show_link_modal(editor: &mut Editor) -> EditorResult<bool> {
    let Some(selection) = editor.selection().cloned() else {
        return Ok(false);
    };
    let payload = match link_above(editor, &selection.anchor.path) {
        Some((path, link)) => payload_for(editor, path, link),
        None => LinkPayload {
            text: editor.selected_text(),
            ..LinkPayload::default()
        },
    };

    let Some(channel) = editor.modals_mut().link_mut() else {
        debug!("Link modal is not installed");
        return Ok(false);
    };
    channel.show(Some(selection), payload, Origin::User);
    Ok(true)
}

/// Apply the modal's URL. An existing link gets the new URL, or is removed
/// when the URL is empty. Otherwise the selection is wrapped into a link, or
/// a link is inserted at the caret showing the text from the modal.
pub fn confirm_link(editor: &mut Editor, url: &str) -> EditorResult<Option<Path>> {
    let url = url.trim();
    let result = confirm(editor, Modals::link_mut, |editor, payload| {
        editor.modals_mut().dismissed_link = None;
        let existing = payload
            .link_path
            .filter(|path| editor.document().type_at(path) == Some(&ElementType::Link));

        match (existing, url.is_empty()) {
            (Some(path), true) => {
                editor.unwrap_node(&path)?;
                Ok(None)
            }
            (Some(path), false) => {
                editor.set_node(&path, NodeProperties::default().with_attr("url", url))?;
                Ok(Some(path))
            }
            (None, true) => Ok(None),
            (None, false) => {
                let link = Element::new(ElementType::Link, Vec::new()).with_attr("url", url);
                if editor.selection().is_some_and(Range::is_expanded) {
                    return editor.wrap_inline(link);
                }
                let text = if payload.text.is_empty() { url } else { payload.text.as_str() };
                let mut link = link;
                link.children.push(Node::text(text));
                editor.insert_inline(link)
            }
        }
    })?;
    Ok(result.flatten())
}

/// Close the link modal. A modal the caret opened stays closed while the
/// caret remains in that link.
pub fn dismiss_link(editor: &mut Editor) {
    let Some(channel) = editor.modals_mut().link_mut() else {
        return;
    };
    let dismissed = match channel.origin() {
        Some(Origin::Caret) => channel.data().and_then(|(_, payload)| payload.link_path.clone()),
        _ => None,
    };
    channel.reset();

    if dismissed.is_some() {
        editor.modals_mut().dismissed_link = dismissed;
    }
    editor.focus();
}

/// Unwrap the link around the caret
pub fn remove_link(editor: &mut Editor) -> EditorResult<bool> {
    editor.unwrap_above(&ElementType::Link)
}

/// Show, move or close the caret-origin modal after a transaction
fn follow_caret(editor: &mut Editor, operations: &[Operation]) {
    let selection = editor.selection().filter(|selection| selection.is_collapsed()).cloned();
    let caret_link = selection
        .as_ref()
        .and_then(|selection| link_above(editor, &selection.anchor.path))
        .map(|(path, link)| payload_for(editor, path, link));

    let caret_link_path = caret_link.as_ref().and_then(|payload| payload.link_path.clone());
    let dismissed = editor
        .modals()
        .dismissed_link
        .as_ref()
        .and_then(|path| rebase_path(path, operations))
        .filter(|path| caret_link_path.as_ref() == Some(path));
    editor.modals_mut().dismissed_link = dismissed.clone();

    let Some(channel) = editor.modals_mut().link_mut() else {
        return;
    };
    if channel.has_pending() || channel.origin() == Some(Origin::User) {
        return;
    }

    match caret_link {
        Some(payload) => {
            let showing = channel.data().and_then(|(_, shown)| shown.link_path.clone());
            if dismissed.is_some() || (channel.is_visible() && showing == payload.link_path) {
                return;
            }
            debug!(link = ?payload.link_path, "Caret entered a link");
            channel.show(selection, payload, Origin::Caret);
        }
        None if channel.is_visible() => {
            debug!("Caret left the link");
            channel.reset();
        }
        None => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Document, Point};

    fn linked_paragraph() -> Editor {
        let link = Element::new(ElementType::Link, vec![Node::text("docs")]).with_attr("url", "https://docs.test");
        let paragraph = Node::element(
            ElementType::Paragraph,
            vec![Node::text("see "), Node::Element(link), Node::text(" here")],
        );
        Editor::new(Document::new(vec![paragraph])).unwrap()
    }

    fn caret(editor: &mut Editor, path: [usize; 3], offset: usize) {
        editor.select(Range::collapsed(Point::new(path, offset))).unwrap();
        editor.flush();
    }

    fn link_origin(editor: &Editor) -> Option<Origin> {
        editor.modals().link.as_ref().and_then(SideChannel::origin)
    }

    #[test]
    fn test_link_without_url_is_unwrapped() {
        let link = Element::new(ElementType::Link, vec![Node::text("x")]);
        let paragraph = Node::element(ElementType::Paragraph, vec![Node::Element(link)]);
        let editor = Editor::new(Document::new(vec![paragraph])).unwrap();
        assert_eq!(editor.document().children, vec![Node::Element(Element::paragraph("x"))]);
    }

    #[test]
    fn test_caret_opens_and_closes_modal() {
        let mut editor = linked_paragraph();
        caret(&mut editor, [0, 1, 0], 2);
        assert_eq!(link_origin(&editor), Some(Origin::Caret));
        let (_, payload) = editor.modals().link.as_ref().and_then(SideChannel::data).unwrap();
        assert_eq!(payload.url, "https://docs.test");
        assert_eq!(payload.text, "docs");

        caret(&mut editor, [0, 0, 0], 1);
        assert_eq!(editor.modals().visible(), None);
    }

    #[test]
    fn test_dismissal_is_remembered_until_caret_leaves() {
        let mut editor = linked_paragraph();
        caret(&mut editor, [0, 1, 0], 2);
        dismiss_link(&mut editor);
        editor.flush();
        assert_eq!(editor.modals().visible(), None);

        caret(&mut editor, [0, 1, 0], 1);
        assert_eq!(editor.modals().visible(), None);

        caret(&mut editor, [0, 2, 0], 1);
        caret(&mut editor, [0, 1, 0], 3);
        assert_eq!(link_origin(&editor), Some(Origin::Caret));
    }

    #[test]
    fn test_confirm_wraps_selection() {
        let mut editor = Editor::new(Document::new(vec![Node::Element(Element::paragraph("read this"))])).unwrap();
        editor
            .select(Range::new(Point::new([0, 0], 5), Point::new([0, 0], 9)))
            .unwrap();
        assert!(show_link_modal(&mut editor).unwrap());
        editor.flush();
        assert_eq!(
            editor.modals().link.as_ref().and_then(SideChannel::data).map(|(_, p)| p.text.clone()),
            Some("this".to_string())
        );

        let path = confirm_link(&mut editor, " https://x.test ").unwrap().unwrap();
        editor.flush();

        let link = editor.document().element(&path).unwrap();
        assert_eq!(link.url(), Some("https://x.test"));
        assert_eq!(editor.document().node(&path).unwrap().string(), "this");
        assert_eq!(editor.modals().visible(), None);
    }

    #[test]
    fn test_empty_url_removes_link() {
        let mut editor = linked_paragraph();
        editor.select(Range::collapsed(Point::new([0, 1, 0], 1))).unwrap();
        show_link_modal(&mut editor).unwrap();
        editor.flush();

        assert_eq!(confirm_link(&mut editor, "").unwrap(), None);
        assert_eq!(editor.document().children, vec![Node::Element(Element::paragraph("see docs here"))]);
    }

    #[test]
    fn test_caret_insert_uses_url_as_text() {
        let mut editor = Editor::new(Document::new(vec![Node::Element(Element::paragraph("ab"))])).unwrap();
        editor.select(Range::collapsed(Point::new([0, 0], 1))).unwrap();
        show_link_modal(&mut editor).unwrap();
        editor.flush();

        let path = confirm_link(&mut editor, "https://y.test").unwrap().unwrap();
        assert_eq!(editor.document().node(&path).unwrap().string(), "https://y.test");
        assert_eq!(editor.document().children[0].string(), "ahttps://y.testb");
    }
}
