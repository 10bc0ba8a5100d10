//! Inline references to bibliography entries.
//!
//! A reference void stores only the entry id (`refId`); its label comes from
//! the host's [`RichContext`](crate::context::RichContext) at render time.
//! References are only allowed directly inside paragraphs.

use std::rc::Rc;

use folio_model::{Element, ElementType, Path};
use tracing::debug;

use crate::context::ReferenceData;
use crate::normalize::{Fix, NodeRef, NormalizeContext, Normalizer};
use crate::operations::NodeProperties;
use crate::plugin::Plugin;
use crate::render::{ElementRenderer, RenderContext, RenderProps, VNode};
use crate::side_channel::{confirm, ModalKind, Modals, Origin, ReferencePayload, SideChannel};
use crate::toolbar::{ToolbarAction, ToolbarItem};
use crate::{Editor, EditorResult};

pub struct ReferencesPlugin;

impl Plugin for ReferencesPlugin {
    fn name(&self) -> &'static str {
        "references"
    }

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        Some(Rc::new(ReferencesNormalizer))
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        vec![(ElementType::Reference, Rc::new(ReferenceRenderer))]
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        vec![ToolbarItem::new("reference", "book", "Reference", ToolbarAction::ShowReference)]
    }

    fn attach(&self, modals: &mut Modals) {
        modals.reference = Some(SideChannel::new(ModalKind::Reference));
    }
}

pub struct ReferencesNormalizer;

impl Normalizer for ReferencesNormalizer {
    fn name(&self) -> &'static str {
        "references"
    }

    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        match entry.element() {
            Some(element)
                if element.kind == ElementType::Reference
                    && element.ref_id().map_or(true, str::is_empty) =>
            {
                debug!(path = %path, "Removing reference without an id");
                cx.fix(Fix::RemoveNode { path: path.clone() })
            }
            _ => false,
        }
    }
}

pub struct ReferenceRenderer;

impl ElementRenderer for ReferenceRenderer {
    fn render(&self, props: RenderProps<'_>, cx: &RenderContext<'_>) -> VNode {
        let id = props.element.ref_id().unwrap_or_default();
        let node = VNode::element("span")
            .with_attr("class", cx.collaborators.class_name(&props.element.kind))
            .with_attr("contenteditable", "false")
            .with_attr("data-ref-id", id);

        match cx.rich.and_then(|rich| rich.reference(id)) {
            Some(reference) => {
                let label = VNode::text(format!("[{}]", reference.short_label()));
                cx.collaborators
                    .tooltip(&reference.title, node.with_child(label))
                    .with_children(props.children)
            }
            None => node
                .with_attr("data-missing", "true")
                .with_child(VNode::text("[?]"))
                .with_children(props.children),
        }
    }
}

/// What the user picked in the reference modal
#[derive(Debug, Clone, PartialEq)]
pub enum ReferenceChoice {
    Existing(String),
    /// A new entry, handed to the host before it is referenced
    New(ReferenceData),
}

impl ReferenceChoice {
    pub fn id(&self) -> &str {
        match self {
            ReferenceChoice::Existing(id) => id,
            ReferenceChoice::New(reference) => &reference.id,
        }
    }
}

/// Open the reference modal, editing the reference at the caret if there is
/// one. Refused unless the caret sits directly in a paragraph.
pub fn show_reference_modal(editor: &mut Editor) -> EditorResult<bool> {
    let Some(selection) = editor.selection().cloned() else {
        return Ok(false);
    };
    let document = editor.document();
    let existing = document
        .void_above(&selection.anchor.path)
        .filter(|(_, element)| element.kind == ElementType::Reference)
        .map(|(path, _)| path);

    if existing.is_none() {
        let parent = selection.anchor.path.parent().and_then(|parent| document.type_at(&parent));
        if parent != Some(&ElementType::Paragraph) {
            debug!(path = %selection.anchor.path, "References can only go into paragraphs");
            return Ok(false);
        }
    }

    let payload = ReferencePayload {
        query: editor.selected_text(),
        reference_path: existing,
    };
    let Some(channel) = editor.modals_mut().reference_mut() else {
        debug!("Reference modal is not installed");
        return Ok(false);
    };
    channel.show(Some(selection), payload, Origin::User);
    Ok(true)
}

/// Insert (or retarget) a reference to the chosen entry. New entries are
/// upserted through the rich context first.
pub fn confirm_reference(editor: &mut Editor, choice: ReferenceChoice) -> EditorResult<Option<Path>> {
    let result = confirm(editor, Modals::reference_mut, |editor, payload| {
        let id = choice.id().to_string();
        if let ReferenceChoice::New(reference) = choice {
            match editor.context() {
                Some(context) => context.upsert_reference(reference),
                None => debug!(id = %reference.id, "No rich context; new reference not stored"),
            }
        }

        let existing = payload
            .reference_path
            .filter(|path| editor.document().type_at(path) == Some(&ElementType::Reference));
        match existing {
            Some(path) => {
                editor.set_node(&path, NodeProperties::default().with_attr("refId", id))?;
                Ok(Some(path))
            }
            None => editor.insert_inline(Element::void(ElementType::Reference).with_attr("refId", id)),
        }
    })?;
    Ok(result.flatten())
}

pub fn dismiss_reference(editor: &mut Editor) {
    if let Some(channel) = editor.modals_mut().reference_mut() {
        channel.reset();
    }
    editor.focus();
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use folio_model::{Document, Node, Point, Range};

    use crate::context::RichContext;
    use crate::render::{render_document, DefaultCollaborators};

    #[test]
    fn test_reference_without_id_is_removed() {
        let paragraph = Node::element(
            ElementType::Paragraph,
            vec![Node::text("a"), Node::Element(Element::void(ElementType::Reference)), Node::text("b")],
        );
        let editor = Editor::new(Document::new(vec![paragraph])).unwrap();
        assert_eq!(editor.document().children, vec![Node::Element(Element::paragraph("ab"))]);
    }

    #[test]
    fn test_new_reference_is_upserted_and_inserted() {
        let stored = Rc::new(RefCell::new(Vec::new()));
        let sink = stored.clone();
        let context = RichContext {
            on_reference_upsert: Some(Rc::new(move |reference: ReferenceData| sink.borrow_mut().push(reference))),
            ..RichContext::default()
        };
        let mut editor = Editor::new(Document::new(vec![Node::Element(Element::paragraph("as shown"))]))
            .unwrap()
            .with_context(context);
        editor.select(Range::collapsed(Point::new([0, 0], 8))).unwrap();

        assert!(show_reference_modal(&mut editor).unwrap());
        editor.flush();
        let path = confirm_reference(&mut editor, ReferenceChoice::New(ReferenceData::new("r1", "Notes")))
            .unwrap()
            .unwrap();
        editor.flush();

        assert_eq!(stored.borrow().len(), 1);
        assert_eq!(editor.document().element(&path).unwrap().ref_id(), Some("r1"));
        assert_eq!(editor.modals().visible(), None);
    }

    #[test]
    fn test_refused_outside_paragraphs() {
        let image_block = Node::element(
            ElementType::ImageBlock,
            vec![
                Node::Element(Element::void(ElementType::Image).with_attr("objectKey", "k")),
                Node::Element(Element::caption()),
            ],
        );
        let mut editor = Editor::new(Document::new(vec![image_block])).unwrap();
        editor.select(Range::collapsed(Point::new([0, 1, 0], 0))).unwrap();
        assert!(!show_reference_modal(&mut editor).unwrap());
        editor.flush();
        assert_eq!(editor.modals().visible(), None);
    }

    #[test]
    fn test_render_uses_context_label() {
        let paragraph = Node::element(
            ElementType::Paragraph,
            vec![
                Node::text(""),
                Node::Element(Element::void(ElementType::Reference).with_attr("refId", "r1")),
                Node::text(""),
            ],
        );
        let mut reference = ReferenceData::new("r1", "Notes");
        reference.authors = vec!["Ada Lovelace".to_string()];
        reference.year = Some(1843);
        let context = RichContext {
            references: vec![reference],
            ..RichContext::default()
        };
        let editor = Editor::new(Document::new(vec![paragraph])).unwrap().with_context(context);

        let tree = render_document(&editor, &DefaultCollaborators);
        assert!(tree.text_content().contains("[Lovelace 1843]"));
    }
}
