//! Sub-sections: a titled block group one level below the section the editor
//! belongs to. Sub-sections do not nest.

use std::rc::Rc;

use folio_model::{Element, ElementType, Path};
use tracing::debug;

use crate::normalize::{Fix, NodeRef, NormalizeContext, Normalizer};
use crate::plugin::Plugin;
use crate::render::{ElementRenderer, RenderContext, RenderProps, VNode};
use crate::toolbar::{ToolbarAction, ToolbarItem};
use crate::{Editor, EditorResult};

pub struct SubsectionsPlugin;

impl Plugin for SubsectionsPlugin {
    fn name(&self) -> &'static str {
        "subsections"
    }

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        Some(Rc::new(SubsectionsNormalizer))
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        vec![(ElementType::SubSection, Rc::new(SubsectionRenderer))]
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        vec![ToolbarItem::new(
            "sub-section",
            "section",
            "Sub-section",
            ToolbarAction::InsertSubSection,
        )]
    }
}

pub struct SubsectionsNormalizer;

impl Normalizer for SubsectionsNormalizer {
    fn name(&self) -> &'static str {
        "subsections"
    }

    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        if entry.kind() != Some(&ElementType::SubSection) {
            return false;
        }
        let nested = cx
            .document()
            .ancestors(path)
            .iter()
            .any(|(_, ancestor)| ancestor.kind == ElementType::SubSection);
        if !nested {
            return false;
        }
        debug!(path = %path, "Unwrapping nested sub-section");
        cx.fix(Fix::UnwrapNode { path: path.clone() })
    }
}

pub struct SubsectionRenderer;

impl ElementRenderer for SubsectionRenderer {
    fn render(&self, props: RenderProps<'_>, cx: &RenderContext<'_>) -> VNode {
        let level = cx.rich.map_or(0, |rich| rich.subsection_level) + 1;
        VNode::element("section")
            .with_attr("class", cx.collaborators.class_name(&props.element.kind))
            .with_attr("data-level", level.to_string())
            .with_children(props.children)
    }
}

/// Insert an empty sub-section after the current block. `None` when the caret
/// is already inside one.
pub fn insert_subsection(editor: &mut Editor) -> EditorResult<Option<Path>> {
    let inside = editor.selection().is_some_and(|selection| {
        editor
            .document()
            .above(&selection.anchor.path, |element| element.kind == ElementType::SubSection)
            .is_some()
    });
    if inside {
        debug!("Sub-sections do not nest");
        return Ok(None);
    }
    let subsection = Element::new(ElementType::SubSection, vec![Element::paragraph("").into()]);
    editor.insert_block(subsection).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::{Document, Node, Point, Range};

    use crate::context::RichContext;
    use crate::render::{render_document, DefaultCollaborators};

    #[test]
    fn test_nested_subsection_is_unwrapped() {
        let inner = Node::element(ElementType::SubSection, vec![Node::Element(Element::paragraph("inner"))]);
        let outer = Node::element(ElementType::SubSection, vec![Node::Element(Element::paragraph("a")), inner]);
        let editor = Editor::new(Document::new(vec![outer])).unwrap();

        let outer = editor.document().element(&Path::from([0])).unwrap();
        assert_eq!(outer.children.len(), 2);
        assert!(outer.children.iter().all(|child| child.is_type(&ElementType::Paragraph)));
    }

    #[test]
    fn test_insert_and_refuse_nesting() {
        let mut editor = Editor::new(Document::new(vec![Node::Element(Element::paragraph("intro"))])).unwrap();
        editor.select(Range::collapsed(Point::new([0, 0], 5))).unwrap();

        let path = insert_subsection(&mut editor).unwrap().unwrap();
        assert_eq!(path, Path::from([1]));
        assert_eq!(editor.selection(), Some(&Range::collapsed(Point::new([1, 0, 0], 0))));

        assert_eq!(insert_subsection(&mut editor).unwrap(), None);
    }

    #[test]
    fn test_level_follows_context() {
        let subsection = Node::element(ElementType::SubSection, vec![Node::Element(Element::paragraph("x"))]);
        let context = RichContext {
            subsection_level: 1,
            ..RichContext::default()
        };
        let editor = Editor::new(Document::new(vec![subsection])).unwrap().with_context(context);

        let tree = render_document(&editor, &DefaultCollaborators);
        assert_eq!(tree.find("section").and_then(|section| section.attr("data-level")), Some("2"));
    }
}
