//! Block and inline equations, edited through the equation modal.

use std::rc::Rc;

use folio_model::{Element, ElementType, Path};
use tracing::debug;

use crate::normalize::{Fix, NodeRef, NormalizeContext, Normalizer};
use crate::operations::NodeProperties;
use crate::plugin::Plugin;
use crate::render::{ElementRenderer, RenderContext, RenderProps, VNode};
use crate::side_channel::{confirm, EquationPayload, ModalKind, Modals, Origin, SideChannel};
use crate::toolbar::{ToolbarAction, ToolbarItem};
use crate::{Editor, EditorResult};

pub struct EquationsPlugin;

impl Plugin for EquationsPlugin {
    fn name(&self) -> &'static str {
        "equations"
    }

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        Some(Rc::new(EquationsNormalizer))
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        vec![
            (ElementType::Equation, Rc::new(EquationRenderer { inline: false })),
            (ElementType::InlineEquation, Rc::new(EquationRenderer { inline: true })),
        ]
    }

    fn toolbar(&self) -> Vec<ToolbarItem> {
        vec![
            ToolbarItem::new("equation", "function", "Equation", ToolbarAction::ShowEquation { inline: false }),
            ToolbarItem::new(
                "inline-equation",
                "function-inline",
                "Inline equation",
                ToolbarAction::ShowEquation { inline: true },
            ),
        ]
    }

    fn attach(&self, modals: &mut Modals) {
        modals.equation = Some(SideChannel::new(ModalKind::Equation));
    }
}

fn is_equation(kind: &ElementType) -> bool {
    matches!(kind, ElementType::Equation | ElementType::InlineEquation)
}

pub struct EquationsNormalizer;

impl Normalizer for EquationsNormalizer {
    fn name(&self) -> &'static str {
        "equations"
    }

    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        match entry.element() {
            Some(element) if is_equation(&element.kind) && element.latex().is_none() => cx.fix(Fix::SetNode {
                path: path.clone(),
                properties: NodeProperties::default().with_attr("latex", ""),
            }),
            _ => false,
        }
    }
}

pub struct EquationRenderer {
    inline: bool,
}

impl ElementRenderer for EquationRenderer {
    fn render(&self, props: RenderProps<'_>, cx: &RenderContext<'_>) -> VNode {
        let latex = props.element.latex().unwrap_or_default();
        let tag = if self.inline { "span" } else { "div" };
        VNode::element(tag)
            .with_attr("class", cx.collaborators.class_name(&props.element.kind))
            .with_attr("contenteditable", "false")
            .with_attr("data-latex", latex)
            .with_child(VNode::element("code").with_child(VNode::text(latex)))
            .with_children(props.children)
    }
}

/// Open the equation modal. With the caret on an equation the modal edits it;
/// otherwise confirming inserts a new one (inline or block per `inline`).
pub fn show_equation_modal(editor: &mut Editor, inline: bool) -> EditorResult<bool> {
    let selection = editor.selection().cloned();
    let existing = selection
        .as_ref()
        .and_then(|selection| editor.document().void_above(&selection.anchor.path))
        .filter(|(_, element)| is_equation(&element.kind));

    let payload = match existing {
        Some((path, element)) => EquationPayload {
            latex: element.latex().unwrap_or_default().to_string(),
            inline: element.kind == ElementType::InlineEquation,
            equation_path: Some(path),
        },
        None => EquationPayload {
            latex: String::new(),
            inline,
            equation_path: None,
        },
    };

    let Some(channel) = editor.modals_mut().equation_mut() else {
        debug!("Equation modal is not installed");
        return Ok(false);
    };
    channel.show(selection, payload, Origin::User);
    Ok(true)
}

/// Apply the modal's LaTeX: update the edited equation or insert a new one.
/// Returns the equation's path, or `None` if the modal was closed or the
/// caret position does not accept the equation.
pub fn confirm_equation(editor: &mut Editor, latex: &str) -> EditorResult<Option<Path>> {
    let inserted = confirm(editor, Modals::equation_mut, |editor, payload| {
        let existing = payload
            .equation_path
            .filter(|path| editor.document().type_at(path).is_some_and(is_equation));
        match existing {
            Some(path) => {
                editor.set_node(&path, NodeProperties::default().with_attr("latex", latex))?;
                Ok(Some(path))
            }
            None if payload.inline => {
                editor.insert_inline(Element::void(ElementType::InlineEquation).with_attr("latex", latex))
            }
            None => editor
                .insert_block(Element::void(ElementType::Equation).with_attr("latex", latex))
                .map(Some),
        }
    })?;
    Ok(inserted.flatten())
}

pub fn dismiss_equation(editor: &mut Editor) {
    if let Some(channel) = editor.modals_mut().equation_mut() {
        channel.reset();
    }
    editor.focus();
}
