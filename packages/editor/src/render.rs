//! # Rendering
//!
//! Turns the document into a virtual node tree the host can mount. Element
//! types are drawn by the renderer registered for them in the plugin
//! registry; leaves are drawn here, with one wrapping tag per mark.
//!
//! Host services the renderers need (class names, icons, tooltips, asset
//! URLs) come in through [`Collaborators`] so the editor never depends on a
//! particular UI toolkit.

use std::collections::BTreeMap;

use folio_model::document::INVALID_CONTENT_TEXT;
use folio_model::{Document, Element, ElementType, Leaf, Mark, Node, Path};
use serde::Serialize;

use crate::context::RichContext;
use crate::Editor;

/// Marker text inside an empty leaf so the host keeps a caret position there
pub const ZERO_WIDTH: &str = "\u{FEFF}";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum VNode {
    Element {
        tag: String,
        attributes: BTreeMap<String, String>,
        children: Vec<VNode>,
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
    },

    Text { content: String },

    /// Shown inline instead of failing the whole render
    Error { message: String },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
            key: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        VNode::Error {
            message: message.into(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let VNode::Element {
            ref mut attributes, ..
        } = self
        {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    pub fn with_child(mut self, child: VNode) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.push(child);
        }
        self
    }

    pub fn with_children(mut self, new_children: Vec<VNode>) -> Self {
        if let VNode::Element {
            ref mut children, ..
        } = self
        {
            children.extend(new_children);
        }
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        if let VNode::Element {
            key: ref mut node_key,
            ..
        } = self
        {
            *node_key = Some(key.into());
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            VNode::Element { attributes, .. } => attributes.get(key).map(String::as_str),
            _ => None,
        }
    }

    pub fn children(&self) -> &[VNode] {
        match self {
            VNode::Element { children, .. } => children,
            _ => &[],
        }
    }

    /// Concatenated text content, zero-width markers excluded
    pub fn text_content(&self) -> String {
        match self {
            VNode::Text { content } => content.replace(ZERO_WIDTH, ""),
            VNode::Error { message } => message.clone(),
            VNode::Element { children, .. } => children.iter().map(VNode::text_content).collect(),
        }
    }

    /// First node in pre-order with the given tag
    pub fn find(&self, tag: &str) -> Option<&VNode> {
        if self.tag() == Some(tag) {
            return Some(self);
        }
        self.children().iter().find_map(|child| child.find(tag))
    }
}

/// Host services available to renderers
pub trait Collaborators {
    fn class_name(&self, kind: &ElementType) -> String {
        format!("folio-{kind}")
    }

    fn icon(&self, name: &str) -> VNode {
        VNode::element("i").with_attr("data-icon", name)
    }

    fn tooltip(&self, text: &str, child: VNode) -> VNode {
        child.with_attr("title", text)
    }

    /// Public URL of a stored asset
    fn asset_url(&self, object_key: &str) -> String {
        object_key.to_string()
    }
}

pub struct DefaultCollaborators;

impl Collaborators for DefaultCollaborators {}

pub struct RenderProps<'a> {
    pub element: &'a Element,
    pub path: &'a Path,
    pub children: Vec<VNode>,
    pub is_selected: bool,
    pub is_read_only: bool,
}

pub struct RenderContext<'a> {
    pub collaborators: &'a dyn Collaborators,
    pub rich: Option<&'a RichContext>,
    pub document: &'a Document,
}

pub trait ElementRenderer {
    fn render(&self, props: RenderProps<'_>, cx: &RenderContext<'_>) -> VNode;
}

/// Renders an element as a single tag around its children
pub struct TagRenderer {
    tag: &'static str,
}

impl TagRenderer {
    pub fn new(tag: &'static str) -> Self {
        Self { tag }
    }
}

impl ElementRenderer for TagRenderer {
    fn render(&self, props: RenderProps<'_>, cx: &RenderContext<'_>) -> VNode {
        VNode::element(self.tag)
            .with_attr("class", cx.collaborators.class_name(&props.element.kind))
            .with_children(props.children)
    }
}

pub fn render_document(editor: &Editor, collaborators: &dyn Collaborators) -> VNode {
    let document = editor.document();
    let root = VNode::element("div")
        .with_attr("class", "folio-editor")
        .with_attr("contenteditable", (!editor.is_read_only()).to_string());

    if document.is_invalid_sentinel() {
        return root.with_child(
            VNode::element("div")
                .with_attr("class", "folio-invalid-content")
                .with_attr("role", "alert")
                .with_child(VNode::text(INVALID_CONTENT_TEXT)),
        );
    }

    let cx = RenderContext {
        collaborators,
        rich: editor.context(),
        document,
    };
    let children = document
        .children
        .iter()
        .enumerate()
        .map(|(index, node)| render_node(editor, node, &Path::root().child(index), &cx))
        .collect();
    root.with_children(children)
}

fn render_node(editor: &Editor, node: &Node, path: &Path, cx: &RenderContext<'_>) -> VNode {
    let rendered = match node {
        Node::Leaf(leaf) => render_leaf(leaf),
        Node::Element(element) => {
            let children = element
                .children
                .iter()
                .enumerate()
                .map(|(index, child)| render_node(editor, child, &path.child(index), cx))
                .collect();
            let props = RenderProps {
                element,
                path,
                children,
                is_selected: editor.selection().is_some_and(|range| range.touches_path(path)),
                is_read_only: editor.is_read_only(),
            };
            match editor.registry().renderer(&element.kind) {
                Some(renderer) => renderer.render(props, cx),
                None => VNode::element("div")
                    .with_attr("class", "folio-unknown")
                    .with_attr("data-type", element.kind.as_str())
                    .with_children(props.children),
            }
        }
    };
    rendered.with_key(key_of(path))
}

fn key_of(path: &Path) -> String {
    path.iter().map(usize::to_string).collect::<Vec<_>>().join(".")
}

fn mark_tag(mark: Mark) -> &'static str {
    match mark {
        Mark::Bold => "strong",
        Mark::Italic => "em",
        Mark::Underline => "u",
        Mark::Subscript => "sub",
        Mark::Superscript => "sup",
    }
}

pub fn render_leaf(leaf: &Leaf) -> VNode {
    let content = if leaf.is_empty() {
        VNode::text(ZERO_WIDTH)
    } else {
        VNode::text(leaf.text.clone())
    };
    let inner = leaf
        .marks
        .iter()
        .fold(content, |inner, mark| VNode::element(mark_tag(mark)).with_child(inner));
    VNode::element("span").with_attr("data-leaf", "true").with_child(inner)
}
