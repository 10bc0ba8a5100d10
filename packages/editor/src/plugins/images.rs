//! Images. An `image-block` holds the image void and its caption; the image
//! carries either an `objectKey` once stored or an upload in progress
//! (`uploadId` plus an `uploading` percentage).
//!
//! Upload callbacks arrive after arbitrary edits, so they locate the image by
//! `uploadId` each time and do nothing if it is gone.

use std::rc::Rc;

use folio_model::{Element, ElementType, Node, Path};
use tracing::debug;

use crate::normalize::{normalize_composite, Fix, NodeRef, NormalizeContext, Normalizer};
use crate::operations::NodeProperties;
use crate::plugin::Plugin;
use crate::render::{ElementRenderer, RenderContext, RenderProps, TagRenderer, VNode};
use crate::{Editor, EditorResult};

pub struct ImagesPlugin;

impl Plugin for ImagesPlugin {
    fn name(&self) -> &'static str {
        "images"
    }

    fn normalizer(&self) -> Option<Rc<dyn Normalizer>> {
        Some(Rc::new(ImagesNormalizer))
    }

    fn renderers(&self) -> Vec<(ElementType, Rc<dyn ElementRenderer>)> {
        vec![
            (ElementType::ImageBlock, Rc::new(TagRenderer::new("figure"))),
            (ElementType::Image, Rc::new(ImageRenderer)),
        ]
    }
}

pub struct ImagesNormalizer;

impl Normalizer for ImagesNormalizer {
    fn name(&self) -> &'static str {
        "images"
    }

    fn normalize(&self, entry: NodeRef<'_>, path: &Path, cx: &mut NormalizeContext<'_>) -> bool {
        let Some(element) = entry.element() else {
            return false;
        };
        match element.kind {
            ElementType::ImageBlock => normalize_composite(element, path, cx),
            ElementType::Image => {
                let (Some(parent), Some(index)) = (path.parent(), path.index()) else {
                    return false;
                };
                let holds_blocks = NodeRef::at(cx.document(), &parent).is_some_and(|node| node.holds_blocks());
                if !holds_blocks {
                    return false;
                }
                debug!(path = %path, "Wrapping a bare image into an image block");
                cx.fix(Fix::WrapNodes {
                    parent,
                    start: index,
                    end: index + 1,
                    wrapper: Element::new(ElementType::ImageBlock, Vec::new()),
                })
            }
            _ => false,
        }
    }
}

pub struct ImageRenderer;

impl ElementRenderer for ImageRenderer {
    fn render(&self, props: RenderProps<'_>, cx: &RenderContext<'_>) -> VNode {
        let element = props.element;
        let content = match (element.uploading(), element.object_key()) {
            (Some(percent), _) => VNode::element("progress")
                .with_attr("max", "100")
                .with_attr("value", percent.to_string()),
            (None, Some(object_key)) => VNode::element("img").with_attr("src", cx.collaborators.asset_url(object_key)),
            (None, None) => VNode::error("Image file is missing"),
        };

        let mut node = VNode::element("div")
            .with_attr("class", cx.collaborators.class_name(&element.kind))
            .with_attr("contenteditable", "false")
            .with_child(content);
        if props.is_selected {
            node = node.with_attr("data-selected", "true");
        }
        node.with_children(props.children)
    }
}

/// An image block for a file that is still uploading
pub fn image_block(upload_id: &str) -> Element {
    let image = Element::void(ElementType::Image)
        .with_attr("uploadId", upload_id)
        .with_attr("uploading", 0);
    Element::new(
        ElementType::ImageBlock,
        vec![Node::Element(image), Node::Element(Element::caption())],
    )
}

/// Insert a placeholder image for an upload that just started
pub fn insert_image(editor: &mut Editor, upload_id: &str) -> EditorResult<Path> {
    editor.insert_block(image_block(upload_id))
}

fn find_upload(editor: &Editor, upload_id: &str) -> Option<Path> {
    editor
        .document()
        .descendants()
        .find(|(_, node)| {
            node.as_element()
                .is_some_and(|element| element.kind == ElementType::Image && element.upload_id() == Some(upload_id))
        })
        .map(|(path, _)| path)
}

/// Record upload progress. Percentages only move forward and stop at 100.
pub fn set_upload_progress(editor: &mut Editor, upload_id: &str, percent: u8) -> EditorResult<bool> {
    let Some(path) = find_upload(editor, upload_id) else {
        debug!(upload_id, "Progress for an image that no longer exists");
        return Ok(false);
    };
    let percent = percent.min(100);
    let current = editor.document().element(&path)?.uploading();
    if current.is_some_and(|current| percent <= current) {
        return Ok(false);
    }
    editor.set_node(&path, NodeProperties::default().with_attr("uploading", percent))?;
    Ok(true)
}

/// Point the image at its stored file and drop the upload bookkeeping
pub fn complete_upload(editor: &mut Editor, upload_id: &str, object_key: &str) -> EditorResult<bool> {
    let Some(path) = find_upload(editor, upload_id) else {
        debug!(upload_id, "Upload finished for an image that no longer exists");
        return Ok(false);
    };
    let properties = NodeProperties::default()
        .with_attr("objectKey", object_key)
        .without_attr("uploading")
        .without_attr("uploadId");
    editor.set_node(&path, properties)?;
    Ok(true)
}

/// Remove the image block of a failed upload
pub fn fail_upload(editor: &mut Editor, upload_id: &str) -> EditorResult<bool> {
    let Some(path) = find_upload(editor, upload_id) else {
        return Ok(false);
    };
    let block = editor.block_of_void(&path);
    debug!(upload_id, path = %block, "Upload failed; removing the image");
    editor.remove_node(&block)?;
    Ok(true)
}
