//! Element nodes and their type classification

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;

use crate::{Leaf, Node};

/// Type-specific element fields (`url`, `latex`, `refId`, ...)
pub type Attrs = serde_json::Map<String, Value>;

/// Element `type` tag.
///
/// Unknown tags round-trip through [`ElementType::Custom`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    #[default]
    Paragraph,
    BulletedList,
    NumberedList,
    ListItem,
    SubSection,
    TableBlock,
    Table,
    TableRow,
    TableCell,
    ImageBlock,
    Image,
    Caption,
    Equation,
    InlineEquation,
    Link,
    Reference,
    Custom(String),
}

impl ElementType {
    pub fn from_name(name: &str) -> Self {
        match name {
            "paragraph" => ElementType::Paragraph,
            "bulleted-list" => ElementType::BulletedList,
            "numbered-list" => ElementType::NumberedList,
            "list-item" => ElementType::ListItem,
            "sub-section" => ElementType::SubSection,
            "table-block" => ElementType::TableBlock,
            "table" => ElementType::Table,
            "table-row" => ElementType::TableRow,
            "table-cell" => ElementType::TableCell,
            "image-block" => ElementType::ImageBlock,
            "image" => ElementType::Image,
            "caption" => ElementType::Caption,
            "equation" => ElementType::Equation,
            "inline-equation" => ElementType::InlineEquation,
            "link" => ElementType::Link,
            "reference" => ElementType::Reference,
            other => ElementType::Custom(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ElementType::Paragraph => "paragraph",
            ElementType::BulletedList => "bulleted-list",
            ElementType::NumberedList => "numbered-list",
            ElementType::ListItem => "list-item",
            ElementType::SubSection => "sub-section",
            ElementType::TableBlock => "table-block",
            ElementType::Table => "table",
            ElementType::TableRow => "table-row",
            ElementType::TableCell => "table-cell",
            ElementType::ImageBlock => "image-block",
            ElementType::Image => "image",
            ElementType::Caption => "caption",
            ElementType::Equation => "equation",
            ElementType::InlineEquation => "inline-equation",
            ElementType::Link => "link",
            ElementType::Reference => "reference",
            ElementType::Custom(name) => name,
        }
    }

    /// No editable text; a single empty placeholder leaf plus domain data
    pub fn is_void(&self) -> bool {
        matches!(
            self,
            ElementType::Equation
                | ElementType::InlineEquation
                | ElementType::Image
                | ElementType::Reference
        )
    }

    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            ElementType::Link | ElementType::Reference | ElementType::InlineEquation
        )
    }

    /// Holds text and inline elements only
    pub fn is_text_block(&self) -> bool {
        matches!(self, ElementType::Paragraph | ElementType::Caption)
    }

    /// Holds element children only, never bare leaves
    pub fn is_block_container(&self) -> bool {
        matches!(
            self,
            ElementType::BulletedList
                | ElementType::NumberedList
                | ElementType::ListItem
                | ElementType::SubSection
                | ElementType::Table
                | ElementType::TableRow
                | ElementType::TableCell
        )
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ElementType::BulletedList | ElementType::NumberedList)
    }

    /// Content type of a composite block (`image-block`, `table-block`)
    pub fn composite_content(&self) -> Option<ElementType> {
        match self {
            ElementType::ImageBlock => Some(ElementType::Image),
            ElementType::TableBlock => Some(ElementType::Table),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        self.composite_content().is_some()
    }

    /// Whether an inline element of type `inline` may sit directly under this type.
    /// Types outside the restricted set are accepted anywhere a text block is.
    pub fn accepts_inline(&self, inline: &ElementType) -> bool {
        match inline {
            ElementType::Reference => matches!(self, ElementType::Paragraph),
            ElementType::Link | ElementType::InlineEquation => {
                matches!(self, ElementType::Paragraph | ElementType::Caption)
            }
            _ => self.is_text_block(),
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for ElementType {
    fn from(name: &str) -> Self {
        ElementType::from_name(name)
    }
}

impl Serialize for ElementType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ElementType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(ElementType::from_name(&name))
    }
}

/// Element node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type", default)]
    pub kind: ElementType,

    #[serde(default)]
    pub children: Vec<Node>,

    #[serde(flatten)]
    pub attrs: Attrs,
}

impl Element {
    pub fn new(kind: ElementType, children: Vec<Node>) -> Self {
        Self {
            kind,
            children,
            attrs: Attrs::new(),
        }
    }

    /// Paragraph holding a single unformatted leaf
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(ElementType::Paragraph, vec![Node::text(text)])
    }

    /// Empty caption for composite blocks
    pub fn caption() -> Self {
        Self::new(ElementType::Caption, vec![Node::Leaf(Leaf::default())])
    }

    /// Void element with its placeholder leaf
    pub fn void(kind: ElementType) -> Self {
        Self::new(kind, vec![Node::Leaf(Leaf::default())])
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&Value> {
        self.attrs.get(key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    pub fn set_attr(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.attrs.insert(key.into(), value.into());
    }

    pub fn remove_attr(&mut self, key: &str) -> Option<Value> {
        self.attrs.remove(key)
    }

    pub fn url(&self) -> Option<&str> {
        self.attr_str("url")
    }

    pub fn latex(&self) -> Option<&str> {
        self.attr_str("latex")
    }

    pub fn ref_id(&self) -> Option<&str> {
        self.attr_str("refId")
    }

    pub fn object_key(&self) -> Option<&str> {
        self.attr_str("objectKey")
    }

    pub fn upload_id(&self) -> Option<&str> {
        self.attr_str("uploadId")
    }

    /// Upload progress in percent, absent once the upload finished
    pub fn uploading(&self) -> Option<u8> {
        self.attr("uploading")
            .and_then(Value::as_u64)
            .map(|pct| pct.min(100) as u8)
    }

    pub fn is_void(&self) -> bool {
        self.kind.is_void()
    }

    pub fn is_inline(&self) -> bool {
        self.kind.is_inline()
    }

    /// Child count, which is also the merge position of a following sibling
    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_element_round_trips_attrs() {
        let value = json!({
            "type": "link",
            "url": "https://example.org",
            "children": [{ "text": "example" }]
        });

        let element: Element = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(element.kind, ElementType::Link);
        assert_eq!(element.url(), Some("https://example.org"));
        assert_eq!(serde_json::to_value(&element).unwrap(), value);
    }

    #[test]
    fn test_unknown_type_is_preserved() {
        let element: Element =
            serde_json::from_value(json!({ "type": "callout", "children": [{ "text": "" }] }))
                .unwrap();
        assert_eq!(element.kind, ElementType::Custom("callout".to_string()));
        assert_eq!(element.kind.as_str(), "callout");
    }

    #[test]
    fn test_inline_allow_lists() {
        assert!(ElementType::Paragraph.accepts_inline(&ElementType::Reference));
        assert!(!ElementType::Caption.accepts_inline(&ElementType::Reference));
        assert!(ElementType::Caption.accepts_inline(&ElementType::Link));
        assert!(!ElementType::Link.accepts_inline(&ElementType::Link));
        assert!(!ElementType::TableCell.accepts_inline(&ElementType::InlineEquation));
    }

    #[test]
    fn test_uploading_is_clamped() {
        let image = Element::void(ElementType::Image).with_attr("uploading", 140);
        assert_eq!(image.uploading(), Some(100));
    }
}
