//! Rich-text form state.
//!
//! A form owns one editor per rich-text field, in display order. All field
//! editors share one overlay registry so only a single modal is open across
//! the form.

use folio_common::{is_blank, serialize_nodes_to_plain_text, truncate_to_length, FieldSource, ReferenceUsageIndex};
use folio_editor::{Editor, EditorConfig, OverlayRegistry, PluginStack, RichContext};
use folio_model::{Document, Node};
use serde_json::{Map, Value};
use tracing::debug;

use crate::{WorkspaceConfig, WorkspaceError, WorkspaceResult};

struct Field {
    name: String,
    editor: Editor,
}

pub struct FormState {
    config: WorkspaceConfig,
    overlays: OverlayRegistry,
    fields: Vec<Field>,
}

impl FormState {
    pub fn new(config: WorkspaceConfig) -> Self {
        Self {
            config,
            overlays: OverlayRegistry::new(),
            fields: Vec::new(),
        }
    }

    /// Build a form from a stored object of field name → document value.
    /// Invalid field values load as the invalid-content document.
    pub fn from_value(config: WorkspaceConfig, value: &Value) -> WorkspaceResult<Self> {
        let mut form = Self::new(config);
        if let Value::Object(fields) = value {
            for (name, stored) in fields {
                form.add_field(name, Document::from_value(stored.clone()))?;
            }
        } else {
            debug!("Stored form is not an object; starting empty");
        }
        Ok(form)
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn overlays(&self) -> &OverlayRegistry {
        &self.overlays
    }

    /// Add a field after the existing ones
    pub fn add_field(&mut self, name: impl Into<String>, document: Document) -> WorkspaceResult<&mut Editor> {
        let name = name.into();
        if self.fields.iter().any(|field| field.name == name) {
            return Err(WorkspaceError::DuplicateField(name));
        }

        let config = EditorConfig {
            read_only: self.config.read_only,
            ..EditorConfig::default()
        };
        let editor = Editor::assemble(document, PluginStack::standard(), config, &self.overlays)?;
        debug!(field = %name, editor = %editor.id(), "Added field");
        self.fields.push(Field { name, editor });

        let index = self.fields.len() - 1;
        Ok(&mut self.fields[index].editor)
    }

    /// Field names in display order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|field| field.name.as_str())
    }

    pub fn field(&self, name: &str) -> WorkspaceResult<&Editor> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.editor)
            .ok_or_else(|| WorkspaceError::UnknownField(name.to_string()))
    }

    pub fn field_mut(&mut self, name: &str) -> WorkspaceResult<&mut Editor> {
        self.fields
            .iter_mut()
            .find(|field| field.name == name)
            .map(|field| &mut field.editor)
            .ok_or_else(|| WorkspaceError::UnknownField(name.to_string()))
    }

    /// Hand the same rich context to every field editor
    pub fn set_context(&mut self, context: RichContext) {
        for field in &mut self.fields {
            field.editor.set_context(Some(context.clone()));
        }
    }

    /// Whether the field holds only whitespace once exported as plain text
    pub fn is_field_empty(&self, name: &str) -> WorkspaceResult<bool> {
        Ok(is_blank(&self.field(name)?.document().children))
    }

    /// Plain-text preview of a field, cut at the configured length
    pub fn preview(&self, name: &str) -> WorkspaceResult<String> {
        let nodes = &self.field(name)?.document().children;
        let truncated = truncate_to_length(nodes, self.config.preview_length);
        Ok(serialize_nodes_to_plain_text(&truncated))
    }

    /// Citation numbers across the configured reference fields
    pub fn reference_index(&self) -> ReferenceUsageIndex {
        ReferenceUsageIndex::build(self, &self.config.reference_fields)
    }

    /// Stored form: field name → document value, transient attributes stripped
    pub fn to_value(&self) -> WorkspaceResult<Value> {
        let mut out = Map::new();
        for field in &self.fields {
            out.insert(field.name.clone(), field.editor.to_value()?);
        }
        Ok(Value::Object(out))
    }
}

impl FieldSource for FormState {
    fn field_nodes(&self, name: &str) -> Option<&[Node]> {
        self.field(name).ok().map(|editor| editor.document().children.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_editor::ModalKind;
    use folio_model::{Element, ElementType, Point, Range};
    use serde_json::json;

    fn cite(text: &str, ref_id: &str) -> Document {
        Document::new(vec![Node::element(
            ElementType::Paragraph,
            vec![
                Node::text(text),
                Node::Element(Element::void(ElementType::Reference).with_attr("refId", ref_id)),
                Node::text(""),
            ],
        )])
    }

    fn config(fields: &[&str]) -> WorkspaceConfig {
        WorkspaceConfig {
            reference_fields: fields.iter().map(|field| field.to_string()).collect(),
            ..WorkspaceConfig::default()
        }
    }

    #[test]
    fn test_citations_follow_scan_order_not_display_order() {
        let mut form = FormState::new(config(&["introduction", "discussion"]));
        // Discussion is displayed first
        form.add_field("discussion", cite("see ", "r1")).unwrap();
        form.add_field("introduction", cite("as in ", "r2")).unwrap();

        let index = form.reference_index();
        assert_eq!(index.doc_index("r2"), Some(1));
        assert_eq!(index.doc_index("r1"), Some(2));
    }

    #[test]
    fn test_emptiness_and_preview() {
        let mut form = FormState::new(WorkspaceConfig {
            preview_length: 5,
            ..WorkspaceConfig::default()
        });
        form.add_field("abstract", Document::new(vec![Node::Element(Element::paragraph("   "))]))
            .unwrap();
        form.add_field("methods", Document::new(vec![Node::Element(Element::paragraph("Measured twice"))]))
            .unwrap();

        assert!(form.is_field_empty("abstract").unwrap());
        assert!(!form.is_field_empty("methods").unwrap());
        assert_eq!(form.preview("methods").unwrap(), "Measu");
        assert!(matches!(form.preview("missing"), Err(WorkspaceError::UnknownField(_))));
    }

    #[test]
    fn test_duplicate_field_is_rejected() {
        let mut form = FormState::new(WorkspaceConfig::default());
        form.add_field("results", Document::default()).unwrap();
        assert!(matches!(
            form.add_field("results", Document::default()),
            Err(WorkspaceError::DuplicateField(_))
        ));
    }

    #[test]
    fn test_fields_share_one_overlay() {
        let mut form = FormState::new(WorkspaceConfig::default());
        form.add_field("abstract", Document::default()).unwrap();
        form.add_field("results", Document::default()).unwrap();

        for name in ["abstract", "results"] {
            let editor = form.field_mut(name).unwrap();
            editor.select(Range::collapsed(Point::new([0, 0], 0))).unwrap();
            folio_editor::plugins::shortcuts::show_shortcuts(editor).unwrap();
            editor.flush();
        }
        form.field_mut("abstract").unwrap().flush();

        let results_id = form.field("results").unwrap().id();
        assert_eq!(form.overlays().active(), Some((results_id, ModalKind::Shortcuts)));
        assert_eq!(form.field("abstract").unwrap().modals().visible(), None);
    }

    #[test]
    fn test_round_trip_through_value() {
        let stored = json!({
            "abstract": [{ "type": "paragraph", "children": [{ "text": "Short" }] }],
            "results": "not a document"
        });
        let form = FormState::from_value(WorkspaceConfig::default(), &stored).unwrap();

        assert_eq!(form.names().collect::<Vec<_>>(), vec!["abstract", "results"]);
        assert!(form.field("results").unwrap().document().is_invalid_sentinel());

        let value = form.to_value().unwrap();
        assert_eq!(value["abstract"], stored["abstract"]);
    }

    #[test]
    fn test_read_only_config_reaches_editors() {
        let mut form = FormState::new(WorkspaceConfig {
            read_only: true,
            ..WorkspaceConfig::default()
        });
        let editor = form.add_field("abstract", Document::default()).unwrap();
        assert!(editor.is_read_only());
    }
}
