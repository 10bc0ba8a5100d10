//! Citation numbering
//!
//! References are numbered by first sighting while scanning a fixed, ordered
//! list of document fields. The scan order is the field list order and then
//! document order within each field; it decides citation numbers and has to
//! be deterministic, so it never depends on how the fields are rendered.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use folio_model::{ElementType, Node};
use serde::Serialize;
use tracing::trace;

use crate::query::find_nodes_by_type;

/// Anything that can hand out the rich-text content of a named field
pub trait FieldSource {
    fn field_nodes(&self, name: &str) -> Option<&[Node]>;
}

impl FieldSource for HashMap<String, Vec<Node>> {
    fn field_nodes(&self, name: &str) -> Option<&[Node]> {
        self.get(name).map(Vec::as_slice)
    }
}

impl FieldSource for BTreeMap<String, Vec<Node>> {
    fn field_nodes(&self, name: &str) -> Option<&[Node]> {
        self.get(name).map(Vec::as_slice)
    }
}

/// Where a single reference is cited
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceUsage {
    pub ref_id: String,
    /// 1-based citation number
    pub doc_index: usize,
    /// Fields citing the reference
    pub fields: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceUsageIndex {
    usages: Vec<ReferenceUsage>,
    #[serde(skip)]
    by_id: HashMap<String, usize>,
}

impl ReferenceUsageIndex {
    /// Scan `field_names` in order. Missing fields are skipped.
    pub fn build<S, I>(source: &S, field_names: I) -> Self
    where
        S: FieldSource + ?Sized,
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut index = Self::default();
        for name in field_names {
            let name = name.as_ref();
            let Some(nodes) = source.field_nodes(name) else {
                continue;
            };
            for node in find_nodes_by_type(nodes, &ElementType::Reference) {
                if let Some(ref_id) = node.as_element().and_then(|element| element.ref_id()) {
                    index.record(ref_id, name);
                }
            }
        }
        index
    }

    fn record(&mut self, ref_id: &str, field: &str) {
        if let Some(&slot) = self.by_id.get(ref_id) {
            self.usages[slot].fields.insert(field.to_string());
            return;
        }

        let doc_index = self.usages.len() + 1;
        trace!(ref_id, doc_index, field, "Numbered reference");
        self.by_id.insert(ref_id.to_string(), self.usages.len());
        self.usages.push(ReferenceUsage {
            ref_id: ref_id.to_string(),
            doc_index,
            fields: BTreeSet::from([field.to_string()]),
        });
    }

    pub fn get(&self, ref_id: &str) -> Option<&ReferenceUsage> {
        self.by_id.get(ref_id).map(|&slot| &self.usages[slot])
    }

    pub fn doc_index(&self, ref_id: &str) -> Option<usize> {
        self.get(ref_id).map(|usage| usage.doc_index)
    }

    /// Usages in citation order
    pub fn iter(&self) -> impl Iterator<Item = &ReferenceUsage> {
        self.usages.iter()
    }

    pub fn len(&self) -> usize {
        self.usages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.usages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_model::Element;

    fn cites(ids: &[&str]) -> Vec<Node> {
        let mut children = vec![Node::text("")];
        for id in ids {
            children.push(Node::Element(
                Element::void(ElementType::Reference).with_attr("refId", *id),
            ));
            children.push(Node::text(""));
        }
        vec![Node::element(ElementType::Paragraph, children)]
    }

    #[test]
    fn test_ordinals_follow_scan_order_not_render_order() {
        // discussion is rendered first here but scanned second
        let mut fields = BTreeMap::new();
        fields.insert("discussion".to_string(), cites(&["r1"]));
        fields.insert("introduction".to_string(), cites(&["r2"]));

        let index = ReferenceUsageIndex::build(&fields, ["introduction", "discussion"]);
        assert_eq!(index.doc_index("r2"), Some(1));
        assert_eq!(index.doc_index("r1"), Some(2));
    }

    #[test]
    fn test_later_sightings_only_extend_fields() {
        let mut fields = HashMap::new();
        fields.insert("introduction".to_string(), cites(&["a", "b", "a"]));
        fields.insert("methods".to_string(), cites(&["c", "a"]));

        let index = ReferenceUsageIndex::build(&fields, ["introduction", "methods", "missing"]);
        let ids: Vec<(&str, usize)> = index
            .iter()
            .map(|usage| (usage.ref_id.as_str(), usage.doc_index))
            .collect();
        assert_eq!(ids, vec![("a", 1), ("b", 2), ("c", 3)]);

        let a = index.get("a").unwrap();
        assert_eq!(
            a.fields.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["introduction", "methods"]
        );
    }

    #[test]
    fn test_reference_without_id_is_ignored() {
        let mut fields = HashMap::new();
        fields.insert(
            "abstract".to_string(),
            vec![Node::element(
                ElementType::Paragraph,
                vec![Node::Element(Element::void(ElementType::Reference))],
            )],
        );
        let index = ReferenceUsageIndex::build(&fields, ["abstract"]);
        assert!(index.is_empty());
    }
}
