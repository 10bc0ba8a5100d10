//! Host-provided context for the rich editor: known references, the callback
//! used to create new ones, and where the editor sits in its owning document.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl ReferenceData {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            authors: Vec::new(),
            year: None,
            url: None,
        }
    }

    /// "Smith 2020", "Smith & Jones 2020", "Smith et al. 2020", or the title
    pub fn short_label(&self) -> String {
        let surname = |author: &String| author.split_whitespace().last().unwrap_or(author).to_string();
        let names = match self.authors.as_slice() {
            [] => return self.title.clone(),
            [one] => surname(one),
            [first, second] => format!("{} & {}", surname(first), surname(second)),
            [first, ..] => format!("{} et al.", surname(first)),
        };
        match self.year {
            Some(year) => format!("{names} {year}"),
            None => names,
        }
    }
}

pub type ReferenceUpsert = Rc<dyn Fn(ReferenceData)>;

#[derive(Clone, Default)]
pub struct RichContext {
    pub references: Vec<ReferenceData>,
    pub on_reference_upsert: Option<ReferenceUpsert>,
    /// Nesting depth of the sub-section this editor renders, 0 at top level
    pub subsection_level: u8,
    pub section_id: Option<String>,
    pub owner_document_id: Option<String>,
}

impl RichContext {
    pub fn reference(&self, id: &str) -> Option<&ReferenceData> {
        self.references.iter().find(|reference| reference.id == id)
    }

    /// Hand a new or edited reference to the host
    pub fn upsert_reference(&self, reference: ReferenceData) {
        match &self.on_reference_upsert {
            Some(upsert) => upsert(reference),
            None => debug!(id = %reference.id, "No reference upsert handler installed"),
        }
    }
}

impl fmt::Debug for RichContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RichContext")
            .field("references", &self.references)
            .field("on_reference_upsert", &self.on_reference_upsert.is_some())
            .field("subsection_level", &self.subsection_level)
            .field("section_id", &self.section_id)
            .field("owner_document_id", &self.owner_document_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_short_label() {
        let mut reference = ReferenceData::new("r1", "On Things");
        assert_eq!(reference.short_label(), "On Things");

        reference.authors = vec!["Ada Lovelace".to_string()];
        reference.year = Some(1843);
        assert_eq!(reference.short_label(), "Lovelace 1843");

        reference.authors.push("Charles Babbage".to_string());
        assert_eq!(reference.short_label(), "Lovelace & Babbage 1843");

        reference.authors.push("Someone Else".to_string());
        assert_eq!(reference.short_label(), "Lovelace et al. 1843");
    }

    #[test]
    fn test_upsert_reaches_host() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let context = RichContext {
            on_reference_upsert: Some(Rc::new(move |reference: ReferenceData| {
                sink.borrow_mut().push(reference.id)
            })),
            ..RichContext::default()
        };

        context.upsert_reference(ReferenceData::new("r9", "New"));
        assert_eq!(*seen.borrow(), vec!["r9".to_string()]);
    }
}
