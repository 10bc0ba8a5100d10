//! Multi-select state over an externally owned, ordered list
//!
//! Click semantics:
//! - plain: select only the item, or clear when it was the only selection
//! - meta: add or remove the item, leaving the rest alone
//! - shift: walk from the last selected item (or the first list item) to the
//!   target; select the whole run, or deselect it when it is already selected

use std::collections::HashSet;
use std::fmt::Debug;
use std::hash::Hash;

use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionListError {
    #[error("Key {0} appears more than once in the list")]
    DuplicateListKey(String),

    #[error("Key {0} appears more than once in the selection")]
    DuplicateSelectionKey(String),

    #[error("Selected key {0} is not in the list")]
    MissingItem(String),
}

/// Modifier keys held during a click
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub meta: bool,
    pub shift: bool,
}

impl Modifiers {
    pub fn meta() -> Self {
        Self {
            meta: true,
            shift: false,
        }
    }

    pub fn shift() -> Self {
        Self {
            meta: false,
            shift: true,
        }
    }
}

/// Selected keys in the order they were selected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionList<K> {
    selected: Vec<K>,
}

impl<K> Default for SelectionList<K> {
    fn default() -> Self {
        Self {
            selected: Vec::new(),
        }
    }
}

impl<K> SelectionList<K>
where
    K: Clone + Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_selected(selected: Vec<K>) -> Self {
        Self { selected }
    }

    pub fn selected(&self) -> &[K] {
        &self.selected
    }

    pub fn is_selected(&self, key: &K) -> bool {
        self.selected.contains(key)
    }

    pub fn select(&mut self, key: K) {
        if !self.is_selected(&key) {
            self.selected.push(key);
        }
    }

    pub fn deselect(&mut self, key: &K) {
        self.selected.retain(|selected| selected != key);
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Apply a click on `key` within `list`
    pub fn toggle(
        &mut self,
        list: &[K],
        key: &K,
        modifiers: Modifiers,
    ) -> Result<(), SelectionListError> {
        ensure_unique(list, SelectionListError::DuplicateListKey)?;
        ensure_unique(&self.selected, SelectionListError::DuplicateSelectionKey)?;

        if modifiers.shift {
            self.toggle_range(list, key)?;
        } else if modifiers.meta {
            if self.is_selected(key) {
                self.deselect(key);
            } else {
                self.selected.push(key.clone());
            }
        } else if self.selected.len() == 1 && self.selected[0] == *key {
            self.selected.clear();
        } else {
            self.selected = vec![key.clone()];
        }

        debug!(selected = self.selected.len(), "Selection toggled");
        Ok(())
    }

    fn toggle_range(&mut self, list: &[K], key: &K) -> Result<(), SelectionListError> {
        let target = position(list, key)?;
        let anchor = match self.selected.last() {
            Some(last) => position(list, last)?,
            None => 0,
        };

        let run: Vec<&K> = if anchor <= target {
            list[anchor..=target].iter().collect()
        } else {
            list[target..=anchor].iter().rev().collect()
        };

        if run.iter().all(|item| self.is_selected(item)) {
            let run: HashSet<&K> = run.into_iter().collect();
            self.selected.retain(|selected| !run.contains(selected));
        } else {
            for item in run {
                self.select(item.clone());
            }
        }
        Ok(())
    }

    /// Selected items looked up in `items`, in selection order
    pub fn materialize<'a, T, F>(
        &self,
        items: &'a [T],
        key_of: F,
    ) -> Result<Vec<&'a T>, SelectionListError>
    where
        F: Fn(&T) -> K,
    {
        let keys: Vec<K> = items.iter().map(&key_of).collect();
        ensure_unique(&keys, SelectionListError::DuplicateListKey)?;
        ensure_unique(&self.selected, SelectionListError::DuplicateSelectionKey)?;

        self.selected
            .iter()
            .map(|key| position(&keys, key).map(|index| &items[index]))
            .collect()
    }
}

fn position<K: PartialEq + Debug>(list: &[K], key: &K) -> Result<usize, SelectionListError> {
    list.iter()
        .position(|item| item == key)
        .ok_or_else(|| SelectionListError::MissingItem(format!("{key:?}")))
}

fn ensure_unique<K, E>(keys: &[K], error: E) -> Result<(), SelectionListError>
where
    K: Eq + Hash + Debug,
    E: Fn(String) -> SelectionListError,
{
    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        if !seen.insert(key) {
            return Err(error(format!("{key:?}")));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST: [u32; 4] = [1, 2, 3, 4];

    #[test]
    fn test_click_sequence() {
        let mut selection = SelectionList::new();

        selection.toggle(&LIST, &1, Modifiers::default()).unwrap();
        assert_eq!(selection.selected(), &[1]);

        selection.toggle(&LIST, &2, Modifiers::default()).unwrap();
        assert_eq!(selection.selected(), &[2]);

        selection.toggle(&LIST, &4, Modifiers::meta()).unwrap();
        assert_eq!(selection.selected(), &[2, 4]);

        selection.toggle(&LIST, &1, Modifiers::shift()).unwrap();
        assert_eq!(selection.selected(), &[2, 4, 3, 1]);

        selection.toggle(&LIST, &4, Modifiers::shift()).unwrap();
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn test_plain_click_on_only_selection_clears() {
        let mut selection = SelectionList::from_selected(vec![3]);
        selection.toggle(&LIST, &3, Modifiers::default()).unwrap();
        assert!(selection.selected().is_empty());
    }

    #[test]
    fn test_meta_click_removes_selected() {
        let mut selection = SelectionList::from_selected(vec![1, 3]);
        selection.toggle(&LIST, &1, Modifiers::meta()).unwrap();
        assert_eq!(selection.selected(), &[3]);
    }

    #[test]
    fn test_shift_without_selection_anchors_at_first_item() {
        let mut selection = SelectionList::new();
        selection.toggle(&LIST, &3, Modifiers::shift()).unwrap();
        assert_eq!(selection.selected(), &[1, 2, 3]);
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let mut selection = SelectionList::new();
        let err = selection
            .toggle(&[1, 2, 2], &1, Modifiers::default())
            .unwrap_err();
        assert_eq!(err, SelectionListError::DuplicateListKey("2".to_string()));

        let mut selection = SelectionList::from_selected(vec![1, 1]);
        let err = selection.toggle(&LIST, &2, Modifiers::meta()).unwrap_err();
        assert_eq!(err, SelectionListError::DuplicateSelectionKey("1".to_string()));
    }

    #[test]
    fn test_materialize() {
        #[derive(Debug, PartialEq)]
        struct Reference {
            id: &'static str,
        }
        let items = [
            Reference { id: "a" },
            Reference { id: "b" },
            Reference { id: "c" },
        ];

        let selection = SelectionList::from_selected(vec!["c", "a"]);
        let picked = selection.materialize(&items, |item| item.id).unwrap();
        assert_eq!(picked, vec![&items[2], &items[0]]);

        let selection = SelectionList::from_selected(vec!["z"]);
        assert_eq!(
            selection.materialize(&items, |item| item.id),
            Err(SelectionListError::MissingItem("\"z\"".to_string()))
        );
    }
}
