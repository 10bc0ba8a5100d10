//! Paths and their transformation across edits
//!
//! A path is only meaningful for the tree it was computed on. Every edit
//! reports a [`TreeChange`]; paths held across an edit must be passed through
//! [`Path::transform`] instead of being reused as-is.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Deref;

/// Child indices from the root to a node. The empty path is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

/// Which side a position sticks to when an edit lands exactly on it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Forward,
    Backward,
    /// The position is dropped when the edit lands exactly on it
    None,
}

/// Structural effect of an edit.
///
/// `position` is a character offset for leaves and a child index for elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeChange {
    InsertNode { path: Path },
    RemoveNode { path: Path },
    MergeNode { path: Path, position: usize },
    SplitNode { path: Path, position: usize },
    MoveNode { path: Path, new_path: Path },
    InsertText { path: Path, offset: usize, len: usize },
    RemoveText { path: Path, offset: usize, len: usize },
}

impl Path {
    pub fn root() -> Self {
        Path(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Path(indices)
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    /// Concatenate a relative path below this one
    pub fn join(&self, relative: &[usize]) -> Path {
        let mut indices = self.0.clone();
        indices.extend_from_slice(relative);
        Path(indices)
    }

    pub fn parent(&self) -> Option<Path> {
        let (_, parent) = self.0.split_last()?;
        Some(Path(parent.to_vec()))
    }

    pub fn index(&self) -> Option<usize> {
        self.0.last().copied()
    }

    pub fn next(&self) -> Option<Path> {
        let index = self.index()?;
        let mut indices = self.0.clone();
        *indices.last_mut()? = index + 1;
        Some(Path(indices))
    }

    pub fn previous(&self) -> Option<Path> {
        let index = self.index()?.checked_sub(1)?;
        let mut indices = self.0.clone();
        *indices.last_mut()? = index;
        Some(Path(indices))
    }

    /// Every proper ancestor, root first
    pub fn ancestors(&self) -> Vec<Path> {
        (0..self.0.len()).map(|len| Path(self.0[..len].to_vec())).collect()
    }

    /// Every ancestor plus the path itself, root first
    pub fn levels(&self) -> Vec<Path> {
        (0..=self.0.len()).map(|len| Path(self.0[..len].to_vec())).collect()
    }

    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_parent_of(&self, other: &Path) -> bool {
        self.0.len() + 1 == other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn is_sibling_of(&self, other: &Path) -> bool {
        !self.0.is_empty()
            && self.0.len() == other.0.len()
            && self.0[..self.0.len() - 1] == other.0[..other.0.len() - 1]
            && self.0 != other.0
    }

    /// Whether this path's node precedes `other` at the same level,
    /// i.e. is an earlier sibling of `other` or of one of its ancestors
    pub fn ends_before(&self, other: &Path) -> bool {
        let Some((last, prefix)) = self.0.split_last() else {
            return false;
        };
        let i = prefix.len();
        other.0.len() > i && other.0[..i] == *prefix && *last < other.0[i]
    }

    /// Document-order comparison; ancestors compare equal to their descendants
    pub fn compare(&self, other: &Path) -> Ordering {
        for (a, b) in self.0.iter().zip(other.0.iter()) {
            match a.cmp(b) {
                Ordering::Equal => continue,
                ordering => return ordering,
            }
        }
        Ordering::Equal
    }

    pub fn is_before(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Path) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Longest shared prefix
    pub fn common(&self, other: &Path) -> Path {
        Path(
            self.0
                .iter()
                .zip(other.0.iter())
                .take_while(|(a, b)| a == b)
                .map(|(a, _)| *a)
                .collect(),
        )
    }

    /// Recompute this path after `change`. `None` means the node is gone.
    pub fn transform(&self, change: &TreeChange, affinity: Affinity) -> Option<Path> {
        let mut p = self.0.clone();

        match change {
            TreeChange::InsertNode { path: op } => {
                if op.is_root() {
                    return Some(self.clone());
                }
                if op == self || op.ends_before(self) || op.is_ancestor_of(self) {
                    p[op.0.len() - 1] += 1;
                }
            }

            TreeChange::RemoveNode { path: op } => {
                if op.is_root() {
                    return Some(self.clone());
                }
                if op == self || op.is_ancestor_of(self) {
                    return None;
                }
                if op.ends_before(self) {
                    p[op.0.len() - 1] -= 1;
                }
            }

            TreeChange::MergeNode { path: op, position } => {
                if op.is_root() {
                    return Some(self.clone());
                }
                if op == self || op.ends_before(self) {
                    p[op.0.len() - 1] -= 1;
                } else if op.is_ancestor_of(self) {
                    p[op.0.len() - 1] -= 1;
                    p[op.0.len()] += position;
                }
            }

            TreeChange::SplitNode { path: op, position } => {
                if op.is_root() {
                    return Some(self.clone());
                }
                if op == self {
                    match affinity {
                        Affinity::Forward => {
                            let last = p.len() - 1;
                            p[last] += 1;
                        }
                        Affinity::Backward => {}
                        Affinity::None => return None,
                    }
                } else if op.ends_before(self) {
                    p[op.0.len() - 1] += 1;
                } else if op.is_ancestor_of(self) && self.0[op.0.len()] >= *position {
                    p[op.0.len() - 1] += 1;
                    p[op.0.len()] -= position;
                }
            }

            TreeChange::MoveNode { path: op, new_path: onp } => {
                if op == onp || op.is_root() {
                    return Some(self.clone());
                }
                if op.is_ancestor_of(self) || op == self {
                    let mut copy = onp.0.clone();
                    if op.ends_before(onp) && op.0.len() < onp.0.len() {
                        copy[op.0.len() - 1] -= 1;
                    }
                    copy.extend_from_slice(&self.0[op.0.len()..]);
                    return Some(Path(copy));
                } else if op.is_sibling_of(onp) && (onp.is_ancestor_of(self) || onp == self) {
                    if op.ends_before(self) {
                        p[op.0.len() - 1] -= 1;
                    } else {
                        p[op.0.len() - 1] += 1;
                    }
                } else if onp.ends_before(self) || onp == self || onp.is_ancestor_of(self) {
                    if op.ends_before(self) {
                        p[op.0.len() - 1] -= 1;
                    }
                    p[onp.0.len() - 1] += 1;
                } else if op.ends_before(self) {
                    if onp == self {
                        p[onp.0.len() - 1] += 1;
                    }
                    p[op.0.len() - 1] -= 1;
                }
            }

            TreeChange::InsertText { .. } | TreeChange::RemoveText { .. } => {}
        }

        Some(Path(p))
    }
}

impl Deref for Path {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<Vec<usize>> for Path {
    fn from(indices: Vec<usize>) -> Self {
        Path(indices)
    }
}

impl From<&[usize]> for Path {
    fn from(indices: &[usize]) -> Self {
        Path(indices.to_vec())
    }
}

impl<const N: usize> From<[usize; N]> for Path {
    fn from(indices: [usize; N]) -> Self {
        Path(indices.to_vec())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, index) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}
