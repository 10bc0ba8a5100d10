//! Points inside leaves and ranges between them

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::{Affinity, Path, TreeChange};

/// A character offset inside the leaf at `path`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    pub fn compare(&self, other: &Point) -> Ordering {
        match self.path.compare(&other.path) {
            Ordering::Equal => self.offset.cmp(&other.offset),
            ordering => ordering,
        }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Greater
    }

    /// Recompute this point after `change`. `None` means its leaf is gone.
    pub fn transform(&self, change: &TreeChange, affinity: Affinity) -> Option<Point> {
        let mut point = self.clone();

        match change {
            TreeChange::InsertText { path, offset, len } => {
                if *path == point.path
                    && (*offset < point.offset
                        || (*offset == point.offset && affinity == Affinity::Forward))
                {
                    point.offset += len;
                }
            }

            TreeChange::RemoveText { path, offset, len } => {
                if *path == point.path && *offset <= point.offset {
                    point.offset -= (point.offset - offset).min(*len);
                }
            }

            TreeChange::RemoveNode { path } => {
                if *path == point.path || path.is_ancestor_of(&point.path) {
                    return None;
                }
                point.path = point.path.transform(change, affinity)?;
            }

            TreeChange::MergeNode { path, position } => {
                if *path == point.path {
                    point.offset += position;
                }
                point.path = point.path.transform(change, affinity)?;
            }

            TreeChange::SplitNode { path, position } => {
                if *path == point.path {
                    if *position == point.offset && affinity == Affinity::None {
                        return None;
                    }
                    if *position < point.offset
                        || (*position == point.offset && affinity == Affinity::Forward)
                    {
                        point.offset -= position;
                        point.path = point.path.transform(change, Affinity::Forward)?;
                    }
                } else {
                    point.path = point.path.transform(change, affinity)?;
                }
            }

            TreeChange::InsertNode { .. } | TreeChange::MoveNode { .. } => {
                point.path = point.path.transform(change, affinity)?;
            }
        }

        Some(point)
    }
}

/// Anchor/focus pair; the anchor is where the selection started
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.is_after(&self.focus)
    }

    /// Start and end in document order
    pub fn edges(&self) -> (&Point, &Point) {
        if self.is_backward() {
            (&self.focus, &self.anchor)
        } else {
            (&self.anchor, &self.focus)
        }
    }

    pub fn start(&self) -> &Point {
        self.edges().0
    }

    pub fn end(&self) -> &Point {
        self.edges().1
    }

    pub fn contains_point(&self, point: &Point) -> bool {
        let (start, end) = self.edges();
        point.compare(start) != Ordering::Less && point.compare(end) != Ordering::Greater
    }

    /// Whether the node at `path` overlaps the range
    pub fn touches_path(&self, path: &Path) -> bool {
        let (start, end) = self.edges();
        start.path.compare(path) != Ordering::Greater && end.path.compare(path) != Ordering::Less
    }

    /// Recompute the range after `change`, keeping an expanded range from
    /// growing over content inserted at its edges.
    pub fn transform(&self, change: &TreeChange) -> Option<Range> {
        let collapsed = self.is_collapsed();
        let (anchor_affinity, focus_affinity) = if !self.is_backward() {
            let anchor = Affinity::Forward;
            (anchor, if collapsed { anchor } else { Affinity::Backward })
        } else {
            let anchor = Affinity::Backward;
            (anchor, if collapsed { anchor } else { Affinity::Forward })
        };

        let anchor = self.anchor.transform(change, anchor_affinity)?;
        let focus = self.focus.transform(change, focus_affinity)?;
        Some(Range { anchor, focus })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_follow_document_order() {
        let range = Range::new(Point::new([1, 0], 2), Point::new([0, 0], 4));
        assert!(range.is_backward());
        assert_eq!(range.start(), &Point::new([0, 0], 4));
        assert_eq!(range.end(), &Point::new([1, 0], 2));
    }

    #[test]
    fn test_split_at_range_edges_keeps_range_inside() {
        let range = Range::new(Point::new([0, 0], 2), Point::new([0, 0], 5));

        let split_start = TreeChange::SplitNode {
            path: Path::from([0, 0]),
            position: 2,
        };
        let range = range.transform(&split_start).unwrap();
        assert_eq!(range.anchor, Point::new([0, 1], 0));
        assert_eq!(range.focus, Point::new([0, 1], 3));

        let split_end = TreeChange::SplitNode {
            path: Path::from([0, 1]),
            position: 3,
        };
        let range = range.transform(&split_end).unwrap();
        assert_eq!(range.anchor, Point::new([0, 1], 0));
        assert_eq!(range.focus, Point::new([0, 1], 3));
    }

    #[test]
    fn test_remove_text_clamps_offset() {
        let point = Point::new([0, 0], 5);
        let change = TreeChange::RemoveText {
            path: Path::from([0, 0]),
            offset: 2,
            len: 10,
        };
        assert_eq!(point.transform(&change, Affinity::Forward).unwrap().offset, 2);
    }

    #[test]
    fn test_merge_adds_position_to_offset() {
        let point = Point::new([0, 1], 2);
        let change = TreeChange::MergeNode {
            path: Path::from([0, 1]),
            position: 4,
        };
        assert_eq!(
            point.transform(&change, Affinity::Forward).unwrap(),
            Point::new([0, 0], 6)
        );
    }
}
