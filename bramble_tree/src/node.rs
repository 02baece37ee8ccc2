// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The recursive BSP cell: leaf storage, splitting, collapsing, traversal.

use alloc::boxed::Box;
use smallvec::SmallVec;

use crate::types::{Point2D, Rect2D, Scalar};

/// Inline buffer size for leaf entries; matches the default leaf capacity so
/// trees built with [`Tree::new`][crate::Tree::new] never spill to the heap
/// for entry storage.
pub(crate) const INLINE_ENTRIES: usize = 8;

type Entries<T, K> = SmallVec<[(Point2D<T>, K); INLINE_ENTRIES]>;

/// A single cell of the partitioning tree.
///
/// A node is a leaf iff it has no children. Leaves hold entries directly;
/// branches hold exactly two children whose rectangles divide the parent's
/// rectangle at the split line (they share only that line). `count` is the
/// total number of entries in the subtree.
pub(crate) struct Node<T, K> {
    bounds: Rect2D<T>,
    count: usize,
    entries: Entries<T, K>,
    children: Option<Box<(Self, Self)>>,
}

impl<T: Scalar, K> Node<T, K> {
    pub(crate) fn new_leaf(bounds: Rect2D<T>) -> Self {
        Self {
            bounds,
            count: 0,
            entries: SmallVec::new(),
            children: None,
        }
    }

    #[inline]
    pub(crate) fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    /// Insert an entry into this subtree. The point must lie within this
    /// node's rectangle.
    pub(crate) fn insert(&mut self, point: Point2D<T>, key: K, capacity: usize) {
        debug_assert!(
            self.bounds.contains_point(point),
            "insert point must lie within node bounds"
        );
        if self.is_leaf() {
            if self.entries.len() < capacity {
                self.entries.push((point, key));
                self.count += 1;
                return;
            }
            if !self.split(capacity) {
                // No split line separates the stored points (coincident, or
                // an extent too narrow for a representable midpoint), so the
                // leaf absorbs the entry beyond capacity. If the new point
                // widens the extent a later split distributes the whole
                // batch.
                self.entries.push((point, key));
                self.count += 1;
                let _ = self.split(capacity);
                return;
            }
        }
        self.insert_into_children(point, key, capacity);
    }

    /// Route an entry into the child with the smaller population when its
    /// rectangle allows it, otherwise into the other child.
    fn insert_into_children(&mut self, point: Point2D<T>, key: K, capacity: usize) {
        let pair = self
            .children
            .as_mut()
            .expect("tree invariant violated: branch node without children");
        let (one, other) = (&mut pair.0, &mut pair.1);
        let (smaller, larger) = if one.count <= other.count {
            (one, other)
        } else {
            (other, one)
        };
        if smaller.bounds.contains_point(point) {
            smaller.insert(point, key, capacity);
        } else {
            debug_assert!(
                larger.bounds.contains_point(point),
                "point must lie within one of the children's bounds"
            );
            larger.insert(point, key, capacity);
        }
        self.count += 1;
    }

    /// The split line for a set of entries: the midpoint of the points' own
    /// extent on the longer of the two axes (x on ties). Returns the axis
    /// (`true` for x) and the split coordinate.
    ///
    /// Returns `None` when no such line can put at least one point strictly
    /// on each side: all points coincident, or the extent so narrow that the
    /// midpoint of two adjacent floats rounds onto an endpoint. Splitting on
    /// such a line would hand every entry to one child and make no progress.
    fn split_line(entries: &Entries<T, K>) -> Option<(bool, T)> {
        let mut it = entries.iter();
        let &(first, _) = it.next()?;
        let (mut min_x, mut max_x) = (first.x, first.x);
        let (mut min_y, mut max_y) = (first.y, first.y);
        for &(p, _) in it {
            min_x = T::min(min_x, p.x);
            max_x = T::max(max_x, p.x);
            min_y = T::min(min_y, p.y);
            max_y = T::max(max_y, p.y);
        }
        let width = T::sub(max_x, min_x);
        let height = T::sub(max_y, min_y);
        if width >= height {
            let split = T::mid(min_x, max_x);
            (min_x < split && split < max_x).then_some((true, split))
        } else {
            let split = T::mid(min_y, max_y);
            (min_y < split && split < max_y).then_some((false, split))
        }
    }

    /// Convert a full leaf into a branch.
    ///
    /// The split line runs through the midpoint of the stored points' own
    /// extent on the longer of the two axes (x on ties), so splits adapt to
    /// data density rather than to the node's static rectangle. All former
    /// entries are redistributed through the branch insertion path. Because
    /// the line strictly separates the extremes, each child receives at
    /// least one entry and redistribution terminates.
    ///
    /// Returns `false` without changing the node when no split line can
    /// separate the stored points (see [`Self::split_line`]).
    fn split(&mut self, capacity: usize) -> bool {
        let Some((x_axis, at)) = Self::split_line(&self.entries) else {
            return false;
        };
        let b = self.bounds;
        let (one, other) = if x_axis {
            (
                Rect2D::new(b.min_x, b.min_y, at, b.max_y),
                Rect2D::new(at, b.min_y, b.max_x, b.max_y),
            )
        } else {
            (
                Rect2D::new(b.min_x, b.min_y, b.max_x, at),
                Rect2D::new(b.min_x, at, b.max_x, b.max_y),
            )
        };
        self.children = Some(Box::new((Self::new_leaf(one), Self::new_leaf(other))));
        self.count = 0;
        let entries = core::mem::take(&mut self.entries);
        for (p, k) in entries {
            self.insert_into_children(p, k, capacity);
        }
        true
    }

    /// Remove the entry with the given key from this subtree, using `point`
    /// (its last-known position) to prune the search. Returns whether an
    /// entry was removed.
    pub(crate) fn remove(&mut self, point: Point2D<T>, key: &K, capacity: usize) -> bool
    where
        K: PartialEq,
    {
        let Some(pair) = self.children.as_mut() else {
            let Some(at) = self.entries.iter().position(|(_, k)| k == key) else {
                return false;
            };
            // `remove` (not `swap_remove`) keeps the later entries in order.
            self.entries.remove(at);
            self.count -= 1;
            return true;
        };

        // A point exactly on the split line sits in both children's
        // rectangles, so probe the second child when the first misses.
        let mut removed = false;
        if pair.0.bounds.contains_point(point) {
            removed = pair.0.remove(point, key, capacity);
        }
        if !removed && pair.1.bounds.contains_point(point) {
            removed = pair.1.remove(point, key, capacity);
        }
        if removed {
            self.count -= 1;
            if self.count <= capacity {
                self.collapse();
            }
        }
        removed
    }

    /// Convert a branch whose population has dropped to the leaf capacity
    /// back into a leaf holding both children's entries.
    ///
    /// Collapsing eagerly at the threshold keeps the invariant that both
    /// children are leaves here: any surviving branch holds more entries
    /// than the capacity, so a branch child would make this node's count
    /// exceed it too.
    fn collapse(&mut self) {
        let pair = self
            .children
            .take()
            .expect("tree invariant violated: collapse on a leaf");
        let (one, other) = *pair;
        debug_assert!(
            one.is_leaf() && other.is_leaf(),
            "eager collapse requires both children to be leaves"
        );
        self.entries = one.entries;
        self.entries.extend(other.entries);
        debug_assert_eq!(
            self.count,
            self.entries.len(),
            "branch count must equal the sum of its children's counts"
        );
    }

    /// Visit entries whose point lies inside `rect`, pruning subtrees whose
    /// rectangle does not overlap it. The callback returns `true` to keep
    /// enumerating; the method returns `false` as soon as any callback
    /// stopped the traversal.
    pub(crate) fn visit_rect<F>(&self, rect: &Rect2D<T>, f: &mut F) -> bool
    where
        F: FnMut(Point2D<T>, &K) -> bool,
    {
        let Some(pair) = self.children.as_ref() else {
            for (p, k) in &self.entries {
                if rect.contains_point(*p) && !f(*p, k) {
                    return false;
                }
            }
            return true;
        };
        if pair.0.bounds.overlaps(rect) && !pair.0.visit_rect(rect, f) {
            return false;
        }
        if pair.1.bounds.overlaps(rect) && !pair.1.visit_rect(rect, f) {
            return false;
        }
        true
    }

    /// Recursively audit the structural invariants. Debug builds run this
    /// after every mutating operation; it is compiled out of release builds.
    #[cfg(debug_assertions)]
    pub(crate) fn assert_consistent(&self, capacity: usize)
    where
        K: core::fmt::Debug,
    {
        match self.children.as_deref() {
            Some((one, other)) => {
                assert!(
                    self.entries.is_empty(),
                    "branch must not hold direct entries"
                );
                assert_eq!(
                    self.count,
                    one.count + other.count,
                    "branch count must equal the sum of its children's counts"
                );
                for child in [one, other] {
                    assert!(
                        self.bounds.min_x <= child.bounds.min_x
                            && self.bounds.min_y <= child.bounds.min_y
                            && child.bounds.max_x <= self.bounds.max_x
                            && child.bounds.max_y <= self.bounds.max_y,
                        "child bounds must lie within the parent bounds"
                    );
                    child.assert_consistent(capacity);
                }
            }
            None => {
                assert_eq!(
                    self.count,
                    self.entries.len(),
                    "leaf count must equal its number of entries"
                );
                if self.count > capacity {
                    assert!(
                        Self::split_line(&self.entries).is_none(),
                        "leaf may exceed capacity only when no split line separates its points"
                    );
                }
                for (p, k) in &self.entries {
                    assert!(
                        self.bounds.contains_point(*p),
                        "entry {k:?} lies outside its leaf bounds"
                    );
                }
            }
        }
    }
}
