// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The partitioning tree: root ownership, mutation entry points, queries.

use crate::node::Node;
use crate::types::{Point2D, Rect2D, Scalar};

/// Default number of entries a leaf holds before it splits.
pub const DEFAULT_CAPACITY: usize = 8;

/// Adaptive BSP tree over 2D points with opaque keys.
///
/// The root rectangle spans the whole finite coordinate range, so any finite
/// point can be inserted. Leaves hold up to a fixed capacity of entries;
/// inserting into a full leaf splits it at the midpoint of its own points'
/// extent along the longer axis, and removals collapse a branch back into a
/// leaf as soon as its population drops to the capacity.
///
/// Keys are opaque: the tree stores them alongside points and hands them
/// back from queries. Removal is by key, with the entry's last-known point
/// used to prune the search.
///
/// ## Example
///
/// ```rust
/// use bramble_tree::{Point2D, Rect2D, Tree};
///
/// let mut tree: Tree<f64, u32> = Tree::new();
/// tree.insert(Point2D::new(1.0, 2.0), 7);
/// tree.insert(Point2D::new(50.0, 50.0), 8);
///
/// let mut hits = Vec::new();
/// tree.visit_rect(&Rect2D::new(0.0, 0.0, 10.0, 10.0), |_p, k| {
///     hits.push(*k);
///     true
/// });
/// assert_eq!(hits, vec![7]);
///
/// assert!(tree.remove(Point2D::new(1.0, 2.0), &7));
/// assert_eq!(tree.len(), 1);
/// ```
pub struct Tree<T, K> {
    root: Node<T, K>,
    capacity: usize,
}

impl<T: Scalar, K> core::fmt::Debug for Tree<T, K> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Tree")
            .field("len", &self.root.count())
            .field("capacity", &self.capacity)
            .field("root_is_leaf", &self.root.is_leaf())
            .finish_non_exhaustive()
    }
}

impl<T: Scalar, K: PartialEq + core::fmt::Debug> Default for Tree<T, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, K: PartialEq + core::fmt::Debug> Tree<T, K> {
    /// Create an empty tree with the default leaf capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create an empty tree with an explicit leaf capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity >= 1, "leaf capacity must be at least 1");
        Self {
            root: Node::new_leaf(Rect2D::everything()),
            capacity,
        }
    }

    /// The number of entries stored in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.root.count()
    }

    /// Whether the tree holds no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.count() == 0
    }

    /// The leaf capacity this tree was created with.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Insert an entry. The point must be finite; callers validating user
    /// input should do so before reaching the tree.
    pub fn insert(&mut self, point: Point2D<T>, key: K) {
        self.root.insert(point, key, self.capacity);
        self.audit();
    }

    /// Remove the entry with the given key, last seen at `point`.
    ///
    /// Returns whether an entry was removed. Removing from an empty tree or
    /// with an unknown key is not an error.
    pub fn remove(&mut self, point: Point2D<T>, key: &K) -> bool {
        let removed = self.root.remove(point, key, self.capacity);
        self.audit();
        removed
    }

    /// Drop every entry, leaving a single empty leaf root.
    pub fn clear(&mut self) {
        self.root = Node::new_leaf(Rect2D::everything());
    }

    /// Visit entries whose point lies inside `rect` (edges inclusive), in no
    /// particular order.
    ///
    /// The callback returns `true` to keep enumerating and `false` to stop;
    /// the method returns `false` iff the callback stopped the traversal.
    /// Subtrees whose rectangle does not overlap `rect` are never visited.
    pub fn visit_rect<F>(&self, rect: &Rect2D<T>, mut f: F) -> bool
    where
        F: FnMut(Point2D<T>, &K) -> bool,
    {
        self.root.visit_rect(rect, &mut f)
    }

    /// Visit entries strictly inside the circle around `center`, in no
    /// particular order. Same callback contract as [`Tree::visit_rect`].
    ///
    /// Candidates are narrowed by the circle's bounding square first, then
    /// tested by squared distance, so no square root is taken per entry. A
    /// point at exactly `radius` from the center is excluded.
    pub fn visit_circle<F>(&self, center: Point2D<T>, radius: T, mut f: F) -> bool
    where
        F: FnMut(Point2D<T>, &K) -> bool,
    {
        let square = Rect2D::around(center, radius);
        let r2 = T::widen(radius) * T::widen(radius);
        self.root.visit_rect(&square, &mut |p, k| {
            if p.dist_squared(&center) < r2 { f(p, k) } else { true }
        })
    }

    #[cfg(debug_assertions)]
    #[inline]
    fn audit(&self) {
        self.root.assert_consistent(self.capacity);
    }

    #[cfg(not(debug_assertions))]
    #[inline(always)]
    fn audit(&self) {}
}
