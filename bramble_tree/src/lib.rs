// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Tree: an adaptive 2D binary space partitioning tree for points.
//!
//! The tree stores (point, key) entries and answers rectangle and circle
//! queries without scanning every entry.
//!
//! - Leaves hold entries directly, up to a fixed capacity (8 by default).
//! - A full leaf splits into two children at the midpoint of its own points'
//!   extent along the longer axis, so the partitioning adapts to data
//!   density rather than static geometry.
//! - Removals collapse a branch back into a leaf as soon as its population
//!   drops to the capacity, keeping the structure compact under churn.
//! - Queries prune whole subtrees whose rectangle does not overlap the
//!   query region, and support early termination from the callback.
//!
//! Keys are opaque to the tree. Higher layers (like [`bramble_index`]'s
//! identity-tracking facade) decide what a key denotes and where an entry's
//! current coordinate comes from.
//!
//! [`bramble_index`]: https://docs.rs/bramble_index
//!
//! # Example
//!
//! ```rust
//! use bramble_tree::{Point2D, Rect2D, Tree};
//!
//! let mut tree: Tree<f64, u32> = Tree::new();
//! tree.insert(Point2D::new(0.0, 0.0), 1);
//! tree.insert(Point2D::new(5.0, 5.0), 2);
//! tree.insert(Point2D::new(100.0, 100.0), 3);
//!
//! // Rectangle query with inclusive edges.
//! let mut hits = Vec::new();
//! tree.visit_rect(&Rect2D::new(0.0, 0.0, 5.0, 5.0), |_p, k| {
//!     hits.push(*k);
//!     true
//! });
//! hits.sort_unstable();
//! assert_eq!(hits, vec![1, 2]);
//!
//! // Circle query: strictly-inside semantics, no square roots taken.
//! let mut close = Vec::new();
//! tree.visit_circle(bramble_tree::Point2D::new(0.0, 0.0), 8.0, |_p, k| {
//!     close.push(*k);
//!     true
//! });
//! close.sort_unstable();
//! assert_eq!(close, vec![1, 2]);
//! ```
//!
//! ## Caller contract
//!
//! The tree is single-threaded and callbacks must not mutate the tree they
//! are enumerating; traversal walks live structure with no snapshot.
//!
//! ### Float semantics
//!
//! Coordinates are assumed finite. Debug builds assert; layers accepting
//! untrusted input should validate before inserting.

#![no_std]

extern crate alloc;

mod node;
mod tree;
mod types;

pub use tree::{DEFAULT_CAPACITY, Tree};
pub use types::{Point2D, Rect2D, Scalar};
