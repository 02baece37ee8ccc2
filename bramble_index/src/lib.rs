// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bramble Index: identity tracking and queries over a 2D point partition.
//!
//! This crate is the public surface over [`bramble_tree`]: it tracks opaque
//! identity keys at coordinates supplied by a caller-provided position
//! accessor, and answers "which keys lie in this rectangle / within this
//! radius" without a linear scan.
//!
//! - [`SpaceIndex::add`] inserts a fresh key or repositions a tracked one;
//!   re-adding an unmoved key is a structural no-op.
//! - [`SpaceIndex::remove`] stops tracking a key and reports whether it was
//!   tracked.
//! - [`SpaceIndex::visit_rect`] / [`SpaceIndex::visit_circle`] stream
//!   matching keys to a callback that can stop the enumeration early;
//!   `query_*` variants collect instead.
//! - An optional [`ChangeObserver`] lets an external notification source
//!   keep moved keys fresh: the index subscribes keys on first add and
//!   unsubscribes on removal and teardown, and the source triggers re-adds.
//!
//! # Example
//!
//! ```rust
//! use bramble_index::{Point2D, Rect2D, SpaceIndex};
//! use std::cell::RefCell;
//! use std::collections::HashMap;
//!
//! // Positions live outside the index; the accessor reads them on demand.
//! let world: RefCell<HashMap<u32, Point2D<f64>>> = RefCell::new(HashMap::new());
//! world.borrow_mut().insert(1, Point2D::new(0.0, 0.0));
//! world.borrow_mut().insert(2, Point2D::new(40.0, 40.0));
//!
//! let mut idx = SpaceIndex::new(|k: &u32| world.borrow()[k]);
//! idx.add(1).unwrap();
//! idx.add(2).unwrap();
//!
//! let near: Vec<u32> = idx.query_rect(&Rect2D::new(-5.0, -5.0, 5.0, 5.0)).collect();
//! assert_eq!(near, vec![1]);
//!
//! // Move a key, then re-add it; exactly one entry remains.
//! world.borrow_mut().insert(1, Point2D::new(41.0, 41.0));
//! idx.add(1).unwrap();
//! let near: Vec<u32> = idx
//!     .query_circle(Point2D::new(40.0, 40.0), 3.0)
//!     .collect();
//! assert_eq!(near.len(), 2);
//! ```
//!
//! ## Caller contract
//!
//! Single-threaded use only; serialize access externally. Enumeration
//! callbacks must not re-enter the index. The position accessor must be
//! deterministic and free of side effects observable by the index.

#![no_std]

extern crate alloc;

mod index;
mod observe;

pub use bramble_tree::{Point2D, Rect2D, Scalar, Tree};
pub use index::{PositionError, SpaceIndex};
pub use observe::ChangeObserver;
