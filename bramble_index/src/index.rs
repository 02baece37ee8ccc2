// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The identity-tracking facade over the partitioning tree.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::hash::Hash;

use bramble_tree::{Point2D, Rect2D, Scalar, Tree};
use hashbrown::HashMap;

use crate::observe::ChangeObserver;

/// Error from feeding the index a position it cannot represent.
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum PositionError {
    /// The position accessor produced a NaN or infinite coordinate.
    #[error("position accessor returned a non-finite coordinate")]
    NonFinite,
}

/// A 2D index of movable, identity-keyed points.
///
/// Keys are opaque handles denoting tracked objects; the position accessor
/// `A` maps a key to its current coordinate. The index keeps a map from key
/// to last-known coordinate (the source of truth for "is this key tracked,
/// and where") and mirrors it into the partitioning tree for queries.
///
/// [`add`][Self::add] both inserts fresh keys and repositions tracked ones,
/// so callers simply call it again after a position changes. With an
/// observer wired up, the external notification source triggers that
/// re-add automatically; see [`ChangeObserver`].
///
/// The index is single-threaded, and enumeration callbacks must not add or
/// remove keys on the index they are enumerating.
pub struct SpaceIndex<T, K, A>
where
    T: Scalar,
    K: Copy + Eq + Hash + Debug,
    A: Fn(&K) -> Point2D<T>,
{
    tree: Tree<T, K>,
    positions: HashMap<K, Point2D<T>>,
    accessor: A,
    observer: Option<Box<dyn ChangeObserver<K>>>,
}

impl<T, K, A> Debug for SpaceIndex<T, K, A>
where
    T: Scalar,
    K: Copy + Eq + Hash + Debug,
    A: Fn(&K) -> Point2D<T>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SpaceIndex")
            .field("tracked", &self.positions.len())
            .field("tree", &self.tree)
            .field("observing", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, K, A> SpaceIndex<T, K, A>
where
    T: Scalar,
    K: Copy + Eq + Hash + Debug,
    A: Fn(&K) -> Point2D<T>,
{
    /// Create an empty index with the default leaf capacity and no
    /// change-notification wiring.
    pub fn new(accessor: A) -> Self {
        Self {
            tree: Tree::new(),
            positions: HashMap::new(),
            accessor,
            observer: None,
        }
    }

    /// Create an empty index with an explicit tree leaf capacity.
    pub fn with_capacity(accessor: A, capacity: usize) -> Self {
        Self {
            tree: Tree::with_capacity(capacity),
            positions: HashMap::new(),
            accessor,
            observer: None,
        }
    }

    /// Create an empty index that subscribes tracked keys to the observer.
    ///
    /// The index subscribes a key when it is first added and unsubscribes it
    /// on removal and on drop, so no subscription outlives the index.
    pub fn with_observer(accessor: A, observer: Box<dyn ChangeObserver<K>>) -> Self {
        Self {
            tree: Tree::new(),
            positions: HashMap::new(),
            accessor,
            observer: Some(observer),
        }
    }

    /// Insert `key`, or reposition it if it is already tracked.
    ///
    /// The current coordinate comes from the position accessor. Re-adding a
    /// key whose coordinate has not changed is a structural no-op (and does
    /// not re-subscribe it); a changed coordinate removes the stale entry
    /// and reinserts at the new position.
    ///
    /// Returns whether the tree changed, or [`PositionError::NonFinite`] if
    /// the accessor produced a coordinate the index cannot store.
    pub fn add(&mut self, key: K) -> Result<bool, PositionError> {
        let point = (self.accessor)(&key);
        if !T::is_finite(point.x) || !T::is_finite(point.y) {
            return Err(PositionError::NonFinite);
        }
        match self.positions.get(&key).copied() {
            Some(prev) if prev == point => Ok(false),
            Some(prev) => {
                let removed = self.tree.remove(prev, &key);
                debug_assert!(removed, "tracked key must have a tree entry");
                self.tree.insert(point, key);
                self.positions.insert(key, point);
                Ok(true)
            }
            None => {
                if let Some(observer) = self.observer.as_mut() {
                    observer.subscribe(&key);
                }
                self.tree.insert(point, key);
                self.positions.insert(key, point);
                Ok(true)
            }
        }
    }

    /// Stop tracking `key`. Returns whether it was tracked.
    pub fn remove(&mut self, key: &K) -> bool {
        let Some(point) = self.positions.get(key).copied() else {
            return false;
        };
        if let Some(observer) = self.observer.as_mut() {
            observer.unsubscribe(key);
        }
        let removed = self.tree.remove(point, key);
        debug_assert!(removed, "identity map and tree disagree on {key:?}");
        self.positions.remove(key);
        true
    }

    /// Whether `key` is currently tracked.
    #[inline]
    pub fn contains(&self, key: &K) -> bool {
        self.positions.contains_key(key)
    }

    /// The last-known coordinate of `key`, if tracked.
    #[inline]
    pub fn position_of(&self, key: &K) -> Option<Point2D<T>> {
        self.positions.get(key).copied()
    }

    /// The number of tracked keys.
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether no keys are tracked.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Visit keys whose coordinate lies inside `rect` (edges inclusive), in
    /// no particular order.
    ///
    /// The callback returns `true` to keep enumerating and `false` to stop;
    /// the method returns `false` iff enumeration was stopped. The callback
    /// must not mutate this index.
    pub fn visit_rect<F>(&self, rect: &Rect2D<T>, mut f: F) -> bool
    where
        F: FnMut(&K) -> bool,
    {
        self.tree.visit_rect(rect, |_p, k| f(k))
    }

    /// Visit keys strictly within `radius` of `center`, in no particular
    /// order. Same callback contract as [`visit_rect`][Self::visit_rect].
    pub fn visit_circle<F>(&self, center: Point2D<T>, radius: T, mut f: F) -> bool
    where
        F: FnMut(&K) -> bool,
    {
        self.tree.visit_circle(center, radius, |_p, k| f(k))
    }

    /// Query for keys whose coordinate lies inside `rect`.
    ///
    /// Collects [`visit_rect`][Self::visit_rect]; use the visitor directly
    /// to avoid the intermediate allocation.
    pub fn query_rect(&self, rect: &Rect2D<T>) -> impl Iterator<Item = K> + '_ {
        let mut out = Vec::new();
        self.visit_rect(rect, |k| {
            out.push(*k);
            true
        });
        out.into_iter()
    }

    /// Query for keys strictly within `radius` of `center`.
    ///
    /// Collects [`visit_circle`][Self::visit_circle].
    pub fn query_circle(&self, center: Point2D<T>, radius: T) -> impl Iterator<Item = K> + '_ {
        let mut out = Vec::new();
        self.visit_circle(center, radius, |k| {
            out.push(*k);
            true
        });
        out.into_iter()
    }
}

impl<T, K, A> Drop for SpaceIndex<T, K, A>
where
    T: Scalar,
    K: Copy + Eq + Hash + Debug,
    A: Fn(&K) -> Point2D<T>,
{
    fn drop(&mut self) {
        // Tear tracked keys down through `remove` so every observer
        // subscription is released; a bare drop of the map would leak them.
        if self.observer.is_some() {
            let keys: Vec<K> = self.positions.keys().copied().collect();
            for key in keys {
                self.remove(&key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec::Vec;
    use core::cell::RefCell;

    type Store = Rc<RefCell<HashMap<u32, Point2D<f64>>>>;

    fn store_with(points: &[(u32, f64, f64)]) -> Store {
        let mut map = HashMap::new();
        for &(k, x, y) in points {
            map.insert(k, Point2D::new(x, y));
        }
        Rc::new(RefCell::new(map))
    }

    fn index_over(store: &Store) -> SpaceIndex<f64, u32, impl Fn(&u32) -> Point2D<f64>> {
        let accessor_store = store.clone();
        SpaceIndex::new(move |k| accessor_store.borrow()[k])
    }

    #[test]
    fn add_then_query_rect() {
        let store = store_with(&[(1, 0.0, 0.0), (2, 5.0, 5.0), (3, 50.0, 50.0)]);
        let mut idx = index_over(&store);
        for k in [1, 2, 3] {
            assert_eq!(idx.add(k), Ok(true));
        }

        let mut hits: Vec<u32> = idx.query_rect(&Rect2D::new(0.0, 0.0, 10.0, 10.0)).collect();
        hits.sort_unstable();
        assert_eq!(hits, alloc::vec![1, 2]);
    }

    #[test]
    fn readd_same_position_is_noop() {
        let store = store_with(&[(1, 3.0, 4.0)]);
        let mut idx = index_over(&store);
        assert_eq!(idx.add(1), Ok(true));
        assert_eq!(idx.add(1), Ok(false));
        assert_eq!(idx.len(), 1);
    }

    #[test]
    fn update_in_place_moves_the_single_entry() {
        let store = store_with(&[(7, 1.0, 1.0)]);
        let mut idx = index_over(&store);
        idx.add(7).unwrap();

        // Move the underlying coordinate, then re-add.
        store.borrow_mut().insert(7, Point2D::new(90.0, 90.0));
        assert_eq!(idx.add(7), Ok(true));
        assert_eq!(idx.len(), 1);
        assert_eq!(idx.position_of(&7), Some(Point2D::new(90.0, 90.0)));

        // The former location yields nothing; the new one yields the key.
        let old: Vec<u32> = idx.query_rect(&Rect2D::new(0.0, 0.0, 2.0, 2.0)).collect();
        assert!(old.is_empty());
        let new: Vec<u32> = idx
            .query_rect(&Rect2D::new(89.0, 89.0, 91.0, 91.0))
            .collect();
        assert_eq!(new, alloc::vec![7]);
    }

    #[test]
    fn remove_is_idempotent() {
        let store = store_with(&[(1, 0.0, 0.0)]);
        let mut idx = index_over(&store);
        idx.add(1).unwrap();
        assert!(idx.remove(&1));
        assert!(!idx.remove(&1), "removing an untracked key must report false");
        assert!(idx.is_empty());
    }

    #[test]
    fn non_finite_positions_are_rejected() {
        let store = store_with(&[(1, f64::NAN, 0.0), (2, 0.0, f64::INFINITY)]);
        let mut idx = index_over(&store);
        assert_eq!(idx.add(1), Err(PositionError::NonFinite));
        assert_eq!(idx.add(2), Err(PositionError::NonFinite));
        assert!(idx.is_empty());
    }

    #[test]
    fn radius_query_is_strictly_inside() {
        let store = store_with(&[(1, 0.0, 0.0), (2, 5.0, 5.0), (3, 10.0, 10.0)]);
        let mut idx = index_over(&store);
        for k in [1, 2, 3] {
            idx.add(k).unwrap();
        }

        // dist(2) = sqrt(50) ≈ 7.07 < 8; dist(3) = sqrt(200) > 8.
        let mut hits: Vec<u32> = idx.query_circle(Point2D::new(0.0, 0.0), 8.0).collect();
        hits.sort_unstable();
        assert_eq!(hits, alloc::vec![1, 2]);
    }

    #[test]
    fn visit_stops_on_false() {
        let store = store_with(&[(1, 0.0, 0.0), (2, 1.0, 1.0), (3, 2.0, 2.0)]);
        let mut idx = index_over(&store);
        for k in [1, 2, 3] {
            idx.add(k).unwrap();
        }

        let mut visited = 0;
        let kept_going = idx.visit_rect(&Rect2D::new(-10.0, -10.0, 10.0, 10.0), |_k| {
            visited += 1;
            false
        });
        assert!(!kept_going);
        assert_eq!(visited, 1);
    }

    // Observer recording subscribe/unsubscribe calls in order.
    #[derive(Clone, Default)]
    struct Recording {
        events: Rc<RefCell<Vec<(&'static str, u32)>>>,
    }

    impl ChangeObserver<u32> for Recording {
        fn subscribe(&mut self, key: &u32) {
            self.events.borrow_mut().push(("sub", *key));
        }

        fn unsubscribe(&mut self, key: &u32) {
            self.events.borrow_mut().push(("unsub", *key));
        }
    }

    #[test]
    fn observer_lifecycle_per_key() {
        let store = store_with(&[(1, 0.0, 0.0)]);
        let recording = Recording::default();
        let events = recording.events.clone();

        let accessor_store = store.clone();
        let mut idx = SpaceIndex::with_observer(
            move |k: &u32| accessor_store.borrow()[k],
            Box::new(recording),
        );

        idx.add(1).unwrap();
        // Same-position re-add must not re-subscribe.
        idx.add(1).unwrap();
        // Reposition keeps the existing subscription.
        store.borrow_mut().insert(1, Point2D::new(2.0, 2.0));
        idx.add(1).unwrap();
        idx.remove(&1);

        assert_eq!(
            events.borrow().clone(),
            alloc::vec![("sub", 1), ("unsub", 1)]
        );
    }

    #[test]
    fn drop_unsubscribes_remaining_keys() {
        let store = store_with(&[(1, 0.0, 0.0), (2, 5.0, 5.0)]);
        let recording = Recording::default();
        let events = recording.events.clone();

        {
            let accessor_store = store.clone();
            let mut idx = SpaceIndex::with_observer(
                move |k: &u32| accessor_store.borrow()[k],
                Box::new(recording),
            );
            idx.add(1).unwrap();
            idx.add(2).unwrap();
        }

        let mut unsubs: Vec<u32> = events
            .borrow()
            .iter()
            .filter(|(kind, _)| *kind == "unsub")
            .map(|(_, k)| *k)
            .collect();
        unsubs.sort_unstable();
        assert_eq!(unsubs, alloc::vec![1, 2], "teardown must release every key");
    }

    #[test]
    fn churn_under_small_capacity() {
        let store = store_with(&[]);
        for i in 0..40_u32 {
            let x = f64::from(i % 8) * 2.0;
            let y = f64::from(i / 8) * 2.0;
            store.borrow_mut().insert(i, Point2D::new(x, y));
        }

        let accessor_store = store.clone();
        let mut idx = SpaceIndex::with_capacity(move |k: &u32| accessor_store.borrow()[k], 2);
        for i in 0..40 {
            idx.add(i).unwrap();
        }
        assert_eq!(idx.len(), 40);

        // Drop every other key, then shift the survivors and re-add.
        for i in (0..40).step_by(2) {
            assert!(idx.remove(&i));
        }
        for i in (1..40).step_by(2) {
            let p = store.borrow()[&i];
            store
                .borrow_mut()
                .insert(i, Point2D::new(p.x + 100.0, p.y));
            idx.add(i).unwrap();
        }
        assert_eq!(idx.len(), 20);

        let moved: Vec<u32> = idx
            .query_rect(&Rect2D::new(99.0, -1.0, 200.0, 100.0))
            .collect();
        assert_eq!(moved.len(), 20, "all survivors must be at shifted positions");
    }
}
