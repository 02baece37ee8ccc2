// Copyright 2025 the Bramble Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Change-notification capability the index wires up per tracked key.

/// Subscription capability for external position-change notifications.
///
/// When a [`SpaceIndex`][crate::SpaceIndex] is created with an observer, it
/// calls [`subscribe`][Self::subscribe] the first time a key is added and
/// [`unsubscribe`][Self::unsubscribe] when the key is removed or the index
/// is dropped. The notification source is expected to call
/// [`SpaceIndex::add`][crate::SpaceIndex::add] again for a subscribed key
/// whenever its position changes; the index only manages the subscription
/// lifetime.
///
/// Both operations must be idempotent per key: subscribing an already
/// subscribed key or unsubscribing an unknown one is a no-op.
pub trait ChangeObserver<K> {
    /// Begin delivering position-change notifications for `key`.
    fn subscribe(&mut self, key: &K);

    /// Stop delivering position-change notifications for `key`.
    fn unsubscribe(&mut self, key: &K);
}
