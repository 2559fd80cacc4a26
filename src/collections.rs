// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collection aliases using the Fx hasher.
//!
//! Window ids are small integers handed out by the display server, so the
//! default SipHash is wasted work.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<K> = rustc_hash::FxHashSet<K>;

/// Insertion-ordered set. Used where the order carries meaning, like the
/// z-order of floating windows.
pub type IndexSet<K> = indexmap::IndexSet<K, rustc_hash::FxBuildHasher>;
