// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Virtual screens and the rotating set that holds them.

use serde::{Deserialize, Serialize};

use super::window::{Placement, WindowId};
use crate::collections::IndexSet;

/// Index of a virtual screen within its [`VirtualScreenSet`].
///
/// Screens are never removed, so ids stay valid for the lifetime of the set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(usize);

impl ScreenId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RotateDirection {
    Left,
    Right,
}

/// A workspace with its own master stack, aux stack and floating windows.
#[derive(Clone, Debug, Default)]
pub struct VirtualScreen {
    master: Vec<WindowId>,
    aux: Vec<WindowId>,
    /// Ordered bottom to top.
    floating: IndexSet<WindowId>,
    focused: Option<WindowId>,
}

impl VirtualScreen {
    pub fn master(&self) -> &[WindowId] {
        &self.master
    }

    pub fn aux(&self) -> &[WindowId] {
        &self.aux
    }

    /// Floating windows from the bottom of the z-order to the top.
    pub fn floating(&self) -> impl DoubleEndedIterator<Item = WindowId> + '_ {
        self.floating.iter().copied()
    }

    /// Tiled windows in layout order: the master stack, then the aux stack.
    pub fn tiled(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.master.iter().chain(&self.aux).copied()
    }

    /// All windows, tiled first and then floating windows bottom to top.
    /// This is also the order they should be stacked in.
    pub fn windows(&self) -> impl Iterator<Item = WindowId> + '_ {
        self.tiled().chain(self.floating())
    }

    pub fn focused(&self) -> Option<WindowId> {
        self.focused
    }

    pub fn len(&self) -> usize {
        self.master.len() + self.aux.len() + self.floating.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn placement_of(&self, id: WindowId) -> Option<Placement> {
        if self.master.contains(&id) {
            Some(Placement::MasterStacked)
        } else if self.aux.contains(&id) {
            Some(Placement::AuxStacked)
        } else if self.floating.contains(&id) {
            Some(Placement::Floating)
        } else {
            None
        }
    }

    /// Appends `id` to the stack for `placement`.
    pub(super) fn push(&mut self, id: WindowId, placement: Placement) {
        debug_assert!(self.placement_of(id).is_none(), "{id:?} is already on this screen");
        match placement {
            Placement::MasterStacked => self.master.push(id),
            Placement::AuxStacked => self.aux.push(id),
            Placement::Floating => {
                self.floating.insert(id);
            }
        }
    }

    /// Removes `id` from whichever stack holds it, returning its placement.
    pub(super) fn remove(&mut self, id: WindowId) -> Option<Placement> {
        if self.focused == Some(id) {
            self.focused = None;
        }
        if let Some(idx) = self.master.iter().position(|&w| w == id) {
            self.master.remove(idx);
            Some(Placement::MasterStacked)
        } else if let Some(idx) = self.aux.iter().position(|&w| w == id) {
            self.aux.remove(idx);
            Some(Placement::AuxStacked)
        } else if self.floating.shift_remove(&id) {
            Some(Placement::Floating)
        } else {
            None
        }
    }

    /// Moves `id` from its current stack to the end of the stack for `to`,
    /// keeping focus. Returns false if `id` is not on this screen.
    pub(super) fn restack(&mut self, id: WindowId, to: Placement) -> bool {
        let focused = self.focused;
        if self.remove(id).is_none() {
            return false;
        }
        self.push(id, to);
        self.focused = focused;
        true
    }

    /// Moves a floating window to the top of the z-order.
    pub(super) fn raise_floating(&mut self, id: WindowId) -> bool {
        if !self.floating.shift_remove(&id) {
            return false;
        }
        self.floating.insert(id);
        true
    }

    pub(super) fn set_focused(&mut self, id: Option<WindowId>) {
        self.focused = id;
    }
}

/// An ordered ring of virtual screens with exactly one active.
#[derive(Clone, Debug)]
pub struct VirtualScreenSet {
    screens: Vec<VirtualScreen>,
    active: usize,
}

impl VirtualScreenSet {
    /// Creates a set of `count` empty screens with the first one active.
    ///
    /// Panics if `count` is zero; configuration validation rules that out.
    pub fn new(count: usize) -> Self {
        assert!(count >= 1, "a virtual screen set needs at least one screen");
        VirtualScreenSet {
            screens: vec![VirtualScreen::default(); count],
            active: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.screens.len()
    }

    pub fn active_id(&self) -> ScreenId {
        ScreenId(self.active)
    }

    pub fn active(&self) -> &VirtualScreen {
        &self.screens[self.active]
    }

    pub fn get(&self, id: ScreenId) -> &VirtualScreen {
        &self.screens[id.0]
    }

    pub(super) fn get_mut(&mut self, id: ScreenId) -> &mut VirtualScreen {
        &mut self.screens[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = (ScreenId, &VirtualScreen)> {
        self.screens.iter().enumerate().map(|(idx, screen)| (ScreenId(idx), screen))
    }

    /// Moves the active cursor one step, wrapping around at either end.
    /// Returns the newly active screen.
    pub fn rotate(&mut self, direction: RotateDirection) -> ScreenId {
        let len = self.screens.len();
        self.active = match direction {
            RotateDirection::Right => (self.active + 1) % len,
            RotateDirection::Left => (self.active + len - 1) % len,
        };
        ScreenId(self.active)
    }

    /// Appends empty screens until there are at least `count`. Existing
    /// screens are never dropped.
    pub fn grow_to(&mut self, count: usize) {
        if count > self.screens.len() {
            self.screens.resize_with(count, VirtualScreen::default);
        }
    }
}
