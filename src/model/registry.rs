// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The authoritative record of every managed window.
//!
//! The [`Registry`] owns both the per-window records and the
//! [`VirtualScreenSet`] holding stack membership. Each window knows its
//! screen by [`ScreenId`] and each screen lists its windows by [`WindowId`],
//! so removal is a single operation that updates both sides.
//!
//! Operations referencing a window the registry doesn't know about are
//! no-ops; the window may have raced a destroy event.

use tracing::{debug, trace};

use super::geometry::{Point, Rect};
use super::screens::{RotateDirection, ScreenId, VirtualScreen, VirtualScreenSet};
use super::tiling::{TileParams, tile};
use super::window::{Placement, Window, WindowId};
use crate::collections::{HashMap, HashSet};

#[derive(Debug)]
pub struct Registry {
    windows: HashMap<WindowId, Window>,
    screens: VirtualScreenSet,
    screen_rect: Rect,
    params: TileParams,
    /// Zero means the master stack is unbounded.
    max_master: usize,
}

impl Registry {
    pub fn new(screen_count: usize, screen_rect: Rect, params: TileParams) -> Self {
        Registry {
            windows: HashMap::default(),
            screens: VirtualScreenSet::new(screen_count),
            screen_rect,
            params,
            max_master: 0,
        }
    }

    pub fn with_max_master(mut self, max_master: usize) -> Self {
        self.max_master = max_master;
        self
    }

    pub fn window(&self, id: WindowId) -> Option<&Window> {
        self.windows.get(&id)
    }

    pub fn contains(&self, id: WindowId) -> bool {
        self.windows.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn screens(&self) -> &VirtualScreenSet {
        &self.screens
    }

    pub fn active_screen(&self) -> ScreenId {
        self.screens.active_id()
    }

    pub fn screen(&self, id: ScreenId) -> &VirtualScreen {
        self.screens.get(id)
    }

    pub fn screen_rect(&self) -> Rect {
        self.screen_rect
    }

    pub fn params(&self) -> &TileParams {
        &self.params
    }

    pub fn set_screen_rect(&mut self, rect: Rect) {
        self.screen_rect = rect;
    }

    pub fn set_params(&mut self, params: TileParams, max_master: usize) {
        self.params = params;
        self.max_master = max_master;
    }

    /// Adds screens until there are at least `count`.
    pub fn grow_screens(&mut self, count: usize) {
        self.screens.grow_to(count);
    }

    /// Appends a new window to the end of the active screen's aux stack.
    ///
    /// Returns false, changing nothing, if the window is already managed.
    pub fn add_window(&mut self, id: WindowId) -> bool {
        if self.windows.contains_key(&id) {
            debug!(?id, "ignoring duplicate window");
            return false;
        }
        let screen = self.screens.active_id();
        self.windows.insert(id, Window::new(id, screen));
        self.screens.get_mut(screen).push(id, Placement::AuxStacked);
        true
    }

    /// Forgets a window entirely. If it was focused on its screen, focus is
    /// cleared.
    pub fn remove_window(&mut self, id: WindowId) -> Option<Window> {
        let window = self.windows.remove(&id)?;
        let removed = self.screens.get_mut(window.screen).remove(id);
        debug_assert_eq!(removed, Some(window.placement));
        Some(window)
    }

    pub fn move_to_master(&mut self, id: WindowId) -> bool {
        self.move_between_stacks(id, Placement::MasterStacked)
    }

    pub fn move_to_aux(&mut self, id: WindowId) -> bool {
        self.move_between_stacks(id, Placement::AuxStacked)
    }

    fn move_between_stacks(&mut self, id: WindowId, to: Placement) -> bool {
        let Some(window) = self.windows.get(&id) else {
            debug!(?id, "ignoring stack move for unknown window");
            return false;
        };
        if window.placement == to || window.is_floating() {
            return false;
        }
        let screen = window.screen;
        if to == Placement::MasterStacked && self.max_master > 0 {
            let master = self.screens.get(screen).master();
            if master.len() >= self.max_master {
                let oldest = master[0];
                trace!(?oldest, "master stack is full, demoting");
                self.restack(oldest, Placement::AuxStacked);
            }
        }
        self.restack(id, to);
        true
    }

    /// Moves a window to the other tiled stack on its screen.
    pub fn toggle_stack(&mut self, id: WindowId) -> bool {
        match self.windows.get(&id).map(|w| w.placement) {
            Some(Placement::MasterStacked) => self.move_to_aux(id),
            Some(Placement::AuxStacked) => self.move_to_master(id),
            Some(Placement::Floating) | None => false,
        }
    }

    /// Converts a floating window back to a tiled one at the end of the
    /// active screen's aux stack. Its floating geometry is discarded; it
    /// takes its layout frame on the next [`relayout`][Self::relayout].
    pub fn retile(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get_mut(&id) else {
            debug!(?id, "ignoring retile for unknown window");
            return false;
        };
        if !window.is_floating() {
            return false;
        }
        let active = self.screens.active_id();
        if window.screen == active {
            self.screens.get_mut(active).restack(id, Placement::AuxStacked);
        } else {
            self.screens.get_mut(window.screen).remove(id);
            self.screens.get_mut(active).push(id, Placement::AuxStacked);
        }
        window.screen = active;
        window.placement = Placement::AuxStacked;
        window.geometry = Rect::ZERO;
        true
    }

    /// Makes a window floating with the given geometry, leaving a gap in
    /// whichever stack held it. A window that is already floating takes the
    /// new geometry and is raised to the top of the floating set.
    ///
    /// Returns the window's previous placement.
    pub fn set_floating(&mut self, id: WindowId, geometry: Rect) -> Option<Placement> {
        let Some(window) = self.windows.get_mut(&id) else {
            debug!(?id, "ignoring set_floating for unknown window");
            return None;
        };
        let previous = window.placement;
        let screen = self.screens.get_mut(window.screen);
        if previous.is_tiled() {
            screen.restack(id, Placement::Floating);
        } else {
            screen.raise_floating(id);
        }
        window.placement = Placement::Floating;
        window.geometry = geometry;
        Some(previous)
    }

    /// Updates the geometry of a floating window. Tiled windows keep their
    /// layout frame, so this returns false for them.
    pub fn set_floating_geometry(&mut self, id: WindowId, geometry: Rect) -> bool {
        match self.windows.get_mut(&id) {
            Some(window) if window.is_floating() => {
                window.geometry = geometry;
                true
            }
            _ => false,
        }
    }

    /// Moves the active-screen cursor, returning the previous and new active
    /// screens.
    pub fn rotate_screen(&mut self, direction: RotateDirection) -> (ScreenId, ScreenId) {
        let old = self.screens.active_id();
        let new = self.screens.rotate(direction);
        (old, new)
    }

    /// Records `id` as the focused window of its screen.
    pub fn focus(&mut self, id: WindowId) -> bool {
        let Some(window) = self.windows.get(&id) else {
            return false;
        };
        self.screens.get_mut(window.screen).set_focused(Some(id));
        true
    }

    /// The focused window of the active screen.
    pub fn focused(&self) -> Option<WindowId> {
        self.screens.active().focused()
    }

    /// The topmost window of the active screen containing `point`.
    ///
    /// Floating windows are checked from the top of the z-order down, then
    /// tiled windows.
    pub fn window_at(&self, point: Point) -> Option<WindowId> {
        let screen = self.screens.active();
        screen
            .floating()
            .rev()
            .chain(screen.tiled())
            .find(|id| self.windows[id].geometry.contains(point))
    }

    /// Recomputes the tiled layout of `screen`, storing each window's frame
    /// on its record. Returns only the frames that changed.
    pub fn relayout(&mut self, screen: ScreenId) -> Vec<(WindowId, Rect)> {
        let vs = self.screens.get(screen);
        let frames = tile(
            self.screen_rect,
            &self.params,
            vs.master().len(),
            vs.aux().len(),
        );
        let mut changed = Vec::new();
        for (id, frame) in vs.tiled().zip(frames) {
            let window = self.windows.get_mut(&id).expect("stacked window is registered");
            if window.geometry != frame {
                window.geometry = frame;
                changed.push((id, frame));
            }
        }
        changed
    }

    /// Current geometry of every window on `screen` in stacking order, tiled
    /// windows first.
    pub fn frames(&self, screen: ScreenId) -> impl Iterator<Item = (WindowId, Rect)> + '_ {
        self.screens.get(screen).windows().map(|id| (id, self.windows[&id].geometry))
    }

    /// Panics if the stacks and the window records disagree.
    ///
    /// Every live window must appear in exactly one stack of exactly one
    /// screen, and its record must name that screen and stack.
    pub fn check_invariants(&self) {
        let mut seen = HashSet::default();
        for (screen_id, screen) in self.screens.iter() {
            for id in screen.windows() {
                assert!(seen.insert(id), "{id:?} appears in more than one stack");
                let Some(window) = self.windows.get(&id) else {
                    panic!("{id:?} is stacked on {screen_id:?} but not registered");
                };
                assert_eq!(window.screen, screen_id, "{id:?} is on the wrong screen");
                assert_eq!(
                    Some(window.placement),
                    screen.placement_of(id),
                    "{id:?} is in the wrong stack"
                );
            }
            if let Some(focused) = screen.focused() {
                assert!(
                    screen.placement_of(focused).is_some(),
                    "{focused:?} is focused on {screen_id:?} but not on it"
                );
            }
        }
        assert_eq!(seen.len(), self.windows.len(), "some windows are in no stack");
    }

    fn restack(&mut self, id: WindowId, to: Placement) {
        let window = self.windows.get_mut(&id).expect("restacking unknown window");
        let moved = self.screens.get_mut(window.screen).restack(id, to);
        debug_assert!(moved);
        window.placement = to;
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use test_log::test;

    use super::*;

    fn registry(gap: u32) -> Registry {
        Registry::new(
            3,
            Rect::new(0, 0, 800, 600),
            TileParams { gap, ..TileParams::default() },
        )
    }

    fn w(n: u64) -> WindowId {
        WindowId(n)
    }

    #[test]
    fn new_windows_append_to_aux() {
        let mut reg = registry(0);
        assert!(reg.add_window(w(1)));
        assert!(reg.add_window(w(2)));
        let screen = reg.screen(reg.active_screen());
        assert_eq!(screen.aux(), &[w(1), w(2)]);
        assert!(screen.master().is_empty());
        assert_eq!(reg.window(w(2)).unwrap().placement, Placement::AuxStacked);
        reg.check_invariants();
    }

    #[test]
    fn duplicate_add_is_ignored() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        reg.move_to_master(w(1));
        assert!(!reg.add_window(w(1)));
        assert_eq!(reg.window(w(1)).unwrap().placement, Placement::MasterStacked);
        assert_eq!(reg.len(), 1);
        reg.check_invariants();
    }

    #[test]
    fn master_and_aux_scenario() {
        let mut reg = registry(10);
        reg.add_window(w(1));
        reg.add_window(w(2));
        assert!(reg.move_to_master(w(1)));
        let active = reg.active_screen();
        assert_eq!(reg.screen(active).master(), &[w(1)]);
        assert_eq!(reg.screen(active).aux(), &[w(2)]);

        let changed = reg.relayout(active);
        assert_eq!(
            changed,
            vec![
                (w(1), Rect::new(10, 10, 385, 580)),
                (w(2), Rect::new(405, 10, 385, 580)),
            ]
        );
        assert_eq!(reg.window(w(1)).unwrap().geometry.max(), Point::new(395, 590));
        assert_eq!(reg.window(w(2)).unwrap().geometry.max(), Point::new(790, 590));
        reg.check_invariants();
    }

    #[test]
    fn relayout_reports_only_changed_frames() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        let active = reg.active_screen();
        assert_eq!(reg.relayout(active).len(), 1);
        assert_eq!(reg.relayout(active), vec![]);
        reg.add_window(w(2));
        // Both frames shrink to make room.
        assert_eq!(reg.relayout(active).len(), 2);
    }

    #[test]
    fn stack_moves_are_noops_when_already_there() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        assert!(!reg.move_to_aux(w(1)));
        assert!(reg.move_to_master(w(1)));
        assert!(!reg.move_to_master(w(1)));
        assert!(!reg.move_to_master(w(9)));
        reg.set_floating(w(1), Rect::new(0, 0, 50, 50));
        assert!(!reg.move_to_aux(w(1)));
        assert!(!reg.toggle_stack(w(1)));
        reg.check_invariants();
    }

    #[test]
    fn moves_append_to_destination() {
        let mut reg = registry(0);
        for n in 1..=3 {
            reg.add_window(w(n));
        }
        reg.move_to_master(w(2));
        reg.move_to_master(w(1));
        reg.move_to_aux(w(2));
        let screen = reg.screen(reg.active_screen());
        assert_eq!(screen.master(), &[w(1)]);
        assert_eq!(screen.aux(), &[w(3), w(2)]);
    }

    #[test]
    fn full_master_demotes_oldest() {
        let mut reg = registry(0).with_max_master(1);
        for n in 1..=3 {
            reg.add_window(w(n));
        }
        reg.move_to_master(w(1));
        reg.move_to_master(w(2));
        let screen = reg.screen(reg.active_screen());
        assert_eq!(screen.master(), &[w(2)]);
        assert_eq!(screen.aux(), &[w(3), w(1)]);
        assert_eq!(reg.window(w(1)).unwrap().placement, Placement::AuxStacked);
        reg.check_invariants();
    }

    #[test]
    fn toggle_flips_between_stacks() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        assert!(reg.toggle_stack(w(1)));
        assert_eq!(reg.window(w(1)).unwrap().placement, Placement::MasterStacked);
        assert!(reg.toggle_stack(w(1)));
        assert_eq!(reg.window(w(1)).unwrap().placement, Placement::AuxStacked);
    }

    #[test]
    fn set_floating_reflows_the_vacated_stack() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        reg.add_window(w(2));
        let active = reg.active_screen();
        reg.relayout(active);
        assert_eq!(reg.window(w(2)).unwrap().geometry, Rect::new(0, 300, 800, 300));

        let g = Rect::new(5, 5, 100, 100);
        assert_eq!(reg.set_floating(w(1), g), Some(Placement::AuxStacked));
        assert_eq!(reg.relayout(active), vec![(w(2), Rect::new(0, 0, 800, 600))]);
        assert_eq!(reg.window(w(1)).unwrap().geometry, g);
        assert_eq!(reg.screen(active).floating().collect::<Vec<_>>(), vec![w(1)]);
        reg.check_invariants();
    }

    #[test]
    fn retile_round_trip_uses_layout_frame() {
        let mut reg = registry(10);
        reg.add_window(w(1));
        let active = reg.active_screen();
        reg.relayout(active);
        let g1 = Rect::new(100, 100, 200, 150);
        reg.set_floating(w(1), g1);
        assert!(reg.retile(w(1)));
        reg.relayout(active);
        let window = reg.window(w(1)).unwrap();
        assert_eq!(window.placement, Placement::AuxStacked);
        assert_eq!(window.geometry, Rect::new(10, 10, 780, 580));
        assert!(!reg.retile(w(1)), "already tiled");
        reg.check_invariants();
    }

    #[test]
    fn retile_moves_window_onto_active_screen() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        reg.set_floating(w(1), Rect::new(0, 0, 10, 10));
        let (old, new) = reg.rotate_screen(RotateDirection::Right);
        assert_ne!(old, new);
        assert!(reg.retile(w(1)));
        assert_eq!(reg.window(w(1)).unwrap().screen, new);
        assert_eq!(reg.screen(new).aux(), &[w(1)]);
        assert!(reg.screen(old).is_empty());
        reg.check_invariants();
    }

    #[test]
    fn remove_clears_focus_and_membership() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        reg.add_window(w(2));
        reg.focus(w(2));
        assert_eq!(reg.focused(), Some(w(2)));
        let removed = reg.remove_window(w(2)).unwrap();
        assert_eq!(removed.id, w(2));
        assert_eq!(reg.focused(), None);
        assert!(reg.remove_window(w(2)).is_none());
        assert_eq!(reg.screen(reg.active_screen()).aux(), &[w(1)]);
        reg.check_invariants();
    }

    #[test]
    fn window_at_prefers_topmost_floating() {
        let mut reg = registry(0);
        for n in 1..=3 {
            reg.add_window(w(n));
        }
        reg.relayout(reg.active_screen());
        reg.set_floating(w(2), Rect::new(0, 0, 100, 100));
        reg.set_floating(w(3), Rect::new(50, 50, 100, 100));
        reg.relayout(reg.active_screen());
        assert_eq!(reg.window_at(Point::new(60, 60)), Some(w(3)));
        assert_eq!(reg.window_at(Point::new(10, 10)), Some(w(2)));
        assert_eq!(reg.window_at(Point::new(400, 400)), Some(w(1)));
        // Re-floating raises.
        reg.set_floating(w(2), Rect::new(0, 0, 100, 100));
        assert_eq!(reg.window_at(Point::new(60, 60)), Some(w(2)));
        assert_eq!(reg.window_at(Point::new(900, 900)), None);
    }

    #[test]
    fn windows_on_inactive_screens_are_not_hit() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        reg.relayout(reg.active_screen());
        reg.rotate_screen(RotateDirection::Left);
        assert_eq!(reg.window_at(Point::new(10, 10)), None);
    }

    #[test]
    fn floating_geometry_only_applies_to_floating_windows() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        let g = Rect::new(1, 2, 3, 4);
        assert!(!reg.set_floating_geometry(w(1), g));
        reg.set_floating(w(1), Rect::ZERO);
        assert!(reg.set_floating_geometry(w(1), g));
        assert_eq!(reg.window(w(1)).unwrap().geometry, g);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Add(WindowId),
        Remove(WindowId),
        MoveToMaster(WindowId),
        MoveToAux(WindowId),
        Toggle(WindowId),
        Retile(WindowId),
        Float(WindowId, Rect),
        Rotate(RotateDirection),
        Focus(WindowId),
        Relayout,
    }

    fn op() -> impl Strategy<Value = Op> {
        let id = (0u64..12).prop_map(WindowId);
        let rect = (0i32..800, 0i32..600, 1i32..400, 1i32..300)
            .prop_map(|(x, y, width, height)| Rect::new(x, y, width, height));
        let direction = prop_oneof![Just(RotateDirection::Left), Just(RotateDirection::Right)];
        prop_oneof![
            id.clone().prop_map(Op::Add),
            id.clone().prop_map(Op::Remove),
            id.clone().prop_map(Op::MoveToMaster),
            id.clone().prop_map(Op::MoveToAux),
            id.clone().prop_map(Op::Toggle),
            id.clone().prop_map(Op::Retile),
            (id.clone(), rect).prop_map(|(id, rect)| Op::Float(id, rect)),
            direction.prop_map(Op::Rotate),
            id.prop_map(Op::Focus),
            Just(Op::Relayout),
        ]
    }

    fn apply(reg: &mut Registry, op: Op) {
        match op {
            Op::Add(id) => {
                reg.add_window(id);
            }
            Op::Remove(id) => {
                reg.remove_window(id);
            }
            Op::MoveToMaster(id) => {
                reg.move_to_master(id);
            }
            Op::MoveToAux(id) => {
                reg.move_to_aux(id);
            }
            Op::Toggle(id) => {
                reg.toggle_stack(id);
            }
            Op::Retile(id) => {
                reg.retile(id);
            }
            Op::Float(id, rect) => {
                reg.set_floating(id, rect);
            }
            Op::Rotate(direction) => {
                reg.rotate_screen(direction);
            }
            Op::Focus(id) => {
                reg.focus(id);
            }
            Op::Relayout => {
                reg.relayout(reg.active_screen());
            }
        }
    }

    proptest! {
        #[test]
        fn partition_holds_over_mixed_operations(
            max_master in 0usize..3,
            ops in prop::collection::vec(op(), 1..200),
        ) {
            let mut reg = registry(4).with_max_master(max_master);
            for op in ops {
                apply(&mut reg, op);
                reg.check_invariants();
                let stacked: usize = reg.screens().iter().map(|(_, screen)| screen.len()).sum();
                prop_assert_eq!(stacked, reg.len());
                if max_master > 0 {
                    for (_, screen) in reg.screens().iter() {
                        prop_assert!(screen.master().len() <= max_master);
                    }
                }
            }
        }

        #[test]
        fn tiled_frames_stay_on_screen(ops in prop::collection::vec(op(), 1..100)) {
            let mut reg = registry(10);
            let screen = reg.screen_rect();
            for op in ops {
                apply(&mut reg, op);
            }
            let active = reg.active_screen();
            reg.relayout(active);
            for id in reg.screen(active).tiled() {
                let frame = reg.window(id).unwrap().geometry;
                prop_assert!(screen.encloses(&frame), "{:?} is off screen", frame);
            }
        }
    }

    #[test]
    #[should_panic(expected = "in no stack")]
    fn orphaned_record_is_detected() {
        let mut reg = registry(0);
        reg.add_window(w(1));
        let active = reg.active_screen();
        reg.screens.get_mut(active).remove(w(1));
        reg.check_invariants();
    }
}
