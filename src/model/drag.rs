// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The interactive move/resize state machine.
//!
//! At most one [`DragSession`] exists at a time. The dispatcher owns the
//! [`DragState`] and is responsible for floating the target before a session
//! begins; this module only turns pointer positions into geometry.

use serde::{Deserialize, Serialize};

use super::geometry::{Point, Rect, Size};
use super::input::Button;
use super::window::WindowId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DragMode {
    Move,
    Resize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DragSession {
    pub target: WindowId,
    pub mode: DragMode,
    /// The button that started the drag. Only its release ends the session.
    pub button: Button,
    pub anchor_pointer: Point,
    pub anchor_geometry: Rect,
}

impl DragSession {
    /// The target's geometry with the pointer at `pointer`.
    ///
    /// Moving translates the anchor geometry by the pointer delta. Resizing
    /// keeps the origin and grows or shrinks the size by the delta, but never
    /// below `min`.
    pub fn geometry_at(&self, pointer: Point, min: Size) -> Rect {
        let delta = pointer - self.anchor_pointer;
        match self.mode {
            DragMode::Move => self.anchor_geometry.translate(delta),
            DragMode::Resize => {
                let size = Size::new(
                    self.anchor_geometry.size.width + delta.x,
                    self.anchor_geometry.size.height + delta.y,
                );
                Rect::from_parts(self.anchor_geometry.origin, size.at_least(min))
            }
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging(DragSession),
}

impl DragState {
    pub fn session(&self) -> Option<&DragSession> {
        match self {
            DragState::Idle => None,
            DragState::Dragging(session) => Some(session),
        }
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, DragState::Dragging(_))
    }

    pub fn target(&self) -> Option<WindowId> {
        self.session().map(|s| s.target)
    }

    /// Starts a session. Refuses, returning false, if one is already active.
    pub fn begin(&mut self, session: DragSession) -> bool {
        if self.is_dragging() {
            return false;
        }
        *self = DragState::Dragging(session);
        true
    }

    /// The target and its new geometry for a pointer move, if dragging.
    pub fn motion(&self, pointer: Point, min: Size) -> Option<(WindowId, Rect)> {
        self.session().map(|s| (s.target, s.geometry_at(pointer, min)))
    }

    /// Ends the session if `button` is the one that started it.
    pub fn release(&mut self, button: Button) -> Option<DragSession> {
        if !self.session().is_some_and(|s| s.button == button) {
            return None;
        }
        match std::mem::take(self) {
            DragState::Dragging(session) => Some(session),
            DragState::Idle => None,
        }
    }

    /// Discards the session without committing anything if it targets `id`.
    pub fn cancel_if_target(&mut self, id: WindowId) -> bool {
        if self.target() == Some(id) {
            *self = DragState::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use test_log::test;

    use super::*;

    const MIN: Size = Size::new(32, 32);

    fn session(mode: DragMode) -> DragSession {
        DragSession {
            target: WindowId(7),
            mode,
            button: Button(1),
            anchor_pointer: Point::new(100, 100),
            anchor_geometry: Rect::new(50, 60, 200, 150),
        }
    }

    #[test]
    fn zero_motion_keeps_anchor_geometry() {
        for mode in [DragMode::Move, DragMode::Resize] {
            let s = session(mode);
            assert_eq!(s.geometry_at(s.anchor_pointer, MIN), s.anchor_geometry);
        }
    }

    #[test]
    fn move_translates_by_pointer_delta() {
        let s = session(DragMode::Move);
        assert_eq!(
            s.geometry_at(Point::new(130, 80), MIN),
            Rect::new(80, 40, 200, 150)
        );
        assert_eq!(
            s.geometry_at(Point::new(-100, -100), MIN),
            Rect::new(-150, -140, 200, 150)
        );
    }

    #[test]
    fn resize_keeps_origin() {
        let s = session(DragMode::Resize);
        assert_eq!(
            s.geometry_at(Point::new(120, 90), MIN),
            Rect::new(50, 60, 220, 140)
        );
    }

    #[test]
    fn resize_never_goes_below_minimum() {
        let s = session(DragMode::Resize);
        for x in (-500..500).step_by(37) {
            for y in (-500..500).step_by(41) {
                let g = s.geometry_at(Point::new(x, y), MIN);
                assert!(g.size.width >= MIN.width, "{g:?}");
                assert!(g.size.height >= MIN.height, "{g:?}");
                assert_eq!(g.origin, s.anchor_geometry.origin);
            }
        }
    }

    #[test]
    fn only_one_session_at_a_time() {
        let mut state = DragState::default();
        assert!(state.begin(session(DragMode::Move)));
        let mut other = session(DragMode::Resize);
        other.target = WindowId(8);
        assert!(!state.begin(other));
        assert_eq!(state.target(), Some(WindowId(7)));
        assert_eq!(state.session().unwrap().mode, DragMode::Move);
    }

    #[test]
    fn release_requires_the_starting_button() {
        let mut state = DragState::default();
        assert_eq!(state.release(Button(1)), None);
        state.begin(session(DragMode::Move));
        assert_eq!(state.release(Button(3)), None);
        assert!(state.is_dragging());
        let ended = state.release(Button(1)).unwrap();
        assert_eq!(ended.target, WindowId(7));
        assert_eq!(state, DragState::Idle);
    }

    #[test]
    fn motion_is_ignored_when_idle() {
        assert_eq!(DragState::Idle.motion(Point::ZERO, MIN), None);
    }

    #[test]
    fn cancel_only_affects_the_target() {
        let mut state = DragState::default();
        state.begin(session(DragMode::Move));
        assert!(!state.cancel_if_target(WindowId(8)));
        assert!(state.is_dragging());
        assert!(state.cancel_if_target(WindowId(7)));
        assert!(!state.is_dragging());
    }
}
