// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The window-management model: geometry, the tiling layout, the window
//! registry with its virtual screens, and the drag state machine.
//!
//! Nothing in here performs I/O. The [`wm`][crate::actor::wm] actor drives it.

mod drag;
mod geometry;
mod input;
mod registry;
mod screens;
pub mod tiling;
mod window;

pub use drag::{DragMode, DragSession, DragState};
pub use geometry::{ParseSizeError, Point, Rect, Size};
pub use input::{Button, Hotkey, HotkeyParseError, Key, Modifiers};
pub use registry::Registry;
pub use screens::{RotateDirection, ScreenId, VirtualScreen, VirtualScreenSet};
pub use tiling::{TileParams, tile};
pub use window::{Placement, Window, WindowId};
