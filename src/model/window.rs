// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::fmt;

use serde::{Deserialize, Serialize};

use super::geometry::Rect;
use super::screens::ScreenId;

/// Opaque handle assigned to a window by the display server.
///
/// Stable and unique for the lifetime of the window.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowId(pub u64);

impl fmt::Debug for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WindowId({:#x})", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    MasterStacked,
    AuxStacked,
    Floating,
}

impl Placement {
    pub fn is_tiled(self) -> bool {
        !matches!(self, Placement::Floating)
    }
}

/// The engine's record of one managed window.
#[derive(Clone, Debug, PartialEq)]
pub struct Window {
    pub id: WindowId,
    pub placement: Placement,
    /// For tiled windows this is always the frame last computed by the
    /// layout. For floating windows it is authoritative.
    pub geometry: Rect,
    pub screen: ScreenId,
}

impl Window {
    pub(super) fn new(id: WindowId, screen: ScreenId) -> Self {
        Window {
            id,
            placement: Placement::AuxStacked,
            geometry: Rect::ZERO,
            screen,
        }
    }

    pub fn is_floating(&self) -> bool {
        self.placement == Placement::Floating
    }
}
