// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The master/aux tiling layout.
//!
//! This is a pure function of the screen rectangle, the gap size and the
//! number of windows in each stack. It owns no state; the
//! [`Registry`][super::Registry] calls it after every structural change.

use serde::{Deserialize, Serialize};

use super::geometry::Rect;

/// Parameters that shape the tiled layout.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileParams {
    /// Space between windows and around the screen edge, in pixels.
    pub gap: u32,
    /// Share of the usable width given to the master column when both stacks
    /// are populated. Must be within (0, 1).
    pub master_ratio: f64,
}

impl Default for TileParams {
    fn default() -> Self {
        TileParams { gap: 0, master_ratio: 0.5 }
    }
}

/// Computes the frames of every tiled window on a screen.
///
/// The result holds `master` frames for the master stack followed by `aux`
/// frames for the aux stack, each in stack order.
///
/// The usable area is `screen` shrunk by the gap on every edge. With only one
/// stack populated that stack gets the whole usable area; otherwise the area
/// is split into two columns at `master_ratio` with a gap between them. Each
/// column is split into equal rows separated by the gap. Leftover pixels from
/// integer division go to the last column and the last row, so frames and
/// gaps always add up to the usable area exactly.
///
/// A gap too large for the space it divides is reduced to fit, so frames
/// always lie within the usable area. They may be empty when the screen
/// has no room left for them.
pub fn tile(screen: Rect, params: &TileParams, master: usize, aux: usize) -> Vec<Rect> {
    let gap = i32::try_from(params.gap).unwrap_or(i32::MAX);
    let usable = screen.inset(gap);

    let (master_col, aux_col) = match (master, aux) {
        (0, 0) => return vec![],
        (_, 0) => (usable, Rect::ZERO),
        (0, _) => (Rect::ZERO, usable),
        (_, _) => split_columns(usable, gap, params.master_ratio),
    };

    let mut frames = Vec::with_capacity(master + aux);
    frames.extend(split_rows(master_col, gap, master));
    frames.extend(split_rows(aux_col, gap, aux));
    frames
}

fn split_columns(area: Rect, gap: i32, ratio: f64) -> (Rect, Rect) {
    let gap = gap.clamp(0, area.size.width.max(0));
    let available = area.size.width.max(0) - gap;
    let master_width = ((f64::from(available) * ratio).floor() as i32).clamp(0, available);
    let aux_width = available - master_width;
    let master = Rect::new(area.origin.x, area.origin.y, master_width, area.size.height);
    let aux = Rect::new(
        area.origin.x + master_width + gap,
        area.origin.y,
        aux_width,
        area.size.height,
    );
    (master, aux)
}

fn split_rows(column: Rect, gap: i32, count: usize) -> impl Iterator<Item = Rect> {
    split_evenly(column.size.height, gap, count).map(move |(offset, height)| {
        Rect::new(
            column.origin.x,
            column.origin.y + offset,
            column.size.width,
            height,
        )
    })
}

/// Splits `total` pixels into `count` runs separated by `gap`, returning
/// `(offset, length)` pairs. The last run absorbs the remainder. The gap
/// shrinks if `count - 1` gaps would not fit in `total`.
pub(crate) fn split_evenly(total: i32, gap: i32, count: usize) -> impl Iterator<Item = (i32, i32)> {
    let total = total.max(0);
    let n = i32::try_from(count).unwrap_or(i32::MAX).max(1);
    let gap = if n > 1 { gap.clamp(0, total / (n - 1)) } else { 0 };
    let available = total - gap * (n - 1);
    let each = available / n;
    let last = available - each * (n - 1);
    (0..count).map(move |i| {
        let i = i as i32;
        let len = if i == n - 1 { last } else { each };
        (i * (each + gap), len)
    })
}
