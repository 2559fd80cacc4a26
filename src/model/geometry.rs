// Copyright The Glide Authors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integer screen geometry.
//!
//! Coordinates follow the display server: the origin is the top-left corner
//! of the screen and `y` grows downward.

use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Point {
    pub const ZERO: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }
}

impl Add for Point {
    type Output = Point;

    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point {
    type Output = Point;

    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Size {
    pub const fn new(width: i32, height: i32) -> Self {
        Size { width, height }
    }

    pub fn area(self) -> i64 {
        i64::from(self.width.max(0)) * i64::from(self.height.max(0))
    }

    /// Returns this size grown as needed to be at least `min` in each
    /// dimension.
    pub fn at_least(self, min: Size) -> Size {
        Size::new(self.width.max(min.width), self.height.max(min.height))
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("expected a size like 1920x1080, got {0:?}")]
pub struct ParseSizeError(String);

impl FromStr for Size {
    type Err = ParseSizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseSizeError(s.to_owned());
        let (w, h) = s.split_once(['x', 'X']).ok_or_else(err)?;
        let width = w.trim().parse().map_err(|_| err())?;
        let height = h.trim().parse().map_err(|_| err())?;
        Ok(Size::new(width, height))
    }
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0, 0, 0, 0);

    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            origin: Point { x, y },
            size: Size { width, height },
        }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Rect { origin, size }
    }

    pub fn min(&self) -> Point {
        self.origin
    }

    /// The exclusive bottom-right corner.
    pub fn max(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width,
            self.origin.y + self.size.height,
        )
    }

    pub fn is_empty(&self) -> bool {
        self.size.width <= 0 || self.size.height <= 0
    }

    pub fn contains(&self, point: Point) -> bool {
        let max = self.max();
        (self.origin.x..max.x).contains(&point.x) && (self.origin.y..max.y).contains(&point.y)
    }

    pub fn translate(&self, delta: Point) -> Rect {
        Rect::from_parts(self.origin + delta, self.size)
    }

    /// Shrinks the rectangle by `amount` on every edge. An amount larger than
    /// half a dimension collapses that dimension to zero around the center,
    /// so the result always lies within `self`.
    pub fn inset(&self, amount: i32) -> Rect {
        let amount = amount.max(0);
        let dx = amount.min(self.size.width.max(0) / 2);
        let dy = amount.min(self.size.height.max(0) / 2);
        Rect::new(
            self.origin.x.saturating_add(dx),
            self.origin.y.saturating_add(dy),
            (self.size.width - 2 * dx).max(0),
            (self.size.height - 2 * dy).max(0),
        )
    }

    /// Whether `other` lies entirely within this rectangle. Empty rectangles
    /// count as contained if their origin is within the closed bounds.
    pub fn encloses(&self, other: &Rect) -> bool {
        let (max, other_max) = (self.max(), other.max());
        self.origin.x <= other.origin.x
            && self.origin.y <= other.origin.y
            && other_max.x <= max.x
            && other_max.y <= max.y
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }
        let (a, b) = (self.max(), other.max());
        self.origin.x < b.x && other.origin.x < a.x && self.origin.y < b.y && other.origin.y < a.y
    }
}
