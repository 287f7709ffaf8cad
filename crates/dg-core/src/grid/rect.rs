//! Rectangles of grid cells used for room footprints and clearance halos

use serde::{Deserialize, Serialize};

use super::GridPos;

/// An inclusive rectangle of cells
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridRect {
    /// Left x coordinate
    pub lx: i32,
    /// Bottom y coordinate
    pub ly: i32,
    /// Right x coordinate
    pub hx: i32,
    /// Top y coordinate
    pub hy: i32,
}

impl GridRect {
    pub fn new(lx: i32, ly: i32, hx: i32, hy: i32) -> Self {
        Self { lx, ly, hx, hy }
    }

    /// Rectangle covering `width` × `height` cells starting at `origin`
    pub fn from_origin(origin: GridPos, width: i32, height: i32) -> Self {
        Self::new(origin.x, origin.y, origin.x + width - 1, origin.y + height - 1)
    }

    pub fn contains_pos(&self, pos: GridPos) -> bool {
        pos.x >= self.lx && pos.x <= self.hx && pos.y >= self.ly && pos.y <= self.hy
    }

    /// Whether every cell of `other` lies inside this rectangle
    pub fn contains(&self, other: &GridRect) -> bool {
        self.lx <= other.lx && self.hx >= other.hx && self.ly <= other.ly && self.hy >= other.hy
    }

    /// Whether the two rectangles share at least one cell
    pub fn intersects(&self, other: &GridRect) -> bool {
        !(self.hx < other.lx || self.lx > other.hx || self.hy < other.ly || self.ly > other.hy)
    }

    /// Grow the rectangle by `margin` cells on every side
    pub fn expanded(&self, margin: i32) -> GridRect {
        GridRect::new(
            self.lx - margin,
            self.ly - margin,
            self.hx + margin,
            self.hy + margin,
        )
    }

    /// Iterate over every cell, row by row
    pub fn cells(&self) -> impl Iterator<Item = GridPos> + use<> {
        let (lx, hx) = (self.lx, self.hx);
        (self.ly..=self.hy).flat_map(move |y| (lx..=hx).map(move |x| GridPos::new(x, y)))
    }
}
