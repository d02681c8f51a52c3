// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core geometry types for region selection.

use serde::{Deserialize, Serialize};

/// A pointer position as captured from an input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// Which coordinate system a [`Rect`] is expressed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoordinateSpace {
    /// Zoomed on-screen coordinates, exactly as the pointer events reported them.
    Display,
    /// Unzoomed pixel coordinates of the source image.
    Image,
}

/// An axis-aligned rectangle with non-negative extent.
///
/// Zero width or height is a valid, degenerate rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Normalized rectangle spanned by two corner points, in any drag direction.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: a.x.abs_diff(b.x),
            height: a.y.abs_diff(b.y),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Pixel dimensions of an image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Size scaled by `factor`, truncating fractional pixels.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            width: (self.width as f32 * factor) as u32,
            height: (self.height as f32 * factor) as u32,
        }
    }
}

impl std::fmt::Display for ImageSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_from_corners_normalizes_any_direction() {
        let forward = Rect::from_corners(Point::new(10, 10), Point::new(220, 160));
        let backward = Rect::from_corners(Point::new(220, 160), Point::new(10, 10));
        assert_eq!(forward, Rect::new(10, 10, 210, 150));
        assert_eq!(forward, backward);
    }

    #[test]
    fn rect_from_identical_corners_is_degenerate() {
        let rect = Rect::from_corners(Point::new(5, 7), Point::new(5, 7));
        assert_eq!(rect, Rect::new(5, 7, 0, 0));
        assert!(rect.is_empty());
    }

    #[test]
    fn rect_handles_negative_coordinates() {
        let rect = Rect::from_corners(Point::new(-20, 4), Point::new(30, -6));
        assert_eq!(rect, Rect::new(-20, -6, 50, 10));
    }

    #[test]
    fn scaled_size_truncates() {
        let size = ImageSize::new(801, 601).scaled(0.5);
        assert_eq!(size, ImageSize::new(400, 300));
    }
}
