//! Screen-space geometry
//!
//! Every element shares one coordinate space with its origin at the top-left
//! corner of the screen. Translation offsets produced here are relative to an
//! element's resting position, which is how the host applies them.

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Neg, Sub};

// ─────────────────────────────────────────────────────────────────────────────
// Core Geometry Types
// ─────────────────────────────────────────────────────────────────────────────

/// 2D point (or offset)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Snap both axes to the nearest integer screen unit
    pub fn round(self) -> Self {
        Self::new(self.x.round(), self.y.round())
    }

    /// Euclidean length when used as an offset
    pub fn length(self) -> f32 {
        self.x.hypot(self.y)
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

impl Neg for Point {
    type Output = Point;

    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

impl Mul<f32> for Point {
    type Output = Point;

    fn mul(self, rhs: f32) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center of a box of this size, in the box's own coordinates
    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Per-axis scale factor
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    pub x: f32,
    pub y: f32,
}

impl Scale {
    pub const IDENTITY: Scale = Scale { x: 1.0, y: 1.0 };
    pub const ZERO: Scale = Scale { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub const fn uniform(s: f32) -> Self {
        Self { x: s, y: s }
    }

    /// Interpolate towards `other` by `t` (not clamped, so overshooting
    /// easings carry through)
    pub fn lerp(&self, other: &Scale, t: f32) -> Scale {
        Scale::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }
}

impl Default for Scale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Axis-aligned box in screen space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Choreography Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// Vector from the center of `a` to the center of `b`
///
/// Computed as `(b.origin - a.origin) + (b.size - a.size) / 2`, which is the
/// translation that makes `a`'s center land on `b`'s center. Both rects are
/// assumed to be laid out already.
pub fn center_delta(a: Rect, b: Rect) -> Point {
    Point::new(
        (b.origin.x - a.origin.x) + (b.size.width - a.size.width) / 2.0,
        (b.origin.y - a.origin.y) + (b.size.height - a.size.height) / 2.0,
    )
}

/// Radius of the smallest circle centered at `center` (box-local) that
/// covers every corner of a box of `size`
pub fn covering_radius(size: Size, center: Point) -> f32 {
    let dx = center.x.max(size.width - center.x);
    let dy = center.y.max(size.height - center.y);
    dx.hypot(dy)
}
