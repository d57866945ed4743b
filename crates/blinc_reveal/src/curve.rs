//! Motion paths for translate segments
//!
//! A path maps time `t` in `[0, 1]` to a point between two endpoints. The
//! linear path is a straight line; the Bezier path is a quadratic curve whose
//! control point defaults to the elbow where the two axis tangents cross,
//! `(from.x, to.y)`, which gives a single natural bend.
//!
//! The same path value is reused for forward and reverse motion: only the
//! endpoints are swapped.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;

/// Shape of a translate segment's motion
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CurvePath {
    /// Straight line between the endpoints
    #[default]
    Linear,
    /// Quadratic Bezier curve
    Bezier {
        /// Control point in the same offset space as the endpoints; `None`
        /// picks the elbow `(from.x, to.y)`
        #[serde(default)]
        control: Option<Point>,
    },
}

impl CurvePath {
    /// Bezier path with the automatic elbow control point
    pub const fn bezier() -> Self {
        CurvePath::Bezier { control: None }
    }

    /// Bezier path through an explicit control point
    pub const fn bezier_with_control(control: Point) -> Self {
        CurvePath::Bezier {
            control: Some(control),
        }
    }

    /// Linear or (auto-elbow) Bezier depending on `curved`, with an optional
    /// control point override
    pub fn select(curved: bool, control: Option<Point>) -> Self {
        if curved {
            CurvePath::Bezier { control }
        } else {
            CurvePath::Linear
        }
    }

    pub fn is_curved(&self) -> bool {
        matches!(self, CurvePath::Bezier { .. })
    }

    /// Control point used between `from` and `to`, if this path is curved
    pub fn control_point(&self, from: Point, to: Point) -> Option<Point> {
        match *self {
            CurvePath::Linear => None,
            CurvePath::Bezier { control } => Some(control.unwrap_or(Point::new(from.x, to.y))),
        }
    }

    /// Position at time `t`
    ///
    /// `t` is clamped to `[0, 1]`. The endpoints are returned exactly; Bezier
    /// points in between are snapped to the nearest integer screen unit.
    pub fn evaluate(&self, t: f32, from: Point, to: Point) -> Point {
        if t.is_nan() || t <= 0.0 {
            return from;
        }
        if t >= 1.0 {
            return to;
        }

        match self.control_point(from, to) {
            None => Point::new(from.x + t * (to.x - from.x), from.y + t * (to.y - from.y)),
            Some(control) => Point::new(
                quadratic(t, from.x, control.x, to.x),
                quadratic(t, from.y, control.y, to.y),
            ),
        }
    }
}

/// One axis of a quadratic Bezier, rounded to the pixel grid
fn quadratic(t: f32, p0: f32, p1: f32, p2: f32) -> f32 {
    let inv = 1.0 - t;
    (inv * inv * p0 + 2.0 * inv * t * p1 + t * t * p2).round()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> [CurvePath; 4] {
        [
            CurvePath::Linear,
            CurvePath::bezier(),
            CurvePath::bezier_with_control(Point::new(40.0, -80.0)),
            CurvePath::bezier_with_control(Point::new(-1000.0, 1000.0)),
        ]
    }

    #[test]
    fn test_paths_hit_endpoints() {
        let pairs = [
            (Point::ZERO, Point::new(-225.0, -375.0)),
            (Point::new(-225.0, -375.0), Point::ZERO),
            (Point::new(12.5, 3.25), Point::new(-0.75, 99.5)),
            (Point::new(5.0, 5.0), Point::new(5.0, 5.0)),
        ];
        for path in paths() {
            for (from, to) in pairs {
                assert_eq!(path.evaluate(0.0, from, to), from, "{path:?}");
                assert_eq!(path.evaluate(1.0, from, to), to, "{path:?}");
            }
        }
    }

    #[test]
    fn test_default_control_is_elbow() {
        let from = Point::new(0.0, 0.0);
        let to = Point::new(100.0, 200.0);
        assert_eq!(
            CurvePath::bezier().control_point(from, to),
            Some(Point::new(0.0, 200.0))
        );

        // Reversed endpoints flip the elbow to the other corner
        assert_eq!(
            CurvePath::bezier().control_point(to, from),
            Some(Point::new(100.0, 0.0))
        );
    }

    #[test]
    fn test_explicit_control_overrides_elbow() {
        let control = Point::new(-30.0, 45.0);
        let path = CurvePath::bezier_with_control(control);
        assert_eq!(
            path.control_point(Point::ZERO, Point::new(100.0, 100.0)),
            Some(control)
        );
        assert_eq!(CurvePath::Linear.control_point(Point::ZERO, control), None);
    }

    #[test]
    fn test_linear_midpoint() {
        let p = CurvePath::Linear.evaluate(0.5, Point::ZERO, Point::new(100.0, -50.0));
        assert_eq!(p, Point::new(50.0, -25.0));
    }

    #[test]
    fn test_bezier_midpoint_is_rounded() {
        // (1-t)^2*0 + 2(1-t)t*0 + t^2*100 at t=0.5 -> 25 for x,
        // and 0 + 2*0.25*200 + 0.25*200 = 150 for y
        let p = CurvePath::bezier().evaluate(0.5, Point::ZERO, Point::new(100.0, 200.0));
        assert_eq!(p, Point::new(25.0, 150.0));

        let p = CurvePath::bezier().evaluate(0.3, Point::ZERO, Point::new(33.0, 7.0));
        assert_eq!(p.x, p.x.round());
        assert_eq!(p.y, p.y.round());
    }

    #[test]
    fn test_bezier_bends_towards_elbow() {
        let to = Point::new(100.0, 100.0);
        let curved = CurvePath::bezier().evaluate(0.5, Point::ZERO, to);
        let straight = CurvePath::Linear.evaluate(0.5, Point::ZERO, to);

        // Elbow at (0, 100): the curve runs left of the diagonal
        assert!(curved.x < straight.x);
        assert!(curved.y > straight.y);
    }

    #[test]
    fn test_select() {
        assert_eq!(CurvePath::select(false, Some(Point::ZERO)), CurvePath::Linear);
        assert_eq!(CurvePath::select(true, None), CurvePath::bezier());
        assert!(CurvePath::select(true, Some(Point::ZERO)).is_curved());
    }
}
