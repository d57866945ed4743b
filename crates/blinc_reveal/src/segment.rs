//! Animation segments
//!
//! A segment is a declarative description of one geometric effect on one
//! element: a translate along a path, a scale around a pivot, or a circular
//! clip opening / closing. The host plays segments; the choreography only
//! builds them and listens for their completion.
//!
//! Timing is in whole milliseconds, so durations and offsets can never be
//! negative. A segment holds its initial value until its start offset has
//! elapsed and its final value once it has finished.

use crate::curve::CurvePath;
use crate::easing::Easing;
use crate::geometry::{Point, Scale};

/// Anchor point of a scale effect
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pivot {
    /// Fixed point in the element's own (unscaled) coordinates
    Absolute(Point),
    /// Fraction of the element's size; `(0.5, 0.5)` is its center
    Relative { x: f32, y: f32 },
}

impl Pivot {
    /// Pivot at the element's own center
    pub const CENTER: Pivot = Pivot::Relative { x: 0.5, y: 0.5 };
}

/// The geometric effect a segment animates
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentKind {
    /// Move along `path` from offset `from` to offset `to` (relative to the
    /// element's resting position)
    Translate {
        path: CurvePath,
        from: Point,
        to: Point,
    },
    /// Scale from `from` to `to` around `pivot`
    Scale {
        from: Scale,
        to: Scale,
        pivot: Pivot,
    },
    /// Circular clip centered at `center` (element-local) growing from 0 to
    /// `radius`
    CircularReveal { center: Point, radius: f32 },
    /// Circular clip centered at `center` shrinking from `radius` to 0
    CircularUnreveal { center: Point, radius: f32 },
}

impl SegmentKind {
    /// Short label for logs and traces
    pub fn label(&self) -> &'static str {
        match self {
            SegmentKind::Translate { .. } => "translate",
            SegmentKind::Scale { .. } => "scale",
            SegmentKind::CircularReveal { .. } => "circular-reveal",
            SegmentKind::CircularUnreveal { .. } => "circular-unreveal",
        }
    }
}

/// Sampled value of a segment at some point in time
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SegmentValue {
    /// Translation offset
    Offset(Point),
    /// Scale factor and its pivot
    Scale { scale: Scale, pivot: Pivot },
    /// Clip circle radius
    ClipRadius(f32),
}

/// A single timed animation
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimationSegment {
    kind: SegmentKind,
    duration_ms: u32,
    start_offset_ms: u32,
    easing: Easing,
}

impl AnimationSegment {
    /// Create a segment with linear easing and no start offset
    pub fn new(kind: SegmentKind, duration_ms: u32) -> Self {
        Self {
            kind,
            duration_ms,
            start_offset_ms: 0,
            easing: Easing::Linear,
        }
    }

    pub fn translate(path: CurvePath, from: Point, to: Point, duration_ms: u32) -> Self {
        Self::new(SegmentKind::Translate { path, from, to }, duration_ms)
    }

    pub fn scale(from: Scale, to: Scale, pivot: Pivot, duration_ms: u32) -> Self {
        Self::new(SegmentKind::Scale { from, to, pivot }, duration_ms)
    }

    pub fn circular_reveal(center: Point, radius: f32, duration_ms: u32) -> Self {
        Self::new(SegmentKind::CircularReveal { center, radius }, duration_ms)
    }

    pub fn circular_unreveal(center: Point, radius: f32, duration_ms: u32) -> Self {
        Self::new(SegmentKind::CircularUnreveal { center, radius }, duration_ms)
    }

    /// Delay the start by `offset_ms` from the moment the segment is issued
    pub fn with_start_offset(mut self, offset_ms: u32) -> Self {
        self.start_offset_ms = offset_ms;
        self
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Copy of this segment pushed back by a further `delay_ms`
    pub fn delayed_by(&self, delay_ms: u32) -> Self {
        Self {
            start_offset_ms: self.start_offset_ms.saturating_add(delay_ms),
            ..*self
        }
    }

    pub fn kind(&self) -> &SegmentKind {
        &self.kind
    }

    pub fn duration_ms(&self) -> u32 {
        self.duration_ms
    }

    pub fn start_offset_ms(&self) -> u32 {
        self.start_offset_ms
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Time from issue to completion
    pub fn end_ms(&self) -> u32 {
        self.start_offset_ms.saturating_add(self.duration_ms)
    }

    /// Eased progress `elapsed_ms` after the segment was issued
    pub fn progress_at(&self, elapsed_ms: f32) -> f32 {
        let local = elapsed_ms - self.start_offset_ms as f32;
        if local < 0.0 {
            return self.easing.apply(0.0);
        }
        if self.duration_ms == 0 {
            return self.easing.apply(1.0);
        }
        self.easing.apply(local / self.duration_ms as f32)
    }

    /// Effect value `elapsed_ms` after the segment was issued
    pub fn value_at(&self, elapsed_ms: f32) -> SegmentValue {
        let progress = self.progress_at(elapsed_ms);
        match self.kind {
            SegmentKind::Translate { path, from, to } => {
                SegmentValue::Offset(path.evaluate(progress, from, to))
            }
            SegmentKind::Scale { from, to, pivot } => SegmentValue::Scale {
                scale: from.lerp(&to, progress),
                pivot,
            },
            SegmentKind::CircularReveal { radius, .. } => {
                SegmentValue::ClipRadius(radius * progress)
            }
            SegmentKind::CircularUnreveal { radius, .. } => {
                SegmentValue::ClipRadius(radius * (1.0 - progress))
            }
        }
    }
}
