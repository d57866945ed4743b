//! Interpolation curves
//!
//! Maps linear progress `t` in `[0, 1]` to eased progress. The set matches what
//! the reveal choreography needs: accelerate for outbound motion, decelerate
//! for inbound motion and the reveal wipe, accelerate-decelerate for the
//! unreveal wipe and a bounce for scale-in.

use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Easing function applied to a segment's progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant speed
    #[default]
    Linear,
    /// Starts slow, ends fast (`t²`)
    Accelerate,
    /// Starts fast, ends slow (`1 - (1 - t)²`)
    Decelerate,
    /// Slow at both ends, cosine shaped
    AccelerateDecelerate,
    /// Overshoots the end and settles with three decaying bounces
    Bounce,
}

impl Easing {
    /// Apply the easing to `t` (clamped to `[0, 1]`)
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        match self {
            Easing::Linear => t,
            Easing::Accelerate => t * t,
            Easing::Decelerate => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::AccelerateDecelerate => ((t + 1.0) * PI).cos() / 2.0 + 0.5,
            Easing::Bounce => bounce(t),
        }
    }
}

fn bounce(t: f32) -> f32 {
    fn parabola(t: f32) -> f32 {
        t * t * 8.0
    }

    // The last arc lands a hair above 1.0; pin the endpoint
    if t >= 1.0 {
        return 1.0;
    }

    let t = t * 1.1226;
    if t < 0.3535 {
        parabola(t)
    } else if t < 0.7408 {
        parabola(t - 0.54719) + 0.7
    } else if t < 0.9644 {
        parabola(t - 0.8526) + 0.9
    } else {
        parabola(t - 1.0435) + 0.95
    }
}
