//! Transition timing settings
//!
//! Plain serde structs so hosts can keep their motion settings in a config
//! file. Missing fields fall back to the standard preset.

use serde::{Deserialize, Serialize};

use crate::error::{Result, RevealError};
use crate::geometry::Point;
use crate::stagger::StaggerSequencer;

/// Settings for a reveal transition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealSettings {
    /// Duration of the origin translate stage (ms)
    pub translate_duration_ms: u32,
    /// Duration of the circular reveal (ms)
    pub reveal_duration_ms: u32,
    /// Move the origin along a Bezier curve instead of a straight line
    pub curved: bool,
    /// Override for the curve's control point (offset space); implies nothing
    /// unless `curved` is set
    pub curve_control: Option<Point>,
    /// Fraction of the translate after which the origin starts shrinking
    pub hide_origin_at: f32,
    /// Scale in the target's visible leaves after the reveal
    pub child_stagger: bool,
    /// Per-child scale-in duration (ms)
    pub child_duration_ms: u32,
    /// Start offset increment between children (ms)
    pub child_delay_ms: u32,
    /// Hold the end action until every child has finished
    pub end_after_children: bool,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl RevealSettings {
    /// Standard motion
    pub fn standard() -> Self {
        Self {
            translate_duration_ms: 250,
            reveal_duration_ms: 250,
            curved: false,
            curve_control: None,
            hide_origin_at: 0.8,
            child_stagger: false,
            child_duration_ms: 500,
            child_delay_ms: 50,
            end_after_children: false,
        }
    }

    /// Zero durations everywhere, for reduced-motion preferences
    pub fn instant() -> Self {
        Self {
            translate_duration_ms: 0,
            reveal_duration_ms: 0,
            child_duration_ms: 0,
            child_delay_ms: 0,
            ..Self::standard()
        }
    }

    pub fn with_translate_duration(mut self, ms: u32) -> Self {
        self.translate_duration_ms = ms;
        self
    }

    pub fn with_reveal_duration(mut self, ms: u32) -> Self {
        self.reveal_duration_ms = ms;
        self
    }

    pub fn with_curve(mut self, curved: bool) -> Self {
        self.curved = curved;
        self
    }

    pub fn with_hide_origin_at(mut self, fraction: f32) -> Self {
        self.hide_origin_at = fraction;
        self
    }

    pub fn with_child_stagger(mut self, enabled: bool) -> Self {
        self.child_stagger = enabled;
        self
    }

    /// Stagger parameters for the child stage
    pub fn stagger(&self) -> StaggerSequencer {
        StaggerSequencer::new(self.child_duration_ms, self.child_delay_ms)
    }

    /// Copy with fractions clamped to `[0, 1]`
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            hide_origin_at: clamp_fraction("hide_origin_at", self.hide_origin_at)?,
            ..self.clone()
        })
    }
}

/// Settings for an unreveal transition
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnrevealSettings {
    /// Duration of the circular unreveal (ms)
    pub unreveal_duration_ms: u32,
    /// Duration of the restore element's translate back (ms)
    pub translate_duration_ms: u32,
    /// Move the restore element along a Bezier curve
    pub curved: bool,
    /// Override for the curve's control point (offset space)
    pub curve_control: Option<Point>,
    /// Restore scale-in duration as a fraction of the translate duration
    pub show_restore_fraction: f32,
}

impl Default for UnrevealSettings {
    fn default() -> Self {
        Self::standard()
    }
}

impl UnrevealSettings {
    /// Standard motion
    pub fn standard() -> Self {
        Self {
            unreveal_duration_ms: 250,
            translate_duration_ms: 250,
            curved: false,
            curve_control: None,
            show_restore_fraction: 0.2,
        }
    }

    /// Zero durations everywhere, for reduced-motion preferences
    pub fn instant() -> Self {
        Self {
            unreveal_duration_ms: 0,
            translate_duration_ms: 0,
            ..Self::standard()
        }
    }

    pub fn with_unreveal_duration(mut self, ms: u32) -> Self {
        self.unreveal_duration_ms = ms;
        self
    }

    pub fn with_translate_duration(mut self, ms: u32) -> Self {
        self.translate_duration_ms = ms;
        self
    }

    pub fn with_curve(mut self, curved: bool) -> Self {
        self.curved = curved;
        self
    }

    /// Copy with fractions clamped to `[0, 1]`
    pub fn normalized(&self) -> Result<Self> {
        Ok(Self {
            show_restore_fraction: clamp_fraction(
                "show_restore_fraction",
                self.show_restore_fraction,
            )?,
            ..self.clone()
        })
    }
}

/// Clamp a finite fraction to `[0, 1]`
pub(crate) fn clamp_fraction(name: &'static str, value: f32) -> Result<f32> {
    if !value.is_finite() {
        return Err(RevealError::InvalidFraction { name, value });
    }
    Ok(value.clamp(0.0, 1.0))
}

/// `duration × fraction`, rounded to whole milliseconds
pub(crate) fn fraction_of(duration_ms: u32, fraction: f32) -> u32 {
    let ms = (duration_ms as f64 * f64::from(fraction)).round();
    (ms as u32).min(duration_ms)
}

/// `duration × percent / 100`, rounded down
pub(crate) fn percent_of(duration_ms: u32, percent: u32) -> u32 {
    (u64::from(duration_ms) * u64::from(percent) / 100) as u32
}
