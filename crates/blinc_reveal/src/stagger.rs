//! Staggered child reveal
//!
//! Every element of an ordered snapshot gets one bouncing scale-in, issued all
//! at once with start offsets growing by a fixed step.

use serde::{Deserialize, Serialize};

use crate::easing::Easing;
use crate::geometry::Scale;
use crate::host::ElementTree;
use crate::segment::{AnimationSegment, Pivot};

/// Stagger parameters
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaggerSequencer {
    /// Per-child scale-in duration (ms)
    pub duration_ms: u32,
    /// Start offset increment between consecutive children (ms)
    pub delay_ms: u32,
}

impl StaggerSequencer {
    pub fn new(duration_ms: u32, delay_ms: u32) -> Self {
        Self {
            duration_ms,
            delay_ms,
        }
    }

    /// Start offset of the child at `index`
    pub fn offset_for_index(&self, index: usize) -> u32 {
        let index = u32::try_from(index).unwrap_or(u32::MAX);
        self.delay_ms.saturating_mul(index)
    }

    /// Wall-clock span of a stagger over `count` children
    pub fn total_duration_ms(&self, count: usize) -> u32 {
        match count {
            0 => 0,
            n => self.offset_for_index(n - 1).saturating_add(self.duration_ms),
        }
    }

    /// Scale-in segment for the child at `index`, growing to `natural`
    pub fn segment_for(&self, index: usize, natural: Scale) -> AnimationSegment {
        AnimationSegment::scale(Scale::ZERO, natural, Pivot::CENTER, self.duration_ms)
            .with_easing(Easing::Bounce)
            .with_start_offset(self.offset_for_index(index))
    }

    /// One segment per element, in snapshot order
    pub fn plan<T: ElementTree + ?Sized>(
        &self,
        tree: &T,
        elements: &[T::Element],
    ) -> Vec<(T::Element, AnimationSegment)> {
        elements
            .iter()
            .enumerate()
            .map(|(index, &element)| (element, self.segment_for(index, tree.scale(element))))
            .collect()
    }
}

impl Default for StaggerSequencer {
    fn default() -> Self {
        Self::new(500, 50)
    }
}
