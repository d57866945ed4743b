//! Concurrent segment groups
//!
//! A [`Timeline`] bundles segments that play at the same time on one element
//! (for example "translate" and "shrink out" of the origin) behind a single
//! start offset. Completion of the group is tracked by a [`CompletionLatch`]
//! with one slot per segment: it opens exactly once, after every slot has
//! arrived, whatever order the host finishes them in.

use smallvec::SmallVec;

use crate::segment::AnimationSegment;

/// Group of segments played concurrently
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    start_offset_ms: u32,
    segments: SmallVec<[AnimationSegment; 2]>,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay the whole group by `offset_ms`
    pub fn with_start_offset(mut self, offset_ms: u32) -> Self {
        self.start_offset_ms = offset_ms;
        self
    }

    /// Add a segment to the group
    pub fn with(mut self, segment: AnimationSegment) -> Self {
        self.segments.push(segment);
        self
    }

    pub fn push(&mut self, segment: AnimationSegment) {
        self.segments.push(segment);
    }

    pub fn start_offset_ms(&self) -> u32 {
        self.start_offset_ms
    }

    /// Segments with offsets relative to the timeline start
    pub fn segments(&self) -> &[AnimationSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments with the timeline offset folded in, ready to hand to a host
    pub fn scheduled(&self) -> impl Iterator<Item = AnimationSegment> + '_ {
        self.segments
            .iter()
            .map(move |segment| segment.delayed_by(self.start_offset_ms))
    }

    /// Time from issue until the last segment finishes
    pub fn end_ms(&self) -> u32 {
        self.scheduled()
            .map(|segment| segment.end_ms())
            .max()
            .unwrap_or(self.start_offset_ms)
    }
}

/// Count-down latch with one slot per grouped segment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionLatch {
    arrived: SmallVec<[bool; 4]>,
    remaining: usize,
}

impl CompletionLatch {
    pub fn new(slots: usize) -> Self {
        Self {
            arrived: SmallVec::from_elem(false, slots),
            remaining: slots,
        }
    }

    /// Mark `slot` as finished
    ///
    /// Returns `true` exactly once: on the arrival that completes the group.
    /// Repeated or out-of-range arrivals are ignored.
    pub fn arrive(&mut self, slot: usize) -> bool {
        match self.arrived.get_mut(slot) {
            Some(arrived) if !*arrived => {
                *arrived = true;
                self.remaining -= 1;
            }
            _ => return false,
        }

        self.remaining == 0
    }

    pub fn remaining(&self) -> usize {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Scale};
    use crate::segment::Pivot;

    fn sample_timeline() -> Timeline {
        Timeline::new()
            .with(AnimationSegment::translate(
                Default::default(),
                Point::ZERO,
                Point::new(10.0, 10.0),
                250,
            ))
            .with(
                AnimationSegment::scale(Scale::IDENTITY, Scale::ZERO, Pivot::CENTER, 50)
                    .with_start_offset(200),
            )
    }

    #[test]
    fn test_latch_fires_once_in_any_order() {
        let orders: [[usize; 3]; 6] = [
            [0, 1, 2],
            [0, 2, 1],
            [1, 0, 2],
            [1, 2, 0],
            [2, 0, 1],
            [2, 1, 0],
        ];
        for order in orders {
            let mut latch = CompletionLatch::new(3);
            let fired: Vec<bool> = order.iter().map(|&slot| latch.arrive(slot)).collect();
            assert_eq!(fired, vec![false, false, true], "order {order:?}");
            assert_eq!(latch.remaining(), 0);
        }
    }

    #[test]
    fn test_latch_ignores_duplicates() {
        let mut latch = CompletionLatch::new(2);
        assert!(!latch.arrive(0));
        assert!(!latch.arrive(0));
        assert_eq!(latch.remaining(), 1);
        assert!(latch.arrive(1));

        // Everything after the group completed is a no-op
        assert!(!latch.arrive(1));
        assert!(!latch.arrive(5));
    }

    #[test]
    fn test_timeline_offsets_fold_into_segments() {
        let timeline = sample_timeline().with_start_offset(225);
        let offsets: Vec<u32> = timeline.scheduled().map(|s| s.start_offset_ms()).collect();
        assert_eq!(offsets, vec![225, 425]);
        assert_eq!(timeline.end_ms(), 475);

        // The group keeps its own relative offsets
        assert_eq!(timeline.segments()[1].start_offset_ms(), 200);
    }

    #[test]
    fn test_empty_timeline() {
        let timeline = Timeline::new().with_start_offset(30);
        assert!(timeline.is_empty());
        assert_eq!(timeline.end_ms(), 30);
        assert_eq!(timeline.scheduled().count(), 0);
    }
}
