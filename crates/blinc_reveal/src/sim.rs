//! Simulated host
//!
//! [`SimHost`] is an in-memory element tree with a virtual millisecond clock.
//! Played segments are turned into `Started` / `Finished` events queued by
//! time, and every visibility change or segment event is logged, which makes
//! a transition's sequencing easy to inspect in tests and from the CLI.

use std::collections::BTreeMap;
use std::fmt;

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, SlotMap};

use crate::choreographer::{Choreographer, SegmentId};
use crate::error::Result;
use crate::geometry::{Point, Rect, Scale, Size};
use crate::host::{AnimationHost, ElementTree, Visibility};
use crate::segment::{AnimationSegment, Pivot, SegmentValue};

new_key_type! {
    /// Handle to an element of a [`SimHost`]
    pub struct ElementId;
}

/// One element in the simulated tree
#[derive(Clone, Debug)]
pub struct SimElement {
    pub name: String,
    pub bounds: Rect,
    pub scale: Scale,
    pub visibility: Visibility,
    /// `None` for a leaf
    pub children: Option<Vec<ElementId>>,
}

/// Lifecycle point of a played segment
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimEventKind {
    Started,
    Finished,
}

/// A queued segment event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SimEvent {
    pub at_ms: u64,
    pub segment: SegmentId,
    pub kind: SimEventKind,
}

/// What happened in a [`TraceEntry`]
#[derive(Clone, Debug, PartialEq)]
pub enum TraceEvent {
    Visibility(Visibility),
    Played {
        label: &'static str,
        start_offset_ms: u32,
        duration_ms: u32,
    },
    Started(&'static str),
    Finished(&'static str),
}

/// One line of the simulation log
#[derive(Clone, Debug, PartialEq)]
pub struct TraceEntry {
    pub at_ms: u64,
    pub element: ElementId,
    pub name: String,
    pub event: TraceEvent,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:>6}ms  {:<12} ", self.at_ms, self.name)?;
        match &self.event {
            TraceEvent::Visibility(Visibility::Visible) => write!(f, "visible"),
            TraceEvent::Visibility(Visibility::Invisible) => write!(f, "invisible"),
            TraceEvent::Played {
                label,
                start_offset_ms,
                duration_ms,
            } => write!(f, "play {label} +{start_offset_ms}ms for {duration_ms}ms"),
            TraceEvent::Started(label) => write!(f, "start {label}"),
            TraceEvent::Finished(label) => write!(f, "finish {label}"),
        }
    }
}

/// Combined animated state of one element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementSample {
    /// Sum of active translate offsets
    pub offset: Point,
    /// Product of active scale factors
    pub scale: Scale,
    pub pivot: Option<Pivot>,
    /// Radius of the active circular clip, if any
    pub clip_radius: Option<f32>,
}

#[derive(Clone, Copy, Debug)]
struct ActiveSegment {
    element: ElementId,
    segment: AnimationSegment,
    issued_at: u64,
}

/// In-memory [`AnimationHost`] driven by a virtual clock
#[derive(Default)]
pub struct SimHost {
    elements: SlotMap<ElementId, SimElement>,
    names: FxHashMap<String, ElementId>,
    now_ms: u64,
    seq: u64,
    queue: BTreeMap<(u64, u64), (SegmentId, SimEventKind)>,
    active: FxHashMap<SegmentId, ActiveSegment>,
    trace: Vec<TraceEntry>,
}

impl SimHost {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Tree
    // =========================================================================

    /// Add a leaf element
    pub fn add_element(&mut self, name: impl Into<String>, bounds: Rect) -> ElementId {
        self.insert(name.into(), bounds, None)
    }

    /// Add an empty container
    pub fn add_container(&mut self, name: impl Into<String>, bounds: Rect) -> ElementId {
        self.insert(name.into(), bounds, Some(Vec::new()))
    }

    fn insert(&mut self, name: String, bounds: Rect, children: Option<Vec<ElementId>>) -> ElementId {
        let id = self.elements.insert(SimElement {
            name: name.clone(),
            bounds,
            scale: Scale::IDENTITY,
            visibility: Visibility::Visible,
            children,
        });
        self.names.insert(name, id);
        id
    }

    /// Append `child` to `parent`, turning a leaf parent into a container
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) {
        if let Some(element) = self.elements.get_mut(parent) {
            element.children.get_or_insert_with(Vec::new).push(child);
        }
    }

    /// Detach an element from the tree
    pub fn remove(&mut self, id: ElementId) -> Option<SimElement> {
        let element = self.elements.remove(id)?;
        self.names.remove(&element.name);
        for (_, other) in self.elements.iter_mut() {
            if let Some(children) = other.children.as_mut() {
                children.retain(|&child| child != id);
            }
        }
        Some(element)
    }

    pub fn set_scale(&mut self, id: ElementId, scale: Scale) {
        if let Some(element) = self.elements.get_mut(id) {
            element.scale = scale;
        }
    }

    pub fn find(&self, name: &str) -> Option<ElementId> {
        self.names.get(name).copied()
    }

    pub fn element(&self, id: ElementId) -> Option<&SimElement> {
        self.elements.get(id)
    }

    fn name_of(&self, id: ElementId) -> String {
        self.elements
            .get(id)
            .map(|e| e.name.clone())
            .unwrap_or_else(|| format!("{id:?}"))
    }

    fn record(&mut self, element: ElementId, event: TraceEvent) {
        let name = self.name_of(element);
        self.trace.push(TraceEntry {
            at_ms: self.now_ms,
            element,
            name,
            event,
        });
    }

    // =========================================================================
    // Clock
    // =========================================================================

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn pending_events(&self) -> usize {
        self.queue.len()
    }

    /// Pop the earliest queued event and move the clock to it
    ///
    /// Events due at the same time come out in the order they were queued.
    pub fn next_event(&mut self) -> Option<SimEvent> {
        let ((at_ms, _), (segment, kind)) = self.queue.pop_first()?;
        self.now_ms = self.now_ms.max(at_ms);

        let active = match kind {
            SimEventKind::Started => self.active.get(&segment).copied(),
            SimEventKind::Finished => self.active.remove(&segment),
        };
        if let Some(active) = active {
            let label = active.segment.kind().label();
            let event = match kind {
                SimEventKind::Started => TraceEvent::Started(label),
                SimEventKind::Finished => TraceEvent::Finished(label),
            };
            self.record(active.element, event);
        }

        Some(SimEvent {
            at_ms,
            segment,
            kind,
        })
    }

    /// Report `event` to `choreographer`
    pub fn deliver(&mut self, choreographer: &mut Choreographer<ElementId>, event: SimEvent) -> Result<()> {
        match event.kind {
            SimEventKind::Started => choreographer.segment_started(self, event.segment),
            SimEventKind::Finished => choreographer.segment_finished(self, event.segment),
        }
    }

    /// Deliver every event due up to `at_ms`, then move the clock there
    pub fn advance_to(&mut self, choreographer: &mut Choreographer<ElementId>, at_ms: u64) -> Result<()> {
        while self
            .queue
            .first_key_value()
            .is_some_and(|(&(due, _), _)| due <= at_ms)
        {
            if let Some(event) = self.next_event() {
                self.deliver(choreographer, event)?;
            }
        }
        self.now_ms = self.now_ms.max(at_ms);
        Ok(())
    }

    /// Deliver events until the queue is empty; returns how many were delivered
    pub fn run_until_idle(&mut self, choreographer: &mut Choreographer<ElementId>) -> Result<usize> {
        let mut delivered = 0;
        while let Some(event) = self.next_event() {
            self.deliver(choreographer, event)?;
            delivered += 1;
        }
        Ok(delivered)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn trace(&self) -> &[TraceEntry] {
        &self.trace
    }

    pub fn take_trace(&mut self) -> Vec<TraceEntry> {
        std::mem::take(&mut self.trace)
    }

    /// Animated state of `element` at the current time
    pub fn sample(&self, element: ElementId) -> ElementSample {
        let mut sample = ElementSample {
            offset: Point::ZERO,
            scale: Scale::IDENTITY,
            pivot: None,
            clip_radius: None,
        };

        let mut active: Vec<&ActiveSegment> = self
            .active
            .values()
            .filter(|active| active.element == element)
            .collect();
        active.sort_by_key(|active| active.issued_at);

        for active in active {
            let elapsed = self.now_ms.saturating_sub(active.issued_at) as f32;
            match active.segment.value_at(elapsed) {
                SegmentValue::Offset(offset) => sample.offset = sample.offset + offset,
                SegmentValue::Scale { scale, pivot } => {
                    sample.scale = Scale::new(sample.scale.x * scale.x, sample.scale.y * scale.y);
                    sample.pivot = Some(pivot);
                }
                SegmentValue::ClipRadius(radius) => sample.clip_radius = Some(radius),
            }
        }
        sample
    }
}

impl fmt::Debug for SimHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimHost")
            .field("elements", &self.elements.len())
            .field("now_ms", &self.now_ms)
            .field("pending_events", &self.queue.len())
            .finish()
    }
}

impl ElementTree for SimHost {
    type Element = ElementId;

    fn contains(&self, element: ElementId) -> bool {
        self.elements.contains_key(element)
    }

    fn position(&self, element: ElementId) -> Point {
        self.elements
            .get(element)
            .map_or(Point::ZERO, |e| e.bounds.origin)
    }

    fn size(&self, element: ElementId) -> Size {
        self.elements.get(element).map_or(Size::ZERO, |e| e.bounds.size)
    }

    fn scale(&self, element: ElementId) -> Scale {
        self.elements
            .get(element)
            .map_or(Scale::IDENTITY, |e| e.scale)
    }

    fn visibility(&self, element: ElementId) -> Visibility {
        self.elements
            .get(element)
            .map(|e| e.visibility)
            .unwrap_or_default()
    }

    fn set_visibility(&mut self, element: ElementId, visibility: Visibility) {
        if let Some(e) = self.elements.get_mut(element) {
            e.visibility = visibility;
            self.record(element, TraceEvent::Visibility(visibility));
        }
    }

    fn children(&self, element: ElementId) -> Option<Vec<ElementId>> {
        self.elements.get(element).and_then(|e| e.children.clone())
    }
}

impl AnimationHost for SimHost {
    fn play(&mut self, element: ElementId, id: SegmentId, segment: &AnimationSegment) {
        self.record(
            element,
            TraceEvent::Played {
                label: segment.kind().label(),
                start_offset_ms: segment.start_offset_ms(),
                duration_ms: segment.duration_ms(),
            },
        );
        self.active.insert(
            id,
            ActiveSegment {
                element,
                segment: *segment,
                issued_at: self.now_ms,
            },
        );

        let start = self.now_ms + u64::from(segment.start_offset_ms());
        let end = self.now_ms + u64::from(segment.end_ms());
        self.queue.insert((start, self.seq), (id, SimEventKind::Started));
        self.queue.insert((end, self.seq + 1), (id, SimEventKind::Finished));
        self.seq += 2;
    }
}
