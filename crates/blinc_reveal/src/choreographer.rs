//! Transition runtime
//!
//! The [`Choreographer`] owns every in-flight transition. `start()` on a
//! builder registers a transition and issues its first segments; the host then
//! reports segment events back, and each completed stage advances that
//! transition's state machine.
//!
//! Segments of one stage are grouped behind a [`CompletionLatch`], so a stage
//! advances exactly once no matter in which order its segments finish.

use std::collections::VecDeque;
use std::fmt;
use std::hash::Hash;

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;

use crate::discovery::collect_visible;
use crate::error::{Result, RevealError};
use crate::host::{AnimationHost, Visibility};
use crate::machine::{Action, Machine, Phase, RevealMachine, StageEvent, UnrevealMachine};
use crate::reveal::{EndAction, RevealConfig};
use crate::segment::AnimationSegment;
use crate::timeline::CompletionLatch;
use crate::unreveal::UnrevealConfig;

new_key_type! {
    /// Handle to a running transition
    pub struct TransitionId;
    /// Handle to one issued segment, reported back by the host
    pub struct SegmentId;
}

/// Stage a segment belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stage {
    Origin,
    Target,
    Restore,
    Children,
}

impl Stage {
    fn finished_event(self) -> StageEvent {
        match self {
            Stage::Origin => StageEvent::OriginFinished,
            Stage::Target => StageEvent::TargetFinished,
            Stage::Restore => StageEvent::RestoreFinished,
            Stage::Children => StageEvent::ChildrenFinished,
        }
    }
}

/// Visibility change tied to a segment's lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SegmentEffect {
    None,
    /// Show the element once the segment starts (or finishes, if no start was
    /// reported)
    ShowOnStart,
    /// Hide the element once the segment finishes
    HideOnFinish,
}

#[derive(Debug)]
struct SegmentTicket<E> {
    transition: TransitionId,
    stage: Stage,
    slot: usize,
    element: E,
    effect: SegmentEffect,
    started: bool,
}

enum Plan<E> {
    Reveal {
        config: RevealConfig<E>,
        /// Leaf snapshot taken before anything was hidden
        children: Vec<E>,
    },
    Unreveal {
        config: UnrevealConfig<E>,
    },
}

impl<E: Copy> Plan<E> {
    fn target(&self) -> E {
        match self {
            Plan::Reveal { config, .. } => config.target(),
            Plan::Unreveal { config } => config.target(),
        }
    }
}

struct Transition<E> {
    machine: Machine,
    plan: Plan<E>,
    latches: SmallVec<[(Stage, CompletionLatch); 3]>,
    end_action: Option<EndAction>,
}

/// One segment of a stage group, before it is issued
type Issue<E> = (E, AnimationSegment, SegmentEffect);

/// Runtime for reveal and unreveal transitions
pub struct Choreographer<E> {
    transitions: SlotMap<TransitionId, Transition<E>>,
    segments: SlotMap<SegmentId, SegmentTicket<E>>,
}

impl<E> Choreographer<E> {
    pub fn new() -> Self {
        Self {
            transitions: SlotMap::with_key(),
            segments: SlotMap::with_key(),
        }
    }

    /// Current phase of a transition; `None` once it is done or abandoned
    pub fn phase(&self, id: TransitionId) -> Option<Phase> {
        self.transitions.get(id).map(|t| t.machine.phase())
    }

    pub fn is_active(&self, id: TransitionId) -> bool {
        self.transitions.contains_key(id)
    }

    /// Number of transitions still running
    pub fn active_count(&self) -> usize {
        self.transitions.len()
    }

    /// Number of issued segments whose completion has not been reported
    pub fn pending_segments(&self) -> usize {
        self.segments.len()
    }

    /// Forget a transition without firing anything
    ///
    /// Later events for its segments are rejected as unknown. Elements keep
    /// whatever visibility they had.
    pub fn abandon(&mut self, id: TransitionId) -> bool {
        if self.transitions.remove(id).is_none() {
            return false;
        }
        self.segments.retain(|_, ticket| ticket.transition != id);
        tracing::debug!("transition {:?} abandoned", id);
        true
    }
}

impl<E> Default for Choreographer<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Choreographer<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choreographer")
            .field("transitions", &self.transitions.len())
            .field("segments", &self.segments.len())
            .finish()
    }
}

impl<E: Copy + Eq + Hash + fmt::Debug> Choreographer<E> {
    pub(crate) fn begin_reveal<H>(&mut self, host: &mut H, mut config: RevealConfig<E>) -> TransitionId
    where
        H: AnimationHost<Element = E>,
    {
        let children = if config.child_stagger() {
            collect_visible(&*host, config.target())
        } else {
            Vec::new()
        };
        let machine = RevealMachine::new(
            config.origin().is_some(),
            children.len(),
            config.settings().end_after_children,
        );

        let id = self.transitions.insert(Transition {
            machine: Machine::Reveal(machine),
            end_action: config.take_end_action(),
            plan: Plan::Reveal { config, children },
            latches: SmallVec::new(),
        });
        tracing::debug!("transition {:?}: reveal started", id);

        self.dispatch(host, id, StageEvent::Start);
        id
    }

    pub(crate) fn begin_unreveal<H>(
        &mut self,
        host: &mut H,
        mut config: UnrevealConfig<E>,
    ) -> TransitionId
    where
        H: AnimationHost<Element = E>,
    {
        let machine = UnrevealMachine::new(config.restore().is_some());

        let id = self.transitions.insert(Transition {
            machine: Machine::Unreveal(machine),
            end_action: config.take_end_action(),
            plan: Plan::Unreveal { config },
            latches: SmallVec::new(),
        });
        tracing::debug!("transition {:?}: unreveal started", id);

        self.dispatch(host, id, StageEvent::Start);
        id
    }

    /// Report that a segment's start offset has elapsed
    pub fn segment_started<H>(&mut self, host: &mut H, id: SegmentId) -> Result<()>
    where
        H: AnimationHost<Element = E>,
    {
        let Some(ticket) = self.segments.get_mut(id) else {
            tracing::warn!("start reported for unknown segment {:?}", id);
            return Err(RevealError::UnknownSegment(id));
        };

        if !ticket.started {
            ticket.started = true;
            if ticket.effect == SegmentEffect::ShowOnStart {
                host.set_visibility(ticket.element, Visibility::Visible);
            }
        }
        Ok(())
    }

    /// Report that a segment has finished
    ///
    /// Advances the owning transition when this was the last outstanding
    /// segment of its stage.
    pub fn segment_finished<H>(&mut self, host: &mut H, id: SegmentId) -> Result<()>
    where
        H: AnimationHost<Element = E>,
    {
        let Some(ticket) = self.segments.remove(id) else {
            tracing::warn!("completion reported for unknown segment {:?}", id);
            return Err(RevealError::UnknownSegment(id));
        };
        tracing::trace!("segment {:?} finished on {:?}", id, ticket.element);

        match ticket.effect {
            SegmentEffect::ShowOnStart if !ticket.started => {
                host.set_visibility(ticket.element, Visibility::Visible);
            }
            SegmentEffect::HideOnFinish => {
                host.set_visibility(ticket.element, Visibility::Invisible);
            }
            _ => {}
        }

        let Some(transition) = self.transitions.get_mut(ticket.transition) else {
            return Ok(());
        };
        let Some(index) = transition
            .latches
            .iter()
            .position(|(stage, _)| *stage == ticket.stage)
        else {
            return Ok(());
        };

        let latch = &mut transition.latches[index].1;
        if latch.arrive(ticket.slot) {
            transition.latches.remove(index);
            self.dispatch(host, ticket.transition, ticket.stage.finished_event());
        } else {
            tracing::trace!("{:?} stage: {} still running", ticket.stage, latch.remaining());
        }
        Ok(())
    }

    /// Feed `event` to a transition's machine and run everything it asks for
    fn dispatch<H>(&mut self, host: &mut H, id: TransitionId, event: StageEvent)
    where
        H: AnimationHost<Element = E>,
    {
        let mut queue = VecDeque::from([event]);

        while let Some(event) = queue.pop_front() {
            let Some(transition) = self.transitions.get_mut(id) else {
                return;
            };
            let before = transition.machine.phase();
            let actions = transition.machine.handle(event);
            let after = transition.machine.phase();
            if before != after {
                tracing::debug!("transition {:?}: {:?} -> {:?}", id, before, after);
            }

            for action in actions {
                self.perform(host, id, action, &mut queue);
            }
        }

        if self.phase(id).is_some_and(Phase::is_done) {
            self.transitions.remove(id);
            tracing::debug!("transition {:?} done", id);
        }
    }

    fn perform<H>(
        &mut self,
        host: &mut H,
        id: TransitionId,
        action: Action,
        queue: &mut VecDeque<StageEvent>,
    ) where
        H: AnimationHost<Element = E>,
    {
        let Some(transition) = self.transitions.get_mut(id) else {
            return;
        };

        let (stage, group): (Stage, Vec<Issue<E>>) = match (action, &transition.plan) {
            (Action::HideTarget, plan) => {
                host.set_visibility(plan.target(), Visibility::Invisible);
                return;
            }
            (Action::HideChildren, Plan::Reveal { children, .. }) => {
                for &child in children {
                    host.set_visibility(child, Visibility::Invisible);
                }
                return;
            }
            (Action::HideOrigin, Plan::Reveal { config, .. }) => {
                if let Some(origin) = config.origin() {
                    host.set_visibility(origin, Visibility::Invisible);
                }
                return;
            }
            (Action::FireEndAction, _) => {
                if let Some(end_action) = transition.end_action.take() {
                    tracing::debug!("transition {:?}: end action", id);
                    end_action();
                }
                return;
            }
            (Action::PlayOrigin, Plan::Reveal { config, .. }) => {
                let Some(origin) = config.origin() else {
                    return;
                };
                let timeline = config.origin_timeline(
                    host.bounds(origin),
                    host.scale(origin),
                    host.bounds(config.target()),
                );
                let group = timeline
                    .scheduled()
                    .map(|segment| (origin, segment, SegmentEffect::None))
                    .collect();
                (Stage::Origin, group)
            }
            (Action::PlayReveal, Plan::Reveal { config, .. }) => {
                let target = config.target();
                let segment = config.reveal_segment(host.size(target));
                (Stage::Target, vec![(target, segment, SegmentEffect::ShowOnStart)])
            }
            (Action::RunStagger, Plan::Reveal { config, children }) => {
                let group = config
                    .stagger()
                    .plan(&*host, children)
                    .into_iter()
                    .map(|(child, segment)| (child, segment, SegmentEffect::None))
                    .collect::<Vec<_>>();
                for &(child, ..) in &group {
                    host.set_visibility(child, Visibility::Visible);
                }
                (Stage::Children, group)
            }
            (Action::PlayUnreveal, Plan::Unreveal { config }) => {
                let target = config.target();
                let segment = config.unreveal_segment(host.size(target));
                (Stage::Target, vec![(target, segment, SegmentEffect::HideOnFinish)])
            }
            (Action::PlayRestore, Plan::Unreveal { config }) => {
                let Some(restore) = config.restore() else {
                    return;
                };
                let timeline = config.restore_timeline(
                    host.bounds(restore),
                    host.scale(restore),
                    host.bounds(config.target()),
                );
                host.set_visibility(restore, Visibility::Visible);
                let group = timeline
                    .scheduled()
                    .map(|segment| (restore, segment, SegmentEffect::None))
                    .collect();
                (Stage::Restore, group)
            }
            (action, _) => {
                tracing::warn!("transition {:?}: {:?} does not apply", id, action);
                return;
            }
        };

        if group.is_empty() {
            queue.push_back(stage.finished_event());
            return;
        }

        transition
            .latches
            .push((stage, CompletionLatch::new(group.len())));
        for (slot, (element, segment, effect)) in group.into_iter().enumerate() {
            let sid = self.segments.insert(SegmentTicket {
                transition: id,
                stage,
                slot,
                element,
                effect,
                started: false,
            });
            tracing::trace!(
                "segment {:?}: {} on {:?} at +{}ms for {}ms",
                sid,
                segment.kind().label(),
                element,
                segment.start_offset_ms(),
                segment.duration_ms()
            );
            host.play(element, sid, &segment);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Point, Size};
    use crate::host::ElementTree;
    use crate::machine::{RevealPhase, UnrevealPhase};
    use crate::segment::SegmentKind;
    use crate::{reveal, unreveal};
    use rustc_hash::FxHashMap;
    use std::cell::Cell;
    use std::rc::Rc;

    /// Host that records plays and lets the test finish segments by hand
    #[derive(Default)]
    struct ManualHost {
        visibility: FxHashMap<u32, Visibility>,
        children: FxHashMap<u32, Vec<u32>>,
        played: Vec<(u32, SegmentId, AnimationSegment)>,
    }

    impl ManualHost {
        fn with_elements(ids: &[u32]) -> Self {
            let mut host = Self::default();
            for &id in ids {
                host.visibility.insert(id, Visibility::Visible);
            }
            host
        }

        fn take_played(&mut self) -> Vec<(u32, SegmentId, AnimationSegment)> {
            std::mem::take(&mut self.played)
        }
    }

    impl ElementTree for ManualHost {
        type Element = u32;

        fn contains(&self, element: u32) -> bool {
            self.visibility.contains_key(&element)
        }

        fn position(&self, element: u32) -> Point {
            Point::new(element as f32 * 100.0, 0.0)
        }

        fn size(&self, _element: u32) -> Size {
            Size::new(40.0, 40.0)
        }

        fn visibility(&self, element: u32) -> Visibility {
            self.visibility.get(&element).copied().unwrap_or_default()
        }

        fn set_visibility(&mut self, element: u32, visibility: Visibility) {
            self.visibility.insert(element, visibility);
        }

        fn children(&self, element: u32) -> Option<Vec<u32>> {
            self.children.get(&element).cloned()
        }
    }

    impl AnimationHost for ManualHost {
        fn play(&mut self, element: u32, id: SegmentId, segment: &AnimationSegment) {
            self.played.push((element, id, *segment));
        }
    }

    fn counter() -> (Rc<Cell<u32>>, impl FnOnce() + 'static) {
        let count = Rc::new(Cell::new(0));
        let inner = Rc::clone(&count);
        (count, move || inner.set(inner.get() + 1))
    }

    #[test]
    fn test_origin_stage_advances_once_in_either_order() {
        for reversed in [false, true] {
            let mut host = ManualHost::with_elements(&[1, 2]);
            let mut choreographer = Choreographer::new();
            let id = reveal(1).from(2).start(&mut choreographer, &mut host).unwrap();

            let mut origin = host.take_played();
            assert_eq!(origin.len(), 2);
            if reversed {
                origin.reverse();
            }

            choreographer.segment_finished(&mut host, origin[0].1).unwrap();
            assert_eq!(
                choreographer.phase(id),
                Some(Phase::Reveal(RevealPhase::OriginTransitioning))
            );
            assert!(host.played.is_empty());

            choreographer.segment_finished(&mut host, origin[1].1).unwrap();
            assert_eq!(
                choreographer.phase(id),
                Some(Phase::Reveal(RevealPhase::TargetRevealing))
            );
            assert_eq!(host.visibility(2), Visibility::Invisible);

            let reveal = host.take_played();
            assert_eq!(reveal.len(), 1);
            assert!(matches!(reveal[0].2.kind(), SegmentKind::CircularReveal { .. }));
        }
    }

    #[test]
    fn test_target_shows_on_start() {
        let mut host = ManualHost::with_elements(&[1]);
        let mut choreographer = Choreographer::new();
        reveal(1).start(&mut choreographer, &mut host).unwrap();
        assert_eq!(host.visibility(1), Visibility::Invisible);

        let (_, sid, _) = host.take_played()[0];
        choreographer.segment_started(&mut host, sid).unwrap();
        assert_eq!(host.visibility(1), Visibility::Visible);
    }

    #[test]
    fn test_target_shows_on_finish_without_start() {
        let mut host = ManualHost::with_elements(&[1]);
        let mut choreographer = Choreographer::new();
        let (count, action) = counter();
        let id = reveal(1)
            .with_end_action(action)
            .start(&mut choreographer, &mut host)
            .unwrap();

        let (_, sid, _) = host.take_played()[0];
        choreographer.segment_finished(&mut host, sid).unwrap();
        assert_eq!(host.visibility(1), Visibility::Visible);
        assert_eq!(count.get(), 1);
        assert!(!choreographer.is_active(id));
    }

    #[test]
    fn test_stale_completion_is_rejected() {
        let mut host = ManualHost::with_elements(&[1]);
        let mut choreographer = Choreographer::new();
        let (count, action) = counter();
        reveal(1)
            .with_end_action(action)
            .start(&mut choreographer, &mut host)
            .unwrap();

        let (_, sid, _) = host.take_played()[0];
        choreographer.segment_finished(&mut host, sid).unwrap();
        assert_eq!(
            choreographer.segment_finished(&mut host, sid),
            Err(RevealError::UnknownSegment(sid))
        );
        assert_eq!(
            choreographer.segment_started(&mut host, sid),
            Err(RevealError::UnknownSegment(sid))
        );
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn test_unreveal_hides_target_on_finish() {
        let mut host = ManualHost::with_elements(&[1]);
        let mut choreographer = Choreographer::new();
        let id = unreveal(1).start(&mut choreographer, &mut host).unwrap();

        let (_, sid, segment) = host.take_played()[0];
        assert!(matches!(segment.kind(), SegmentKind::CircularUnreveal { .. }));

        choreographer.segment_started(&mut host, sid).unwrap();
        assert_eq!(host.visibility(1), Visibility::Visible);
        assert_eq!(
            choreographer.phase(id),
            Some(Phase::Unreveal(UnrevealPhase::TargetUnrevealing))
        );

        choreographer.segment_finished(&mut host, sid).unwrap();
        assert_eq!(host.visibility(1), Visibility::Invisible);
        assert_eq!(choreographer.phase(id), None);
    }

    #[test]
    fn test_restore_is_issued_with_unreveal() {
        let mut host = ManualHost::with_elements(&[1, 2]);
        host.set_visibility(2, Visibility::Invisible);
        let mut choreographer = Choreographer::new();
        let (count, action) = counter();
        let id = unreveal(1)
            .to(2)
            .with_end_action(action)
            .start(&mut choreographer, &mut host)
            .unwrap();

        let played = host.take_played();
        assert_eq!(played.len(), 3);
        assert_eq!(host.visibility(2), Visibility::Visible);

        // Restore beats the unreveal: the end action runs with the restore
        choreographer.segment_finished(&mut host, played[1].1).unwrap();
        assert_eq!(count.get(), 0);
        choreographer.segment_finished(&mut host, played[2].1).unwrap();
        assert_eq!(count.get(), 1);
        assert!(choreographer.is_active(id));
        assert_eq!(choreographer.pending_segments(), 1);

        choreographer.segment_finished(&mut host, played[0].1).unwrap();
        assert_eq!(count.get(), 1);
        assert_eq!(host.visibility(1), Visibility::Invisible);
        assert!(!choreographer.is_active(id));
        assert_eq!(choreographer.pending_segments(), 0);
    }

    #[test]
    fn test_abandon_drops_bookkeeping() {
        let mut host = ManualHost::with_elements(&[1, 2]);
        let mut choreographer = Choreographer::new();
        let (count, action) = counter();
        let id = reveal(1)
            .from(2)
            .with_end_action(action)
            .start(&mut choreographer, &mut host)
            .unwrap();
        assert_eq!(choreographer.pending_segments(), 2);

        assert!(choreographer.abandon(id));
        assert!(!choreographer.abandon(id));
        assert_eq!(choreographer.active_count(), 0);
        assert_eq!(choreographer.pending_segments(), 0);

        for (_, sid, _) in host.take_played() {
            assert!(choreographer.segment_finished(&mut host, sid).is_err());
        }
        assert_eq!(count.get(), 0);
    }

    #[test]
    fn test_transitions_are_independent() {
        let mut host = ManualHost::with_elements(&[1, 2]);
        let mut choreographer = Choreographer::new();
        let first = reveal(1).start(&mut choreographer, &mut host).unwrap();
        let second = reveal(2).start(&mut choreographer, &mut host).unwrap();
        assert_eq!(choreographer.active_count(), 2);

        let played = host.take_played();
        choreographer.segment_finished(&mut host, played[1].1).unwrap();
        assert!(choreographer.is_active(first));
        assert!(!choreographer.is_active(second));
    }
}
