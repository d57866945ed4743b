//! Transition state machines
//!
//! Each transition is driven by a small state machine that consumes
//! [`StageEvent`]s ("this stage's segments have all finished") and returns the
//! [`Action`]s to perform next. The machines are pure: the
//! [`Choreographer`](crate::Choreographer) executes actions against the host.
//!
//! ```text
//! Reveal:   Idle ─Start─▶ OriginTransitioning ─OriginFinished─▶ TargetRevealing
//!           Idle ─Start─▶ TargetRevealing                        (no origin)
//!           TargetRevealing ─TargetFinished─▶ ChildStaggering ─ChildrenFinished─▶ Done
//!           TargetRevealing ─TargetFinished─▶ Done               (no children)
//!
//! Unreveal: Idle ─Start─▶ TargetUnrevealing ─TargetFinished─▶ OriginRestoring ─RestoreFinished─▶ Done
//!           TargetUnrevealing ─TargetFinished─▶ Done             (no restore, or restore already done)
//! ```
//!
//! In the reveal machine the end action fires on the `TargetFinished` edge by
//! default, while children are still animating. With `end_after_children` it
//! moves to the `ChildrenFinished` edge instead.
//!
//! With a restore element the unreveal end action belongs to the restore
//! timeline: it fires on `RestoreFinished` even if the target is still
//! unrevealing, and the machine stays alive until the target reports too.

use smallvec::SmallVec;

/// Event fed into a transition machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEvent {
    /// `start()` was called
    Start,
    /// Origin translate + shrink timeline finished
    OriginFinished,
    /// Circular reveal or unreveal on the target finished
    TargetFinished,
    /// Restore grow + translate timeline finished
    RestoreFinished,
    /// Every staggered child finished
    ChildrenFinished,
}

/// Side effect requested by a transition machine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Set the target invisible
    HideTarget,
    /// Set every snapshotted child invisible
    HideChildren,
    /// Play the origin translate + shrink timeline
    PlayOrigin,
    /// Set the origin invisible
    HideOrigin,
    /// Play the circular reveal on the target
    PlayReveal,
    /// Issue the staggered child scale-ins
    RunStagger,
    /// Play the circular unreveal on the target
    PlayUnreveal,
    /// Show the restore element and play its grow + translate timeline
    PlayRestore,
    /// Invoke the end action
    FireEndAction,
}

/// Actions produced by one event
pub type Actions = SmallVec<[Action; 4]>;

/// Reveal machine states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    Idle,
    OriginTransitioning,
    TargetRevealing,
    ChildStaggering,
    Done,
}

/// Unreveal machine states
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnrevealPhase {
    Idle,
    TargetUnrevealing,
    OriginRestoring,
    Done,
}

/// State of either kind of transition
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Reveal(RevealPhase),
    Unreveal(UnrevealPhase),
}

impl Phase {
    pub fn is_done(self) -> bool {
        matches!(
            self,
            Phase::Reveal(RevealPhase::Done) | Phase::Unreveal(UnrevealPhase::Done)
        )
    }
}

/// Forward transition machine
#[derive(Clone, Debug)]
pub struct RevealMachine {
    phase: RevealPhase,
    has_origin: bool,
    child_count: usize,
    end_after_children: bool,
}

impl RevealMachine {
    pub fn new(has_origin: bool, child_count: usize, end_after_children: bool) -> Self {
        Self {
            phase: RevealPhase::Idle,
            has_origin,
            child_count,
            end_after_children,
        }
    }

    pub fn phase(&self) -> RevealPhase {
        self.phase
    }

    pub fn handle(&mut self, event: StageEvent) -> Actions {
        let mut actions = Actions::new();

        match (self.phase, event) {
            (RevealPhase::Idle, StageEvent::Start) => {
                actions.push(Action::HideTarget);
                if self.child_count > 0 {
                    actions.push(Action::HideChildren);
                }
                if self.has_origin {
                    actions.push(Action::PlayOrigin);
                    self.phase = RevealPhase::OriginTransitioning;
                } else {
                    actions.push(Action::PlayReveal);
                    self.phase = RevealPhase::TargetRevealing;
                }
            }
            (RevealPhase::OriginTransitioning, StageEvent::OriginFinished) => {
                actions.push(Action::HideOrigin);
                actions.push(Action::PlayReveal);
                self.phase = RevealPhase::TargetRevealing;
            }
            (RevealPhase::TargetRevealing, StageEvent::TargetFinished) => {
                if self.child_count == 0 {
                    actions.push(Action::FireEndAction);
                    self.phase = RevealPhase::Done;
                } else {
                    actions.push(Action::RunStagger);
                    if !self.end_after_children {
                        actions.push(Action::FireEndAction);
                    }
                    self.phase = RevealPhase::ChildStaggering;
                }
            }
            (RevealPhase::ChildStaggering, StageEvent::ChildrenFinished) => {
                if self.end_after_children {
                    actions.push(Action::FireEndAction);
                }
                self.phase = RevealPhase::Done;
            }
            (phase, event) => {
                tracing::warn!("reveal: ignoring {:?} in {:?}", event, phase);
            }
        }

        actions
    }
}

/// Reverse transition machine
#[derive(Clone, Debug)]
pub struct UnrevealMachine {
    phase: UnrevealPhase,
    has_restore: bool,
    restore_finished: bool,
}

impl UnrevealMachine {
    pub fn new(has_restore: bool) -> Self {
        Self {
            phase: UnrevealPhase::Idle,
            has_restore,
            restore_finished: false,
        }
    }

    pub fn phase(&self) -> UnrevealPhase {
        self.phase
    }

    pub fn handle(&mut self, event: StageEvent) -> Actions {
        let mut actions = Actions::new();

        match (self.phase, event) {
            (UnrevealPhase::Idle, StageEvent::Start) => {
                actions.push(Action::PlayUnreveal);
                if self.has_restore {
                    actions.push(Action::PlayRestore);
                }
                self.phase = UnrevealPhase::TargetUnrevealing;
            }
            (UnrevealPhase::TargetUnrevealing, StageEvent::TargetFinished) => {
                if !self.has_restore {
                    actions.push(Action::FireEndAction);
                    self.phase = UnrevealPhase::Done;
                } else if self.restore_finished {
                    self.phase = UnrevealPhase::Done;
                } else {
                    self.phase = UnrevealPhase::OriginRestoring;
                }
            }
            // Long unreveal, short translate: the restore ends first
            (UnrevealPhase::TargetUnrevealing, StageEvent::RestoreFinished)
                if self.has_restore && !self.restore_finished =>
            {
                actions.push(Action::FireEndAction);
                self.restore_finished = true;
            }
            (UnrevealPhase::OriginRestoring, StageEvent::RestoreFinished) => {
                actions.push(Action::FireEndAction);
                self.phase = UnrevealPhase::Done;
            }
            (phase, event) => {
                tracing::warn!("unreveal: ignoring {:?} in {:?}", event, phase);
            }
        }

        actions
    }
}

/// Either machine behind one interface
#[derive(Clone, Debug)]
pub(crate) enum Machine {
    Reveal(RevealMachine),
    Unreveal(UnrevealMachine),
}

impl Machine {
    pub(crate) fn phase(&self) -> Phase {
        match self {
            Machine::Reveal(m) => Phase::Reveal(m.phase()),
            Machine::Unreveal(m) => Phase::Unreveal(m.phase()),
        }
    }

    pub(crate) fn handle(&mut self, event: StageEvent) -> Actions {
        match self {
            Machine::Reveal(m) => m.handle(event),
            Machine::Unreveal(m) => m.handle(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(machine: &mut RevealMachine, events: &[StageEvent]) -> Vec<Action> {
        events.iter().flat_map(|&e| machine.handle(e)).collect()
    }

    #[test]
    fn test_reveal_full_path() {
        let mut m = RevealMachine::new(true, 3, false);
        assert_eq!(
            m.handle(StageEvent::Start).as_slice(),
            &[Action::HideTarget, Action::HideChildren, Action::PlayOrigin]
        );
        assert_eq!(m.phase(), RevealPhase::OriginTransitioning);

        assert_eq!(
            m.handle(StageEvent::OriginFinished).as_slice(),
            &[Action::HideOrigin, Action::PlayReveal]
        );
        assert_eq!(m.phase(), RevealPhase::TargetRevealing);

        // End action does not wait for the children
        assert_eq!(
            m.handle(StageEvent::TargetFinished).as_slice(),
            &[Action::RunStagger, Action::FireEndAction]
        );
        assert_eq!(m.phase(), RevealPhase::ChildStaggering);

        assert!(m.handle(StageEvent::ChildrenFinished).is_empty());
        assert_eq!(m.phase(), RevealPhase::Done);
    }

    #[test]
    fn test_reveal_without_origin_goes_straight_to_target() {
        let mut m = RevealMachine::new(false, 0, false);
        assert_eq!(
            m.handle(StageEvent::Start).as_slice(),
            &[Action::HideTarget, Action::PlayReveal]
        );
        assert_eq!(
            m.handle(StageEvent::TargetFinished).as_slice(),
            &[Action::FireEndAction]
        );
        assert_eq!(m.phase(), RevealPhase::Done);
    }

    #[test]
    fn test_reveal_end_after_children() {
        let mut m = RevealMachine::new(false, 2, true);
        m.handle(StageEvent::Start);
        assert_eq!(
            m.handle(StageEvent::TargetFinished).as_slice(),
            &[Action::RunStagger]
        );
        assert_eq!(
            m.handle(StageEvent::ChildrenFinished).as_slice(),
            &[Action::FireEndAction]
        );
    }

    #[test]
    fn test_reveal_fires_end_action_once() {
        for children in [0, 1, 5] {
            for wait in [false, true] {
                let mut m = RevealMachine::new(true, children, wait);
                let actions = run(
                    &mut m,
                    &[
                        StageEvent::Start,
                        StageEvent::OriginFinished,
                        StageEvent::TargetFinished,
                        StageEvent::ChildrenFinished,
                        StageEvent::TargetFinished,
                    ],
                );
                let fired = actions
                    .iter()
                    .filter(|&&a| a == Action::FireEndAction)
                    .count();
                assert_eq!(fired, 1, "children={children} wait={wait}");
                assert_eq!(m.phase(), RevealPhase::Done);
            }
        }
    }

    #[test]
    fn test_reveal_ignores_out_of_order_events() {
        let mut m = RevealMachine::new(true, 0, false);
        assert!(m.handle(StageEvent::TargetFinished).is_empty());
        assert_eq!(m.phase(), RevealPhase::Idle);

        m.handle(StageEvent::Start);
        assert!(m.handle(StageEvent::Start).is_empty());
        assert!(m.handle(StageEvent::TargetFinished).is_empty());
        assert_eq!(m.phase(), RevealPhase::OriginTransitioning);
    }

    #[test]
    fn test_unreveal_without_restore() {
        let mut m = UnrevealMachine::new(false);
        assert_eq!(
            m.handle(StageEvent::Start).as_slice(),
            &[Action::PlayUnreveal]
        );
        assert_eq!(
            m.handle(StageEvent::TargetFinished).as_slice(),
            &[Action::FireEndAction]
        );
        assert_eq!(m.phase(), UnrevealPhase::Done);
    }

    #[test]
    fn test_unreveal_with_restore() {
        let mut m = UnrevealMachine::new(true);
        assert_eq!(
            m.handle(StageEvent::Start).as_slice(),
            &[Action::PlayUnreveal, Action::PlayRestore]
        );
        // Target first: the end action still waits for the restore
        assert!(m.handle(StageEvent::TargetFinished).is_empty());
        assert_eq!(m.phase(), UnrevealPhase::OriginRestoring);
        assert_eq!(
            m.handle(StageEvent::RestoreFinished).as_slice(),
            &[Action::FireEndAction]
        );
        assert_eq!(m.phase(), UnrevealPhase::Done);
    }

    #[test]
    fn test_unreveal_end_action_follows_restore_finishing_first() {
        let mut m = UnrevealMachine::new(true);
        m.handle(StageEvent::Start);
        assert_eq!(
            m.handle(StageEvent::RestoreFinished).as_slice(),
            &[Action::FireEndAction]
        );
        assert_eq!(m.phase(), UnrevealPhase::TargetUnrevealing);

        // Target completion only closes the transition
        assert!(m.handle(StageEvent::TargetFinished).is_empty());
        assert_eq!(m.phase(), UnrevealPhase::Done);
    }

    #[test]
    fn test_unreveal_restore_repeat_is_ignored() {
        let mut m = UnrevealMachine::new(true);
        m.handle(StageEvent::Start);
        m.handle(StageEvent::RestoreFinished);
        assert!(m.handle(StageEvent::RestoreFinished).is_empty());
        assert_eq!(m.phase(), UnrevealPhase::TargetUnrevealing);
    }

    #[test]
    fn test_phase_is_done() {
        assert!(Phase::Reveal(RevealPhase::Done).is_done());
        assert!(Phase::Unreveal(UnrevealPhase::Done).is_done());
        assert!(!Phase::Reveal(RevealPhase::ChildStaggering).is_done());
    }
}
