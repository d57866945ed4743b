//! Reveal builder
//!
//! Fluent configuration for the forward transition: the origin (optional)
//! flies to the target and shrinks away, the target opens with a circular
//! wipe, then its visible leaves scale in one after another.
//!
//! ```ignore
//! use blinc_reveal::{reveal, Choreographer};
//!
//! reveal(panel)
//!     .from(fab)
//!     .with_curved_translation()
//!     .with_child_animation()
//!     .with_end_action(|| tracing::info!("panel open"))
//!     .start(&mut choreographer, &mut host)?;
//! ```

use std::fmt;
use std::hash::Hash;

use crate::choreographer::{Choreographer, TransitionId};
use crate::config::{fraction_of, RevealSettings};
use crate::curve::CurvePath;
use crate::easing::Easing;
use crate::error::Result;
use crate::geometry::{center_delta, covering_radius, Point, Rect, Scale, Size};
use crate::host::{ensure_attached, AnimationHost, ElementTree};
use crate::segment::{AnimationSegment, Pivot};
use crate::stagger::StaggerSequencer;
use crate::timeline::Timeline;

/// Callback run once when a transition completes
pub type EndAction = Box<dyn FnOnce()>;

/// Start configuring a reveal of `target`
pub fn reveal<E>(target: E) -> RevealBuilder<E> {
    RevealBuilder::new(target)
}

/// Builder for a reveal transition
pub struct RevealBuilder<E> {
    target: E,
    origin: Option<E>,
    settings: RevealSettings,
    end_action: Option<EndAction>,
}

impl<E> RevealBuilder<E> {
    pub fn new(target: E) -> Self {
        Self {
            target,
            origin: None,
            settings: RevealSettings::standard(),
            end_action: None,
        }
    }

    /// Fly `origin` to the target before revealing it
    pub fn from(mut self, origin: E) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Replace all timing settings at once
    pub fn with_settings(mut self, settings: RevealSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_translate_duration(mut self, ms: u32) -> Self {
        self.settings.translate_duration_ms = ms;
        self
    }

    pub fn with_reveal_duration(mut self, ms: u32) -> Self {
        self.settings.reveal_duration_ms = ms;
        self
    }

    /// Fraction of the translate after which the origin starts shrinking
    ///
    /// Clamped to `[0, 1]` when the transition starts. Default `0.8`.
    pub fn with_hide_origin_at(mut self, fraction: f32) -> Self {
        self.settings.hide_origin_at = fraction;
        self
    }

    /// Move the origin along a Bezier curve with the automatic elbow
    pub fn with_curved_translation(mut self) -> Self {
        self.settings.curved = true;
        self
    }

    /// Move the origin along a Bezier curve through `control` (offset space)
    pub fn with_curve_control(mut self, control: Point) -> Self {
        self.settings.curved = true;
        self.settings.curve_control = Some(control);
        self
    }

    /// Scale in the target's visible leaves after the reveal
    ///
    /// Ignored when the target is not a container.
    pub fn with_child_animation(mut self) -> Self {
        self.settings.child_stagger = true;
        self
    }

    pub fn with_child_animation_duration(mut self, ms: u32) -> Self {
        self.settings.child_duration_ms = ms;
        self
    }

    pub fn with_delay_between_children(mut self, ms: u32) -> Self {
        self.settings.child_delay_ms = ms;
        self
    }

    pub fn with_end_action<F>(mut self, action: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.end_action = Some(Box::new(action));
        self
    }

    /// Hold the end action until every child has finished scaling in
    pub fn with_end_action_after_children(mut self) -> Self {
        self.settings.end_after_children = true;
        self
    }

    pub fn settings(&self) -> &RevealSettings {
        &self.settings
    }
}

impl<E: Copy + Eq + Hash + fmt::Debug> RevealBuilder<E> {
    /// Validate against `tree` and freeze the configuration
    pub fn build<T: ElementTree<Element = E>>(self, tree: &T) -> Result<RevealConfig<E>> {
        ensure_attached(tree, self.target)?;
        if let Some(origin) = self.origin {
            ensure_attached(tree, origin)?;
        }

        let mut settings = self.settings.normalized()?;
        let has_children = tree
            .children(self.target)
            .is_some_and(|children| !children.is_empty());
        if settings.child_stagger && !has_children {
            tracing::debug!(
                "reveal: {:?} has no children, child animation disabled",
                self.target
            );
            settings.child_stagger = false;
        }

        Ok(RevealConfig {
            target: self.target,
            origin: self.origin,
            settings,
            end_action: self.end_action,
        })
    }

    /// Build and run the transition
    ///
    /// Returns as soon as the first stage has been issued; later stages run
    /// from the host's segment events.
    pub fn start<H>(self, choreographer: &mut Choreographer<E>, host: &mut H) -> Result<TransitionId>
    where
        H: AnimationHost<Element = E>,
    {
        let config = self.build(&*host)?;
        Ok(choreographer.begin_reveal(host, config))
    }
}

impl<E: fmt::Debug> fmt::Debug for RevealBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealBuilder")
            .field("target", &self.target)
            .field("origin", &self.origin)
            .field("settings", &self.settings)
            .field("end_action", &self.end_action.is_some())
            .finish()
    }
}

/// Frozen reveal configuration
///
/// Fractions are clamped and `child_stagger` reflects whether the target is a
/// container.
pub struct RevealConfig<E> {
    target: E,
    origin: Option<E>,
    settings: RevealSettings,
    end_action: Option<EndAction>,
}

impl<E: Copy> RevealConfig<E> {
    pub fn target(&self) -> E {
        self.target
    }

    pub fn origin(&self) -> Option<E> {
        self.origin
    }

    pub fn settings(&self) -> &RevealSettings {
        &self.settings
    }

    pub fn child_stagger(&self) -> bool {
        self.settings.child_stagger
    }

    pub fn path(&self) -> CurvePath {
        CurvePath::select(self.settings.curved, self.settings.curve_control)
    }

    pub fn stagger(&self) -> StaggerSequencer {
        self.settings.stagger()
    }

    /// Translate + shrink of the origin onto the target's center
    ///
    /// The shrink starts at `hide_origin_at` of the translate and runs for the
    /// remainder, so the origin arrives before it vanishes. Its pivot is the
    /// origin's center at the end of the translate.
    pub fn origin_timeline(&self, origin: Rect, origin_scale: Scale, target: Rect) -> Timeline {
        let delta = center_delta(origin, target);
        let duration = self.settings.translate_duration_ms;
        let hide_at = fraction_of(duration, self.settings.hide_origin_at);

        let translate = AnimationSegment::translate(self.path(), Point::ZERO, delta, duration)
            .with_easing(Easing::Accelerate);
        let shrink = AnimationSegment::scale(
            origin_scale,
            Scale::ZERO,
            Pivot::Absolute(delta + origin.size.center()),
            duration - hide_at,
        )
        .with_start_offset(hide_at)
        .with_easing(Easing::Accelerate);

        Timeline::new().with(translate).with(shrink)
    }

    /// Circular reveal covering the whole target
    pub fn reveal_segment(&self, target_size: Size) -> AnimationSegment {
        let center = target_size.center();
        let radius = covering_radius(target_size, center);
        AnimationSegment::circular_reveal(center, radius, self.settings.reveal_duration_ms)
            .with_easing(Easing::Decelerate)
    }

    pub(crate) fn take_end_action(&mut self) -> Option<EndAction> {
        self.end_action.take()
    }
}

impl<E: fmt::Debug> fmt::Debug for RevealConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RevealConfig")
            .field("target", &self.target)
            .field("origin", &self.origin)
            .field("settings", &self.settings)
            .field("end_action", &self.end_action.is_some())
            .finish()
    }
}
