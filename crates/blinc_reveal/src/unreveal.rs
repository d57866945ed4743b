//! Unreveal builder
//!
//! Reverse transition: the target closes with a circular wipe and, when a
//! restore element is configured, that element grows back in and travels
//! from the target's center to its own resting place. The restore is issued
//! together with the unreveal and overlaps its last tenth.

use std::fmt;
use std::hash::Hash;

use crate::choreographer::{Choreographer, TransitionId};
use crate::config::{fraction_of, percent_of, UnrevealSettings};
use crate::curve::CurvePath;
use crate::easing::Easing;
use crate::error::Result;
use crate::geometry::{center_delta, covering_radius, Point, Rect, Scale, Size};
use crate::host::{ensure_attached, AnimationHost, ElementTree};
use crate::reveal::EndAction;
use crate::segment::{AnimationSegment, Pivot};
use crate::timeline::Timeline;

/// Restore timeline start, in percent of the unreveal duration
const RESTORE_START_PERCENT: u32 = 90;
/// Restore translate start inside its timeline, in percent of the translate
const RESTORE_TRANSLATE_PERCENT: u32 = 10;

/// Start configuring an unreveal of `target`
pub fn unreveal<E>(target: E) -> UnrevealBuilder<E> {
    UnrevealBuilder::new(target)
}

/// Builder for an unreveal transition
pub struct UnrevealBuilder<E> {
    target: E,
    restore: Option<E>,
    settings: UnrevealSettings,
    end_action: Option<EndAction>,
}

impl<E> UnrevealBuilder<E> {
    pub fn new(target: E) -> Self {
        Self {
            target,
            restore: None,
            settings: UnrevealSettings::standard(),
            end_action: None,
        }
    }

    /// Bring `restore` back in from the target's center
    pub fn to(mut self, restore: E) -> Self {
        self.restore = Some(restore);
        self
    }

    pub fn with_settings(mut self, settings: UnrevealSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_unreveal_duration(mut self, ms: u32) -> Self {
        self.settings.unreveal_duration_ms = ms;
        self
    }

    pub fn with_translate_duration(mut self, ms: u32) -> Self {
        self.settings.translate_duration_ms = ms;
        self
    }

    pub fn with_curved_translation(mut self) -> Self {
        self.settings.curved = true;
        self
    }

    pub fn with_curve_control(mut self, control: Point) -> Self {
        self.settings.curved = true;
        self.settings.curve_control = Some(control);
        self
    }

    /// Restore grow duration as a fraction of the translate duration
    pub fn with_show_restore_fraction(mut self, fraction: f32) -> Self {
        self.settings.show_restore_fraction = fraction;
        self
    }

    pub fn with_end_action<F>(mut self, action: F) -> Self
    where
        F: FnOnce() + 'static,
    {
        self.end_action = Some(Box::new(action));
        self
    }

    pub fn settings(&self) -> &UnrevealSettings {
        &self.settings
    }
}

impl<E: Copy + Eq + Hash + fmt::Debug> UnrevealBuilder<E> {
    pub fn build<T: ElementTree<Element = E>>(self, tree: &T) -> Result<UnrevealConfig<E>> {
        ensure_attached(tree, self.target)?;
        if let Some(restore) = self.restore {
            ensure_attached(tree, restore)?;
        }

        Ok(UnrevealConfig {
            target: self.target,
            restore: self.restore,
            settings: self.settings.normalized()?,
            end_action: self.end_action,
        })
    }

    /// Build and run the transition
    pub fn start<H>(self, choreographer: &mut Choreographer<E>, host: &mut H) -> Result<TransitionId>
    where
        H: AnimationHost<Element = E>,
    {
        let config = self.build(&*host)?;
        Ok(choreographer.begin_unreveal(host, config))
    }
}

impl<E: fmt::Debug> fmt::Debug for UnrevealBuilder<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnrevealBuilder")
            .field("target", &self.target)
            .field("restore", &self.restore)
            .field("settings", &self.settings)
            .field("end_action", &self.end_action.is_some())
            .finish()
    }
}

/// Frozen unreveal configuration
pub struct UnrevealConfig<E> {
    target: E,
    restore: Option<E>,
    settings: UnrevealSettings,
    end_action: Option<EndAction>,
}

impl<E: Copy> UnrevealConfig<E> {
    pub fn target(&self) -> E {
        self.target
    }

    pub fn restore(&self) -> Option<E> {
        self.restore
    }

    pub fn settings(&self) -> &UnrevealSettings {
        &self.settings
    }

    pub fn path(&self) -> CurvePath {
        CurvePath::select(self.settings.curved, self.settings.curve_control)
    }

    /// Circular unreveal closing over the whole target
    pub fn unreveal_segment(&self, target_size: Size) -> AnimationSegment {
        let center = target_size.center();
        let radius = covering_radius(target_size, center);
        AnimationSegment::circular_unreveal(center, radius, self.settings.unreveal_duration_ms)
            .with_easing(Easing::AccelerateDecelerate)
    }

    /// Grow + translate of the restore element back from the target's center
    ///
    /// The whole group starts at 90% of the unreveal, whatever the translate
    /// duration is.
    pub fn restore_timeline(&self, restore: Rect, natural: Scale, target: Rect) -> Timeline {
        let delta = center_delta(restore, target);
        let translate_ms = self.settings.translate_duration_ms;

        let grow = AnimationSegment::scale(
            Scale::ZERO,
            natural,
            Pivot::CENTER,
            fraction_of(translate_ms, self.settings.show_restore_fraction),
        )
        .with_easing(Easing::Bounce);
        let translate = AnimationSegment::translate(self.path(), delta, Point::ZERO, translate_ms)
            .with_start_offset(percent_of(translate_ms, RESTORE_TRANSLATE_PERCENT))
            .with_easing(Easing::Decelerate);

        Timeline::new()
            .with_start_offset(percent_of(
                self.settings.unreveal_duration_ms,
                RESTORE_START_PERCENT,
            ))
            .with(grow)
            .with(translate)
    }

    pub(crate) fn take_end_action(&mut self) -> Option<EndAction> {
        self.end_action.take()
    }
}

impl<E: fmt::Debug> fmt::Debug for UnrevealConfig<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnrevealConfig")
            .field("target", &self.target)
            .field("restore", &self.restore)
            .field("settings", &self.settings)
            .field("end_action", &self.end_action.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segment::SegmentKind;
    use crate::sim::{ElementId, SimHost};

    fn scene() -> (SimHost, ElementId, ElementId) {
        let mut host = SimHost::new();
        let target = host.add_container("panel", Rect::new(0.0, 0.0, 200.0, 100.0));
        let fab = host.add_element("fab", Rect::new(300.0, 400.0, 50.0, 50.0));
        (host, target, fab)
    }

    #[test]
    fn test_restore_offset_ignores_translate_duration() {
        let (host, target, fab) = scene();
        for translate in [0, 100, 250, 1_000] {
            let config = unreveal(target)
                .to(fab)
                .with_unreveal_duration(250)
                .with_translate_duration(translate)
                .build(&host)
                .unwrap();
            let timeline =
                config.restore_timeline(host.bounds(fab), Scale::IDENTITY, host.bounds(target));
            assert_eq!(timeline.start_offset_ms(), 225, "translate {translate}");
        }
    }

    #[test]
    fn test_restore_segments() {
        let (host, target, fab) = scene();
        let config = unreveal(target).to(fab).build(&host).unwrap();
        let timeline =
            config.restore_timeline(host.bounds(fab), Scale::IDENTITY, host.bounds(target));

        let [grow, translate] = timeline.segments() else {
            panic!("expected two segments");
        };
        assert_eq!(grow.start_offset_ms(), 0);
        assert_eq!(grow.duration_ms(), 50);
        assert_eq!(grow.easing(), Easing::Bounce);

        assert_eq!(translate.start_offset_ms(), 25);
        assert_eq!(translate.duration_ms(), 250);
        assert_eq!(translate.easing(), Easing::Decelerate);
        assert_eq!(
            *translate.kind(),
            SegmentKind::Translate {
                path: CurvePath::Linear,
                from: Point::new(-225.0, -375.0),
                to: Point::ZERO,
            }
        );

        let offsets: Vec<u32> = timeline.scheduled().map(|s| s.start_offset_ms()).collect();
        assert_eq!(offsets, vec![225, 250]);
    }

    #[test]
    fn test_unreveal_segment() {
        let (host, target, _) = scene();
        let config = unreveal(target).build(&host).unwrap();
        let segment = config.unreveal_segment(host.size(target));

        assert_eq!(segment.easing(), Easing::AccelerateDecelerate);
        assert!(matches!(
            *segment.kind(),
            SegmentKind::CircularUnreveal { radius, .. } if (radius - 111.803).abs() < 0.01
        ));
    }

    #[test]
    fn test_show_fraction_is_clamped() {
        let (host, target, fab) = scene();
        let config = unreveal(target)
            .to(fab)
            .with_show_restore_fraction(4.0)
            .build(&host)
            .unwrap();
        assert_eq!(config.settings().show_restore_fraction, 1.0);

        let timeline =
            config.restore_timeline(host.bounds(fab), Scale::IDENTITY, host.bounds(target));
        assert_eq!(timeline.segments()[0].duration_ms(), 250);
    }

    #[test]
    fn test_curved_restore_uses_reverse_elbow() {
        let (host, target, fab) = scene();
        let config = unreveal(target)
            .to(fab)
            .with_curved_translation()
            .build(&host)
            .unwrap();
        let timeline =
            config.restore_timeline(host.bounds(fab), Scale::IDENTITY, host.bounds(target));

        match *timeline.segments()[1].kind() {
            SegmentKind::Translate { path, from, to } => {
                assert_eq!(path, CurvePath::bezier());
                assert_eq!(path.control_point(from, to), Some(Point::new(-225.0, 0.0)));
            }
            other => panic!("unexpected kind {other:?}"),
        }
    }
}
