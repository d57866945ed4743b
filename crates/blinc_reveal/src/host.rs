//! Host integration traits
//!
//! The choreography never owns elements or plays animations itself. A host UI
//! layer implements [`ElementTree`] to expose geometry and visibility, and
//! [`AnimationHost`] to play segments.
//!
//! # Event contract
//!
//! For every segment passed to [`AnimationHost::play`] the host must, on its
//! UI thread:
//!
//! 1. call [`Choreographer::segment_started`] once the start offset has
//!    elapsed (optional, but circular reveals only become visible on start
//!    if it is reported),
//! 2. call [`Choreographer::segment_finished`] exactly once when it ends.
//!
//! Neither call may be made from inside `play` itself; queue them for the
//! next turn of the host's event loop.
//!
//! [`Choreographer::segment_started`]: crate::Choreographer::segment_started
//! [`Choreographer::segment_finished`]: crate::Choreographer::segment_finished

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;

use crate::choreographer::SegmentId;
use crate::error::{Result, RevealError};
use crate::geometry::{Point, Rect, Scale, Size};
use crate::segment::AnimationSegment;

/// Visibility of an element
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    /// Not drawn, but still laid out
    Invisible,
}

impl Visibility {
    pub fn is_visible(self) -> bool {
        self == Visibility::Visible
    }
}

/// Read geometry and toggle visibility of host elements
pub trait ElementTree {
    /// Handle identifying one element
    type Element: Copy + Eq + Hash + Debug;

    /// Whether `element` is currently attached to this tree
    fn contains(&self, _element: Self::Element) -> bool {
        true
    }

    /// Top-left corner in shared screen coordinates
    fn position(&self, element: Self::Element) -> Point;

    /// Measured size
    fn size(&self, element: Self::Element) -> Size;

    /// Current scale factor
    fn scale(&self, _element: Self::Element) -> Scale {
        Scale::IDENTITY
    }

    fn visibility(&self, element: Self::Element) -> Visibility;

    fn set_visibility(&mut self, element: Self::Element, visibility: Visibility);

    /// Ordered children, or `None` if `element` is not a container
    fn children(&self, element: Self::Element) -> Option<Vec<Self::Element>>;

    /// Screen-space bounds
    fn bounds(&self, element: Self::Element) -> Rect {
        Rect::from_origin_size(self.position(element), self.size(element))
    }
}

/// Play animation segments
pub trait AnimationHost: ElementTree {
    /// Start playing `segment` on `element`
    ///
    /// `id` must be reported back through the choreographer as described in
    /// the [module docs](self).
    fn play(&mut self, element: Self::Element, id: SegmentId, segment: &AnimationSegment);
}

/// Fail with [`RevealError::UnknownElement`] unless `element` is attached
pub(crate) fn ensure_attached<T: ElementTree + ?Sized>(tree: &T, element: T::Element) -> Result<()> {
    if tree.contains(element) {
        Ok(())
    } else {
        Err(RevealError::UnknownElement(format!("{element:?}")))
    }
}
