//! blinc_reveal - Reveal / unreveal transition choreography
//!
//! Sequences the "fly in, wipe open, pop children" motion pattern over a UI
//! host that exposes its elements through [`ElementTree`] and plays segments
//! through [`AnimationHost`]. This crate decides *what* plays *when*; the host
//! does the drawing.
//!
//! # Quick Start
//!
//! ```ignore
//! use blinc_reveal::{reveal, unreveal, Choreographer};
//!
//! let mut choreographer = Choreographer::new();
//!
//! // FAB flies to the panel's center, the panel opens, its items pop in
//! reveal(panel)
//!     .from(fab)
//!     .with_curved_translation()
//!     .with_child_animation()
//!     .start(&mut choreographer, &mut host)?;
//!
//! // ... later: close the panel and bring the FAB back
//! unreveal(panel).to(fab).start(&mut choreographer, &mut host)?;
//!
//! // From the host's animation loop
//! choreographer.segment_finished(&mut host, segment_id)?;
//! ```
//!
//! [`sim::SimHost`] is a headless host with a virtual clock for tests and
//! tooling.

pub mod choreographer;
pub mod config;
pub mod curve;
pub mod discovery;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod host;
pub mod machine;
pub mod reveal;
pub mod segment;
pub mod sim;
pub mod stagger;
pub mod timeline;
pub mod unreveal;

pub use choreographer::{Choreographer, SegmentId, TransitionId};
pub use config::{RevealSettings, UnrevealSettings};
pub use curve::CurvePath;
pub use discovery::collect_visible;
pub use easing::Easing;
pub use error::{Result, RevealError};
pub use geometry::{center_delta, covering_radius, Point, Rect, Scale, Size};
pub use host::{AnimationHost, ElementTree, Visibility};
pub use machine::{Phase, RevealPhase, UnrevealPhase};
pub use reveal::{reveal, EndAction, RevealBuilder, RevealConfig};
pub use segment::{AnimationSegment, Pivot, SegmentKind, SegmentValue};
pub use stagger::StaggerSequencer;
pub use timeline::{CompletionLatch, Timeline};
pub use unreveal::{unreveal, UnrevealBuilder, UnrevealConfig};
