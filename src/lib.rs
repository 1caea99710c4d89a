//! timeline-layout: layout engine for timeline editors.
//!
//! The crate converts between millisecond time values and horizontal pixel
//! positions (linearly, or folded onto a single leap-year template in cyclic
//! view) and packs overlapping intervals into the fewest practical rows with
//! fast point-to-interval hit testing. Rendering is left to the host.

pub mod api;
pub mod core;
pub mod error;
pub mod telemetry;

pub use api::{LayoutSnapshot, TimelineLayout, TimelineLayoutConfig};
pub use error::{LayoutError, LayoutResult};
