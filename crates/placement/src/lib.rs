//! Photomark Placement — The Position Resolver
//!
//! Maps a named anchor or free-form offset, plus watermark and canvas
//! dimensions, to a top-left pixel coordinate, translating between preview
//! scale and full resolution so the same configuration lands on the same
//! real-world spot in every render.
//!
//! This crate is pure computation — no I/O, no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod resolver;

pub use resolver::{CanvasGeometry, PlacementState};
