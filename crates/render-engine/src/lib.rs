//! Photomark Render Engine
//!
//! Builds a standalone watermark layer (rendered text or a transformed
//! source image), composites it over a base photo at a resolved position,
//! and drives batch export.
//!
//! # Pipeline Architecture
//!
//! ```text
//! photo.jpg ──────────────┐
//!                         ├── Layer Build (text render / image transform)
//! WatermarkConfig ────────┘         │
//!                                   ├── Rotate (canvas-expanding)
//!                                   │
//!                                   ├── Resolve Position (placement crate)
//!                                   │
//!                                   ├── Alpha Composite ("over")
//!                                   ▼
//!                            Encode (PNG / JPEG)
//! ```
//!
//! Preview and export run the identical path; only the scale ratio differs.

pub mod compositor;
pub mod export;
pub mod font8x8;
pub mod layer;
pub mod text;

pub use compositor::composite;
pub use export::*;
