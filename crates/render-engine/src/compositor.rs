//! Watermark compositing.
//!
//! One entry point serves preview and export alike: the caller passes the
//! base photo, the configuration, the mutable placement state, and the
//! render scale. The base is never mutated; the result is always a new
//! RGBA image of the same dimensions.

use image::{imageops, RgbaImage};

use photomark_common::error::PhotomarkResult;
use photomark_placement::{CanvasGeometry, PlacementState};
use photomark_watermark_model::config::{WatermarkConfig, WatermarkKind};

use crate::layer::{build_image_layer, build_text_layer};

/// Composite the configured watermark over `base` at the given render scale
/// (1.0 for export, below 1.0 for previews).
///
/// Configurations with nothing to draw (empty text, missing watermark
/// source, zero opacity) return an untouched copy of the base — never an
/// error. Resolving the placement updates `state` as documented on
/// [`PlacementState::resolve`].
pub fn composite(
    base: &RgbaImage,
    cfg: &WatermarkConfig,
    state: &mut PlacementState,
    scale: f64,
) -> PhotomarkResult<RgbaImage> {
    let mut out = base.clone();

    let layer = match cfg.kind {
        WatermarkKind::Text => build_text_layer(&cfg.text, cfg.rotation_degrees, scale)?,
        WatermarkKind::Image => build_image_layer(&cfg.image, cfg.rotation_degrees, scale)?,
    };
    let Some(layer) = layer else {
        return Ok(out);
    };

    let geom = CanvasGeometry::new(
        base.width(),
        base.height(),
        layer.width(),
        layer.height(),
        scale,
    );
    let (x, y) = state.resolve(geom);
    tracing::debug!(
        kind = ?cfg.kind,
        x,
        y,
        layer_w = layer.width(),
        layer_h = layer.height(),
        scale,
        "Compositing watermark"
    );

    imageops::overlay(&mut out, &layer, x, y);
    Ok(out)
}
