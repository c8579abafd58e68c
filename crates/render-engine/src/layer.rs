//! Watermark layer construction.
//!
//! A layer is a standalone RGBA image: rendered text or a transformed copy
//! of a source image, already scaled, faded, and rotated. The compositor
//! only has to place it and blend it over the base photo.

use std::path::Path;

use image::{imageops, Rgba, RgbaImage};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use photomark_common::error::{PhotomarkError, PhotomarkResult};
use photomark_watermark_model::config::{ImageWatermark, TextWatermark};

use crate::text::{GlyphRenderer, MIN_FONT_PX};

/// Build the text watermark layer, or `None` when there is nothing to draw
/// (empty text, zero opacity, degenerate metrics).
pub fn build_text_layer(
    cfg: &TextWatermark,
    rotation_degrees: f32,
    scale: f64,
) -> PhotomarkResult<Option<RgbaImage>> {
    if cfg.content.is_empty() {
        return Ok(None);
    }

    let px = ((f64::from(cfg.font_size) * scale).round() as u32).max(MIN_FONT_PX);
    let renderer = GlyphRenderer::select(cfg, px);

    let Some(layer) = renderer.render(cfg) else {
        tracing::debug!("Text layer is empty, skipping watermark");
        return Ok(None);
    };

    // Bitmap glyphs stay blocky on purpose; smoothing them would only blur.
    let interpolation = if renderer.is_bitmap() {
        Interpolation::Nearest
    } else {
        Interpolation::Bilinear
    };
    Ok(Some(rotate_layer(&layer, rotation_degrees, interpolation)))
}

/// Build the image watermark layer, or `None` when no usable source is
/// configured. Decode failures are real errors for the caller to count.
pub fn build_image_layer(
    cfg: &ImageWatermark,
    rotation_degrees: f32,
    scale: f64,
) -> PhotomarkResult<Option<RgbaImage>> {
    let Some(source) = &cfg.source else {
        return Ok(None);
    };
    if !source.exists() {
        tracing::warn!(source = %source.display(), "Watermark image does not exist");
        return Ok(None);
    }

    let decoded = image::open(source)
        .map_err(|e| {
            PhotomarkError::load(format!("watermark image {}: {e}", source.display()))
        })?
        .to_rgba8();

    let factor = f64::from(cfg.scale_percent) / 100.0 * scale;
    let target_w = (f64::from(decoded.width()) * factor).round() as u32;
    let target_h = (f64::from(decoded.height()) * factor).round() as u32;
    if target_w == 0 || target_h == 0 {
        tracing::warn!(
            source = %source.display(),
            "Watermark scales to zero pixels, skipping"
        );
        return Ok(None);
    }

    let mut layer = if (target_w, target_h) == decoded.dimensions() {
        decoded
    } else {
        imageops::resize(&decoded, target_w, target_h, imageops::FilterType::Lanczos3)
    };

    // The user opacity multiplies into whatever transparency the source
    // already carries.
    let opacity = f32::from(cfg.opacity_percent.min(100)) / 100.0;
    if opacity < 1.0 {
        for pixel in layer.pixels_mut() {
            pixel[3] = (f32::from(pixel[3]) * opacity).round() as u8;
        }
    }

    Ok(Some(rotate_layer(
        &layer,
        rotation_degrees,
        Interpolation::Bilinear,
    )))
}

/// Rotate a layer clockwise about its center, expanding the canvas so the
/// rotated corners are never clipped.
pub(crate) fn rotate_layer(
    layer: &RgbaImage,
    degrees: f32,
    interpolation: Interpolation,
) -> RgbaImage {
    if degrees.rem_euclid(360.0) == 0.0 {
        return layer.clone();
    }

    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let (w, h) = (layer.width() as f32, layer.height() as f32);
    let new_w = (w * cos + h * sin).ceil() as u32;
    let new_h = (w * sin + h * cos).ceil() as u32;

    let mut expanded = RgbaImage::new(new_w.max(1), new_h.max(1));
    imageops::overlay(
        &mut expanded,
        layer,
        i64::from((new_w.saturating_sub(layer.width())) / 2),
        i64::from((new_h.saturating_sub(layer.height())) / 2),
    );

    rotate_about_center(&expanded, theta, interpolation, Rgba([0, 0, 0, 0]))
}

/// Load a base photo as RGBA at full resolution.
pub fn load_base_image(path: &Path) -> PhotomarkResult<RgbaImage> {
    if !path.exists() {
        return Err(PhotomarkError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(image::open(path)
        .map_err(|e| PhotomarkError::load(format!("{}: {e}", path.display())))?
        .to_rgba8())
}
