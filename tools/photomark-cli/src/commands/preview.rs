//! Render one watermarked image at preview scale.
//!
//! Runs the exact compositing path export uses, only with a smaller scale
//! ratio, so what this command writes is what the export will look like.

use std::path::PathBuf;

use image::imageops;

use photomark_common::config::AppConfig;
use photomark_placement::PlacementState;
use photomark_render_engine::composite;
use photomark_render_engine::layer::load_base_image;

use super::watermark::{persist_last_used, resolve_config, WatermarkArgs};

pub fn run(
    app: &AppConfig,
    image: PathBuf,
    output: PathBuf,
    scale: Option<f64>,
    max_dim: Option<u32>,
    template: Option<&str>,
    watermark: &WatermarkArgs,
) -> anyhow::Result<()> {
    let cfg = resolve_config(app, template, watermark)?;
    let base = load_base_image(&image)?;

    let scale = match (scale, max_dim) {
        (Some(s), _) if s > 0.0 => s.min(1.0),
        (_, Some(dim)) if dim > 0 => {
            let fit_w = f64::from(dim) / f64::from(base.width());
            let fit_h = f64::from(dim) / f64::from(base.height());
            fit_w.min(fit_h).min(1.0)
        }
        _ => 1.0,
    };

    let scaled_base = if scale < 1.0 {
        let w = ((f64::from(base.width()) * scale).round() as u32).max(1);
        let h = ((f64::from(base.height()) * scale).round() as u32).max(1);
        imageops::resize(&base, w, h, imageops::FilterType::Lanczos3)
    } else {
        base
    };

    let mut state = PlacementState::new(cfg.placement);
    let preview = match composite(&scaled_base, &cfg, &mut state, scale) {
        Ok(preview) => preview,
        Err(e) => {
            // Preview errors degrade to the unmodified image.
            tracing::warn!("Preview render failed, showing unmodified image: {e}");
            scaled_base
        }
    };

    preview.save(&output)?;
    println!(
        "Preview written: {} ({}x{} at scale {:.3})",
        output.display(),
        preview.width(),
        preview.height(),
        scale
    );

    persist_last_used(app, &cfg);
    Ok(())
}
