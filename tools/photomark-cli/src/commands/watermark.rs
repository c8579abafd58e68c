//! Shared watermark flags and config resolution.
//!
//! Export, preview, and template-save all accept the same flag group. The
//! effective configuration starts from a named template (or the last-used
//! record, or defaults) and each given flag overrides one field.

use std::path::PathBuf;

use anyhow::{anyhow, Context};
use clap::Args;

use photomark_common::config::AppConfig;
use photomark_watermark_model::config::{Rgb, WatermarkConfig, WatermarkKind};
use photomark_watermark_model::position::{Anchor, Placement};
use photomark_watermark_model::template::{LastUsed, TemplateStore};

#[derive(Args, Debug, Default)]
pub struct WatermarkArgs {
    /// Watermark kind: text or image
    #[arg(long)]
    pub kind: Option<String>,

    /// Watermark text
    #[arg(long)]
    pub text: Option<String>,

    /// Preferred font family stem or font file path
    #[arg(long)]
    pub font_family: Option<String>,

    /// Font size in pixels at full resolution
    #[arg(long)]
    pub font_size: Option<u32>,

    /// Prefer a bold face
    #[arg(long)]
    pub bold: bool,

    /// Prefer an italic face
    #[arg(long)]
    pub italic: bool,

    /// Text fill color as #RRGGBB
    #[arg(long)]
    pub color: Option<String>,

    /// Text opacity, 0-100
    #[arg(long)]
    pub opacity: Option<u8>,

    /// Draw a soft shadow behind the text
    #[arg(long)]
    pub shadow: bool,

    /// Draw a contrasting outline around the text
    #[arg(long)]
    pub outline: bool,

    /// Outline color as #RRGGBB
    #[arg(long)]
    pub outline_color: Option<String>,

    /// Watermark image file
    #[arg(long)]
    pub wm_image: Option<PathBuf>,

    /// Watermark image scale, percent
    #[arg(long)]
    pub wm_scale: Option<u32>,

    /// Watermark image opacity, 0-100
    #[arg(long)]
    pub wm_opacity: Option<u8>,

    /// Named anchor position (e.g. bottom_right, center)
    #[arg(long)]
    pub anchor: Option<String>,

    /// Horizontal margin from the anchor edge, full-resolution pixels
    #[arg(long)]
    pub margin_x: Option<f64>,

    /// Vertical margin from the anchor edge, full-resolution pixels
    #[arg(long)]
    pub margin_y: Option<f64>,

    /// Free-form position as X,Y in full-resolution pixels
    #[arg(long)]
    pub position: Option<String>,

    /// Rotation in degrees, clockwise
    #[arg(long)]
    pub rotation: Option<f32>,
}

impl WatermarkArgs {
    /// Override the given configuration with every flag that was set.
    pub fn apply_to(&self, cfg: &mut WatermarkConfig) -> anyhow::Result<()> {
        if let Some(kind) = &self.kind {
            cfg.kind = match kind.to_ascii_lowercase().as_str() {
                "text" => WatermarkKind::Text,
                "image" => WatermarkKind::Image,
                other => return Err(anyhow!("Unknown kind: {other}. Use: text, image")),
            };
        }

        if let Some(text) = &self.text {
            cfg.text.content = text.clone();
        }
        if let Some(family) = &self.font_family {
            cfg.text.font_family = Some(family.clone());
        }
        if let Some(size) = self.font_size {
            cfg.text.font_size = size;
        }
        if self.bold {
            cfg.text.bold = true;
        }
        if self.italic {
            cfg.text.italic = true;
        }
        if let Some(color) = &self.color {
            cfg.text.color = Rgb::from_hex(color).with_context(|| format!("--color {color}"))?;
        }
        if let Some(opacity) = self.opacity {
            cfg.text.opacity_percent = opacity.min(100);
        }
        if self.shadow {
            cfg.text.shadow = true;
        }
        if self.outline {
            cfg.text.outline = true;
        }
        if let Some(color) = &self.outline_color {
            cfg.text.outline_color =
                Rgb::from_hex(color).with_context(|| format!("--outline-color {color}"))?;
        }

        if let Some(path) = &self.wm_image {
            cfg.image.source = Some(path.clone());
        }
        if let Some(scale) = self.wm_scale {
            cfg.image.scale_percent = scale;
        }
        if let Some(opacity) = self.wm_opacity {
            cfg.image.opacity_percent = opacity.min(100);
        }

        if let Some(position) = &self.position {
            let (x, y) = parse_position(position)?;
            cfg.placement = Placement::Custom { x, y };
        } else if self.anchor.is_some() || self.margin_x.is_some() || self.margin_y.is_some() {
            let (current_anchor, current_mx, current_my) = match cfg.placement {
                Placement::Anchor {
                    anchor,
                    margin_x,
                    margin_y,
                } => (anchor, margin_x, margin_y),
                Placement::Custom { .. } => (Anchor::BottomRight, 50.0, 50.0),
            };
            cfg.placement = Placement::Anchor {
                anchor: self
                    .anchor
                    .as_deref()
                    .map(Anchor::parse)
                    .unwrap_or(current_anchor),
                margin_x: self.margin_x.unwrap_or(current_mx),
                margin_y: self.margin_y.unwrap_or(current_my),
            };
        }

        if let Some(rotation) = self.rotation {
            cfg.rotation_degrees = rotation;
        }

        Ok(())
    }
}

fn parse_position(value: &str) -> anyhow::Result<(f64, f64)> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| anyhow!("--position expects X,Y, got: {value}"))?;
    Ok((
        x.trim().parse().with_context(|| format!("--position x: {x}"))?,
        y.trim().parse().with_context(|| format!("--position y: {y}"))?,
    ))
}

/// Build the effective configuration: template (or last-used, or defaults)
/// plus flag overrides.
pub fn resolve_config(
    app: &AppConfig,
    template: Option<&str>,
    args: &WatermarkArgs,
) -> anyhow::Result<WatermarkConfig> {
    let mut cfg = match template {
        Some(name) => {
            let store = TemplateStore::load(&app.templates_path());
            store
                .get(name)
                .cloned()
                .ok_or_else(|| anyhow!("Unknown template: {name}"))?
        }
        None => LastUsed::load(&app.last_used_path())
            .map(|record| record.config)
            .unwrap_or_default(),
    };
    args.apply_to(&mut cfg)?;
    Ok(cfg)
}

/// Persist the effective configuration as the new last-used record.
/// Failure here is a diagnostic, never fatal.
pub fn persist_last_used(app: &AppConfig, cfg: &WatermarkConfig) {
    if let Err(e) = LastUsed::now(cfg.clone()).save(&app.last_used_path()) {
        tracing::warn!("Failed to save last-used config: {e}");
    }
}
