//! Batch export driver.
//!
//! Iterates the job list strictly sequentially: load at full resolution,
//! composite with scale 1.0, encode to the chosen format under the chosen
//! filename rule. Individual failures are logged and tallied; the batch
//! always runs to completion.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use image::{codecs::jpeg::JpegEncoder, DynamicImage, ImageFormat, RgbaImage};
use serde::{Deserialize, Serialize};

use photomark_common::error::{PhotomarkError, PhotomarkResult};
use photomark_placement::PlacementState;
use photomark_watermark_model::config::WatermarkConfig;
use photomark_watermark_model::job::JobList;

use crate::compositor::composite;
use crate::layer::load_base_image;

/// Target encoding for exported files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless, preserves alpha.
    #[default]
    Png,
    /// Lossy, opaque, fixed quality.
    Jpeg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpeg => "jpg",
        }
    }

    /// Parse a format name ("png"/"jpeg"/"jpg", any case).
    pub fn parse(name: &str) -> PhotomarkResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            other => Err(PhotomarkError::config(format!(
                "Unknown output format: {other}. Use: png, jpeg"
            ))),
        }
    }
}

/// How the output filename derives from the source filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilenameRule {
    /// Keep the original stem.
    Original,
    /// Prepend the affix.
    Prefix,
    /// Append the affix.
    #[default]
    Suffix,
}

impl FilenameRule {
    pub fn parse(name: &str) -> PhotomarkResult<Self> {
        match name.to_ascii_lowercase().as_str() {
            "original" => Ok(FilenameRule::Original),
            "prefix" => Ok(FilenameRule::Prefix),
            "suffix" => Ok(FilenameRule::Suffix),
            other => Err(PhotomarkError::config(format!(
                "Unknown filename rule: {other}. Use: original, prefix, suffix"
            ))),
        }
    }
}

/// Everything the batch driver needs besides the watermark itself.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub output_dir: PathBuf,
    pub format: OutputFormat,
    pub rule: FilenameRule,
    pub affix: String,
    pub jpeg_quality: u8,
    /// Exporting into a source directory overwrites originals; refuse
    /// unless the caller confirmed.
    pub allow_source_dir: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            format: OutputFormat::Png,
            rule: FilenameRule::Suffix,
            affix: "_watermarked".to_string(),
            jpeg_quality: 95,
            allow_source_dir: false,
        }
    }
}

/// Success/failure tallies for one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// Progress report fired after each file.
#[derive(Debug, Clone)]
pub struct ExportProgress {
    pub completed: usize,
    pub total: usize,
    pub current: PathBuf,
}

/// Progress callback for batch export.
pub type ProgressCallback = Box<dyn Fn(ExportProgress) + Send>;

/// Derive the output filename for one source under the options' rule.
pub fn output_filename(source: &Path, opts: &ExportOptions) -> String {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("image");
    let name = match opts.rule {
        FilenameRule::Original => stem.to_string(),
        FilenameRule::Prefix => format!("{}{}", opts.affix, stem),
        FilenameRule::Suffix => format!("{}{}", stem, opts.affix),
    };
    format!("{}.{}", name, opts.format.extension())
}

/// Run the batch. Per-image failures are counted, never fatal; the returned
/// error covers only conditions that prevent the batch from starting.
pub fn export_batch(
    jobs: &JobList,
    cfg: &WatermarkConfig,
    opts: &ExportOptions,
    progress: Option<ProgressCallback>,
) -> PhotomarkResult<ExportSummary> {
    if jobs.is_empty() {
        return Err(PhotomarkError::config("No images queued for export"));
    }
    if !opts.allow_source_dir {
        check_output_dir(jobs, &opts.output_dir)?;
    }
    std::fs::create_dir_all(&opts.output_dir)?;

    tracing::info!(
        total = jobs.len(),
        output = %opts.output_dir.display(),
        format = ?opts.format,
        "Starting batch export"
    );

    let total = jobs.len();
    let mut summary = ExportSummary::default();
    for (index, source) in jobs.iter().enumerate() {
        match export_one(source, cfg, opts) {
            Ok(path) => {
                tracing::debug!(output = %path.display(), "Exported");
                summary.succeeded += 1;
            }
            Err(e) => {
                tracing::warn!(source = %source.display(), "Export failed: {e}");
                summary.failed += 1;
            }
        }
        if let Some(cb) = &progress {
            cb(ExportProgress {
                completed: index + 1,
                total,
                current: source.to_path_buf(),
            });
        }
    }

    tracing::info!(
        succeeded = summary.succeeded,
        failed = summary.failed,
        "Batch export finished"
    );
    Ok(summary)
}

fn export_one(
    source: &Path,
    cfg: &WatermarkConfig,
    opts: &ExportOptions,
) -> PhotomarkResult<PathBuf> {
    let base = load_base_image(source)?;

    // A fresh placement state per image: the canonical-offset write-back of
    // one photo must not leak into the next, differently sized one.
    let mut state = PlacementState::new(cfg.placement);
    let watermarked = composite(&base, cfg, &mut state, 1.0)?;

    let out_path = opts.output_dir.join(output_filename(source, opts));
    encode(&watermarked, &out_path, opts)?;
    Ok(out_path)
}

fn encode(image: &RgbaImage, path: &Path, opts: &ExportOptions) -> PhotomarkResult<()> {
    match opts.format {
        OutputFormat::Png => {
            DynamicImage::ImageRgba8(image.clone())
                .save_with_format(path, ImageFormat::Png)
                .map_err(|e| PhotomarkError::export(format!("{}: {e}", path.display())))?;
        }
        OutputFormat::Jpeg => {
            // JPEG carries no alpha; drop the channel like the preview shows
            // it over its own background.
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            JpegEncoder::new_with_quality(&mut writer, opts.jpeg_quality)
                .encode_image(&rgb)
                .map_err(|e| PhotomarkError::export(format!("{}: {e}", path.display())))?;
        }
    }
    Ok(())
}

/// Refuse an output directory that is also a source directory.
fn check_output_dir(jobs: &JobList, output_dir: &Path) -> PhotomarkResult<()> {
    let canonical_out = output_dir.canonicalize().unwrap_or_else(|_| output_dir.to_path_buf());
    for source in jobs {
        if let Some(parent) = source.parent() {
            let canonical_src = parent.canonicalize().unwrap_or_else(|_| parent.to_path_buf());
            if canonical_src == canonical_out {
                return Err(PhotomarkError::export(format!(
                    "Output directory {} contains source images; pass --allow-source-dir to overwrite",
                    output_dir.display()
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts(rule: FilenameRule, affix: &str, format: OutputFormat) -> ExportOptions {
        ExportOptions {
            rule,
            affix: affix.to_string(),
            format,
            ..ExportOptions::default()
        }
    }

    #[test]
    fn suffix_rule_appends_before_extension() {
        let o = opts(FilenameRule::Suffix, "_wm", OutputFormat::Png);
        assert_eq!(output_filename(Path::new("photo.jpg"), &o), "photo_wm.png");
    }

    #[test]
    fn prefix_rule_prepends() {
        let o = opts(FilenameRule::Prefix, "new_", OutputFormat::Png);
        assert_eq!(output_filename(Path::new("photo.jpg"), &o), "new_photo.png");
    }

    #[test]
    fn original_rule_keeps_stem() {
        let o = opts(FilenameRule::Original, "_wm", OutputFormat::Png);
        assert_eq!(output_filename(Path::new("photo.jpg"), &o), "photo.png");
    }

    #[test]
    fn jpeg_extension_follows_format() {
        let o = opts(FilenameRule::Suffix, "_wm", OutputFormat::Jpeg);
        assert_eq!(
            output_filename(Path::new("dir/photo.tiff"), &o),
            "photo_wm.jpg"
        );
    }

    #[test]
    fn format_and_rule_parsing() {
        assert_eq!(OutputFormat::parse("PNG").unwrap(), OutputFormat::Png);
        assert_eq!(OutputFormat::parse("jpg").unwrap(), OutputFormat::Jpeg);
        assert!(OutputFormat::parse("webp").is_err());

        assert_eq!(
            FilenameRule::parse("original").unwrap(),
            FilenameRule::Original
        );
        assert!(FilenameRule::parse("infix").is_err());
    }
}
