//! Watermark and export a batch of photos.

use std::path::PathBuf;

use photomark_common::config::AppConfig;
use photomark_render_engine::export::{
    export_batch, ExportOptions, ExportProgress, FilenameRule, OutputFormat,
};
use photomark_watermark_model::job::JobList;

use super::watermark::{persist_last_used, resolve_config, WatermarkArgs};

pub fn run(
    app: &AppConfig,
    inputs: Vec<PathBuf>,
    output: PathBuf,
    format: Option<String>,
    rule: Option<String>,
    affix: Option<String>,
    allow_source_dir: bool,
    template: Option<&str>,
    watermark: &WatermarkArgs,
) -> anyhow::Result<()> {
    if inputs.is_empty() {
        return Err(anyhow::anyhow!("No input files or directories given"));
    }

    let mut jobs = JobList::new();
    let added = jobs.add_dropped(&inputs);
    if jobs.is_empty() {
        return Err(anyhow::anyhow!(
            "No images found in the given inputs (accepted extensions: jpg, jpeg, png, bmp, tiff, tif)"
        ));
    }
    println!("Queued {added} image(s)");

    let cfg = resolve_config(app, template, watermark)?;

    let format = match format {
        Some(name) => OutputFormat::parse(&name)?,
        None => OutputFormat::parse(&app.export.format).unwrap_or_default(),
    };
    let rule = match rule {
        Some(name) => FilenameRule::parse(&name)?,
        None => FilenameRule::Suffix,
    };
    let opts = ExportOptions {
        output_dir: output.clone(),
        format,
        rule,
        affix: affix.unwrap_or_else(|| app.export.affix.clone()),
        jpeg_quality: app.export.jpeg_quality,
        allow_source_dir,
    };

    println!("  Output: {}", output.display());
    println!("  Format: {format:?}");

    let progress_cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(|p| {
        let name = p
            .current
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        print!("\r  Exporting {}/{} ({name})        ", p.completed, p.total);
    });

    let summary = export_batch(&jobs, &cfg, &opts, Some(progress_cb))?;
    println!();
    println!(
        "Export complete. Succeeded: {}, failed: {}",
        summary.succeeded, summary.failed
    );

    persist_last_used(app, &cfg);
    Ok(())
}
