//! End-to-end pipeline tests: composite, encode, reload.

use std::path::PathBuf;

use image::{Rgba, RgbaImage};

use photomark_placement::PlacementState;
use photomark_render_engine::export::{
    export_batch, ExportOptions, ExportProgress, FilenameRule, OutputFormat,
};
use photomark_render_engine::composite;
use photomark_watermark_model::config::{ImageWatermark, WatermarkConfig, WatermarkKind};
use photomark_watermark_model::job::JobList;
use photomark_watermark_model::position::{Anchor, Placement};

fn solid(w: u32, h: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(w, h, Rgba(rgba))
}

fn image_watermark_config(source: PathBuf) -> WatermarkConfig {
    WatermarkConfig {
        kind: WatermarkKind::Image,
        image: ImageWatermark {
            source: Some(source),
            scale_percent: 100,
            opacity_percent: 100,
        },
        placement: Placement::Anchor {
            anchor: Anchor::TopLeft,
            margin_x: 0.0,
            margin_y: 0.0,
        },
        ..WatermarkConfig::default()
    }
}

#[test]
fn exported_png_reproduces_watermark_pixels_exactly() {
    let dir = tempfile::tempdir().unwrap();

    let wm_path = dir.path().join("mark.png");
    solid(16, 8, [210, 40, 70, 255]).save(&wm_path).unwrap();

    let photo_path = dir.path().join("photo.png");
    solid(64, 48, [0, 90, 180, 255]).save(&photo_path).unwrap();

    let mut jobs = JobList::new();
    assert!(jobs.add_file(&photo_path));

    let out_dir = dir.path().join("out");
    let opts = ExportOptions {
        output_dir: out_dir.clone(),
        format: OutputFormat::Png,
        rule: FilenameRule::Suffix,
        affix: "_wm".to_string(),
        ..ExportOptions::default()
    };

    let summary = export_batch(&jobs, &image_watermark_config(wm_path), &opts, None).unwrap();
    assert_eq!((summary.succeeded, summary.failed), (1, 0));

    let reloaded = image::open(out_dir.join("photo_wm.png")).unwrap().to_rgba8();
    assert_eq!(reloaded.dimensions(), (64, 48));
    for y in 0..8 {
        for x in 0..16 {
            assert_eq!(reloaded.get_pixel(x, y).0, [210, 40, 70, 255], "at {x},{y}");
        }
    }
    assert_eq!(reloaded.get_pixel(16, 0).0, [0, 90, 180, 255]);
    assert_eq!(reloaded.get_pixel(0, 8).0, [0, 90, 180, 255]);
}

#[test]
fn batch_continues_past_a_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();

    let wm_path = dir.path().join("mark.png");
    solid(4, 4, [255, 255, 255, 255]).save(&wm_path).unwrap();

    let good_a = dir.path().join("a.png");
    let good_b = dir.path().join("b.png");
    let broken = dir.path().join("broken.png");
    solid(32, 32, [10, 10, 10, 255]).save(&good_a).unwrap();
    solid(32, 32, [20, 20, 20, 255]).save(&good_b).unwrap();
    std::fs::write(&broken, b"this is not image data").unwrap();

    let mut jobs = JobList::new();
    jobs.add_file(&good_a);
    jobs.add_file(&broken);
    jobs.add_file(&good_b);

    let out_dir = dir.path().join("out");
    let opts = ExportOptions {
        output_dir: out_dir.clone(),
        ..ExportOptions::default()
    };

    let progress_seen = std::sync::Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = progress_seen.clone();
    let cb: Box<dyn Fn(ExportProgress) + Send> = Box::new(move |p| {
        sink.lock().unwrap().push((p.completed, p.total));
    });

    let summary =
        export_batch(&jobs, &image_watermark_config(wm_path), &opts, Some(cb)).unwrap();
    assert_eq!((summary.succeeded, summary.failed), (2, 1));

    // Progress fired for every file, failures included.
    assert_eq!(
        *progress_seen.lock().unwrap(),
        vec![(1, 3), (2, 3), (3, 3)]
    );

    assert!(out_dir.join("a_watermarked.png").exists());
    assert!(out_dir.join("b_watermarked.png").exists());
    assert!(!out_dir.join("broken_watermarked.png").exists());
}

#[test]
fn exporting_into_a_source_directory_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("photo.png");
    solid(8, 8, [1, 1, 1, 255]).save(&photo).unwrap();

    let mut jobs = JobList::new();
    jobs.add_file(&photo);

    let opts = ExportOptions {
        output_dir: dir.path().to_path_buf(),
        ..ExportOptions::default()
    };
    let cfg = WatermarkConfig::default();
    assert!(export_batch(&jobs, &cfg, &opts, None).is_err());

    // Explicit confirmation lifts the refusal.
    let opts = ExportOptions {
        allow_source_dir: true,
        ..opts
    };
    let summary = export_batch(&jobs, &cfg, &opts, None).unwrap();
    assert_eq!(summary.succeeded, 1);
}

#[test]
fn empty_job_list_is_refused() {
    let jobs = JobList::new();
    let opts = ExportOptions::default();
    assert!(export_batch(&jobs, &WatermarkConfig::default(), &opts, None).is_err());
}

#[test]
fn jpeg_export_flattens_alpha() {
    let dir = tempfile::tempdir().unwrap();
    let photo = dir.path().join("photo.png");
    solid(24, 24, [120, 130, 140, 255]).save(&photo).unwrap();

    let mut jobs = JobList::new();
    jobs.add_file(&photo);

    let out_dir = dir.path().join("out");
    let opts = ExportOptions {
        output_dir: out_dir.clone(),
        format: OutputFormat::Jpeg,
        rule: FilenameRule::Original,
        ..ExportOptions::default()
    };

    let summary = export_batch(&jobs, &WatermarkConfig::default(), &opts, None).unwrap();
    assert_eq!(summary.succeeded, 1);

    let reloaded = image::open(out_dir.join("photo.jpg")).unwrap();
    assert!(!reloaded.color().has_alpha());
}

#[test]
fn preview_then_export_keeps_the_watermark_in_the_same_spot() {
    let dir = tempfile::tempdir().unwrap();
    let wm_path = dir.path().join("mark.png");
    solid(20, 20, [255, 0, 0, 255]).save(&wm_path).unwrap();

    let mut cfg = image_watermark_config(wm_path);
    cfg.placement = Placement::Custom { x: 100.0, y: 60.0 };

    // Interactive session: preview at 0.25 scale first.
    let mut state = PlacementState::new(cfg.placement);
    let preview_base = solid(100, 75, [255, 255, 255, 255]);
    composite(&preview_base, &cfg, &mut state, 0.25).unwrap();

    // The canonical offset is unchanged, so the full-resolution export
    // lands at the configured full-resolution position.
    let export_base = solid(400, 300, [255, 255, 255, 255]);
    let out = composite(&export_base, &cfg, &mut state, 1.0).unwrap();
    assert_eq!(out.get_pixel(100, 60).0, [255, 0, 0, 255]);
    assert_eq!(out.get_pixel(99, 59).0, [255, 255, 255, 255]);
}
