//! Glyph rendering strategies.
//!
//! Text is rasterized by one of a closed set of renderers, selected up
//! front by a text-classification predicate plus font availability:
//!
//! - **Outline**: a scalable system font loaded through `ab_glyph`. The
//!   candidate list depends on whether the text contains CJK code points,
//!   so CJK-capable families are tried first when they are needed.
//! - **Bitmap**: the built-in 8x8 face, integer-upscaled with
//!   nearest-neighbor to approximate the requested size. This is the
//!   degradation path for environments without a usable outline font.
//!
//! Both produce a tight-cropped straight-alpha RGBA layer.

use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::{imageops, Rgba, RgbaImage};

use photomark_watermark_model::config::{opacity_to_alpha, Rgb, TextWatermark};

use crate::font8x8;

/// CJK detection range, matching the reference behavior (CJK Unified
/// Ideographs).
pub fn contains_cjk(text: &str) -> bool {
    text.chars().any(|ch| ('\u{4e00}'..='\u{9fff}').contains(&ch))
}

/// Minimum effective font size; smaller previews still render legibly.
pub const MIN_FONT_PX: u32 = 10;

/// Native pixel height the bitmap upscale factor is derived from.
const BITMAP_REFERENCE_PX: u32 = 11;

/// Padding around the rendered text before the tight crop, leaving room for
/// outline and shadow passes.
const TEXT_PAD: i32 = 10;

/// A renderer chosen for one piece of text.
pub enum GlyphRenderer {
    Outline(OutlineRenderer),
    Bitmap(BitmapRenderer),
}

impl GlyphRenderer {
    /// Pick the strategy for this text: an outline font when one loads,
    /// the bitmap face otherwise.
    pub fn select(cfg: &TextWatermark, px: u32) -> GlyphRenderer {
        match OutlineRenderer::load(cfg, px) {
            Some(renderer) => GlyphRenderer::Outline(renderer),
            None => {
                tracing::warn!(
                    cjk = contains_cjk(&cfg.content),
                    "No outline font available, falling back to bitmap face"
                );
                GlyphRenderer::Bitmap(BitmapRenderer::new(px))
            }
        }
    }

    /// Bitmap layers keep their blocky pixels through later transforms.
    pub fn is_bitmap(&self) -> bool {
        matches!(self, GlyphRenderer::Bitmap(_))
    }

    /// Rasterize the text into a tight-cropped transparent layer.
    /// Returns `None` for empty text or a degenerate bounding box.
    pub fn render(&self, cfg: &TextWatermark) -> Option<RgbaImage> {
        match self {
            GlyphRenderer::Outline(r) => r.render(cfg),
            GlyphRenderer::Bitmap(r) => r.render(cfg),
        }
    }
}

/// One rasterization pass: an offset stamp of the full glyph set.
struct Pass {
    dx: i32,
    dy: i32,
    color: Rgb,
    alpha: u8,
}

/// Shadow and outline render as extra passes behind the fill.
fn passes(cfg: &TextWatermark) -> Vec<Pass> {
    let alpha = opacity_to_alpha(cfg.opacity_percent);
    let mut out = Vec::new();
    if cfg.shadow {
        out.push(Pass {
            dx: 2,
            dy: 2,
            color: Rgb::BLACK,
            alpha: alpha / 2,
        });
    }
    if cfg.outline {
        for (dx, dy) in [
            (-1, -1),
            (0, -1),
            (1, -1),
            (-1, 0),
            (1, 0),
            (-1, 1),
            (0, 1),
            (1, 1),
        ] {
            out.push(Pass {
                dx,
                dy,
                color: cfg.outline_color,
                alpha,
            });
        }
    }
    out.push(Pass {
        dx: 0,
        dy: 0,
        color: cfg.color,
        alpha,
    });
    out
}

/// Straight-alpha "over" of a single stamp onto the layer.
fn stamp(layer: &mut RgbaImage, x: i32, y: i32, color: Rgb, alpha: f32) {
    if alpha <= 0.0 || x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= layer.width() || y >= layer.height() {
        return;
    }

    let dst = layer.get_pixel_mut(x, y);
    let sa = (alpha / 255.0).clamp(0.0, 1.0);
    let da = f32::from(dst[3]) / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return;
    }

    let blend = |src: u8, dst: u8| {
        ((f32::from(src) * sa + f32::from(dst) * da * (1.0 - sa)) / out_a).round() as u8
    };
    *dst = Rgba([
        blend(color.r, dst[0]),
        blend(color.g, dst[1]),
        blend(color.b, dst[2]),
        (out_a * 255.0).round() as u8,
    ]);
}

/// Crop a layer to its minimal region with non-zero alpha.
/// Returns `None` when every pixel is fully transparent.
pub(crate) fn crop_to_alpha(layer: &RgbaImage) -> Option<RgbaImage> {
    let (mut min_x, mut min_y) = (u32::MAX, u32::MAX);
    let (mut max_x, mut max_y) = (0u32, 0u32);
    for (x, y, pixel) in layer.enumerate_pixels() {
        if pixel[3] > 0 {
            min_x = min_x.min(x);
            min_y = min_y.min(y);
            max_x = max_x.max(x);
            max_y = max_y.max(y);
        }
    }
    if min_x == u32::MAX {
        return None;
    }
    Some(imageops::crop_imm(layer, min_x, min_y, max_x - min_x + 1, max_y - min_y + 1).to_image())
}

/// Scalable-font rendering via `ab_glyph`.
pub struct OutlineRenderer {
    font: FontVec,
    source: PathBuf,
    px: f32,
}

impl OutlineRenderer {
    /// Try each candidate font file in order; the first that parses wins.
    pub fn load(cfg: &TextWatermark, px: u32) -> Option<Self> {
        for path in candidate_fonts(cfg) {
            match load_font(&path) {
                Some(font) => {
                    tracing::debug!(font = %path.display(), px, "Selected outline font");
                    return Some(Self {
                        font,
                        source: path,
                        px: px as f32,
                    });
                }
                None => continue,
            }
        }
        None
    }

    /// Path of the loaded font file.
    pub fn source(&self) -> &Path {
        &self.source
    }

    fn render(&self, cfg: &TextWatermark) -> Option<RgbaImage> {
        let scale = PxScale::from(self.px);
        let scaled = self.font.as_scaled(scale);

        // Lay out the line, collecting outlined glyphs and their union bounds.
        let mut outlined = Vec::new();
        let mut caret = 0.0f32;
        let mut last = None;
        for ch in cfg.content.chars() {
            if ch.is_control() {
                continue;
            }
            let id = self.font.glyph_id(ch);
            if let Some(prev) = last {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, ab_glyph::point(caret, scaled.ascent()));
            caret += scaled.h_advance(id);
            last = Some(id);
            if let Some(og) = self.font.outline_glyph(glyph) {
                outlined.push(og);
            }
        }
        if outlined.is_empty() {
            return None;
        }

        let (mut min_x, mut min_y) = (f32::MAX, f32::MAX);
        let (mut max_x, mut max_y) = (f32::MIN, f32::MIN);
        for og in &outlined {
            let bounds = og.px_bounds();
            min_x = min_x.min(bounds.min.x);
            min_y = min_y.min(bounds.min.y);
            max_x = max_x.max(bounds.max.x);
            max_y = max_y.max(bounds.max.y);
        }
        let width = (max_x - min_x).ceil() as i64;
        let height = (max_y - min_y).ceil() as i64;
        if width <= 0 || height <= 0 {
            return None;
        }

        let mut layer = RgbaImage::new(
            (width + i64::from(TEXT_PAD) * 2) as u32,
            (height + i64::from(TEXT_PAD) * 2) as u32,
        );
        for pass in passes(cfg) {
            for og in &outlined {
                let bounds = og.px_bounds();
                let origin_x = (bounds.min.x - min_x).round() as i32 + TEXT_PAD + pass.dx;
                let origin_y = (bounds.min.y - min_y).round() as i32 + TEXT_PAD + pass.dy;
                og.draw(|gx, gy, coverage| {
                    stamp(
                        &mut layer,
                        origin_x + gx as i32,
                        origin_y + gy as i32,
                        pass.color,
                        coverage * f32::from(pass.alpha),
                    );
                });
            }
        }

        crop_to_alpha(&layer)
    }
}

/// Bitmap-face rendering with integer nearest-neighbor upscale.
pub struct BitmapRenderer {
    upscale: u32,
}

impl BitmapRenderer {
    pub fn new(px: u32) -> Self {
        Self {
            upscale: (px / BITMAP_REFERENCE_PX).max(1),
        }
    }

    /// The integer factor applied after rendering at native size.
    pub fn upscale(&self) -> u32 {
        self.upscale
    }

    fn render(&self, cfg: &TextWatermark) -> Option<RgbaImage> {
        let chars: Vec<char> = cfg.content.chars().filter(|c| !c.is_control()).collect();
        if chars.is_empty() {
            return None;
        }

        let cell = font8x8::GLYPH_SIZE as i32;
        let pad = 2i32;
        let mut layer = RgbaImage::new(
            (chars.len() as u32) * font8x8::GLYPH_SIZE + 2 * pad as u32,
            font8x8::GLYPH_SIZE + 2 * pad as u32,
        );

        for pass in passes(cfg) {
            for (i, ch) in chars.iter().enumerate() {
                let rows = font8x8::glyph(*ch);
                let base_x = pad + i as i32 * cell + pass.dx;
                let base_y = pad + pass.dy;
                for (row, bits) in rows.iter().enumerate() {
                    for col in 0..cell {
                        if bits & (1u8 << col) != 0 {
                            stamp(
                                &mut layer,
                                base_x + col,
                                base_y + row as i32,
                                pass.color,
                                f32::from(pass.alpha),
                            );
                        }
                    }
                }
            }
        }

        let cropped = crop_to_alpha(&layer)?;
        if self.upscale == 1 {
            return Some(cropped);
        }
        Some(imageops::resize(
            &cropped,
            cropped.width() * self.upscale,
            cropped.height() * self.upscale,
            imageops::FilterType::Nearest,
        ))
    }
}

fn load_font(path: &Path) -> Option<FontVec> {
    let data = std::fs::read(path).ok()?;
    match FontVec::try_from_vec(data) {
        Ok(font) => Some(font),
        Err(e) => {
            tracing::debug!(font = %path.display(), "Unparseable font file: {e}");
            None
        }
    }
}

/// Ordered candidate font files for this text.
///
/// An explicit family narrows the search first; the built-in lists then
/// supply CJK-capable or Latin families depending on the classification,
/// preferring bold/italic variants when those flags are set.
fn candidate_fonts(cfg: &TextWatermark) -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    if let Some(family) = &cfg.font_family {
        let direct = PathBuf::from(family);
        if direct.is_file() {
            candidates.push(direct);
        } else {
            for dir in FONT_DIRS {
                for name in family_file_names(family, cfg.bold, cfg.italic) {
                    candidates.push(Path::new(dir).join(name));
                }
            }
        }
    }

    let builtin: &[&str] = if contains_cjk(&cfg.content) {
        CJK_FONTS
    } else if cfg.bold && cfg.italic {
        LATIN_BOLD_ITALIC_FONTS
    } else if cfg.bold {
        LATIN_BOLD_FONTS
    } else if cfg.italic {
        LATIN_ITALIC_FONTS
    } else {
        LATIN_FONTS
    };
    candidates.extend(builtin.iter().map(|p| PathBuf::from(*p)));

    // Styled lists end with the regular faces so a missing variant degrades
    // to an unstyled render instead of the bitmap face.
    if !contains_cjk(&cfg.content) && (cfg.bold || cfg.italic) {
        candidates.extend(LATIN_FONTS.iter().map(|p| PathBuf::from(*p)));
    }

    candidates.retain(|p| p.is_file());
    candidates
}

fn family_file_names(family: &str, bold: bool, italic: bool) -> Vec<String> {
    let suffixes: &[&str] = match (bold, italic) {
        (true, true) => &["-BoldItalic", "-BoldOblique"],
        (true, false) => &["-Bold"],
        (false, true) => &["-Italic", "-Oblique"],
        (false, false) => &["", "-Regular"],
    };
    let mut names = Vec::new();
    for suffix in suffixes {
        for ext in ["ttf", "otf"] {
            names.push(format!("{family}{suffix}.{ext}"));
        }
    }
    names
}

const FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/truetype/liberation",
    "/usr/share/fonts/truetype/noto",
    "/usr/share/fonts/TTF",
    "/usr/share/fonts",
    "/usr/local/share/fonts",
    "/Library/Fonts",
    "C:\\Windows\\Fonts",
];

const LATIN_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

const LATIN_BOLD_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

const LATIN_ITALIC_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Oblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Italic.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Italic.ttf",
    "C:\\Windows\\Fonts\\ariali.ttf",
];

const LATIN_BOLD_ITALIC_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-BoldOblique.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-BoldItalic.ttf",
    "C:\\Windows\\Fonts\\arialbi.ttf",
];

const CJK_FONTS: &[&str] = &[
    "/usr/share/fonts/opentype/noto/NotoSansCJKsc-Regular.otf",
    "/usr/share/fonts/opentype/noto/NotoSansCJK-Regular.ttc",
    "/usr/share/fonts/truetype/droid/DroidSansFallbackFull.ttf",
    "/usr/share/fonts/truetype/wqy/wqy-microhei.ttc",
    "/usr/share/fonts/truetype/arphic/uming.ttc",
    "/System/Library/Fonts/PingFang.ttc",
    "C:\\Windows\\Fonts\\msyh.ttc",
    "C:\\Windows\\Fonts\\simhei.ttf",
    "C:\\Windows\\Fonts\\simsun.ttc",
];

/// Which font files would serve each text class on this system.
/// Used by the CLI capability check.
#[derive(Debug)]
pub struct FontReport {
    pub latin: Option<PathBuf>,
    pub cjk: Option<PathBuf>,
}

pub fn probe_fonts() -> FontReport {
    let first_loadable = |paths: &[&str]| {
        paths
            .iter()
            .map(|p| PathBuf::from(*p))
            .find(|p| p.is_file() && load_font(p).is_some())
    };
    FontReport {
        latin: first_loadable(LATIN_FONTS),
        cjk: first_loadable(CJK_FONTS),
    }
}
