//! Anchor and free-offset placement resolution.
//!
//! All stored offsets are full-resolution pixel units. A render at preview
//! scale converts them on the way in (`* scale`) and writes the resolved
//! position back unscaled (`/ scale`), so every render of the same
//! configuration lands on the same real-world spot and a drag started in a
//! preview continues exactly where the last render put the watermark.

use photomark_watermark_model::position::{Anchor, Placement};

/// Dimensions for one placement resolution.
///
/// `canvas_w`/`canvas_h` and `wm_w`/`wm_h` are the sizes of the render
/// target and the (already scaled and rotated) watermark layer at the
/// current render scale; `scale` is the ratio between this render and full
/// resolution (1.0 for export, below 1.0 for previews).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    pub canvas_w: u32,
    pub canvas_h: u32,
    pub wm_w: u32,
    pub wm_h: u32,
    pub scale: f64,
}

impl CanvasGeometry {
    pub fn new(canvas_w: u32, canvas_h: u32, wm_w: u32, wm_h: u32, scale: f64) -> Self {
        Self {
            canvas_w,
            canvas_h,
            wm_w,
            wm_h,
            scale,
        }
    }

    /// Render scale, guarded against zero/negative values.
    fn safe_scale(&self) -> f64 {
        if self.scale > 0.0 {
            self.scale
        } else {
            1.0
        }
    }
}

/// Mutable placement state carried across renders of one configuration.
///
/// `last_resolved` caches the unscaled top-left of the most recent
/// resolution; it is the hand-off point when a drag switches an anchor
/// placement into custom mode.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementState {
    pub placement: Placement,
    pub last_resolved: Option<(f64, f64)>,
}

impl PlacementState {
    pub fn new(placement: Placement) -> Self {
        Self {
            placement,
            last_resolved: None,
        }
    }

    /// Resolve the top-left pixel position for the current render.
    ///
    /// Side effects, both in unscaled full-resolution units: `last_resolved`
    /// is updated, and in custom mode the clamped position is written back
    /// as the canonical offset so later renders at a different scale stay
    /// consistent.
    pub fn resolve(&mut self, geom: CanvasGeometry) -> (i64, i64) {
        let scale = geom.safe_scale();

        let (x, y) = match self.placement {
            Placement::Custom { x, y } => {
                let px = clamp_axis(x * scale, geom.canvas_w, geom.wm_w);
                let py = clamp_axis(y * scale, geom.canvas_h, geom.wm_h);
                self.placement = Placement::Custom {
                    x: px / scale,
                    y: py / scale,
                };
                (px, py)
            }
            Placement::Anchor {
                anchor,
                margin_x,
                margin_y,
            } => {
                let (px, py) =
                    anchor_position(anchor, margin_x * scale, margin_y * scale, geom);
                (
                    clamp_axis(px, geom.canvas_w, geom.wm_w),
                    clamp_axis(py, geom.canvas_h, geom.wm_h),
                )
            }
        };

        self.last_resolved = Some((x / scale, y / scale));
        (x.round() as i64, y.round() as i64)
    }

    /// Apply a pointer-drag delta measured in screen pixels at the given
    /// render scale.
    ///
    /// The delta is converted to full-resolution units so the same physical
    /// drag moves the watermark the same real-world distance at any preview
    /// zoom. Forces custom mode, seeding from the last resolved position
    /// when leaving an anchor.
    pub fn drag_by(&mut self, dx_screen: f64, dy_screen: f64, scale: f64) {
        let scale = if scale > 0.0 { scale } else { 1.0 };
        let (dx, dy) = (dx_screen / scale, dy_screen / scale);

        let (x, y) = match self.placement {
            Placement::Custom { x, y } => (x, y),
            Placement::Anchor { .. } => self.last_resolved.unwrap_or((50.0, 50.0)),
        };

        self.placement = Placement::Custom {
            x: x + dx,
            y: y + dy,
        };
    }
}

/// Clamp a coordinate to `[0, canvas - wm]`; the lower bound wins when the
/// watermark exceeds the canvas on this axis.
fn clamp_axis(value: f64, canvas: u32, wm: u32) -> f64 {
    value.min(f64::from(canvas) - f64::from(wm)).max(0.0)
}

fn anchor_position(anchor: Anchor, mx: f64, my: f64, geom: CanvasGeometry) -> (f64, f64) {
    let w = f64::from(geom.canvas_w);
    let h = f64::from(geom.canvas_h);
    let ww = f64::from(geom.wm_w);
    let wh = f64::from(geom.wm_h);

    match anchor {
        Anchor::TopLeft => (mx, my),
        Anchor::TopCenter => ((w - ww) / 2.0, my),
        Anchor::TopRight => (w - ww - mx, my),
        Anchor::MiddleLeft => (mx, (h - wh) / 2.0),
        Anchor::Center => ((w - ww) / 2.0, (h - wh) / 2.0),
        Anchor::MiddleRight => (w - ww - mx, (h - wh) / 2.0),
        Anchor::BottomLeft => (mx, h - wh - my),
        Anchor::BottomCenter => ((w - ww) / 2.0, h - wh - my),
        Anchor::BottomRight => (w - ww - mx, h - wh - my),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchored(anchor: Anchor, mx: f64, my: f64) -> PlacementState {
        PlacementState::new(Placement::Anchor {
            anchor,
            margin_x: mx,
            margin_y: my,
        })
    }

    #[test]
    fn all_nine_anchors_exact_at_zero_margin() {
        let geom = CanvasGeometry::new(1000, 800, 100, 50, 1.0);
        let expected = [
            (Anchor::TopLeft, (0, 0)),
            (Anchor::TopCenter, (450, 0)),
            (Anchor::TopRight, (900, 0)),
            (Anchor::MiddleLeft, (0, 375)),
            (Anchor::Center, (450, 375)),
            (Anchor::MiddleRight, (900, 375)),
            (Anchor::BottomLeft, (0, 750)),
            (Anchor::BottomCenter, (450, 750)),
            (Anchor::BottomRight, (900, 750)),
        ];
        for (anchor, want) in expected {
            let mut state = anchored(anchor, 0.0, 0.0);
            assert_eq!(state.resolve(geom), want, "anchor {anchor}");
        }
    }

    #[test]
    fn margins_offset_from_the_native_edge() {
        let geom = CanvasGeometry::new(1000, 800, 100, 50, 1.0);

        let mut state = anchored(Anchor::BottomRight, 50.0, 50.0);
        assert_eq!(state.resolve(geom), (850, 700));

        let mut state = anchored(Anchor::TopLeft, 50.0, 50.0);
        assert_eq!(state.resolve(geom), (50, 50));

        // Center anchors ignore the margin on the centered axis.
        let mut state = anchored(Anchor::TopCenter, 50.0, 20.0);
        assert_eq!(state.resolve(geom), (450, 20));
    }

    #[test]
    fn anchor_resolution_scales_with_the_preview() {
        // Same configuration rendered at half scale: canvas, watermark, and
        // margins all halve; the cached unscaled position matches the
        // full-resolution render.
        let mut full = anchored(Anchor::BottomRight, 50.0, 50.0);
        let full_pos = full.resolve(CanvasGeometry::new(1000, 800, 100, 50, 1.0));
        assert_eq!(full_pos, (850, 700));

        let mut preview = anchored(Anchor::BottomRight, 50.0, 50.0);
        let preview_pos = preview.resolve(CanvasGeometry::new(500, 400, 50, 25, 0.5));
        assert_eq!(preview_pos, (425, 350));
        assert_eq!(preview.last_resolved, Some((850.0, 700.0)));
    }

    #[test]
    fn custom_mode_is_scale_invariant() {
        let mut state = PlacementState::new(Placement::Custom { x: 300.0, y: 200.0 });

        let full = state.resolve(CanvasGeometry::new(1000, 800, 100, 50, 1.0));
        assert_eq!(full, (300, 200));

        let preview = state.resolve(CanvasGeometry::new(500, 400, 50, 25, 0.5));
        assert_eq!(preview, (150, 100));

        // The canonical offset survived both renders unchanged.
        match state.placement {
            Placement::Custom { x, y } => {
                assert!((x - 300.0).abs() < 1e-9);
                assert!((y - 200.0).abs() < 1e-9);
            }
            _ => panic!("placement left custom mode"),
        }
    }

    #[test]
    fn out_of_bounds_custom_offsets_clamp_and_write_back() {
        let mut state = PlacementState::new(Placement::Custom {
            x: 5000.0,
            y: -120.0,
        });
        let pos = state.resolve(CanvasGeometry::new(1000, 800, 100, 50, 1.0));
        assert_eq!(pos, (900, 0));
        assert_eq!(state.placement, Placement::Custom { x: 900.0, y: 0.0 });
    }

    #[test]
    fn oversized_watermark_pins_to_zero() {
        let geom = CanvasGeometry::new(1000, 800, 1200, 900, 1.0);

        let mut state = anchored(Anchor::BottomRight, 50.0, 50.0);
        assert_eq!(state.resolve(geom), (0, 0));

        let mut state = PlacementState::new(Placement::Custom { x: 400.0, y: 400.0 });
        assert_eq!(state.resolve(geom), (0, 0));
    }

    #[test]
    fn drag_converts_screen_delta_to_full_resolution() {
        let mut state = anchored(Anchor::BottomRight, 50.0, 50.0);
        state.resolve(CanvasGeometry::new(500, 400, 50, 25, 0.5));
        assert_eq!(state.last_resolved, Some((850.0, 700.0)));

        // 10px right, 20px up on a half-scale preview = 20/-40 full-res.
        state.drag_by(10.0, -20.0, 0.5);
        assert_eq!(
            state.placement,
            Placement::Custom { x: 870.0, y: 660.0 }
        );

        let pos = state.resolve(CanvasGeometry::new(1000, 800, 100, 50, 1.0));
        assert_eq!(pos, (870, 660));
    }

    #[test]
    fn drag_without_prior_resolution_seeds_defaults() {
        let mut state = anchored(Anchor::TopLeft, 50.0, 50.0);
        state.drag_by(5.0, 5.0, 1.0);
        assert_eq!(state.placement, Placement::Custom { x: 55.0, y: 55.0 });
    }

    #[test]
    fn zero_scale_is_treated_as_full_resolution() {
        let mut state = PlacementState::new(Placement::Custom { x: 30.0, y: 40.0 });
        let pos = state.resolve(CanvasGeometry::new(1000, 800, 100, 50, 0.0));
        assert_eq!(pos, (30, 40));
    }
}
