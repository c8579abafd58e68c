use photomark_placement::{CanvasGeometry, PlacementState};
use photomark_watermark_model::position::{Anchor, Placement};
use proptest::prelude::*;

fn anchor_strategy() -> impl Strategy<Value = Anchor> {
    prop::sample::select(Anchor::ALL.to_vec())
}

proptest! {
    #[test]
    fn resolved_position_stays_inside_clamp_bounds(
        anchor in anchor_strategy(),
        canvas_w in 1u32..4000,
        canvas_h in 1u32..4000,
        wm_w in 1u32..4000,
        wm_h in 1u32..4000,
        margin_x in 0.0f64..500.0,
        margin_y in 0.0f64..500.0,
        scale in 0.05f64..1.0,
    ) {
        let mut state = PlacementState::new(Placement::Anchor { anchor, margin_x, margin_y });
        let (x, y) = state.resolve(CanvasGeometry::new(canvas_w, canvas_h, wm_w, wm_h, scale));

        let max_x = i64::from(canvas_w.saturating_sub(wm_w));
        let max_y = i64::from(canvas_h.saturating_sub(wm_h));
        prop_assert!(x >= 0 && x <= max_x, "x={x} outside [0, {max_x}]");
        prop_assert!(y >= 0 && y <= max_y, "y={y} outside [0, {max_y}]");
    }

    #[test]
    fn custom_offsets_survive_preview_renders_within_rounding(
        x in 0.0f64..900.0,
        y in 0.0f64..700.0,
        scale in 0.1f64..1.0,
    ) {
        let (canvas_w, canvas_h, wm_w, wm_h) = (1000u32, 800u32, 100u32, 50u32);
        let mut state = PlacementState::new(Placement::Custom { x, y });

        // Preview render with integer-rounded scaled dimensions.
        let geom = CanvasGeometry::new(
            (f64::from(canvas_w) * scale).round() as u32,
            (f64::from(canvas_h) * scale).round() as u32,
            (f64::from(wm_w) * scale).round() as u32,
            (f64::from(wm_h) * scale).round() as u32,
            scale,
        );
        state.resolve(geom);

        // The canonical offset drifts by at most the preview's own rounding
        // granularity (one preview pixel = 1/scale full-resolution pixels).
        match state.placement {
            Placement::Custom { x: cx, y: cy } => {
                prop_assert!((cx - x).abs() <= 2.0 / scale, "x drifted {} -> {}", x, cx);
                prop_assert!((cy - y).abs() <= 2.0 / scale, "y drifted {} -> {}", y, cy);
            }
            _ => prop_assert!(false, "placement left custom mode"),
        }
    }

    #[test]
    fn drag_round_trips_between_scales(
        dx in -200.0f64..200.0,
        dy in -200.0f64..200.0,
        scale in 0.1f64..1.0,
    ) {
        let mut state = PlacementState::new(Placement::Custom { x: 400.0, y: 300.0 });
        state.drag_by(dx, dy, scale);

        match state.placement {
            Placement::Custom { x, y } => {
                prop_assert!((x - (400.0 + dx / scale)).abs() < 1e-9);
                prop_assert!((y - (300.0 + dy / scale)).abs() < 1e-9);
            }
            _ => prop_assert!(false, "placement left custom mode"),
        }
    }
}
