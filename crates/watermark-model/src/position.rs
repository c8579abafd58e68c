//! Watermark placement contracts.
//!
//! A watermark is placed either at one of nine named canvas anchors with a
//! margin pair, or at a free-form offset in full-resolution pixel
//! coordinates. Exactly one of the two modes is authoritative at a time.

use serde::{Deserialize, Serialize};

/// One of the nine canvas-relative reference points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    TopLeft,
    TopCenter,
    TopRight,
    MiddleLeft,
    Center,
    MiddleRight,
    BottomLeft,
    BottomCenter,
    #[default]
    BottomRight,
}

impl Anchor {
    /// All anchors in grid order (left to right, top to bottom).
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::MiddleLeft,
        Anchor::Center,
        Anchor::MiddleRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Canonical snake_case name.
    pub fn name(&self) -> &'static str {
        match self {
            Anchor::TopLeft => "top_left",
            Anchor::TopCenter => "top_center",
            Anchor::TopRight => "top_right",
            Anchor::MiddleLeft => "middle_left",
            Anchor::Center => "center",
            Anchor::MiddleRight => "middle_right",
            Anchor::BottomLeft => "bottom_left",
            Anchor::BottomCenter => "bottom_center",
            Anchor::BottomRight => "bottom_right",
        }
    }

    /// Parse an anchor name. Unknown names fall back to `BottomRight`.
    pub fn parse(name: &str) -> Anchor {
        match name {
            "top_left" => Anchor::TopLeft,
            "top_center" => Anchor::TopCenter,
            "top_right" => Anchor::TopRight,
            "middle_left" => Anchor::MiddleLeft,
            "center" => Anchor::Center,
            "middle_right" => Anchor::MiddleRight,
            "bottom_left" => Anchor::BottomLeft,
            "bottom_center" => Anchor::BottomCenter,
            "bottom_right" => Anchor::BottomRight,
            _ => Anchor::BottomRight,
        }
    }
}

impl std::str::FromStr for Anchor {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Anchor::parse(s))
    }
}

impl std::fmt::Display for Anchor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Authoritative placement mode for a watermark.
///
/// All stored distances are full-resolution pixel units; renders at a
/// different scale convert on the way in and out.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Placement {
    /// Named anchor with margins measured from its native edges/corner.
    Anchor {
        anchor: Anchor,
        margin_x: f64,
        margin_y: f64,
    },

    /// Free-form top-left position set by dragging.
    Custom { x: f64, y: f64 },
}

impl Placement {
    /// Anchor placement with the default 50px margins.
    pub fn anchored(anchor: Anchor) -> Self {
        Placement::Anchor {
            anchor,
            margin_x: 50.0,
            margin_y: 50.0,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Placement::Custom { .. })
    }
}

impl Default for Placement {
    fn default() -> Self {
        Placement::anchored(Anchor::BottomRight)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_anchor_falls_back_to_bottom_right() {
        assert_eq!(Anchor::parse("nowhere"), Anchor::BottomRight);
        assert_eq!(Anchor::parse(""), Anchor::BottomRight);
    }

    #[test]
    fn anchor_names_round_trip() {
        for anchor in Anchor::ALL {
            assert_eq!(Anchor::parse(anchor.name()), anchor);
        }
    }

    #[test]
    fn placement_serde_is_tagged() {
        let anchored = Placement::anchored(Anchor::TopCenter);
        let json = serde_json::to_string(&anchored).unwrap();
        assert!(json.contains(r#""mode":"anchor""#));
        assert!(json.contains(r#""anchor":"top_center""#));

        let custom = Placement::Custom { x: 120.0, y: 40.5 };
        let json = serde_json::to_string(&custom).unwrap();
        let back: Placement = serde_json::from_str(&json).unwrap();
        assert_eq!(back, custom);
    }
}
