//! Watermark configuration types.
//!
//! A [`WatermarkConfig`] is the complete description of one watermark: its
//! kind (text or image), the styling for both kinds, placement, and
//! rotation. It is the unit persisted by templates and the last-used record.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::position::Placement;

/// Errors raised by the model layer.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Invalid color value: {value}")]
    InvalidColor { value: String },

    #[error("Failed to read {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Which watermark kind is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WatermarkKind {
    #[default]
    Text,
    Image,
}

/// An opaque RGB fill color, serialized as `#RRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Rgb = Rgb {
        r: 255,
        g: 255,
        b: 255,
    };
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    /// Parse a `#RRGGBB` hex string (leading `#` optional).
    pub fn from_hex(value: &str) -> Result<Self, ModelError> {
        let digits = value.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ModelError::InvalidColor {
                value: value.to_string(),
            });
        }
        let parse = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&digits[range], 16).map_err(|_| ModelError::InvalidColor {
                value: value.to_string(),
            })
        };
        Ok(Rgb {
            r: parse(0..2)?,
            g: parse(2..4)?,
            b: parse(4..6)?,
        })
    }

    /// Format as `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Rgb::from_hex(&value).map_err(serde::de::Error::custom)
    }
}

/// Styling for a text watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextWatermark {
    /// The watermark string. Empty text renders as a no-op.
    pub content: String,

    /// Preferred font family stem (e.g. "DejaVuSans"). `None` uses the
    /// built-in candidate lists.
    pub font_family: Option<String>,

    /// Font size in pixels at full resolution.
    pub font_size: u32,

    pub bold: bool,
    pub italic: bool,

    /// Fill color.
    pub color: Rgb,

    /// Opacity on the 0-100 UI scale.
    pub opacity_percent: u8,

    /// Draw a 1px contrasting ring behind the fill.
    pub outline: bool,
    pub outline_color: Rgb,

    /// Draw a soft offset copy behind the fill.
    pub shadow: bool,
}

impl Default for TextWatermark {
    fn default() -> Self {
        Self {
            content: "© watermark".to_string(),
            font_family: None,
            font_size: 36,
            bold: false,
            italic: false,
            color: Rgb::WHITE,
            opacity_percent: 50,
            outline: false,
            outline_color: Rgb::BLACK,
            shadow: false,
        }
    }
}

/// Styling for an image watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageWatermark {
    /// Source image path. `None` (or a missing file) renders as a no-op.
    pub source: Option<PathBuf>,

    /// Scale relative to the source image size, in percent.
    pub scale_percent: u32,

    /// Opacity on the 0-100 UI scale, multiplied into the source's own
    /// alpha channel.
    pub opacity_percent: u8,
}

impl Default for ImageWatermark {
    fn default() -> Self {
        Self {
            source: None,
            scale_percent: 100,
            opacity_percent: 50,
        }
    }
}

/// The complete description of one watermark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkConfig {
    /// Active kind. Both style blocks are kept so switching kinds does not
    /// lose edits.
    pub kind: WatermarkKind,

    pub text: TextWatermark,
    pub image: ImageWatermark,

    /// Anchor-or-custom placement, offsets in full-resolution pixels.
    pub placement: Placement,

    /// Rotation in degrees, clockwise-positive, applied about the layer
    /// center.
    pub rotation_degrees: f32,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            kind: WatermarkKind::Text,
            text: TextWatermark::default(),
            image: ImageWatermark::default(),
            placement: Placement::default(),
            rotation_degrees: 0.0,
        }
    }
}

/// Map a 0-100 UI opacity to an 8-bit alpha value.
pub fn opacity_to_alpha(percent: u8) -> u8 {
    (f32::from(percent.min(100)) * 2.55).round() as u8
}
