//! Paint parameters shared by every stroke.

use crate::tools::BrushShape;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Smallest stroke width accepted by the store.
pub const MIN_SIZE: f32 = 1.0;
/// Largest stroke width accepted by the store.
pub const MAX_SIZE: f32 = 256.0;
/// Stroke width used when nothing has been selected yet.
pub const DEFAULT_SIZE: f32 = 5.0;

/// Error returned for malformed hex colors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid hex color: {0:?}")]
pub struct ParseColorError(String);

/// Opaque RGB color as chosen in the toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color like "#ff0000" or "#f00". The leading '#' is optional.
    pub fn from_hex(s: &str) -> Result<Self, ParseColorError> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
        let err = || ParseColorError(s.to_string());

        if !hex.is_ascii() {
            return Err(err());
        }

        match hex.len() {
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).map_err(|_| err())?;
                let g = u8::from_str_radix(&hex[2..4], 16).map_err(|_| err())?;
                let b = u8::from_str_radix(&hex[4..6], 16).map_err(|_| err())?;
                Ok(Self::new(r, g, b))
            }
            3 => {
                let nibble = |i: usize| {
                    u8::from_str_radix(&hex[i..i + 1], 16)
                        .map(|v| v * 17)
                        .map_err(|_| err())
                };
                Ok(Self::new(nibble(0)?, nibble(1)?, nibble(2)?))
            }
            _ => Err(err()),
        }
    }

    /// Format as "#rrggbb".
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl Serialize for Rgb {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Rgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

/// Current paint parameters. A single shared value, not per-stroke history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintParams {
    pub color: Rgb,
    /// Stroke width in surface pixels.
    pub size: f32,
    /// 0.0 (invisible) to 1.0 (opaque).
    pub opacity: f32,
    pub shape: BrushShape,
}

impl Default for PaintParams {
    fn default() -> Self {
        Self {
            color: Rgb::BLACK,
            size: DEFAULT_SIZE,
            opacity: 1.0,
            shape: BrushShape::Round,
        }
    }
}

/// Clamp a requested stroke width. Returns `None` for non-finite input.
pub fn sanitize_size(size: f32) -> Option<f32> {
    size.is_finite().then(|| size.clamp(MIN_SIZE, MAX_SIZE))
}

/// Clamp a requested opacity into [0, 1]. Returns `None` for non-finite input.
pub fn sanitize_opacity(opacity: f32) -> Option<f32> {
    opacity.is_finite().then(|| opacity.clamp(0.0, 1.0))
}
