//! Color values and randomization.
//!
//! Entity colors are linear-free sRGB triples (`palette::Srgb<f32>`); opacity is
//! tracked separately on scene nodes. Configuration files describe colors with
//! [`ColorValue`], which accepts either an `{ r, g, b }` object or a hex string.

use palette::Srgb;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// An sRGB color with components in `0.0..=1.0`.
pub type Color = Srgb<f32>;

/// Returns a color whose components are each sampled uniformly from `0.0..1.0`.
pub fn random_color(rng: &mut impl Rng) -> Color {
    Srgb::new(rng.random::<f32>(), rng.random::<f32>(), rng.random::<f32>())
}

/// Color value as it appears in configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Float components in `0.0..=1.0`.
    Rgb { r: f32, g: f32, b: f32 },
    /// Hex color string (e.g., "#FF0000").
    Hex(HexColor),
}

impl ColorValue {
    pub fn to_color(self) -> Color {
        match self {
            ColorValue::Rgb { r, g, b } => Srgb::new(r, g, b),
            ColorValue::Hex(hex) => Srgb::new(hex.r, hex.g, hex.b).into_format(),
        }
    }
}

/// Hex color wrapper for serde.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HexColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Serialize for HexColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let hex = format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b);
        serializer.serialize_str(&hex)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let s = s.trim_start_matches('#');
        if s.len() != 6 {
            return Err(serde::de::Error::custom("hex color must be 6 characters"));
        }
        let r = u8::from_str_radix(&s[0..2], 16).map_err(serde::de::Error::custom)?;
        let g = u8::from_str_radix(&s[2..4], 16).map_err(serde::de::Error::custom)?;
        let b = u8::from_str_radix(&s[4..6], 16).map_err(serde::de::Error::custom)?;
        Ok(HexColor { r, g, b })
    }
}
