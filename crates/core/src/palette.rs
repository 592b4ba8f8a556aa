//! Color palettes generated around a base hue.

use core::str::FromStr;

use rand::Rng;
use serde::Serialize;

use crate::{
    color::{hsv2rgb, ColorTriple, Hsv, Rgb},
    Error,
};

/// Number of colors in a generated palette.
pub const PALETTE_LEN: usize = 5;

/// Hue offsets in degrees of the palette colors relative to the base hue.
const HUE_OFFSETS: [f32; PALETTE_LEN] = [-40.0, -20.0, 0.0, 20.0, 40.0];
/// Saturation of the palette colors, the base color is the most saturated one.
const SATURATIONS: [u8; PALETTE_LEN] = [200, 230, 255, 230, 200];

/// Base hue of a palette in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hue(f32);

impl Hue {
    const NAMED: [(&'static str, f32); 8] = [
        ("red", 0.0),
        ("orange", 30.0),
        ("yellow", 60.0),
        ("green", 120.0),
        ("cyan", 180.0),
        ("blue", 240.0),
        ("purple", 280.0),
        ("pink", 320.0),
    ];

    /// Creates a hue from degrees, wrapping them into `0.0..360.0`.
    pub fn from_degrees(degrees: f32) -> Self {
        Self(degrees.rem_euclid(360.0))
    }

    /// Picks a random hue.
    pub fn random() -> Self {
        Self(rand::thread_rng().gen_range(0.0..360.0))
    }

    pub const fn degrees(self) -> f32 {
        self.0
    }
}

impl FromStr for Hue {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(degrees) = s.parse::<f32>() {
            if degrees.is_finite() {
                return Ok(Self::from_degrees(degrees));
            }
        }

        Self::NAMED
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(s))
            .map(|(_, degrees)| Self(*degrees))
            .ok_or_else(|| Error::InvalidHue(s.to_owned()))
    }
}

/// An ordered set of colors used by the palette based effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    colors: Vec<Rgb>,
}

impl ColorPalette {
    /// Generates an analogous palette around the given hue.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_hue(hue: Hue) -> Self {
        let colors = HUE_OFFSETS
            .iter()
            .zip(SATURATIONS)
            .map(|(offset, sat)| {
                let degrees = (hue.degrees() + offset).rem_euclid(360.0);
                hsv2rgb(Hsv {
                    hue: (degrees / 360.0 * 256.0) as u8,
                    sat,
                    val: 255,
                })
            })
            .collect();
        Self { colors }
    }

    /// Palette with the full color wheel, used until a palette is chosen.
    #[allow(clippy::cast_possible_truncation)]
    pub fn rainbow() -> Self {
        let colors = (0..PALETTE_LEN)
            .map(|i| crate::color::wheel((i * 256 / PALETTE_LEN) as u8))
            .collect();
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    /// Returns a palette color for the given position, wrapping around.
    pub fn color_at(&self, index: usize) -> Rgb {
        self.colors[index % self.colors.len()]
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::rainbow()
    }
}

impl Serialize for ColorPalette {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.colors.iter().copied().map(ColorTriple))
    }
}
