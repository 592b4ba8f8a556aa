//! Color primitives shared by the display and the effect routines.

use core::{fmt::Display, str::FromStr};

use serde::{Serialize, Serializer};
pub use smart_leds::hsv::{hsv2rgb, Hsv};
pub use smart_leds::RGB8;

use crate::Error;

/// Color type used across the whole rendering pipeline.
pub type Rgb = RGB8;

/// Completely dark pixel.
pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// A color given as a `r.g.b` triple, the format used by the HTTP endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColorTriple(pub Rgb);

impl FromStr for ColorTriple {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidColor(s.to_owned());

        let mut components = s.split('.').map(|part| part.trim().parse::<u8>());
        let (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) = (
            components.next(),
            components.next(),
            components.next(),
            components.next(),
        ) else {
            return Err(invalid());
        };
        Ok(Self(Rgb { r, g, b }))
    }
}

impl Display for ColorTriple {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {}, {})", self.0.r, self.0.g, self.0.b)
    }
}

impl Serialize for ColorTriple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [self.0.r, self.0.g, self.0.b].serialize(serializer)
    }
}

impl From<Rgb> for ColorTriple {
    fn from(value: Rgb) -> Self {
        Self(value)
    }
}

/// Classic 256 step color wheel: red -> green -> blue -> red.
///
/// Every returned color has its channels summing up to 255, so the wheel never
/// yields a dark pixel.
pub const fn wheel(pos: u8) -> Rgb {
    match pos {
        0..=84 => Rgb {
            r: 255 - pos * 3,
            g: pos * 3,
            b: 0,
        },
        85..=169 => {
            let pos = pos - 85;
            Rgb {
                r: 0,
                g: 255 - pos * 3,
                b: pos * 3,
            }
        }
        _ => {
            let pos = pos - 170;
            Rgb {
                r: pos * 3,
                g: 0,
                b: 255 - pos * 3,
            }
        }
    }
}

/// Multiplies every channel by the given factor clamped to `0.0..=1.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn scale(color: Rgb, factor: f32) -> Rgb {
    let factor = factor.clamp(0.0, 1.0);
    let channel = |c: u8| (f32::from(c) * factor).round() as u8;
    Rgb {
        r: channel(color.r),
        g: channel(color.g),
        b: channel(color.b),
    }
}

/// Linear interpolation between two colors, `t` is clamped to `0.0..=1.0`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn lerp(from: Rgb, to: Rgb, t: f32) -> Rgb {
    let t = t.clamp(0.0, 1.0);
    let channel = |a: u8, b: u8| {
        let (a, b) = (f32::from(a), f32::from(b));
        (a + (b - a) * t).round() as u8
    };
    Rgb {
        r: channel(from.r, to.r),
        g: channel(from.g, to.g),
        b: channel(from.b, to.b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wheel_is_never_dark() {
        for pos in 0..=255_u8 {
            let color = wheel(pos);
            assert_eq!(
                u16::from(color.r) + u16::from(color.g) + u16::from(color.b),
                255
            );
        }
    }

    #[test]
    fn test_lerp_bounds() {
        let from = Rgb { r: 0, g: 100, b: 200 };
        let to = Rgb { r: 200, g: 100, b: 0 };
        assert_eq!(lerp(from, to, 0.0), from);
        assert_eq!(lerp(from, to, 1.0), to);
        assert_eq!(lerp(from, to, 0.5), Rgb { r: 100, g: 100, b: 100 });
    }
}
