//! Geometry of the hexagon wall.

use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Default number of hexagons in the wall.
pub const DEFAULT_HEXAGONS: usize = 7;
/// Default number of LEDs along the perimeter of a single hexagon.
pub const DEFAULT_LEDS_PER_HEXAGON: usize = 18;

/// Physical layout of the display.
///
/// LEDs are chained hexagon after hexagon, so the LEDs of hexagon `i` occupy the
/// `i * leds_per_hexagon..(i + 1) * leds_per_hexagon` range of the strip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub hexagons: usize,
    pub leds_per_hexagon: usize,
    /// Order in which the path based effects visit the hexagons.
    ///
    /// An empty path means the wiring order.
    #[serde(default)]
    pub path: Vec<usize>,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            hexagons: DEFAULT_HEXAGONS,
            leds_per_hexagon: DEFAULT_LEDS_PER_HEXAGON,
            path: Vec::new(),
        }
    }
}

impl Layout {
    /// Checks the layout and fills the default path if needed.
    pub fn validated(mut self) -> Result<Self> {
        if self.hexagons == 0 || self.leds_per_hexagon == 0 {
            return Err(Error::InvalidLayout(
                "display should have at least one hexagon with one LED".to_owned(),
            ));
        }

        if self.path.is_empty() {
            self.path = (0..self.hexagons).collect();
        }

        let mut visited = vec![false; self.hexagons];
        for &index in &self.path {
            match visited.get_mut(index) {
                None => {
                    return Err(Error::HexagonOutOfRange {
                        index,
                        count: self.hexagons,
                    })
                }
                Some(seen) if *seen => {
                    return Err(Error::InvalidLayout(format!(
                        "hexagon {index} occurs in the path more than once"
                    )))
                }
                Some(seen) => *seen = true,
            }
        }
        if visited.iter().any(|seen| !seen) {
            return Err(Error::InvalidLayout(
                "path should visit every hexagon".to_owned(),
            ));
        }

        Ok(self)
    }

    /// Total number of LEDs in the strip.
    pub const fn strip_len(&self) -> usize {
        self.hexagons * self.leds_per_hexagon
    }

    /// Returns the strip range occupied by the given hexagon.
    pub const fn leds_of(&self, hexagon: usize) -> Range<usize> {
        let start = hexagon * self.leds_per_hexagon;
        start..start + self.leds_per_hexagon
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_path() {
        let layout = Layout::default().validated().unwrap();
        assert_eq!(layout.path, (0..DEFAULT_HEXAGONS).collect::<Vec<_>>());
        assert_eq!(layout.strip_len(), DEFAULT_HEXAGONS * DEFAULT_LEDS_PER_HEXAGON);
        assert_eq!(layout.leds_of(1), 18..36);
    }

    #[test]
    fn test_invalid_path() {
        let layout = Layout {
            hexagons: 3,
            leds_per_hexagon: 6,
            path: vec![0, 2, 2],
        };
        assert!(matches!(layout.validated(), Err(Error::InvalidLayout(_))));

        let layout = Layout {
            hexagons: 3,
            leds_per_hexagon: 6,
            path: vec![0, 1, 3],
        };
        assert!(matches!(
            layout.validated(),
            Err(Error::HexagonOutOfRange { index: 3, count: 3 })
        ));
    }
}
