use std::time::Duration;

use super::{Effect, EffectContext};
use crate::{color::BLACK, Result};

/// Default time every hexagon stays lit.
pub const FLASH_INTERVAL: Duration = Duration::from_secs(1);

/// Hexagons light up one at a time along the display path, each with the next
/// color of the active palette.
#[derive(Debug, Clone)]
pub struct FlashAround {
    interval: Duration,
}

impl Default for FlashAround {
    fn default() -> Self {
        Self {
            interval: FLASH_INTERVAL,
        }
    }
}

impl FlashAround {
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Effect for FlashAround {
    fn name(&self) -> &'static str {
        "flash_around"
    }

    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> Result<()> {
        let path = ctx.inspect(|display| display.path().to_vec());
        for (position, hexagon) in path.into_iter().enumerate() {
            ctx.draw(|display| {
                let color = display.palette().color_at(position);
                display.paint_all(BLACK);
                display.paint_hexagon(hexagon, color)
            })?;
            ctx.pause(self.interval)?;
        }
        Ok(())
    }
}
