//! Color wheel animations.

use std::time::Duration;

use super::{Effect, EffectContext};
use crate::{color::wheel, Result};

/// Default delay between two steps of [`CycleThroughRainbow`].
pub const CYCLE_STEP: Duration = Duration::from_millis(20);
/// Default delay between two steps of [`RainbowCycle`].
pub const RAINBOW_CYCLE_STEP: Duration = Duration::from_millis(10);

/// The whole display walks through the color wheel.
#[derive(Debug, Clone)]
pub struct CycleThroughRainbow {
    step: Duration,
}

impl Default for CycleThroughRainbow {
    fn default() -> Self {
        Self { step: CYCLE_STEP }
    }
}

impl CycleThroughRainbow {
    pub const fn new(step: Duration) -> Self {
        Self { step }
    }
}

impl Effect for CycleThroughRainbow {
    fn name(&self) -> &'static str {
        "cycle_through_rainbow"
    }

    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> Result<()> {
        for pos in 0..=u8::MAX {
            ctx.draw(|display| {
                display.paint_all(wheel(pos));
                Ok(())
            })?;
            ctx.pause(self.step)?;
        }
        Ok(())
    }
}

/// The color wheel is spread across the whole strip and rotates one step per frame.
#[derive(Debug, Clone)]
pub struct RainbowCycle {
    step: Duration,
}

impl Default for RainbowCycle {
    fn default() -> Self {
        Self {
            step: RAINBOW_CYCLE_STEP,
        }
    }
}

impl RainbowCycle {
    pub const fn new(step: Duration) -> Self {
        Self { step }
    }
}

impl Effect for RainbowCycle {
    fn name(&self) -> &'static str {
        "rainbow_cycle"
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> Result<()> {
        for offset in 0..256_usize {
            ctx.draw(|display| {
                let leds = display.leds_mut();
                let len = leds.len();
                for (i, led) in leds.iter_mut().enumerate() {
                    *led = wheel(((i * 256 / len + offset) & 0xFF) as u8);
                }
                Ok(())
            })?;
            ctx.pause(self.step)?;
        }
        Ok(())
    }
}
