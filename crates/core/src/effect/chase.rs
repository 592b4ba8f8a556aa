use std::time::Duration;

use super::{Effect, EffectContext};
use crate::{
    color::{wheel, BLACK},
    display::Display,
    Result,
};

/// Default delay between two chase frames.
pub const CHASE_STEP: Duration = Duration::from_millis(50);

/// Every LED in a group of [`RainbowChase::SPACING`] is lit, the lit LEDs crawl
/// along the strip while their colors follow the color wheel.
#[derive(Debug, Clone)]
pub struct RainbowChase {
    step: Duration,
}

impl Default for RainbowChase {
    fn default() -> Self {
        Self { step: CHASE_STEP }
    }
}

impl RainbowChase {
    pub const SPACING: usize = 3;

    pub const fn new(step: Duration) -> Self {
        Self { step }
    }
}

impl Effect for RainbowChase {
    fn name(&self) -> &'static str {
        "rainbow_chase"
    }

    fn prepare(&mut self, display: &mut Display) -> Result<()> {
        display.clear()
    }

    #[allow(clippy::cast_possible_truncation)]
    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> Result<()> {
        for offset in 0..256_usize {
            for phase in 0..Self::SPACING {
                ctx.draw(|display| {
                    for (i, led) in display.leds_mut().iter_mut().enumerate() {
                        *led = if i % Self::SPACING == phase {
                            wheel(((i + offset) % 255) as u8)
                        } else {
                            BLACK
                        };
                    }
                    Ok(())
                })?;
                ctx.pause(self.step)?;
            }
        }
        Ok(())
    }
}
