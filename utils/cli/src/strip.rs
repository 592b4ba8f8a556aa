use core::convert::Infallible;

use hexlight_core::{color::BLACK, Rgb};
use smart_leds::SmartLedsWrite;

/// Output driver for hosts without an LED strip, it logs a summary of every frame.
#[derive(Debug, Default)]
pub struct LogStrip {
    frames: u64,
}

impl SmartLedsWrite for LogStrip {
    type Error = Infallible;
    type Color = Rgb;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: Iterator<Item = I>,
        I: Into<Self::Color>,
    {
        let (len, lit) = iterator
            .map(Into::into)
            .fold((0_usize, 0_usize), |(len, lit), led: Rgb| {
                (len + 1, lit + usize::from(led != BLACK))
            });

        self.frames += 1;
        log::trace!("Frame #{}: {lit} of {len} LEDs lit", self.frames);
        Ok(())
    }
}
