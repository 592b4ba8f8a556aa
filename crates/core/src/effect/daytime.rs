//! Display color that follows the time of day.

use std::time::Duration;

use chrono::{Local, NaiveTime, Timelike};

use super::{Effect, EffectContext};
use crate::{
    color::{lerp, Rgb},
    display::Display,
    Result,
};

/// Default period between two synchronizations.
pub const RESYNC_PERIOD: Duration = Duration::from_secs(60);

/// Sky colors for the given hour of the day, the color between two keyframes is
/// interpolated.
const SKY: [(u32, Rgb); 8] = [
    (0, Rgb { r: 10, g: 10, b: 60 }),
    (5, Rgb { r: 40, g: 20, b: 90 }),
    (7, Rgb { r: 255, g: 120, b: 40 }),
    (9, Rgb { r: 255, g: 200, b: 150 }),
    (13, Rgb { r: 255, g: 250, b: 230 }),
    (18, Rgb { r: 255, g: 160, b: 70 }),
    (20, Rgb { r: 120, g: 50, b: 140 }),
    (22, Rgb { r: 20, g: 20, b: 80 }),
];

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Returns the sky color for the given local time.
#[allow(clippy::cast_precision_loss)]
pub fn sky_color(time: NaiveTime) -> Rgb {
    let minute = time.hour() * 60 + time.minute();

    let next = SKY
        .iter()
        .position(|(hour, _)| hour * 60 > minute)
        .unwrap_or(SKY.len());
    let (from_hour, from) = SKY[(next + SKY.len() - 1) % SKY.len()];
    let (to_hour, to) = SKY[next % SKY.len()];

    let from_minute = from_hour * 60;
    // The last keyframe wraps around midnight.
    let to_minute = if to_hour * 60 > from_minute {
        to_hour * 60
    } else {
        to_hour * 60 + MINUTES_PER_DAY
    };
    let t = (minute - from_minute) as f32 / (to_minute - from_minute) as f32;
    lerp(from, to, t)
}

type Clock = Box<dyn Fn() -> NaiveTime + Send>;

/// Paints the whole display with the sky color of the current local time and
/// keeps it in sync.
pub struct DayTimeSync {
    period: Duration,
    clock: Clock,
}

impl core::fmt::Debug for DayTimeSync {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DayTimeSync")
            .field("period", &self.period)
            .finish_non_exhaustive()
    }
}

impl Default for DayTimeSync {
    fn default() -> Self {
        Self::new(RESYNC_PERIOD)
    }
}

impl DayTimeSync {
    pub fn new(period: Duration) -> Self {
        Self::with_clock(period, || Local::now().time())
    }

    /// Creates the effect that reads the time from the given clock.
    pub fn with_clock<C>(period: Duration, clock: C) -> Self
    where
        C: Fn() -> NaiveTime + Send + 'static,
    {
        Self {
            period,
            clock: Box::new(clock),
        }
    }

    fn sync(&self, display: &mut Display) {
        let time = (self.clock)();
        let color = sky_color(time);
        log::debug!("Syncing display to {time}: {color:?}");
        display.paint_all(color);
    }
}

impl Effect for DayTimeSync {
    fn name(&self) -> &'static str {
        "day_time"
    }

    /// The first synchronization happens before the request is answered.
    fn prepare(&mut self, display: &mut Display) -> Result<()> {
        self.sync(display);
        display.show()
    }

    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> Result<()> {
        ctx.pause(self.period)?;
        ctx.draw(|display| {
            self.sync(display);
            Ok(())
        })
    }
}
