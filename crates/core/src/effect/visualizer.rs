//! Audio reactive visualization driven by playback timing data.

use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use super::{Effect, EffectContext, StopHook};
use crate::{
    color::{hsv2rgb, scale, Hsv},
    display::Display,
    palette::{ColorPalette, Hue},
    playback::{PlaybackEvent, PlaybackFeed, PITCH_CLASSES},
    Error, Result,
};

/// Longest time a beat stays at its full loudness before it decays.
const MAX_BEAT_HOLD: Duration = Duration::from_millis(200);
/// Brightness of a decayed beat relative to its loudness.
const BEAT_DECAY: f32 = 0.3;

/// Pulses the display with the beats and segments of the current track.
///
/// The routine blocks on the playback feed between events, so besides the
/// cancellation signal it has to be stopped through its [`StopHook`].
#[derive(Debug)]
pub struct Visualizer {
    control: Arc<VisualizerControl>,
}

#[derive(Debug)]
struct VisualizerControl {
    feed: Arc<PlaybackFeed>,
    should_run: AtomicBool,
}

impl StopHook for VisualizerControl {
    fn request_stop(&self) {
        self.should_run.store(false, Ordering::Release);
        self.feed.interrupt();
    }
}

impl Visualizer {
    pub fn new(feed: Arc<PlaybackFeed>) -> Self {
        Self {
            control: Arc::new(VisualizerControl {
                feed,
                should_run: AtomicBool::new(false),
            }),
        }
    }

    fn next_event(&self) -> Result<PlaybackEvent> {
        if !self.control.should_run.load(Ordering::Acquire) {
            return Err(Error::Interrupted);
        }
        self.control.feed.next_event().ok_or(Error::Interrupted)
    }

    fn beat(ctx: &mut EffectContext<'_>, loudness: f32, duration: Duration) -> Result<()> {
        let paint = |display: &mut Display, level: f32| -> Result<()> {
            let path = display.path().to_vec();
            for (position, hexagon) in path.into_iter().enumerate() {
                let color = scale(display.palette().color_at(position), level);
                display.paint_hexagon(hexagon, color)?;
            }
            Ok(())
        };

        ctx.draw(|display| paint(display, loudness))?;
        ctx.pause((duration / 2).min(MAX_BEAT_HOLD))?;
        ctx.draw(|display| paint(display, loudness * BEAT_DECAY))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn segment(
        ctx: &mut EffectContext<'_>,
        loudness: f32,
        pitches: &[f32; PITCH_CLASSES],
    ) -> Result<()> {
        ctx.draw(|display| {
            let path = display.path().to_vec();
            for (position, hexagon) in path.into_iter().enumerate() {
                let pitch = position % PITCH_CLASSES;
                let strength = (pitches[pitch] * loudness).clamp(0.0, 1.0);
                let color = hsv2rgb(Hsv {
                    hue: (pitch * 256 / PITCH_CLASSES) as u8,
                    sat: 255,
                    val: (strength * 255.0) as u8,
                });
                display.paint_hexagon(hexagon, color)?;
            }
            Ok(())
        })
    }
}

impl Effect for Visualizer {
    fn name(&self) -> &'static str {
        "visualizer"
    }

    fn prepare(&mut self, display: &mut Display) -> Result<()> {
        let stale = self.control.feed.drain();
        if stale > 0 {
            log::debug!("Dropped {stale} stale playback events");
        }
        self.control.should_run.store(true, Ordering::Release);
        display.clear()
    }

    fn render_pass(&mut self, ctx: &mut EffectContext<'_>) -> Result<()> {
        let event = self.next_event()?;
        ctx.checkpoint()?;
        match event {
            PlaybackEvent::Beat { loudness, duration } => Self::beat(ctx, loudness, duration),
            PlaybackEvent::Segment { loudness, pitches } => Self::segment(ctx, loudness, &pitches),
            PlaybackEvent::Paused => ctx.draw(|display| {
                display.paint_all(crate::color::BLACK);
                Ok(())
            }),
            PlaybackEvent::TrackChanged { title } => {
                log::info!("Visualizing track \"{title}\"");
                ctx.draw(|display| {
                    display.set_palette(ColorPalette::from_hue(Hue::random()));
                    Ok(())
                })
            }
        }
    }

    fn stop_hook(&self) -> Option<Arc<dyn StopHook>> {
        Some(self.control.clone())
    }
}
