//! Hexlight application business-logic implementation

use std::{collections::BTreeMap, sync::Arc};

use hexlight_core::{
    effect::{CycleThroughRainbow, DayTimeSync, FlashAround, RainbowChase, RainbowCycle, Visualizer},
    playback::{PlaybackFeed, PlaybackPublisher},
    ColorPalette, ColorTriple, EffectState, Hue, RunOptions, SharedDisplay,
};
use serde::Serialize;

use crate::{CredentialsStore, EffectScheduler, EffectsConfig, HexlightResult, SmartPlug};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BrightnessReply {
    pub brightness: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathReply {
    pub path: Vec<usize>,
}

/// Hexagon colors keyed by the hexagon index.
pub type HexColors = BTreeMap<usize, ColorTriple>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteReply {
    pub color_palette: Vec<ColorTriple>,
}

impl From<&ColorPalette> for PaletteReply {
    fn from(palette: &ColorPalette) -> Self {
        Self {
            color_palette: palette.colors().iter().copied().map(ColorTriple).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlugReply {
    pub is_on: bool,
}

/// Name and state of the effect occupying the slot, both are `null` when idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatusReply {
    pub effect: Option<&'static str>,
    pub state: Option<EffectState>,
}

/// Hexlight application facade.
///
/// Every method corresponds to a single user request. Effects are started
/// through the scheduler, direct writes that repaint the display pre-empt the
/// running effect first.
pub struct LightController {
    scheduler: EffectScheduler,
    feed: Arc<PlaybackFeed>,
    credentials: CredentialsStore,
    plug: Option<Box<dyn SmartPlug>>,
    effects: EffectsConfig,
}

impl core::fmt::Debug for LightController {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LightController")
            .field("scheduler", &self.scheduler)
            .field("credentials", &self.credentials)
            .field("has_plug", &self.plug.is_some())
            .finish_non_exhaustive()
    }
}

impl LightController {
    /// Creates a new controller without a smart plug.
    pub fn new(display: SharedDisplay, credentials: CredentialsStore, effects: EffectsConfig) -> Self {
        Self {
            scheduler: EffectScheduler::new(display),
            feed: PlaybackFeed::new(effects.feed_capacity),
            credentials,
            plug: None,
            effects,
        }
    }

    /// Attaches the smart plug that powers the display.
    #[must_use]
    pub fn with_plug<P>(mut self, plug: P) -> Self
    where
        P: SmartPlug + 'static,
    {
        self.plug = Some(Box::new(plug));
        self
    }

    pub fn scheduler(&self) -> &EffectScheduler {
        &self.scheduler
    }

    /// Returns a publisher for the streaming service playback timing data.
    pub fn playback_publisher(&self) -> PlaybackPublisher {
        self.feed.publisher()
    }

    pub fn credentials(&self) -> &CredentialsStore {
        &self.credentials
    }

    pub fn clear(&self) -> HexlightResult<String> {
        self.scheduler.exclusive(|display| display.clear())?;
        Ok("Display cleared".to_owned())
    }

    pub fn cycle_through_rainbow(&self) -> HexlightResult<String> {
        self.scheduler.switch(
            CycleThroughRainbow::new(self.effects.cycle_step()),
            RunOptions::REPEAT,
        )?;
        Ok("Mode set to Cycle through Rainbow".to_owned())
    }

    pub fn rainbow_cycle(&self) -> HexlightResult<String> {
        self.scheduler.switch(
            RainbowCycle::new(self.effects.rainbow_cycle_step()),
            RunOptions::REPEAT,
        )?;
        Ok("Mode set to Rainbow Cycle".to_owned())
    }

    pub fn play_song(&self) -> HexlightResult<String> {
        self.scheduler
            .switch(Visualizer::new(self.feed.clone()), RunOptions::REPEAT)?;
        Ok("Visualizing song".to_owned())
    }

    /// Stops the running effect and caches the streaming service credentials.
    ///
    /// The client is expected to request [`LightController::play_song`] next.
    pub fn authenticate(&self, credentials: &str) -> HexlightResult<()> {
        self.scheduler.stop_all();
        self.credentials.store(credentials)
    }

    pub fn set_color(&self, color: ColorTriple) -> HexlightResult<String> {
        self.scheduler
            .exclusive(|display| display.set_color(color.0))?;
        Ok(format!("Color set to {color}"))
    }

    pub fn set_hex_color(&self, index: usize, color: ColorTriple) -> HexlightResult<String> {
        self.scheduler
            .exclusive(|display| display.set_hex_color(index, color.0))?;
        Ok(format!("Color set to {color}"))
    }

    pub fn flash_around(&self) -> HexlightResult<String> {
        self.scheduler.switch(
            FlashAround::new(self.effects.flash_interval()),
            RunOptions::REPEAT,
        )?;
        Ok("Flashing around".to_owned())
    }

    /// Changes the brightness without stopping the running effect, the new
    /// value applies from the next frame on.
    pub fn set_brightness(&self, brightness: f32) -> HexlightResult<String> {
        self.scheduler.display().lock().set_brightness(brightness)?;
        Ok(format!("Brightness set to {brightness:.6}"))
    }

    pub fn brightness(&self) -> BrightnessReply {
        BrightnessReply {
            brightness: self.scheduler.display().lock().brightness(),
        }
    }

    pub fn path(&self) -> PathReply {
        PathReply {
            path: self.scheduler.display().lock().path().to_vec(),
        }
    }

    pub fn hex_colors(&self) -> HexColors {
        self.scheduler
            .display()
            .lock()
            .hex_colors()
            .iter()
            .copied()
            .map(ColorTriple)
            .enumerate()
            .collect()
    }

    /// Generates a palette around the given hue, or a random one, and paints
    /// the hexagons with it.
    pub fn set_color_palette(&self, hue: Option<Hue>) -> HexlightResult<PaletteReply> {
        let hue = hue.unwrap_or_else(Hue::random);
        let palette = ColorPalette::from_hue(hue);
        let reply = PaletteReply::from(&palette);
        self.scheduler
            .exclusive(|display| display.apply_palette(palette))?;
        log::info!("Applied color palette around {:.1} degrees", hue.degrees());
        Ok(reply)
    }

    pub fn day_time(&self) -> HexlightResult<String> {
        self.scheduler.switch(
            DayTimeSync::new(self.effects.day_time_resync()),
            RunOptions::REPEAT,
        )?;
        Ok("Synced to daytime".to_owned())
    }

    pub fn chase(&self) -> HexlightResult<String> {
        self.scheduler
            .switch(RainbowChase::new(self.effects.chase_step()), RunOptions::REPEAT)?;
        Ok("Chasing".to_owned())
    }

    pub fn toggle_power(&self) -> HexlightResult<PlugReply> {
        let Some(plug) = &self.plug else {
            log::warn!("Unable to toggle power, no smart plug is configured");
            return Ok(PlugReply { is_on: false });
        };
        Ok(PlugReply {
            is_on: plug.toggle()?,
        })
    }

    pub fn plug_state(&self) -> HexlightResult<PlugReply> {
        let is_on = match &self.plug {
            Some(plug) => plug.is_on()?,
            None => false,
        };
        Ok(PlugReply { is_on })
    }

    pub fn status(&self) -> StatusReply {
        let current = self.scheduler.current();
        StatusReply {
            effect: current.map(|status| status.name),
            state: current.map(|status| status.state),
        }
    }
}
