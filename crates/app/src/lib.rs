//! Hexlight application
//!
//! Owns the single effect slot of the display and maps every user request onto
//! it.

#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
// Too many false positives.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn
)]

use std::{
    net::{Ipv4Addr, SocketAddr},
    path::PathBuf,
    time::Duration,
};

use hexlight_core::{display::DEFAULT_BRIGHTNESS, playback::DEFAULT_FEED_CAPACITY, Layout};
pub use hexlight_core::{Error as HexlightError, Result as HexlightResult};
use serde::{Deserialize, Serialize};

pub use crate::{
    app::{
        BrightnessReply, HexColors, LightController, PaletteReply, PathReply, PlugReply,
        StatusReply,
    },
    credentials::CredentialsStore,
    plug::{SmartPlug, VirtualPlug},
    scheduler::{EffectScheduler, EffectStatus},
};

mod app;
mod credentials;
mod plug;
mod scheduler;

/// Default HTTP server port.
pub const DEFAULT_PORT: u16 = 5000;
/// File the streaming service credentials are cached in by default.
pub const DEFAULT_CREDENTIALS_FILE: &str = "cached-spotify-user.txt";

/// A global application configuration.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Configuration {
    pub server: ServerConfig,
    /// Physical layout of the hexagon wall.
    pub layout: Layout,
    pub display: DisplayConfig,
    pub effects: EffectsConfig,
}

impl Configuration {
    /// Parses the configuration from a TOML document, missing fields take their
    /// default values.
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP server listens on.
    pub address: SocketAddr,
    /// Where the streaming service credentials are cached.
    pub credentials: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            credentials: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Brightness the display starts with.
    pub brightness: f32,
    /// Use the in-memory smart plug instead of leaving the plug endpoints
    /// without a device.
    pub virtual_plug: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            brightness: DEFAULT_BRIGHTNESS,
            virtual_plug: false,
        }
    }
}

/// Effect timings, all durations are in milliseconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct EffectsConfig {
    pub cycle_step_ms: u64,
    pub rainbow_cycle_step_ms: u64,
    pub chase_step_ms: u64,
    pub flash_interval_ms: u64,
    pub day_time_resync_ms: u64,
    /// Number of playback events buffered for the visualizer.
    pub feed_capacity: usize,
}

impl Default for EffectsConfig {
    fn default() -> Self {
        Self {
            cycle_step_ms: 20,
            rainbow_cycle_step_ms: 10,
            chase_step_ms: 50,
            flash_interval_ms: 1_000,
            day_time_resync_ms: 60_000,
            feed_capacity: DEFAULT_FEED_CAPACITY,
        }
    }
}

impl EffectsConfig {
    pub const fn cycle_step(&self) -> Duration {
        Duration::from_millis(self.cycle_step_ms)
    }

    pub const fn rainbow_cycle_step(&self) -> Duration {
        Duration::from_millis(self.rainbow_cycle_step_ms)
    }

    pub const fn chase_step(&self) -> Duration {
        Duration::from_millis(self.chase_step_ms)
    }

    pub const fn flash_interval(&self) -> Duration {
        Duration::from_millis(self.flash_interval_ms)
    }

    pub const fn day_time_resync(&self) -> Duration {
        Duration::from_millis(self.day_time_resync_ms)
    }
}
