use core::fmt::Display;

use displaydoc::Display;

/// A specialized result type for the hexlight device.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors that can occur while driving the hexagon display.
#[derive(Debug, Display)]
pub enum Error {
    /// invalid color `{0}`, expected `r.g.b` with components in 0..=255
    InvalidColor(String),
    /// invalid hue `{0}`, expected degrees or a color name
    InvalidHue(String),
    /// invalid brightness `{0}`, expected a value between 0 and 1
    InvalidBrightness(String),
    /// invalid hexagon index `{0}`
    InvalidHexagon(String),
    /// hexagon {index} is out of range, display has {count} hexagons
    HexagonOutOfRange { index: usize, count: usize },
    /// invalid display layout: {0}
    InvalidLayout(String),
    /// unable to write a frame to the output device: {0}
    Device(String),
    /// effect routine has been interrupted
    Interrupted,
    /// unable to spawn an effect thread: {0}
    Spawn(std::io::Error),
    /// credentials storage error: {0}
    Storage(String),
    /// smart plug error: {0}
    Plug(String),
}

impl Error {
    /// Creates a new output device error.
    pub fn device<E>(err: E) -> Self
    where
        E: core::fmt::Debug,
    {
        Self::Device(format!("{err:?}"))
    }

    /// Creates a new storage error.
    pub fn storage<E>(err: E) -> Self
    where
        E: Display,
    {
        Self::Storage(err.to_string())
    }

    pub fn plug<E>(err: E) -> Self
    where
        E: Display,
    {
        Self::Plug(err.to_string())
    }

    /// Returns `true` if the error means that a routine has observed its cancellation.
    pub const fn is_interrupted(&self) -> bool {
        matches!(self, Self::Interrupted)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            _ => None,
        }
    }
}
