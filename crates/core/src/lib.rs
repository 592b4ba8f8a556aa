//! Hexlight core
//!
//! Rendering primitives of the hexagon wall and the effect routines that drive it.

#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
// Too many false positives.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn
)]

pub use crate::{
    color::{ColorTriple, Rgb},
    display::{Display, OutputDriver, SharedDisplay},
    effect::{Effect, EffectState, RunOptions, StopHook},
    errors::{Error, Result},
    layout::Layout,
    palette::{ColorPalette, Hue},
    signal::CancellationSignal,
};

pub mod color;
pub mod display;
pub mod effect;
pub mod errors;
pub mod layout;
pub mod palette;
pub mod playback;
pub mod signal;
pub mod test_utils;
