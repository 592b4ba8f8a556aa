//! Hexlight command line application components.

#![warn(unsafe_code, clippy::pedantic, clippy::use_self)]
// Too many false positives.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions,
    clippy::missing_const_for_fn
)]

pub use crate::{
    metronome::{Metronome, MetronomeHandle},
    strip::LogStrip,
};

mod metronome;
mod strip;
