//! Test helpers

use core::convert::Infallible;
use std::sync::{Arc, Mutex, PoisonError};

use smart_leds::SmartLedsWrite;

use crate::{Display, Layout, Rgb, SharedDisplay};

/// In-memory LED strip that records every written frame.
#[derive(Debug, Clone, Default)]
pub struct RecordingStrip {
    frames: Arc<Mutex<Vec<Vec<Rgb>>>>,
}

impl RecordingStrip {
    /// Returns a snapshot of all recorded frames.
    pub fn frames(&self) -> Vec<Vec<Rgb>> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Returns the number of recorded frames.
    pub fn frames_count(&self) -> usize {
        self.frames.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn last_frame(&self) -> Option<Vec<Rgb>> {
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .last()
            .cloned()
    }
}

impl SmartLedsWrite for RecordingStrip {
    type Error = Infallible;
    type Color = Rgb;

    fn write<T, I>(&mut self, iterator: T) -> Result<(), Self::Error>
    where
        T: Iterator<Item = I>,
        I: Into<Self::Color>,
    {
        let frame = iterator.map(Into::into).collect();
        self.frames
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(frame);
        Ok(())
    }
}

/// LED strip that refuses every frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrokenStrip;

impl SmartLedsWrite for BrokenStrip {
    type Error = &'static str;
    type Color = Rgb;

    fn write<T, I>(&mut self, _iterator: T) -> Result<(), Self::Error>
    where
        T: Iterator<Item = I>,
        I: Into<Self::Color>,
    {
        Err("strip is disconnected")
    }
}

/// Creates a small full brightness display backed by the recording strip.
pub fn recording_display() -> (SharedDisplay, RecordingStrip) {
    let strip = RecordingStrip::default();
    let layout = Layout {
        hexagons: 4,
        leds_per_hexagon: 6,
        path: vec![2, 0, 3, 1],
    };
    let display = Display::new(layout, strip.clone())
        .expect("test layout should be valid")
        .with_brightness(1.0);
    (SharedDisplay::new(display), strip)
}
