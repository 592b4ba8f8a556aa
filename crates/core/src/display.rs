//! The shared output device.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use smart_leds::SmartLedsWrite;

use crate::{
    color::{Rgb, BLACK},
    layout::Layout,
    palette::ColorPalette,
    Error, Result,
};

/// Default display brightness.
pub const DEFAULT_BRIGHTNESS: f32 = 0.5;

/// Object safe LED strip writer.
///
/// It is implemented for every [`SmartLedsWrite`] strip, so any `smart-leds`
/// driver can be used as the display output.
pub trait OutputDriver: Send {
    /// Writes a whole frame to the strip.
    fn write_frame(&mut self, frame: &[Rgb]) -> Result<()>;
}

impl<S> OutputDriver for S
where
    S: SmartLedsWrite<Color = Rgb> + Send,
    S::Error: core::fmt::Debug,
{
    fn write_frame(&mut self, frame: &[Rgb]) -> Result<()> {
        self.write(frame.iter().copied()).map_err(Error::device)
    }
}

/// State of the hexagon wall: LED frame buffer, brightness and active palette.
///
/// Every mutating method that ends with [`Display::show`] writes a complete frame,
/// so a frame is never split between two writers as long as the display is
/// accessed through [`SharedDisplay`].
pub struct Display {
    layout: Layout,
    driver: Box<dyn OutputDriver>,
    leds: Vec<Rgb>,
    /// Last color painted on every hexagon.
    hex_colors: Vec<Rgb>,
    brightness: f32,
    palette: ColorPalette,
}

impl core::fmt::Debug for Display {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Display")
            .field("layout", &self.layout)
            .field("brightness", &self.brightness)
            .field("palette", &self.palette)
            .finish_non_exhaustive()
    }
}

impl Display {
    /// Creates a new display with the blank frame buffer.
    pub fn new<D>(layout: Layout, driver: D) -> Result<Self>
    where
        D: OutputDriver + 'static,
    {
        let layout = layout.validated()?;
        Ok(Self {
            leds: vec![BLACK; layout.strip_len()],
            hex_colors: vec![BLACK; layout.hexagons],
            layout,
            driver: Box::new(driver),
            brightness: DEFAULT_BRIGHTNESS,
            palette: ColorPalette::default(),
        })
    }

    /// Sets the initial brightness, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_brightness(mut self, brightness: f32) -> Self {
        self.brightness = brightness.clamp(0.0, 1.0);
        self
    }

    pub const fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Order in which the path based effects visit the hexagons.
    pub fn path(&self) -> &[usize] {
        &self.layout.path
    }

    pub fn hexagons(&self) -> usize {
        self.layout.hexagons
    }

    /// Last colors painted on the hexagons, in the wiring order.
    ///
    /// Per-LED animations written through [`Display::leds_mut`] do not change them.
    pub fn hex_colors(&self) -> &[Rgb] {
        &self.hex_colors
    }

    pub const fn brightness(&self) -> f32 {
        self.brightness
    }

    pub const fn palette(&self) -> &ColorPalette {
        &self.palette
    }

    /// Raw LED frame buffer, changes become visible on the next [`Display::show`].
    pub fn leds_mut(&mut self) -> &mut [Rgb] {
        &mut self.leds
    }

    /// Paints the hexagon without showing the frame.
    pub fn paint_hexagon(&mut self, index: usize, color: Rgb) -> Result<()> {
        let count = self.layout.hexagons;
        if index >= count {
            return Err(Error::HexagonOutOfRange { index, count });
        }
        let range = self.layout.leds_of(index);
        self.leds[range].fill(color);
        self.hex_colors[index] = color;
        Ok(())
    }

    /// Paints every hexagon without showing the frame.
    pub fn paint_all(&mut self, color: Rgb) {
        self.leds.fill(color);
        self.hex_colors.fill(color);
    }

    /// Makes the palette active without repainting the display.
    pub fn set_palette(&mut self, palette: ColorPalette) {
        self.palette = palette;
    }

    /// Blanks the whole display.
    pub fn clear(&mut self) -> Result<()> {
        self.paint_all(BLACK);
        self.show()
    }

    /// Sets a single color to the whole display.
    pub fn set_color(&mut self, color: Rgb) -> Result<()> {
        self.paint_all(color);
        self.show()
    }

    /// Sets a color of a single hexagon.
    pub fn set_hex_color(&mut self, index: usize, color: Rgb) -> Result<()> {
        self.paint_hexagon(index, color)?;
        self.show()
    }

    /// Changes the display brightness, the value should be within `0.0..=1.0`.
    pub fn set_brightness(&mut self, brightness: f32) -> Result<()> {
        if !(0.0..=1.0).contains(&brightness) {
            return Err(Error::InvalidBrightness(brightness.to_string()));
        }
        self.brightness = brightness;
        self.show()
    }

    /// Makes the palette active and paints the hexagons with its colors along the path.
    pub fn apply_palette(&mut self, palette: ColorPalette) -> Result<()> {
        for (position, index) in self.layout.path.clone().into_iter().enumerate() {
            self.paint_hexagon(index, palette.color_at(position))?;
        }
        self.set_palette(palette);
        self.show()
    }

    /// Writes the frame buffer to the output device.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn show(&mut self) -> Result<()> {
        let level = (self.brightness * 255.0).round() as u8;
        let frame: Vec<Rgb> = smart_leds::brightness(self.leds.iter().copied(), level).collect();
        log::trace!("Writing frame of {} LEDs, brightness {}", frame.len(), level);
        self.driver.write_frame(&frame)
    }
}

/// Display handle shared between the effect routines and the request handlers.
#[derive(Debug, Clone)]
pub struct SharedDisplay(Arc<Mutex<Display>>);

impl SharedDisplay {
    pub fn new(display: Display) -> Self {
        Self(Arc::new(Mutex::new(display)))
    }

    /// Locks the display.
    ///
    /// A routine that panicked while drawing leaves a consistent display behind,
    /// since frames are only written as a whole, so the poisoning is ignored.
    pub fn lock(&self) -> MutexGuard<'_, Display> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
