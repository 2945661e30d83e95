//! SSD1306 OLED display wrapper.
//!
//! The controller thinks in two stacked layers. The panel has no
//! transparency, so a foreground image is drawn opaquely over the whole
//! frame and removing it brings the backdrop back.

use crate::error::Error;
use ancs_icons::config::{Icon, BLE_DEVICE_NAME};
use ancs_icons::controller::{DisplaySink, Image, Layer};
use defmt::warn;
use embedded_graphics::mono_font::ascii::{FONT_6X10, FONT_9X15_BOLD};
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle, RoundedRectangle};
use embedded_graphics::text::{Alignment, Text};
use ssd1306::mode::BufferedGraphicsMode;
use ssd1306::prelude::*;
use ssd1306::I2CDisplayInterface;
use ssd1306::Ssd1306;

/// Type alias for the concrete display driver.
///
/// Generic over the I²C implementation so callers pass in their HAL's
/// I²C peripheral.
pub type Display<I2C> =
    Ssd1306<I2CInterface<I2C>, DisplaySize128x64, BufferedGraphicsMode<DisplaySize128x64>>;

/// Initialise the SSD1306 display and clear the screen.
pub fn init<I2C>(i2c: I2C) -> Display<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    let interface = I2CDisplayInterface::new(i2c);
    let mut display = Ssd1306::new(interface, DisplaySize128x64, DisplayRotation::Rotate0)
        .into_buffered_graphics_mode();
    let _ = display.init();
    display.clear_buffer();
    let _ = display.flush();
    display
}

fn text_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_6X10)
        .text_color(BinaryColor::On)
        .build()
}

fn label_style() -> MonoTextStyle<'static, BinaryColor> {
    MonoTextStyleBuilder::new()
        .font(&FONT_9X15_BOLD)
        .text_color(BinaryColor::On)
        .build()
}

/// "Connect your phone" backdrop.
fn draw_connect<I2C>(display: &mut Display<I2C>)
where
    I2C: embedded_hal::i2c::I2c,
{
    let center = Alignment::Center;
    let _ = Text::with_alignment("Connect your", Point::new(64, 14), text_style(), center)
        .draw(display);
    let _ = Text::with_alignment("iPhone via", Point::new(64, 26), text_style(), center)
        .draw(display);
    let _ = Text::with_alignment("Bluetooth to", Point::new(64, 38), text_style(), center)
        .draw(display);
    let _ = Text::with_alignment(BLE_DEVICE_NAME, Point::new(64, 54), label_style(), center)
        .draw(display);
}

fn draw_no_notifications<I2C>(display: &mut Display<I2C>)
where
    I2C: embedded_hal::i2c::I2c,
{
    let _ = Text::with_alignment(
        "No notifications",
        Point::new(64, 36),
        text_style(),
        Alignment::Center,
    )
    .draw(display);
}

/// App icon: rounded tile with the app's label in the middle.
fn draw_icon<I2C>(display: &mut Display<I2C>, icon: Icon)
where
    I2C: embedded_hal::i2c::I2c,
{
    let tile = Rectangle::new(Point::new(14, 6), Size::new(100, 52));
    let _ = RoundedRectangle::with_equal_corners(tile, Size::new(10, 10))
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, 2))
        .draw(display);
    let _ = Text::with_alignment(icon.label(), Point::new(64, 37), label_style(), Alignment::Center)
        .draw(display);
}

/// [`DisplaySink`] on top of the SSD1306.
pub struct OledSink<I2C> {
    display: Display<I2C>,
    backdrop: Option<Image>,
    foreground: Option<Image>,
}

impl<I2C> OledSink<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    pub fn new(i2c: I2C) -> Self {
        Self {
            display: init(i2c),
            backdrop: None,
            foreground: None,
        }
    }

    /// Redraw the topmost layer into a fresh frame and push it out.
    fn redraw(&mut self) -> Result<(), Error> {
        self.display.clear_buffer();

        match self.foreground.or(self.backdrop) {
            Some(Image::Connect) => draw_connect(&mut self.display),
            Some(Image::NoNotifications) => draw_no_notifications(&mut self.display),
            Some(Image::App(icon)) => draw_icon(&mut self.display, icon),
            None => {}
        }

        self.display.flush().map_err(|_| Error::Display)
    }

    fn refresh(&mut self) {
        if let Err(e) = self.redraw() {
            warn!("Display update failed: {}", e);
        }
    }
}

impl<I2C> DisplaySink for OledSink<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    fn show(&mut self, layer: Layer, image: Image) {
        match layer {
            Layer::Backdrop => self.backdrop = Some(image),
            Layer::Foreground => self.foreground = Some(image),
        }
        self.refresh();
    }

    fn remove(&mut self, layer: Layer) {
        match layer {
            Layer::Backdrop => self.backdrop = None,
            Layer::Foreground => self.foreground = None,
        }
        self.refresh();
    }

    fn set_brightness(&mut self, level: f32) {
        let contrast = (level.clamp(0.0, 1.0) * 255.0) as u8;
        if self
            .display
            .set_brightness(Brightness::custom(2, contrast))
            .is_err()
        {
            warn!("Display brightness write failed: {}", Error::Display);
        }
    }
}
