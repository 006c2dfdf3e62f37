//! Display driver for M5StickC Plus2 (ST7789V2, 135x240, SPI).
//!
//! Paints the text lines laid out by `airtally::screen`. Runs on its own
//! FreeRTOS thread and redraws only when the main loop sends a new view.

use std::sync::mpsc::Receiver;
use std::time::Duration;

use embedded_graphics::mono_font::ascii::FONT_6X10;
use embedded_graphics::mono_font::{MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::Rgb565;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};
use embedded_graphics::text::Text;
use esp_idf_svc::hal::delay::Delay;
use esp_idf_svc::hal::gpio::*;
use esp_idf_svc::hal::peripheral::Peripheral;
use esp_idf_svc::hal::spi::config::Config as SpiConfig;
use esp_idf_svc::hal::spi::config::DriverConfig as SpiDriverConfig;
use esp_idf_svc::hal::spi::{SpiDeviceDriver, SpiDriver};
use esp_idf_svc::hal::units::Hertz;
use mipidsi::interface::SpiInterface;
use mipidsi::models::ST7789;
use mipidsi::options::{ColorInversion, ColorOrder, Orientation, Rotation};
use mipidsi::Builder;

use airtally::board;
use airtally::protocol::VERSION;
use airtally::screen::{Line, Tone, LINE_W, MAX_LINES};

// ── Display geometry ─────────────────────────────────────────────────

const W: i32 = board::DISPLAY_HEIGHT as i32;
const H: i32 = board::DISPLAY_WIDTH as i32;
const ROW_H: i32 = 11;

// ── Color palette ────────────────────────────────────────────────────

const BG: Rgb565 = Rgb565::BLACK;
const HEADER_BG: Rgb565 = Rgb565::new(2, 4, 12);
const FG: Rgb565 = Rgb565::WHITE;
const ACCENT: Rgb565 = Rgb565::new(0, 50, 0);
const DIM: Rgb565 = Rgb565::new(12, 24, 12);

pub type ScreenLines = heapless::Vec<Line, MAX_LINES>;

// ── Screen renderer ──────────────────────────────────────────────────

struct Screen<'a, D> {
    display: &'a mut D,
    y: i32,
    buf: heapless::String<LINE_W>,
}

impl<'a, D: DrawTarget<Color = Rgb565>> Screen<'a, D> {
    fn new(display: &'a mut D) -> Self {
        Self {
            display,
            y: 0,
            buf: heapless::String::new(),
        }
    }

    fn clear(&mut self) {
        let _ = self.display.clear(BG);
        self.y = 0;
    }

    fn skip(&mut self, pixels: i32) {
        self.y += pixels;
    }

    fn fits(&self) -> bool {
        self.y + ROW_H <= H
    }

    fn line(&mut self, line: &Line) {
        self.buf.clear();
        let _ = self.buf.push_str(&line.text);
        self.pad();
        let (fg, bg) = match line.tone {
            Tone::Header => (FG, HEADER_BG),
            Tone::Title => (ACCENT, BG),
            Tone::Normal => (FG, BG),
            Tone::Dim => (DIM, BG),
        };
        self.emit(fg, bg, 0);
        self.y += ROW_H;
    }

    fn centered(&mut self, color: Rgb565, args: core::fmt::Arguments<'_>) {
        self.buf.clear();
        let _ = core::fmt::write(&mut self.buf, args);
        let x = (W - self.buf.len() as i32 * 6) / 2;
        self.emit(color, BG, x);
        self.y += ROW_H;
    }

    /// Blank everything below the last drawn line.
    fn clear_rest(&mut self) {
        if self.y < H {
            let _ = Rectangle::new(Point::new(0, self.y), Size::new(W as u32, (H - self.y) as u32))
                .into_styled(PrimitiveStyle::with_fill(BG))
                .draw(self.display);
        }
    }

    fn pad(&mut self) {
        while self.buf.len() < LINE_W {
            let _ = self.buf.push(' ');
        }
    }

    fn emit(&mut self, fg: Rgb565, bg: Rgb565, x: i32) {
        let _ = Text::new(
            &self.buf,
            Point::new(x, self.y + 9),
            Self::text_style(fg, bg),
        )
        .draw(self.display);
    }

    fn text_style(fg: Rgb565, bg: Rgb565) -> MonoTextStyle<'static, Rgb565> {
        MonoTextStyleBuilder::new()
            .font(&FONT_6X10)
            .text_color(fg)
            .background_color(bg)
            .build()
    }
}

macro_rules! centered {
    ($s:expr, $color:expr, $($arg:tt)*) => {
        $s.centered($color, format_args!($($arg)*))
    };
}

// ── Screen implementations ───────────────────────────────────────────

fn draw_splash(display: &mut impl DrawTarget<Color = Rgb565>) {
    let mut s = Screen::new(display);
    s.clear();
    s.skip(42);
    centered!(s, FG, "AIRTALLY");
    centered!(s, ACCENT, "v{}", VERSION);
    s.skip(12);
    centered!(s, DIM, "waiting for first scan");
}

fn draw_lines(display: &mut impl DrawTarget<Color = Rgb565>, lines: &[Line]) {
    let mut s = Screen::new(display);
    for line in lines {
        if !s.fits() {
            break;
        }
        s.line(line);
    }
    s.clear_rest();
}

// ── Display thread ───────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn display_thread(
    views: Receiver<ScreenLines>,
    spi: impl Peripheral<P = impl esp_idf_svc::hal::spi::SpiAnyPins> + 'static,
    mosi: impl Peripheral<P = impl OutputPin> + 'static,
    clk: impl Peripheral<P = impl OutputPin> + 'static,
    cs_pin: impl Peripheral<P = impl OutputPin> + 'static,
    dc_pin: impl Peripheral<P = impl OutputPin> + 'static,
    rst_pin: impl Peripheral<P = impl IOPin> + 'static,
    bl_pin: impl Peripheral<P = impl OutputPin> + 'static,
) -> anyhow::Result<()> {
    log::info!("Display thread starting");

    // Manual hardware reset
    let mut rst = PinDriver::output(rst_pin)?;
    rst.set_low()?;
    std::thread::sleep(Duration::from_millis(20));
    rst.set_high()?;
    std::thread::sleep(Duration::from_millis(120));

    // SPI bus
    let spi_driver = SpiDriver::new(spi, clk, mosi, None::<AnyIOPin>, &SpiDriverConfig::new())?;

    let spi_config = SpiConfig::new()
        .baudrate(Hertz(board::DISPLAY_SPI_FREQ_MHZ * 1_000_000))
        .data_mode(embedded_hal::spi::MODE_0);

    let spi_device = SpiDeviceDriver::new(spi_driver, Some(cs_pin), &spi_config)?;

    // mipidsi SPI interface
    let dc = PinDriver::output(dc_pin)?;
    let mut buffer = [0u8; 512];
    let di = SpiInterface::new(spi_device, dc, &mut buffer);

    // Build display
    let mut delay = Delay::new_default();
    let mut display = Builder::new(ST7789, di)
        .display_size(board::DISPLAY_WIDTH, board::DISPLAY_HEIGHT)
        .display_offset(board::DISPLAY_OFFSET_X, board::DISPLAY_OFFSET_Y)
        .invert_colors(ColorInversion::Inverted)
        .color_order(ColorOrder::Bgr)
        .orientation(Orientation::new().rotate(Rotation::Deg90))
        .init(&mut delay)
        .map_err(|e| anyhow::anyhow!("display init failed: {:?}", e))?;

    log::info!("Display initialized ({}x{} landscape)", W, H);

    // Backlight on
    let mut bl = PinDriver::output(bl_pin)?;
    bl.set_high()?;

    draw_splash(&mut display);

    // Redraw on every changed view; the channel closing ends the thread.
    while let Ok(lines) = views.recv() {
        draw_lines(&mut display, &lines);
    }
    Ok(())
}
