/// Hardware abstraction for supported boards.
///
/// Each board module defines pin assignments and capabilities
/// selected at compile time via feature flags.

#[cfg(feature = "board-xiao")]
mod hw {
    pub const LED_PIN: u8 = 21;
    pub const HAS_PSRAM: bool = true;
    pub const HAS_DISPLAY: bool = false;
    pub const HAS_BUTTONS: bool = false;
    pub const BOARD_NAME: &str = "xiao_esp32s3";
}

#[cfg(feature = "board-m5stickc")]
mod hw {
    pub const LED_PIN: u8 = 19;
    pub const HAS_PSRAM: bool = false;
    pub const HAS_DISPLAY: bool = true;
    pub const HAS_BUTTONS: bool = true;
    /// Panel size in its native portrait orientation
    pub const DISPLAY_WIDTH: u16 = 135;
    pub const DISPLAY_HEIGHT: u16 = 240;
    pub const DISPLAY_OFFSET_X: u16 = 52;
    pub const DISPLAY_OFFSET_Y: u16 = 40;
    pub const DISPLAY_SPI_FREQ_MHZ: u32 = 40;
    /// Front button: next filter
    pub const BUTTON_A_PIN: u8 = 37;
    /// Side button: previous filter
    pub const BUTTON_B_PIN: u8 = 39;
    pub const BOARD_NAME: &str = "m5stickc_plus2";
}

#[cfg(not(any(feature = "board-xiao", feature = "board-m5stickc")))]
mod hw {
    pub const HAS_DISPLAY: bool = false;
    pub const HAS_BUTTONS: bool = false;
    pub const BOARD_NAME: &str = "unknown";
}

pub use hw::*;
