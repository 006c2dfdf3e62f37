//! Front/side button polling for M5StickC Plus2.
//!
//! Both buttons are active-low on input-only pins with external pull-ups.
//! Each press (falling edge, debounced) becomes one filter command.

use std::sync::mpsc::SyncSender;
use std::time::Duration;

use airtally::filter::FilterCommand;
use esp_idf_svc::hal::gpio::{InputPin, PinDriver};
use esp_idf_svc::hal::peripheral::Peripheral;

const POLL_MS: u64 = 20;

pub fn buttons_thread(
    commands: SyncSender<FilterCommand>,
    button_a: impl Peripheral<P = impl InputPin> + 'static,
    button_b: impl Peripheral<P = impl InputPin> + 'static,
) -> anyhow::Result<()> {
    let a = PinDriver::input(button_a)?;
    let b = PinDriver::input(button_b)?;
    log::info!("Buttons thread started");

    let mut a_was_down = false;
    let mut b_was_down = false;
    loop {
        let a_down = a.is_low();
        let b_down = b.is_low();
        if a_down && !a_was_down {
            let _ = commands.try_send(FilterCommand::Next);
        }
        if b_down && !b_was_down {
            let _ = commands.try_send(FilterCommand::Previous);
        }
        a_was_down = a_down;
        b_was_down = b_down;
        std::thread::sleep(Duration::from_millis(POLL_MS));
    }
}
