//! AirTally ESP-IDF std firmware
//!
//! One cooperative loop owns the tracker: scan for a fixed budget, ingest
//! the batch, drain input commands, tick, emit the view if it changed, and
//! flush learned labels on a debounce. Helper threads only read hardware
//! (buttons, serial) or paint the screen, and talk to the loop through
//! channels, so tracker state is never shared.

#[cfg(feature = "m5stickc")]
mod buttons;
#[cfg(feature = "m5stickc")]
mod display;
mod nvs;

use std::sync::mpsc::{self, SyncSender};
use std::thread;
use std::time::{Duration, Instant};

use airtally::{board, comm, protocol};

use airtally::config::TrackerConfig;
use airtally::engine::Tracker;
use airtally::scanner::{BleAdvParser, Sighting, SCAN_INTERVAL, SCAN_TIME_MS, SCAN_WINDOW};
use comm::LineReader;
use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::hal::task::block_on;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use protocol::{DeviceMessage, HostCommand, MsgBuffer, MAX_MSG_LEN, VERSION};

use esp32_nimble::{BLEDevice, BLEScan};

/// Interval between unsolicited status reports.
const STATUS_INTERVAL_MS: u64 = 30_000;

fn uptime_ms(boot: &Instant) -> u64 {
    boot.elapsed().as_millis() as u64
}

fn main() -> anyhow::Result<()> {
    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    let boot = Instant::now();

    log::info!("AirTally v{} starting on {} (std)", VERSION, board::BOARD_NAME);

    // ── Peripherals ──────────────────────────────────────────────────

    #[cfg_attr(not(feature = "m5stickc"), allow(unused_variables))]
    let peripherals = Peripherals::take()?;
    let partition = EspDefaultNvsPartition::take()?;

    // Hold power on (M5StickC Plus2)
    #[cfg(feature = "m5stickc")]
    let _power_hold = {
        use esp_idf_svc::hal::gpio::PinDriver;
        let mut p = PinDriver::output(peripherals.pins.gpio4)?;
        p.set_high()?;
        p
    };

    // ── Tracker ──────────────────────────────────────────────────────

    let mut nvs = nvs::NvsStore::new(partition)?;

    #[allow(unused_mut)]
    let mut config = TrackerConfig::new();
    #[cfg(feature = "m5stickc")]
    {
        // Fits both lists on the landscape screen
        config.top_n = 4;
        config.recent_n = 4;
    }
    let mut tracker = Tracker::with_store(config, &mut nvs);
    log::info!(
        "Tracker ready: window {} min, top {}, recent {}, {} known devices",
        config.window_ms / 60_000,
        config.top_n,
        config.recent_n,
        tracker.knowledge().len()
    );

    // ── Input threads ────────────────────────────────────────────────

    let (cmd_tx, cmd_rx) = mpsc::sync_channel::<HostCommand>(4);
    thread::Builder::new()
        .name("serial".into())
        .stack_size(4096)
        .spawn(move || serial_thread(cmd_tx))?;
    log::info!("Serial thread spawned");

    #[cfg(feature = "m5stickc")]
    let filter_rx = {
        let (filter_tx, filter_rx) = mpsc::sync_channel(4);
        let button_a = peripherals.pins.gpio37;
        let button_b = peripherals.pins.gpio39;
        thread::Builder::new()
            .name("buttons".into())
            .stack_size(2048)
            .spawn(move || {
                if let Err(e) = buttons::buttons_thread(filter_tx, button_a, button_b) {
                    log::error!("Buttons thread stopped: {:?}", e);
                }
            })?;
        log::info!("Buttons thread spawned");
        filter_rx
    };

    // ── Display thread (M5StickC) ────────────────────────────────────

    #[cfg(feature = "m5stickc")]
    let screen_tx = {
        let (screen_tx, screen_rx) = mpsc::sync_channel(1);
        let spi2 = peripherals.spi2;
        let mosi = peripherals.pins.gpio15;
        let clk = peripherals.pins.gpio13;
        let cs_pin = peripherals.pins.gpio5;
        let dc_pin = peripherals.pins.gpio14;
        let rst_pin = peripherals.pins.gpio12;
        let bl_pin = peripherals.pins.gpio27;
        thread::Builder::new()
            .name("display".into())
            .stack_size(4096)
            .spawn(move || {
                if let Err(e) = display::display_thread(
                    screen_rx, spi2, mosi, clk, cs_pin, dc_pin, rst_pin, bl_pin,
                ) {
                    log::error!("Display thread stopped: {:?}", e);
                }
            })?;
        log::info!("Display thread spawned");
        screen_tx
    };

    // ── BLE (NimBLE) ─────────────────────────────────────────────────

    let ble_device = BLEDevice::take();
    let mut scan = BLEScan::new();
    scan.active_scan(true).interval(SCAN_INTERVAL).window(SCAN_WINDOW);
    log::info!("BLE scanner ready ({} ms rounds)", SCAN_TIME_MS);

    let mut batch: Vec<Sighting> = Vec::new();
    let mut last_status_ms = 0;

    loop {
        batch.clear();
        let result = block_on(scan.start(ble_device, SCAN_TIME_MS as i32, |device, data| {
            let addr = device.addr().as_be_bytes();
            let event = BleAdvParser::parse(&addr, device.rssi(), data.payload());
            batch.push(Sighting::from_event(event, uptime_ms(&boot)));
            None::<()> // Continue scanning
        }));
        if let Err(e) = result {
            log::warn!("BLE scan round failed: {:?}", e);
        }

        let now = uptime_ms(&boot);
        tracker.ingest(&batch);

        #[cfg(feature = "m5stickc")]
        while let Ok(cmd) = filter_rx.try_recv() {
            tracker.apply(cmd, now);
        }

        let mut status_requested = now.saturating_sub(last_status_ms) >= STATUS_INTERVAL_MS;
        while let Ok(cmd) = cmd_rx.try_recv() {
            status_requested |= comm::handle_command(&cmd, &mut tracker, now);
        }

        if let Some(view) = tracker.tick(now) {
            let msg = DeviceMessage::View {
                active: view.active_count,
                filter: view.filter,
                top: &view.top_by_frequency,
                recent: &view.top_by_recency,
                ts: now as u32,
            };
            emit(&msg);

            #[cfg(feature = "m5stickc")]
            let _ = screen_tx.try_send(airtally::screen::render_lines(view));
        }

        if status_requested {
            emit(&DeviceMessage::Status {
                uptime: (now / 1000) as u32,
                tracked: tracker.store().len() as u32,
                known: tracker.knowledge().len() as u32,
                min_rssi: tracker.config().min_rssi,
                filter: tracker.filter(),
                board: board::BOARD_NAME,
                version: VERSION,
            });
            last_status_ms = now;
        }

        // Failures are logged by the tracker and retried next pass.
        let _ = tracker.flush_if_due(&mut nvs, now);
    }
}

/// Write one NDJSON message to the console.
fn emit(msg: &DeviceMessage) {
    let mut buf = MsgBuffer::new();
    buf.resize_default(MAX_MSG_LEN).ok();
    match comm::serialize_message(msg, &mut buf) {
        Some(len) => {
            buf.truncate(len);
            if let Ok(s) = std::str::from_utf8(&buf) {
                log::info!("{}", s.trim_end());
            }
        }
        None => log::warn!("Message exceeds {} bytes, dropped", MAX_MSG_LEN),
    }
}

// ── Serial command thread ────────────────────────────────────────────

fn serial_thread(cmd_tx: SyncSender<HostCommand>) {
    use std::io::Read;

    log::info!("Serial thread started");

    let mut reader = LineReader::new();
    let mut stdin = std::io::stdin();
    let mut byte = [0u8; 1];
    loop {
        match stdin.read(&mut byte) {
            Ok(1) => {
                if let Some(line) = reader.feed(byte[0]) {
                    if let Some(cmd) = comm::parse_command(line) {
                        let _ = cmd_tx.try_send(cmd);
                    }
                }
            }
            // Console reads are non-blocking; back off when idle
            _ => thread::sleep(Duration::from_millis(20)),
        }
    }
}
