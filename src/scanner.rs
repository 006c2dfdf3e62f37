/// BLE advertisement parsing and sighting construction.
///
/// The radio layer hands raw advertisement payloads to [`BleAdvParser`];
/// the parsed [`BleEvent`] becomes a [`Sighting`] stamped with the scan
/// time. Nothing here touches the radio.
use core::fmt::Write;

use heapless::Vec;

use crate::classify::AdvertFields;
use crate::protocol::{MacString, NameString};

/// Length of one blocking scan round in milliseconds.
pub const SCAN_TIME_MS: u32 = 5000;

/// Active scan interval / window (units of 0.625 ms).
pub const SCAN_INTERVAL: u16 = 100;
pub const SCAN_WINDOW: u16 = 99;

/// Maximum manufacturer payload kept per advertisement (31 - len/type/company).
pub const MFR_DATA_LEN: usize = 27;

/// A parsed BLE advertisement
#[derive(Debug, Clone, PartialEq)]
pub struct BleEvent {
    pub mac: [u8; 6],
    pub name: NameString,
    pub rssi: i8,
    /// 16-bit service UUIDs from UUID lists and service-data headers
    pub service_uuids_16: Vec<u16, 8>,
    /// Manufacturer company ID, if manufacturer data was present
    pub manufacturer_id: Option<u16>,
    /// Manufacturer payload after the company ID
    pub manufacturer_data: Vec<u8, MFR_DATA_LEN>,
    /// GAP appearance value
    pub appearance: Option<u16>,
}

impl BleEvent {
    pub fn new(mac: [u8; 6], rssi: i8) -> Self {
        Self {
            mac,
            name: NameString::new(),
            rssi,
            service_uuids_16: Vec::new(),
            manufacturer_id: None,
            manufacturer_data: Vec::new(),
            appearance: None,
        }
    }

    /// Borrow the classifier's view of this advertisement.
    pub fn fields(&self) -> AdvertFields<'_> {
        AdvertFields {
            name: self.name.as_str(),
            service_uuids_16: &self.service_uuids_16,
            manufacturer_id: self.manufacturer_id,
            manufacturer_data: &self.manufacturer_data,
            appearance: self.appearance,
        }
    }

    fn add_uuid(&mut self, uuid: u16) {
        if !self.service_uuids_16.contains(&uuid) {
            let _ = self.service_uuids_16.push(uuid);
        }
    }
}

/// Parse BLE advertisement data (AD structures).
///
/// AD structure format: [length] [type] [data...]
/// Types we care about:
///   0x02/0x03 = Incomplete/Complete list of 16-bit service UUIDs
///   0x08/0x09 = Shortened/Complete local name
///   0x16      = Service data, 16-bit UUID (first 2 bytes, little-endian)
///   0x19      = Appearance (little-endian u16)
///   0xFF      = Manufacturer specific data (company ID LE, then payload)
pub struct BleAdvParser;

impl BleAdvParser {
    /// Parse advertisement data bytes into a BleEvent.
    ///
    /// Truncated or zero-length structures end parsing; fields already
    /// extracted are kept. Scan responses can be fed through
    /// [`BleAdvParser::merge`] into the same event.
    pub fn parse(addr: &[u8; 6], rssi: i8, ad_data: &[u8]) -> BleEvent {
        let mut event = BleEvent::new(*addr, rssi);
        Self::merge(&mut event, ad_data);
        event
    }

    /// Parse additional AD structures into an existing event. Fields already
    /// set are only overwritten by non-empty values.
    pub fn merge(event: &mut BleEvent, ad_data: &[u8]) {
        let mut pos = 0;
        while pos < ad_data.len() {
            let len = ad_data[pos] as usize;
            if len == 0 || pos + 1 + len > ad_data.len() {
                break;
            }

            let ad_type = ad_data[pos + 1];
            let data = &ad_data[pos + 2..pos + 1 + len];

            match ad_type {
                0x02 | 0x03 => {
                    for pair in data.chunks_exact(2) {
                        event.add_uuid(u16::from_le_bytes([pair[0], pair[1]]));
                    }
                }
                0x08 | 0x09 => {
                    if let Ok(name) = core::str::from_utf8(data) {
                        if !name.is_empty() {
                            event.name.clear();
                            push_truncated(&mut event.name, name);
                        }
                    }
                }
                0x16 => {
                    if data.len() >= 2 {
                        event.add_uuid(u16::from_le_bytes([data[0], data[1]]));
                    }
                }
                0x19 => {
                    if data.len() >= 2 {
                        event.appearance = Some(u16::from_le_bytes([data[0], data[1]]));
                    }
                }
                0xFF => {
                    if data.len() >= 2 {
                        event.manufacturer_id = Some(u16::from_le_bytes([data[0], data[1]]));
                        event.manufacturer_data.clear();
                        let payload = &data[2..];
                        let take = payload.len().min(MFR_DATA_LEN);
                        let _ = event.manufacturer_data.extend_from_slice(&payload[..take]);
                    }
                }
                _ => {}
            }

            pos += 1 + len;
        }
    }
}

/// Copy as much of `s` as fits, never splitting a character.
fn push_truncated<const N: usize>(dst: &mut heapless::String<N>, s: &str) {
    for c in s.chars() {
        if dst.push(c).is_err() {
            break;
        }
    }
}

/// One observation of a device in one scan round.
#[derive(Debug, Clone, PartialEq)]
pub struct Sighting {
    /// 48-bit address packed into the low bits of a u64. Zero is invalid.
    pub identity: u64,
    /// Human-readable address, display only
    pub display: NameString,
    pub rssi: i8,
    /// Milliseconds since boot
    pub timestamp: u64,
    pub advert: BleEvent,
}

impl Sighting {
    pub fn from_event(advert: BleEvent, timestamp: u64) -> Self {
        let mut mac = MacString::new();
        format_mac(&advert.mac, &mut mac);
        let mut display = NameString::new();
        let _ = display.push_str(&mac);
        Self {
            identity: mac_to_identity(&advert.mac),
            display,
            rssi: advert.rssi,
            timestamp,
            advert,
        }
    }
}

/// Pack a 6-byte address (most significant byte first) into a u64 key.
pub fn mac_to_identity(mac: &[u8; 6]) -> u64 {
    mac.iter().fold(0u64, |acc, &b| (acc << 8) | b as u64)
}

/// Format a 6-byte MAC address into "AA:BB:CC:DD:EE:FF" string
pub fn format_mac(mac: &[u8; 6], buf: &mut MacString) {
    let _ = write!(
        buf,
        "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
        mac[0], mac[1], mac[2], mac[3], mac[4], mac[5]
    );
}
