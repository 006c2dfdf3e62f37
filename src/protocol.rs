/// JSON message protocol between AirTally and a host on the serial port.
///
/// All messages are newline-delimited JSON (NDJSON).
/// Uses `heapless` types so messages serialize without allocating.
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

use crate::aggregate::{FrequencyEntry, RecencyEntry, MAX_RANKED};
use crate::filter::LabelFilter;

/// Maximum length for MAC address strings ("AA:BB:CC:DD:EE:FF")
pub type MacString = String<18>;

/// Maximum length for device display strings (advertised name or MAC)
pub type NameString = String<33>;

/// Messages sent from the device to the host
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
pub enum DeviceMessage<'a> {
    /// Ranked view, sent whenever it changes
    #[serde(rename = "view")]
    View {
        /// Active devices in the countable set
        active: u32,
        filter: LabelFilter,
        top: &'a Vec<FrequencyEntry, MAX_RANKED>,
        recent: &'a Vec<RecencyEntry, MAX_RANKED>,
        /// Uptime in milliseconds when aggregated
        ts: u32,
    },
    /// Device status report
    #[serde(rename = "status")]
    Status {
        /// Uptime in seconds
        uptime: u32,
        /// Devices currently in the activity store
        tracked: u32,
        /// Identities in the knowledge base
        known: u32,
        min_rssi: i8,
        filter: LabelFilter,
        /// Board identifier
        board: &'static str,
        /// Firmware version
        version: &'static str,
    },
}

/// Commands sent from the host to the device.
///
/// Deserialized manually via [`RawCommand`] in `comm::parse_command()` because
/// `serde_json_core` does not support internally tagged enums (`deserialize_any`).
#[derive(Debug, PartialEq)]
pub enum HostCommand {
    /// Step the display filter forward
    Next,
    /// Step the display filter back
    Previous,
    /// Request current status
    GetStatus,
    /// Update minimum RSSI threshold
    SetRssi {
        /// Minimum RSSI (negative dBm value)
        min_rssi: i8,
    },
}

/// Wire format for host commands. A flat struct that `serde_json_core` can
/// deserialize without `deserialize_any`; converted to [`HostCommand`] in
/// `comm::parse_command()`.
#[derive(Deserialize)]
pub(crate) struct RawCommand {
    pub cmd: heapless::String<16>,
    #[serde(default)]
    pub min_rssi: Option<i8>,
}

/// Firmware version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Maximum size of a serialized JSON message
pub const MAX_MSG_LEN: usize = 2048;

/// Buffer type for serialized JSON messages
pub type MsgBuffer = Vec<u8, MAX_MSG_LEN>;
