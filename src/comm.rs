/// Serial NDJSON transport helpers.
///
/// The device streams ranked views as newline-delimited JSON over the
/// serial console and accepts commands on the same port.
use crate::engine::Tracker;
use crate::filter::FilterCommand;
use crate::protocol::{DeviceMessage, HostCommand, RawCommand};

/// Serial baud rate
pub const SERIAL_BAUD: u32 = 115200;

/// Longest accepted command line
pub const MAX_CMD_LEN: usize = 128;

/// Serialize a DeviceMessage to JSON bytes and write to the output buffer.
/// Returns the number of bytes written, or None if serialization failed.
pub fn serialize_message(msg: &DeviceMessage, buf: &mut [u8]) -> Option<usize> {
    match serde_json_core::to_slice(msg, buf) {
        Ok(len) => {
            // Append newline for NDJSON
            if len < buf.len() {
                buf[len] = b'\n';
                Some(len + 1)
            } else {
                Some(len)
            }
        }
        Err(_) => None,
    }
}

/// Deserialize a HostCommand from a JSON byte slice.
pub fn parse_command(data: &[u8]) -> Option<HostCommand> {
    let trimmed = data.trim_ascii_end();
    if trimmed.is_empty() {
        return None;
    }
    let (raw, _) = serde_json_core::from_slice::<RawCommand>(trimmed).ok()?;
    match raw.cmd.as_str() {
        "next" => Some(HostCommand::Next),
        "prev" => Some(HostCommand::Previous),
        "status" => Some(HostCommand::GetStatus),
        "set_rssi" => raw.min_rssi.map(|min_rssi| HostCommand::SetRssi { min_rssi }),
        _ => None,
    }
}

/// Apply a received host command to the tracker.
///
/// Returns `true` when the host asked for a status report, which the caller
/// builds with platform data (uptime, board).
pub fn handle_command(cmd: &HostCommand, tracker: &mut Tracker, now_ms: u64) -> bool {
    match cmd {
        HostCommand::Next => {
            tracker.apply(FilterCommand::Next, now_ms);
            false
        }
        HostCommand::Previous => {
            tracker.apply(FilterCommand::Previous, now_ms);
            false
        }
        HostCommand::GetStatus => true,
        HostCommand::SetRssi { min_rssi } => {
            tracker.set_min_rssi(*min_rssi);
            false
        }
    }
}

/// Serial NDJSON reader state machine.
/// Accumulates bytes until a newline is found, then yields the line.
pub struct LineReader {
    buf: [u8; MAX_CMD_LEN],
    pos: usize,
    overflow: bool,
}

impl LineReader {
    pub const fn new() -> Self {
        Self {
            buf: [0; MAX_CMD_LEN],
            pos: 0,
            overflow: false,
        }
    }

    /// Feed a byte into the reader. Returns a complete line (without newline)
    /// when one is detected. An overlong line is dropped whole.
    pub fn feed(&mut self, byte: u8) -> Option<&[u8]> {
        if byte == b'\n' || byte == b'\r' {
            let len = core::mem::take(&mut self.pos);
            if core::mem::take(&mut self.overflow) || len == 0 {
                return None;
            }
            Some(&self.buf[..len])
        } else if self.overflow {
            None
        } else if self.pos < self.buf.len() {
            self.buf[self.pos] = byte;
            self.pos += 1;
            None
        } else {
            log::warn!("Command line longer than {} bytes, dropped", MAX_CMD_LEN);
            self.pos = 0;
            self.overflow = true;
            None
        }
    }
}

impl Default for LineReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::filter::LabelFilter;
    use crate::knowledge::KnowledgeBase;
    use crate::protocol::MAX_MSG_LEN;

    #[test]
    fn parse_filter_commands() {
        assert_eq!(parse_command(br#"{"cmd":"next"}"#), Some(HostCommand::Next));
        assert_eq!(parse_command(br#"{"cmd":"prev"}"#), Some(HostCommand::Previous));
        assert_eq!(parse_command(b"{\"cmd\":\"status\"}\r\n"), Some(HostCommand::GetStatus));
    }

    #[test]
    fn parse_set_rssi() {
        assert_eq!(
            parse_command(br#"{"cmd":"set_rssi","min_rssi":-80}"#),
            Some(HostCommand::SetRssi { min_rssi: -80 })
        );
        assert_eq!(parse_command(br#"{"cmd":"set_rssi"}"#), None);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_command(b""), None);
        assert_eq!(parse_command(b"  \n"), None);
        assert_eq!(parse_command(b"not json"), None);
        assert_eq!(parse_command(br#"{"cmd":"reboot"}"#), None);
    }

    #[test]
    fn serialize_appends_newline() {
        let msg = DeviceMessage::Status {
            uptime: 1,
            tracked: 0,
            known: 0,
            min_rssi: -100,
            filter: LabelFilter::All,
            board: "host",
            version: "0.1.0",
        };
        let mut buf = [0u8; MAX_MSG_LEN];
        let len = serialize_message(&msg, &mut buf).unwrap();
        assert_eq!(buf[len - 1], b'\n');
        assert_eq!(buf[0], b'{');
    }

    #[test]
    fn serialize_reports_overflow() {
        let msg = DeviceMessage::Status {
            uptime: 1,
            tracked: 0,
            known: 0,
            min_rssi: -100,
            filter: LabelFilter::All,
            board: "host",
            version: "0.1.0",
        };
        let mut buf = [0u8; 8];
        assert_eq!(serialize_message(&msg, &mut buf), None);
    }

    #[test]
    fn handle_commands_update_tracker() {
        let mut t = Tracker::new(TrackerConfig::new(), KnowledgeBase::new(0));
        assert!(!handle_command(&HostCommand::SetRssi { min_rssi: -70 }, &mut t, 0));
        assert_eq!(t.config().min_rssi, -70);
        assert!(handle_command(&HostCommand::GetStatus, &mut t, 0));
        // Nothing present: cycling stays on ALL.
        assert!(!handle_command(&HostCommand::Next, &mut t, 0));
        assert_eq!(t.filter(), LabelFilter::All);
    }

    #[test]
    fn line_reader_yields_lines() {
        let mut r = LineReader::new();
        let mut got = None;
        for &b in b"{\"cmd\":\"next\"}\n" {
            if let Some(line) = r.feed(b) {
                got = parse_command(line);
            }
        }
        assert_eq!(got, Some(HostCommand::Next));
        assert!(r.feed(b'\n').is_none(), "blank lines are skipped");
    }

    #[test]
    fn line_reader_drops_overlong_line() {
        let mut r = LineReader::new();
        for _ in 0..MAX_CMD_LEN + 10 {
            assert!(r.feed(b'x').is_none());
        }
        assert!(r.feed(b'\n').is_none());
        for &b in b"ab" {
            r.feed(b);
        }
        assert_eq!(r.feed(b'\n'), Some(&b"ab"[..]));
    }
}
