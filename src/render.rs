use crate::{MessagePair, Settings};

pub const TERMINATED_BY_USER: &str = "Streaming terminated by user";

pub const USAGE: &str = " ubxdump is a simple command line utility to stream \
the parsed UBX output of a u-blox GNSS device.

 Usage (all args are optional): ubxdump port=\"COM13\" baud=9600 timeout=5 ubx_only=0 raw=0

   port      serial device (default COM13)
   baud      bit rate (default 9600)
   timeout   read timeout in seconds, streaming ends when no data arrives in time (default 5)
   ubx_only  1 to terminate streaming on any non-UBX data, e.g. NMEA (default 0)
   raw       1 to print the undecoded frame bytes (default 0)

 Type Ctrl-C to terminate.";

/// Status line printed before streaming starts.
pub fn banner(settings: &Settings) -> String {
    format!(
        "Streaming from {} at {} baud in {} format...",
        settings.port,
        settings.baud,
        if settings.raw { "raw" } else { "parsed" }
    )
}

/// Byte string form of a frame, printable ASCII kept and everything else escaped.
pub fn raw_bytes(raw: &[u8]) -> String {
    format!("b'{}'", raw.escape_ascii())
}

/// The line printed for a single message.
pub fn message_line(pair: &MessagePair, raw: bool) -> String {
    if raw {
        raw_bytes(&pair.raw)
    } else {
        pair.parsed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::Parsed;

    #[test]
    fn test_banner() {
        let mut settings = Settings::default();
        assert_eq!(
            "Streaming from COM13 at 9600 baud in parsed format...",
            banner(&settings)
        );
        settings.raw = true;
        settings.port = "/dev/ttyACM0".to_string();
        settings.baud = 115200;
        assert_eq!(
            "Streaming from /dev/ttyACM0 at 115200 baud in raw format...",
            banner(&settings)
        );
    }

    #[test]
    fn test_raw_bytes() {
        assert_eq!(
            r"b'\xb5b\n\x04\x00\x00\x0e4'",
            raw_bytes(&[0xB5, 0x62, 0x0A, 0x04, 0x00, 0x00, 0x0E, 0x34])
        );
        assert_eq!("b''", raw_bytes(&[]));
    }

    #[test]
    fn test_message_line() {
        let pair = MessagePair {
            raw: vec![0xB5, 0x62],
            parsed: Parsed::Message("NavPosLlh".to_string()),
        };
        assert_eq!(r"b'\xb5b'", message_line(&pair, true));
        assert_eq!("NavPosLlh", message_line(&pair, false));
    }
}
