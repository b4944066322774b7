use core::fmt;

use log::debug;
use ublox::{PacketRef, Parser};

/// Decoded form of a single UBX frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed {
    /// Packet known to the decoder, kept in its textual form
    Message(String),
    /// Well-formed frame the decoder has no definition for
    Unsupported { class: u8, msg_id: u8, len: usize },
    /// Frame rejected by the decoder, e.g. on a checksum mismatch
    Invalid(String),
}

impl fmt::Display for Parsed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parsed::Message(message) => f.write_str(message),
            Parsed::Unsupported { class, msg_id, len } => write!(
                f,
                "<UBX(0x{:02X}, 0x{:02X}) unsupported, {} bytes payload>",
                class, msg_id, len
            ),
            Parsed::Invalid(reason) => write!(f, "<invalid UBX frame: {}>", reason),
        }
    }
}

/// One message read from the stream: the frame as received plus its decoded form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePair {
    pub raw: Vec<u8>,
    pub parsed: Parsed,
}

impl MessagePair {
    /// Decodes a complete frame, sync chars through checksum.
    ///
    /// Decoding never fails, frames the decoder rejects end up as
    /// [`Parsed::Invalid`].
    pub fn decode(raw: Vec<u8>) -> Self {
        // a fresh parser per frame, a rejected frame must not leave
        // bytes behind for the next one
        let mut parser = Parser::new(Vec::new());
        let mut it = parser.consume(&raw);
        let parsed = match it.next() {
            Some(Ok(PacketRef::Unknown(packet))) => Parsed::Unsupported {
                class: packet.class,
                msg_id: packet.msg_id,
                len: packet.payload.len(),
            },
            Some(Ok(packet)) => Parsed::Message(format!("{:?}", packet)),
            Some(Err(err)) => Parsed::Invalid(format!("{:?}", err)),
            None => Parsed::Invalid("incomplete frame".to_string()),
        };
        drop(it);
        debug!("decoded {} byte frame: {:?}", raw.len(), parsed);

        Self { raw, parsed }
    }
}
