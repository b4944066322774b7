use core::fmt;
use std::io;

#[derive(Debug)]
pub enum Error {
    /// A command line token was not a valid `key=value` pair
    InvalidArgument { token: String, reason: String },
    /// The serial port could not be opened
    Open {
        port: String,
        source: serialport::Error,
    },
    /// Reading from the byte source failed
    Io(io::Error),
    /// A blocking read was interrupted by a signal before any data arrived.
    Interrupted,
    /// Non-UBX data was found while streaming in `ubx_only` mode, the byte is the
    /// first one that did not belong to a UBX frame
    NonUbxData(u8),
    /// The byte source ended or timed out in the middle of a frame
    TruncatedFrame { expected: usize, got: usize },
}

impl Error {
    pub(crate) fn invalid_argument(token: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            token: token.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::Interrupted => Self::Interrupted,
            _ => Self::Io(error),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidArgument { token, reason } => {
                write!(f, "Invalid argument '{}': {}", token, reason)
            }
            Error::Open { port, source } => {
                write!(f, "Failed to open serial port '{}': {}", port, source)
            }
            Error::Io(e) => write!(f, "Read error: {}", e),
            Error::Interrupted => write!(f, "Read interrupted"),
            Error::NonUbxData(byte) => write!(
                f,
                "Unknown data header 0x{:02X} while streaming UBX only",
                byte
            ),
            Error::TruncatedFrame { expected, got } => write!(
                f,
                "Truncated UBX frame (expected = {} bytes, got = {})",
                expected, got
            ),
        }
    }
}

impl core::error::Error for Error {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Error::Open { source, .. } => Some(source),
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}
