use std::io::Read;

use log::info;
use serialport::SerialPort;

use crate::{Error, Settings};

/// Opens the byte source messages are read from.
///
/// The returned port is closed when it is dropped.
pub trait Connector {
    type Port: Read;

    fn open(&self, settings: &Settings) -> Result<Self::Port, Error>;
}

/// Opens the serial device named by [`Settings::port`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SerialConnector;

impl Connector for SerialConnector {
    type Port = Box<dyn SerialPort>;

    fn open(&self, settings: &Settings) -> Result<Self::Port, Error> {
        info!(
            "Opening {} at {} baud, timeout {}s",
            settings.port, settings.baud, settings.timeout
        );
        serialport::new(settings.port.as_str(), settings.baud)
            .timeout(settings.timeout_duration())
            .open()
            .map_err(|source| Error::Open {
                port: settings.port.clone(),
                source,
            })
    }
}
