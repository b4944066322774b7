use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use log::warn;

use crate::{Connector, Error, Settings, UbxStream, render};

/// Why streaming stopped without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The source ran dry or timed out between frames
    EndOfStream,
    /// `interrupted` was raised, usually by Ctrl-C
    Interrupted,
    /// Non-UBX data in `ubx_only` mode
    NonUbxData(u8),
}

/// Streams messages from the port described by `settings` to `out` until
/// the stream ends, `interrupted` is raised or an error occurs.
///
/// The port is opened after the banner is written and closed on every
/// return path.
pub fn run<C, W>(
    settings: &Settings,
    connector: &C,
    interrupted: &AtomicBool,
    out: &mut W,
) -> Result<Termination, Error>
where
    C: Connector,
    W: Write,
{
    writeln!(out, "\n{}\n", render::banner(settings))?;

    let port = connector.open(settings)?;
    let mut messages = UbxStream::new(port, settings.ubx_only);

    loop {
        if interrupted.load(Ordering::SeqCst) {
            writeln!(out, "\n{}\n", render::TERMINATED_BY_USER)?;
            return Ok(Termination::Interrupted);
        }

        match messages.next() {
            Some(Ok(pair)) => writeln!(out, "{}", render::message_line(&pair, settings.raw))?,
            Some(Err(Error::Interrupted)) => continue,
            Some(Err(Error::NonUbxData(byte))) => {
                warn!(
                    "Streaming stopped on non-UBX data (0x{:02X}), ubx_only is set",
                    byte
                );
                return Ok(Termination::NonUbxData(byte));
            }
            Some(Err(e)) => return Err(e),
            None => return Ok(Termination::EndOfStream),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::io::{self, Read};
    use std::rc::Rc;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::message::tests::frame;

    const NMEA: &[u8] = b"$GNTXT,01,01,02,ANTSTATUS=OK*25\r\n";

    /// In-memory port which records when it is dropped.
    struct FakePort {
        data: io::Cursor<Vec<u8>>,
        closed: Rc<Cell<bool>>,
        /// raised once the data is used up, simulating Ctrl-C
        interrupt_at_end: Option<Rc<AtomicBool>>,
    }

    impl Read for FakePort {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                if let Some(flag) = &self.interrupt_at_end {
                    flag.store(true, Ordering::SeqCst);
                    return Err(io::ErrorKind::Interrupted.into());
                }
            }
            Ok(n)
        }
    }

    impl Drop for FakePort {
        fn drop(&mut self) {
            self.closed.set(true);
        }
    }

    struct FakeConnector {
        data: Vec<u8>,
        closed: Rc<Cell<bool>>,
        opened: Cell<bool>,
        interrupt_at_end: Option<Rc<AtomicBool>>,
    }

    impl FakeConnector {
        fn new(data: Vec<u8>) -> Self {
            Self {
                data,
                closed: Rc::new(Cell::new(false)),
                opened: Cell::new(false),
                interrupt_at_end: None,
            }
        }
    }

    impl Connector for FakeConnector {
        type Port = FakePort;

        fn open(&self, _settings: &Settings) -> Result<Self::Port, Error> {
            self.opened.set(true);
            Ok(FakePort {
                data: io::Cursor::new(self.data.clone()),
                closed: Rc::clone(&self.closed),
                interrupt_at_end: self.interrupt_at_end.clone(),
            })
        }
    }

    struct FailingConnector;

    impl Connector for FailingConnector {
        type Port = io::Empty;

        fn open(&self, settings: &Settings) -> Result<Self::Port, Error> {
            Err(Error::Open {
                port: settings.port.clone(),
                source: serialport::Error::new(serialport::ErrorKind::NoDevice, "no such device"),
            })
        }
    }

    fn lines(out: &[u8]) -> Vec<String> {
        String::from_utf8_lossy(out)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_run_parsed() {
        let ubx = frame(0x7F, 0x01, &[1, 2]);
        let connector = FakeConnector::new([&ubx[..], NMEA, &ubx[..]].concat());
        let mut out = Vec::new();

        let termination =
            run(&Settings::default(), &connector, &AtomicBool::new(false), &mut out).unwrap();
        assert_eq!(Termination::EndOfStream, termination);
        assert!(connector.closed.get());
        assert_eq!(
            vec![
                "Streaming from COM13 at 9600 baud in parsed format...".to_string(),
                "<UBX(0x7F, 0x01) unsupported, 2 bytes payload>".to_string(),
                "<UBX(0x7F, 0x01) unsupported, 2 bytes payload>".to_string(),
            ],
            lines(&out)
        );
    }

    #[test]
    fn test_run_raw() {
        let ubx = frame(0x7F, 0x01, &[]);
        let connector = FakeConnector::new([&ubx[..], &ubx[..]].concat());
        let settings = Settings {
            raw: true,
            ..Settings::default()
        };
        let mut out = Vec::new();

        run(&settings, &connector, &AtomicBool::new(false), &mut out).unwrap();
        let lines = lines(&out);
        assert_eq!(3, lines.len());
        assert_eq!("Streaming from COM13 at 9600 baud in raw format...", lines[0]);
        for line in &lines[1..] {
            assert_eq!(&render::raw_bytes(&ubx), line);
        }
    }

    #[test]
    fn test_run_ubx_only() {
        let ubx = frame(0x7F, 0x01, &[]);
        let connector = FakeConnector::new([&ubx[..], NMEA, &ubx[..]].concat());
        let settings = Settings {
            ubx_only: true,
            ..Settings::default()
        };
        let mut out = Vec::new();

        let termination = run(&settings, &connector, &AtomicBool::new(false), &mut out).unwrap();
        assert_eq!(Termination::NonUbxData(b'$'), termination);
        assert_eq!(2, lines(&out).len());
        assert!(connector.closed.get());
    }

    #[test]
    fn test_run_interrupted() {
        let ubx = frame(0x7F, 0x01, &[]);
        let flag = Rc::new(AtomicBool::new(false));
        let mut connector = FakeConnector::new(ubx);
        connector.interrupt_at_end = Some(Rc::clone(&flag));
        let mut out = Vec::new();

        let termination = run(&Settings::default(), &connector, &flag, &mut out).unwrap();
        assert_eq!(Termination::Interrupted, termination);
        assert!(connector.closed.get());

        let lines = lines(&out);
        assert_eq!(3, lines.len());
        assert_eq!(
            1,
            lines
                .iter()
                .filter(|line| *line == render::TERMINATED_BY_USER)
                .count()
        );
        assert_eq!(render::TERMINATED_BY_USER, lines[2]);
    }

    #[test]
    fn test_run_interrupted_before_first_read() {
        let connector = FakeConnector::new(frame(0x7F, 0x01, &[]));
        let mut out = Vec::new();

        let termination =
            run(&Settings::default(), &connector, &AtomicBool::new(true), &mut out).unwrap();
        assert_eq!(Termination::Interrupted, termination);
        assert_eq!(2, lines(&out).len());
        assert!(connector.closed.get());
    }

    #[test]
    fn test_run_open_failure() {
        let mut out = Vec::new();
        let result = run(
            &Settings::default(),
            &FailingConnector,
            &AtomicBool::new(false),
            &mut out,
        );
        assert!(matches!(result, Err(Error::Open { .. })));
        assert_eq!(1, lines(&out).len());
    }

    #[test]
    fn test_run_truncated_frame() {
        let mut ubx = frame(0x7F, 0x01, &[1, 2, 3]);
        ubx.pop();
        let connector = FakeConnector::new(ubx);
        let mut out = Vec::new();

        let result = run(&Settings::default(), &connector, &AtomicBool::new(false), &mut out);
        assert!(matches!(result, Err(Error::TruncatedFrame { .. })));
        assert!(connector.closed.get());
    }
}
