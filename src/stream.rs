use std::io::{self, BufReader, Read};

use log::{debug, info, trace};
use nom::{IResult, Parser as _, number::complete::le_u16, number::complete::u8 as byte};

use crate::{Error, MessagePair};

pub const SYNC_CHAR_1: u8 = 0xB5;
pub const SYNC_CHAR_2: u8 = 0x62;
/// Sync chars, class, id and the two length bytes
pub const HEADER_LEN: usize = 6;
pub const CHECKSUM_LEN: usize = 2;

// an iterator-based reader that will yield UBX frames
// from e.g. a serial port, paired with their decoded form.
//
// framing only looks at the sync chars and the length field,
// validating and decoding is left to `MessagePair::decode`.

/// Reads UBX frames from any byte source.
///
/// A read that returns no data, or times out, at a frame boundary ends the
/// stream. Bytes outside of UBX frames (e.g. NMEA sentences) are skipped, or
/// end the stream with [`Error::NonUbxData`] when `ubx_only` is set.
///
/// # Examples
///
/// ```
/// use ubxdump::UbxStream;
///
/// let data: &[u8] = b"$GNTXT,01,01,02,ANTSTATUS=OK*25\r\n\xb5\x62\x7f\x01\x00\x00\x80\xff";
/// let mut stream = UbxStream::new(data, false);
///
/// let pair = stream.next().unwrap().unwrap();
/// assert_eq!(pair.raw, b"\xb5\x62\x7f\x01\x00\x00\x80\xff");
/// assert!(stream.next().is_none());
/// ```
pub struct UbxStream<R: Read> {
    reader: BufReader<R>,
    ubx_only: bool,
    /// byte already read which has to be looked at before reading on
    pending: Option<u8>,
    done: bool,
}

impl<R: Read> UbxStream<R> {
    pub fn new(reader: R, ubx_only: bool) -> Self {
        UbxStream {
            reader: BufReader::new(reader),
            ubx_only,
            pending: None,
            done: false,
        }
    }

    /// Reads a single byte, `None` when the source is exhausted or timed out.
    fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut buf = [0u8; 1];
        match self.reader.read(&mut buf) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(buf[0])),
            Err(e) if e.kind() == io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Fills `buf` as far as the source allows, returns the number of bytes read.
    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::TimedOut => break,
                Err(e) => return Err(e),
            }
        }
        Ok(filled)
    }

    fn skip_byte(&self, byte: u8) -> Result<(), Error> {
        if self.ubx_only {
            Err(Error::NonUbxData(byte))
        } else {
            trace!("skipping non-UBX byte 0x{:02X}", byte);
            Ok(())
        }
    }

    /// Consumes bytes up to and including the two sync chars.
    ///
    /// Returns `false` if the stream ended before a frame started.
    fn sync(&mut self) -> Result<bool, Error> {
        loop {
            let byte = match self.pending.take() {
                Some(byte) => byte,
                None => match self.read_byte()? {
                    Some(byte) => byte,
                    None => return Ok(false),
                },
            };
            if byte != SYNC_CHAR_1 {
                self.skip_byte(byte)?;
                continue;
            }

            let next = match self.read_byte() {
                Ok(next) => next,
                Err(e) => {
                    self.pending = Some(SYNC_CHAR_1);
                    return Err(e.into());
                }
            };
            match next {
                Some(SYNC_CHAR_2) => return Ok(true),
                Some(next) => {
                    self.skip_byte(SYNC_CHAR_1)?;
                    self.pending = Some(next);
                }
                None => return Ok(false),
            }
        }
    }

    fn read_message(&mut self) -> Result<Option<MessagePair>, Error> {
        if !self.sync()? {
            return Ok(None);
        }

        let mut raw = vec![0u8; HEADER_LEN];
        raw[0] = SYNC_CHAR_1;
        raw[1] = SYNC_CHAR_2;
        let got = self.fill(&mut raw[2..])?;
        if got < HEADER_LEN - 2 {
            return Err(Error::TruncatedFrame {
                expected: HEADER_LEN,
                got: got + 2,
            });
        }

        let (_, (class, msg_id, len)) =
            parse_header(&raw[2..]).map_err(|_| Error::TruncatedFrame {
                expected: HEADER_LEN,
                got: got + 2,
            })?;
        let expected = HEADER_LEN + usize::from(len) + CHECKSUM_LEN;
        raw.resize(expected, 0);
        let got = self.fill(&mut raw[HEADER_LEN..])?;
        if HEADER_LEN + got < expected {
            return Err(Error::TruncatedFrame {
                expected,
                got: HEADER_LEN + got,
            });
        }
        debug!(
            "UBX frame class=0x{:02X} id=0x{:02X} len={}",
            class, msg_id, len
        );

        Ok(Some(MessagePair::decode(raw)))
    }
}

/// Class, message id and little endian payload length.
fn parse_header(i: &[u8]) -> IResult<&[u8], (u8, u8, u16)> {
    (byte, byte, le_u16).parse(i)
}

impl<R: Read> Iterator for UbxStream<R> {
    type Item = Result<MessagePair, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.read_message() {
            Ok(Some(pair)) => Some(Ok(pair)),
            Ok(None) => {
                info!("End of stream");
                self.done = true;
                None
            }
            // the caller decides whether to go on
            Err(Error::Interrupted) => Some(Err(Error::Interrupted)),
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
