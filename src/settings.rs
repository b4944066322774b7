//! Command line settings given as `key=value` tokens.

use core::str::FromStr;
use std::time::Duration;

use log::warn;
use nom::{
    IResult, Parser as _,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::rest,
    sequence::separated_pair,
};

use crate::Error;

pub const DEFAULT_PORT: &str = "COM13";
pub const DEFAULT_BAUD: u32 = 9600;
/// Read timeout in seconds
pub const DEFAULT_TIMEOUT: u64 = 5;

/// Tokens which, given as the first argument, ask for the usage text.
pub const HELP_TOKENS: [&str; 6] = ["-h", "--h", "help", "-help", "--help", "-H"];

pub fn is_help_token(arg: &str) -> bool {
    HELP_TOKENS.contains(&arg)
}

/// Streaming configuration, built once at startup.
///
/// # Examples
///
/// ```
/// use ubxdump::Settings;
///
/// let settings = Settings::from_args(["port=\"/dev/ttyACM0\"", "raw=1"]).unwrap();
/// assert_eq!(settings.port, "/dev/ttyACM0");
/// assert_eq!(settings.baud, 9600);
/// assert!(settings.raw);
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Serial device, e.g. `COM13` or `/dev/ttyACM0`
    pub port: String,
    /// Bit rate of the serial line
    pub baud: u32,
    /// Read timeout in seconds
    pub timeout: u64,
    /// Stop streaming on the first byte that does not belong to a UBX frame
    pub ubx_only: bool,
    /// Print the undecoded frame bytes instead of the decoded message
    pub raw: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT.to_string(),
            baud: DEFAULT_BAUD,
            timeout: DEFAULT_TIMEOUT,
            ubx_only: false,
            raw: false,
        }
    }
}

impl Settings {
    /// Folds parsed tokens over the defaults, later tokens win.
    pub fn from_settings(settings: impl IntoIterator<Item = Setting>) -> Self {
        settings
            .into_iter()
            .fold(Self::default(), |mut acc, setting| {
                match setting {
                    Setting::Port(port) => acc.port = port,
                    Setting::Baud(baud) => acc.baud = baud,
                    Setting::Timeout(timeout) => acc.timeout = timeout,
                    Setting::UbxOnly(ubx_only) => acc.ubx_only = ubx_only,
                    Setting::Raw(raw) => acc.raw = raw,
                    Setting::Unknown { key, value } => {
                        warn!("Ignoring unknown setting '{}={}'", key, value)
                    }
                }
                acc
            })
    }

    /// Parses raw `key=value` tokens, failing on the first malformed one.
    pub fn from_args<I, S>(args: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let settings = args
            .into_iter()
            .map(|arg| arg.as_ref().parse::<Setting>())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::from_settings(settings))
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

/// A single `key=value` command line token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Setting {
    Port(String),
    Baud(u32),
    Timeout(u64),
    UbxOnly(bool),
    Raw(bool),
    Unknown { key: String, value: String },
}

fn do_parse_key_value(i: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_'),
        char('='),
        rest,
    )
    .parse(i)
}

fn strip_quotes(value: &str) -> &str {
    value.trim_matches(|c| c == '"' || c == '\'')
}

fn parse_number<T: FromStr>(token: &str, key: &str, value: &str) -> Result<T, Error>
where
    T::Err: core::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|err| Error::invalid_argument(token, format!("'{}' expects an integer: {}", key, err)))
}

/// Integer flags, any non-zero value is `true`.
fn parse_flag(token: &str, key: &str, value: &str) -> Result<bool, Error> {
    parse_number::<i64>(token, key, value).map(|flag| flag != 0)
}

impl FromStr for Setting {
    type Err = Error;

    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let (_, (key, value)) = do_parse_key_value(token)
            .map_err(|_| Error::invalid_argument(token, "expected key=value"))?;

        let setting = match key {
            "port" => Setting::Port(strip_quotes(value).to_string()),
            "baud" => Setting::Baud(parse_number(token, key, value)?),
            "timeout" => Setting::Timeout(parse_number(token, key, value)?),
            "ubx_only" => Setting::UbxOnly(parse_flag(token, key, value)?),
            "raw" => Setting::Raw(parse_flag(token, key, value)?),
            _ => Setting::Unknown {
                key: key.to_string(),
                value: value.to_string(),
            },
        };
        Ok(setting)
    }
}
