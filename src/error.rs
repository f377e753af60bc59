//! Unified error types for the SensorHub firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! top-level loop's error handling uniform.  Every variant is recoverable:
//! nothing in the alarm core halts the process.  All variants are `Copy`
//! so they can be passed around without allocation.

use core::fmt;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A remote command envelope could not be parsed.
    Parse(ParseError),
    /// Expander register read or publish failed.
    Io(IoError),
    /// The sensor table rejected a descriptor.
    Sensor(SensorError),
    /// Configuration is invalid.
    Config(ConfigError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(e) => write!(f, "parse: {e}"),
            Self::Io(e) => write!(f, "io: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Command envelope parse errors
// ---------------------------------------------------------------------------

/// Malformed command envelope.  Always recovered locally into an `error`
/// command result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// Input was empty or whitespace only.
    Empty,
    /// Input is not a flat `{ "key": value, ... }` object.
    Malformed,
    /// The required `command` field is absent.
    MissingCommand,
    /// A key or value exceeded the fixed field capacity.
    FieldTooLong,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty envelope"),
            Self::Malformed => write!(f, "malformed envelope"),
            Self::MissingCommand => write!(f, "missing command field"),
            Self::FieldTooLong => write!(f, "field too long"),
        }
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Self::Parse(e)
    }
}

// ---------------------------------------------------------------------------
// I/O errors (surfaced by collaborators)
// ---------------------------------------------------------------------------

/// Failure reported by the expander or transport collaborator.  The core
/// treats a failed read as "no transition this tick".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// Bus transaction NACKed or arbitration lost.
    Bus,
    /// Bounded bus timeout elapsed.
    Timeout,
    /// Transport is not connected.
    NotConnected,
    /// Transport refused the publish.
    Publish,
}

impl fmt::Display for IoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus => write!(f, "bus error"),
            Self::Timeout => write!(f, "bus timeout"),
            Self::NotConnected => write!(f, "transport not connected"),
            Self::Publish => write!(f, "publish failed"),
        }
    }
}

impl From<IoError> for Error {
    fn from(e: IoError) -> Self {
        Self::Io(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor table errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The fixed-capacity table is full.
    TableFull,
    /// The pin mask does not have exactly one bit set.
    InvalidPinMask,
    /// Another sensor already owns this expander pin.
    DuplicatePin,
    /// Another sensor already uses this id.
    DuplicateId,
    /// Name does not fit the fixed-capacity buffer.
    NameTooLong,
}

impl fmt::Display for SensorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TableFull => write!(f, "sensor table full"),
            Self::InvalidPinMask => write!(f, "pin mask must have exactly one bit"),
            Self::DuplicatePin => write!(f, "pin already assigned"),
            Self::DuplicateId => write!(f, "sensor id already assigned"),
            Self::NameTooLong => write!(f, "sensor name too long"),
        }
    }
}

impl From<SensorError> for Error {
    fn from(e: SensorError) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    /// A config field failed range validation.
    /// The `&'static str` describes which field and why.
    ValidationFailed(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ValidationFailed(msg) => write!(f, "validation failed: {msg}"),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
