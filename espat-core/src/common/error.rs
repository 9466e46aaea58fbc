use core::fmt;

use super::types::Ecn;
use crate::command::descriptor::CommandKind;

/// Argument rejected before the command reaches the mailbox
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ArgumentError {
    /// IP address is required (0.0.0.0 given)
    MissingIp,
    /// MAC address has the group bit set
    GroupMacAddress,
    /// SSID is required
    EmptySsid,
    /// SSID longer than the device accepts
    SsidTooLong { len: usize },
    /// Password longer than the device accepts
    PasswordTooLong { len: usize },
    /// RF channel out of range
    ChannelOutOfRange { channel: u8 },
    /// Encryption mode not allowed for the SoftAP
    UnsupportedEncryption { ecn: Ecn },
    /// Station limit out of range
    MaxStationsOutOfRange { max_stations: u8 },
    /// Station list output has no room
    EmptyStationBuffer,
}

impl fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingIp => write!(f, "ip address is required"),
            Self::GroupMacAddress => write!(f, "bit 0 of byte 0 in AP MAC must be 0"),
            Self::EmptySsid => write!(f, "ssid is required"),
            Self::SsidTooLong { len } => write!(f, "ssid too long ({len} bytes)"),
            Self::PasswordTooLong { len } => write!(f, "password too long ({len} bytes)"),
            Self::ChannelOutOfRange { channel } => write!(f, "channel {channel} out of range"),
            Self::UnsupportedEncryption { ecn } => {
                write!(f, "encryption {ecn:?} not supported by access point")
            }
            Self::MaxStationsOutOfRange { max_stations } => {
                write!(f, "max stations {max_stations} out of range")
            }
            Self::EmptyStationBuffer => write!(f, "station buffer is empty"),
        }
    }
}

/// Failure reported by the device for a well-formed request
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceError {
    /// "ERROR"
    Error,
    /// "FAIL"
    Fail,
    /// "busy p..." / "busy s..."
    Busy,
    /// "ERR CODE:0x..."
    Code(u32),
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "device reported error"),
            Self::Fail => write!(f, "device reported failure"),
            Self::Busy => write!(f, "device busy"),
            Self::Code(code) => write!(f, "device error code {code:#010x}"),
        }
    }
}

/// Failure while writing a request to the link
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Write to the link failed
    Write,
    /// Link closed
    Closed,
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Write => write!(f, "link write failed"),
            Self::Closed => write!(f, "link closed"),
        }
    }
}

/// Command Error
/// `InvalidArgument` and `QueueFull` are returned at the call boundary,
/// all others only through completion.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandError {
    InvalidArgument(ArgumentError),
    QueueFull,
    TimedOut,
    Device(DeviceError),
    Transport(TransportError),
    UnexpectedResponse { expected: CommandKind },
}

impl CommandError {
    /// Result code of this error
    pub fn status(&self) -> CommandStatus {
        match self {
            Self::InvalidArgument(_) => CommandStatus::InvalidArgument,
            Self::QueueFull => CommandStatus::QueueFull,
            Self::TimedOut => CommandStatus::TimedOut,
            Self::Device(_) => CommandStatus::DeviceError,
            Self::Transport(_) => CommandStatus::TransportError,
            Self::UnexpectedResponse { .. } => CommandStatus::UnexpectedResponse,
        }
    }

    /// Check if the link state is unknown after this error
    pub fn is_link_suspect(&self) -> bool {
        matches!(self, Self::TimedOut)
    }
}

impl From<ArgumentError> for CommandError {
    fn from(err: ArgumentError) -> Self {
        Self::InvalidArgument(err)
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(err) => write!(f, "invalid argument: {err}"),
            Self::QueueFull => write!(f, "command mailbox is full"),
            Self::TimedOut => write!(f, "command timed out"),
            Self::Device(err) => fmt::Display::fmt(err, f),
            Self::Transport(err) => fmt::Display::fmt(err, f),
            Self::UnexpectedResponse { expected } => {
                write!(f, "unexpected response for {expected:?}")
            }
        }
    }
}

/// Final status code of a transaction
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandStatus {
    Ok,
    InvalidArgument,
    QueueFull,
    TimedOut,
    DeviceError,
    TransportError,
    UnexpectedResponse,
}

impl CommandStatus {
    /// Status of a finished transaction
    pub fn of<T>(result: &Result<T, CommandError>) -> Self {
        match result {
            Ok(_) => Self::Ok,
            Err(err) => err.status(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok)
    }
}
