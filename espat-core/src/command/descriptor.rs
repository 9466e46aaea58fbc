use alloc::vec::Vec;
use core::fmt;
use core::net::Ipv4Addr;

use embassy_time::Duration;

use super::completion::Completion;
use crate::common::error::{CommandError, CommandStatus, DeviceError};
use crate::common::types::{ApConfiguration, ApIpConfig, MacAddress, Station};
use crate::constant::*;

/// Command ID
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandKind {
    /// AT+CIPAP?
    ApGetIp,
    /// AT+CIPAP=
    ApSetIp,
    /// AT+CIPAPMAC?
    ApGetMac,
    /// AT+CIPAPMAC=
    ApSetMac,
    /// AT+CWSAP=
    ApConfigure,
    /// AT+CWLIF
    ApListStations,
    /// AT+CWQIF=
    ApDisconnectStation,
}

impl CommandKind {
    /// Default time allowed from dequeue to completion
    pub const fn default_timeout(&self) -> Duration {
        match self {
            Self::ApConfigure => Duration::from_millis(COMMAND_TIMEOUT_MS_PERSIST),
            _ => Duration::from_millis(COMMAND_TIMEOUT_MS_DEFAULT),
        }
    }

    /// Check if the device saves the change to its NVS area
    pub const fn persists_to_device(&self) -> bool {
        matches!(self, Self::ApSetIp | Self::ApSetMac | Self::ApConfigure)
    }
}

/// Command Request
/// Every variant owns its inputs, so nothing borrowed from the caller
/// crosses the mailbox.
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Request {
    ApGetIp,
    /// gateway/netmask: None keeps the device default
    ApSetIp {
        ip: Ipv4Addr,
        gateway: Option<Ipv4Addr>,
        netmask: Option<Ipv4Addr>,
    },
    ApGetMac,
    ApSetMac {
        mac: MacAddress,
    },
    ApConfigure(ApConfiguration),
    /// limit: number of entries the caller can take
    ApListStations {
        limit: usize,
    },
    ApDisconnectStation {
        mac: MacAddress,
    },
}

impl Request {
    pub fn kind(&self) -> CommandKind {
        match self {
            Self::ApGetIp => CommandKind::ApGetIp,
            Self::ApSetIp { .. } => CommandKind::ApSetIp,
            Self::ApGetMac => CommandKind::ApGetMac,
            Self::ApSetMac { .. } => CommandKind::ApSetMac,
            Self::ApConfigure(_) => CommandKind::ApConfigure,
            Self::ApListStations { .. } => CommandKind::ApListStations,
            Self::ApDisconnectStation { .. } => CommandKind::ApDisconnectStation,
        }
    }
}

/// Command Response (parsed by the response collaborator)
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum Response {
    /// Reply to ApGetIp
    ApIp(ApIpConfig),
    /// Reply to ApGetMac
    ApMac(MacAddress),
    /// Reply to ApListStations
    Stations(Vec<Station>),
    /// Plain "OK" for set/configure/disconnect
    Done,
}

impl Response {
    /// Check if this response has the shape `kind` expects
    pub fn answers(&self, kind: CommandKind) -> bool {
        match self {
            Self::ApIp(_) => kind == CommandKind::ApGetIp,
            Self::ApMac(_) => kind == CommandKind::ApGetMac,
            Self::Stations(_) => kind == CommandKind::ApListStations,
            Self::Done => matches!(
                kind,
                CommandKind::ApSetIp
                    | CommandKind::ApSetMac
                    | CommandKind::ApConfigure
                    | CommandKind::ApDisconnectStation
            ),
        }
    }

    pub fn into_ap_ip(self) -> Result<ApIpConfig, CommandError> {
        match self {
            Self::ApIp(config) => Ok(config),
            _ => Err(CommandError::UnexpectedResponse {
                expected: CommandKind::ApGetIp,
            }),
        }
    }

    pub fn into_mac(self) -> Result<MacAddress, CommandError> {
        match self {
            Self::ApMac(mac) => Ok(mac),
            _ => Err(CommandError::UnexpectedResponse {
                expected: CommandKind::ApGetMac,
            }),
        }
    }

    pub fn into_stations(self) -> Result<Vec<Station>, CommandError> {
        match self {
            Self::Stations(stations) => Ok(stations),
            _ => Err(CommandError::UnexpectedResponse {
                expected: CommandKind::ApListStations,
            }),
        }
    }

    /// `expected`: the status-only command this reply answers
    pub fn into_done(self, expected: CommandKind) -> Result<(), CommandError> {
        match self {
            Self::Done => Ok(()),
            _ => Err(CommandError::UnexpectedResponse { expected }),
        }
    }
}

/// Transaction result handed to the completion
pub type CommandResult = Result<Response, CommandError>;

/// What the response collaborator delivers for the pending transaction
pub type DeviceReply = Result<Response, DeviceError>;

/// Completion Mode
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CommandMode {
    /// Caller awaits the result
    Blocking,
    /// Caller gets a callback from the worker
    NonBlocking,
}

/// Command Descriptor
/// Built by one producer call, serviced by exactly one worker transaction.
pub struct CommandDescriptor {
    /// Payload (kind is derived from it)
    request: Request,
    /// Time allowed from dequeue to completion
    timeout: Duration,
    /// Completion Signal
    completion: Completion,
}

impl CommandDescriptor {
    /// Create a new CommandDescriptor
    pub fn new(request: Request, timeout: Duration, completion: Completion) -> Self {
        Self {
            request,
            timeout,
            completion,
        }
    }

    /// Create a new CommandDescriptor with the kind's default timeout
    pub fn with_default_timeout(request: Request, completion: Completion) -> Self {
        let timeout = request.kind().default_timeout();
        Self::new(request, timeout, completion)
    }

    pub fn kind(&self) -> CommandKind {
        self.request.kind()
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn mode(&self) -> CommandMode {
        self.completion.mode()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Fire the completion signal with the transaction result
    /// Consumes the descriptor, so a result is delivered at most once.
    /// The returned status is the worker's record of the outcome.
    pub(crate) fn complete(self, result: CommandResult) -> CommandStatus {
        let status = CommandStatus::of(&result);
        self.completion.fire(result);
        status
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("request", &self.request)
            .field("timeout_ms", &self.timeout.as_millis())
            .field("mode", &self.mode())
            .finish()
    }
}
