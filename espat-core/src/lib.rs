#![cfg_attr(not(test), no_std)]

extern crate alloc;

// This mod MUST go first, so that the others see its macros.
mod fmt;

pub mod command;
pub mod common;
pub mod constant;
pub mod dispatcher;
pub mod engine;
pub mod link;
pub mod mailbox;
pub mod client;

#[cfg(feature = "access-point")]
pub mod ap;

#[cfg(test)]
mod testing;

pub use client::AtClient;
pub use command::completion::{Completion, CompletionSignal};
pub use command::descriptor::{
    CommandDescriptor, CommandKind, CommandMode, CommandResult, DeviceReply, Request, Response,
};
pub use common::error::{ArgumentError, CommandError, CommandStatus, DeviceError, TransportError};
pub use common::types::{ApConfiguration, ApIpConfig, Ecn, MacAddress, Station};
pub use dispatcher::{DispatchState, DispatchStats, DispatchWorker};
pub use engine::AtEngine;
pub use link::{AtTransport, ResponseSlot};
pub use mailbox::Mailbox;

#[cfg(feature = "access-point")]
pub use ap::AccessPoint;
