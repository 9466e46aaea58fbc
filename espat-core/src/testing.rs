//! Test doubles for the link side of the engine.

use core::future::Future;
use core::net::Ipv4Addr;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::command::descriptor::{CommandKind, DeviceReply, Request, Response};
use crate::common::error::TransportError;
use crate::common::types::{ApIpConfig, MacAddress, Station};
use crate::dispatcher::DispatchWorker;
use crate::link::{AtTransport, ResponseSlot};

/// What happened on the link, in order
#[derive(Clone, Eq, PartialEq, Debug)]
pub enum LinkEvent {
    Sent(Request),
    Resolved(CommandKind),
    Resynchronized,
}

#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<LinkEvent>>>);

impl Journal {
    pub fn push(&self, event: LinkEvent) {
        self.0.lock().unwrap().push(event);
    }

    pub fn events(&self) -> Vec<LinkEvent> {
        self.0.lock().unwrap().clone()
    }
}

/// Device behavior for one request
#[derive(Clone, Debug)]
pub enum Scripted {
    /// Answer right away
    Reply(DeviceReply),
    /// Answer after a delay (device busy)
    Delayed(std::time::Duration, DeviceReply),
    /// Accept the request, never answer
    Silent,
    /// Fail the write
    Fail(TransportError),
    /// Never finish the write
    Stall,
}

pub fn sample_mac() -> MacAddress {
    MacAddress::new([0x02, 0x12, 0x34, 0x56, 0x78, 0x9a])
}

pub fn sample_ap_ip() -> ApIpConfig {
    ApIpConfig {
        ip: Ipv4Addr::new(192, 168, 4, 1),
        gateway: Ipv4Addr::new(192, 168, 4, 1),
        netmask: Ipv4Addr::new(255, 255, 255, 0),
    }
}

pub fn sample_stations(n: usize) -> Vec<Station> {
    (0..n)
        .map(|i| {
            let i = i as u8;
            Station::new(
                Ipv4Addr::new(192, 168, 4, 2 + i),
                MacAddress::new([0x02, 0, 0, 0, 0, i]),
            )
        })
        .collect()
}

/// Reply a well behaved device gives for `kind`
pub fn default_reply(kind: CommandKind) -> DeviceReply {
    Ok(match kind {
        CommandKind::ApGetIp => Response::ApIp(sample_ap_ip()),
        CommandKind::ApGetMac => Response::ApMac(sample_mac()),
        CommandKind::ApListStations => Response::Stations(sample_stations(3)),
        _ => Response::Done,
    })
}

/// Transport answering from a script, then like a well behaved device
/// Replies are delivered through the response slot the way a parser would.
pub struct ScriptedTransport<'e> {
    responses: &'e ResponseSlot,
    script: VecDeque<Scripted>,
    journal: Journal,
}

impl<'e> ScriptedTransport<'e> {
    pub fn new(responses: &'e ResponseSlot, journal: Journal) -> Self {
        Self {
            responses,
            script: VecDeque::new(),
            journal,
        }
    }

    pub fn with_script(mut self, script: impl IntoIterator<Item = Scripted>) -> Self {
        self.script.extend(script);
        self
    }

    fn deliver(&self, reply: DeviceReply) {
        if let Some(kind) = self.responses.pending() {
            if self.responses.resolve(reply) {
                self.journal.push(LinkEvent::Resolved(kind));
            }
        }
    }
}

impl AtTransport for ScriptedTransport<'_> {
    async fn send_request(&mut self, request: &Request) -> Result<(), TransportError> {
        self.journal.push(LinkEvent::Sent(request.clone()));
        let step = self
            .script
            .pop_front()
            .unwrap_or_else(|| Scripted::Reply(default_reply(request.kind())));
        match step {
            Scripted::Reply(reply) => self.deliver(reply),
            Scripted::Delayed(delay, reply) => {
                tokio::time::sleep(delay).await;
                self.deliver(reply);
            }
            Scripted::Silent => {}
            Scripted::Fail(err) => return Err(err),
            Scripted::Stall => core::future::pending::<()>().await,
        }
        Ok(())
    }

    async fn resynchronize(&mut self) {
        self.journal.push(LinkEvent::Resynchronized);
    }
}

/// Run `body` while the worker services the mailbox
pub async fn drive<T, const N: usize, F>(worker: &mut DispatchWorker<'_, T, N>, body: F) -> F::Output
where
    T: AtTransport,
    F: Future,
{
    tokio::select! {
        _ = worker.run() => unreachable!("dispatch worker returned"),
        output = body => output,
    }
}
