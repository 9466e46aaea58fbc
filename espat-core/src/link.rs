use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::command::descriptor::{CommandKind, DeviceReply, Request};
use crate::common::error::TransportError;

/// Link Transport
/// Writes the wire form of one request. The dispatch worker never calls
/// `send_request` again before the previous transaction completed or timed out.
#[trait_variant::make(Send)]
pub trait AtTransport {
    /// Transmit one request
    async fn send_request(&mut self, request: &Request) -> Result<(), TransportError>;
    /// Recover the link after a timed out transaction
    /// Called before the next request is sent.
    async fn resynchronize(&mut self);
}

/// Response Slot
/// Resolution point between the response parser and the dispatch worker.
/// The parser asks `pending()` which reply shape is awaited and delivers it
/// with `resolve()`. Replies arriving while nothing is pending are dropped.
pub struct ResponseSlot {
    /// Kind of the transaction waiting for a reply
    pending: Mutex<CriticalSectionRawMutex, Cell<Option<CommandKind>>>,
    /// Reply for the pending transaction
    reply: Signal<CriticalSectionRawMutex, DeviceReply>,
}

impl Default for ResponseSlot {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseSlot {
    /// Create a new ResponseSlot
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(None)),
            reply: Signal::new(),
        }
    }

    /// Kind of the transaction awaiting a reply, if any
    pub fn pending(&self) -> Option<CommandKind> {
        self.pending.lock(|pending| pending.get())
    }

    /// Deliver the reply for the pending transaction
    /// Returns false if no transaction is waiting (late or unsolicited reply).
    pub fn resolve(&self, reply: DeviceReply) -> bool {
        // signal under the same lock as arm/disarm, a late reply can never
        // land on the next transaction
        let resolved = self.pending.lock(|pending| match pending.take() {
            Some(kind) => {
                trace!("reply resolved: kind={:?}", kind);
                self.reply.signal(reply);
                true
            }
            None => false,
        });
        if !resolved {
            debug!("reply dropped, no pending transaction");
        }
        resolved
    }

    /// Open the slot for `kind`, discarding anything left over
    pub(crate) fn arm(&self, kind: CommandKind) {
        self.pending.lock(|pending| {
            self.reply.reset();
            pending.set(Some(kind));
        });
    }

    /// Close the slot after a timeout or transport failure
    pub(crate) fn disarm(&self) {
        self.pending.lock(|pending| {
            pending.set(None);
            self.reply.reset();
        });
    }

    /// Wait for the reply
    pub(crate) async fn wait(&self) -> DeviceReply {
        self.reply.wait().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::descriptor::Response;
    use crate::common::error::DeviceError;

    #[tokio::test]
    async fn test_resolve_pending() {
        let slot = ResponseSlot::new();
        assert_eq!(slot.pending(), None);

        slot.arm(CommandKind::ApGetMac);
        assert_eq!(slot.pending(), Some(CommandKind::ApGetMac));
        assert!(slot.resolve(Err(DeviceError::Fail)));
        assert_eq!(slot.pending(), None);
        assert_eq!(slot.wait().await, Err(DeviceError::Fail));
    }

    #[test]
    fn test_unsolicited_reply_dropped() {
        let slot = ResponseSlot::new();
        assert!(!slot.resolve(Ok(Response::Done)));
    }

    #[tokio::test]
    async fn test_second_reply_dropped() {
        let slot = ResponseSlot::new();
        slot.arm(CommandKind::ApSetMac);
        assert!(slot.resolve(Ok(Response::Done)));
        assert!(!slot.resolve(Err(DeviceError::Error)));
        assert_eq!(slot.wait().await, Ok(Response::Done));
    }

    #[tokio::test]
    async fn test_disarm_discards_reply() {
        let slot = ResponseSlot::new();
        slot.arm(CommandKind::ApGetIp);
        slot.disarm();
        assert!(!slot.resolve(Ok(Response::Done)));

        // next transaction does not see anything stale
        slot.arm(CommandKind::ApSetIp);
        let waited =
            tokio::time::timeout(std::time::Duration::from_millis(20), slot.wait()).await;
        assert!(waited.is_err());
    }
}
