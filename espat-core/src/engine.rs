use crate::client::AtClient;
use crate::constant::MAILBOX_DEPTH;
use crate::dispatcher::DispatchWorker;
use crate::link::{AtTransport, ResponseSlot};
use crate::mailbox::Mailbox;

/// Engine Resources
/// Mailbox and response slot shared by producers, the dispatch worker and
/// the response parser. Meant to live in a `static`:
///
/// ```ignore
/// static ENGINE: AtEngine = AtEngine::new();
///
/// #[embassy_executor::task]
/// async fn dispatch_task(uart: UartTransport) {
///     ENGINE.worker(uart).run().await;
/// }
/// ```
pub struct AtEngine<const N: usize = MAILBOX_DEPTH> {
    /// Producer -> Worker mailbox
    mailbox: Mailbox<N>,
    /// Parser -> Worker reply slot
    responses: ResponseSlot,
}

impl<const N: usize> Default for AtEngine<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> AtEngine<N> {
    /// Create a new AtEngine
    pub const fn new() -> Self {
        Self {
            mailbox: Mailbox::new(),
            responses: ResponseSlot::new(),
        }
    }

    /// Producer handle
    pub fn client(&self) -> AtClient<'_, N> {
        AtClient::new(&self.mailbox)
    }

    /// Build the dispatch worker. Only one worker may run per engine.
    pub fn worker<T: AtTransport>(&self, transport: T) -> DispatchWorker<'_, T, N> {
        DispatchWorker::new(transport, &self.mailbox, &self.responses)
    }

    /// Reply slot handed to the response parser
    pub fn responses(&self) -> &ResponseSlot {
        &self.responses
    }

    pub fn mailbox(&self) -> &Mailbox<N> {
        &self.mailbox
    }
}
