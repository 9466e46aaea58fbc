use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use crate::command::descriptor::CommandDescriptor;
use crate::common::error::CommandError;

/// Producer -> Dispatch Worker mailbox
/// Bounded FIFO. Any number of producers may submit, only the worker takes.
pub struct Mailbox<const N: usize> {
    channel: Channel<CriticalSectionRawMutex, CommandDescriptor, N>,
}

impl<const N: usize> Default for Mailbox<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Mailbox<N> {
    /// Create a new Mailbox
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Enqueue a descriptor
    /// Waits while the mailbox is full, never drops.
    pub async fn submit(&self, descriptor: CommandDescriptor) {
        if self.channel.is_full() {
            debug!("mailbox full, waiting for slot: kind={:?}", descriptor.kind());
        }
        self.channel.send(descriptor).await;
    }

    /// Enqueue a descriptor without waiting
    /// On a full mailbox the descriptor is dropped unfired and QueueFull returned.
    pub fn try_submit(&self, descriptor: CommandDescriptor) -> Result<(), CommandError> {
        let kind = descriptor.kind();
        self.channel.try_send(descriptor).map_err(|_| {
            warn!("mailbox full, rejected: kind={:?}", kind);
            CommandError::QueueFull
        })
    }

    /// Dequeue the oldest descriptor (worker only)
    pub async fn take(&self) -> CommandDescriptor {
        self.channel.receive().await
    }

    /// Number of descriptors waiting
    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::completion::Completion;
    use crate::command::descriptor::{CommandKind, Request};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn descriptor(request: Request) -> CommandDescriptor {
        CommandDescriptor::with_default_timeout(request, Completion::callback(|_| {}))
    }

    #[tokio::test]
    async fn test_fifo_order() {
        let mailbox = Mailbox::<4>::new();
        mailbox.submit(descriptor(Request::ApGetIp)).await;
        mailbox.submit(descriptor(Request::ApGetMac)).await;
        mailbox
            .submit(descriptor(Request::ApListStations { limit: 1 }))
            .await;
        assert_eq!(mailbox.len(), 3);

        assert_eq!(mailbox.take().await.kind(), CommandKind::ApGetIp);
        assert_eq!(mailbox.take().await.kind(), CommandKind::ApGetMac);
        assert_eq!(mailbox.take().await.kind(), CommandKind::ApListStations);
        assert!(mailbox.is_empty());
    }

    #[test]
    fn test_try_submit_full() {
        let mailbox = Mailbox::<2>::new();
        assert_eq!(mailbox.capacity(), 2);
        assert_eq!(mailbox.try_submit(descriptor(Request::ApGetIp)), Ok(()));
        assert_eq!(mailbox.try_submit(descriptor(Request::ApGetMac)), Ok(()));

        // rejected descriptor never fires its callback
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = calls.clone();
        let rejected = CommandDescriptor::with_default_timeout(
            Request::ApGetIp,
            Completion::callback(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
            }),
        );
        assert_eq!(mailbox.try_submit(rejected), Err(CommandError::QueueFull));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(mailbox.len(), 2);
    }

    #[tokio::test]
    async fn test_submit_waits_while_full() {
        let mailbox = Mailbox::<1>::new();
        mailbox.submit(descriptor(Request::ApGetIp)).await;

        // second submit parks until the first is taken
        let blocked = tokio::time::timeout(
            std::time::Duration::from_millis(50),
            mailbox.submit(descriptor(Request::ApGetMac)),
        )
        .await;
        assert!(blocked.is_err());
        assert_eq!(mailbox.len(), 1);

        let (taken, ()) = tokio::join!(mailbox.take(), mailbox.submit(descriptor(Request::ApGetMac)));
        assert_eq!(taken.kind(), CommandKind::ApGetIp);
        assert_eq!(mailbox.take().await.kind(), CommandKind::ApGetMac);
    }
}
