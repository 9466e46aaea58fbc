use embassy_time::Duration;

use crate::command::completion::Completion;
use crate::command::descriptor::{CommandDescriptor, CommandResult, Request};
use crate::common::error::CommandError;
use crate::mailbox::Mailbox;

#[cfg(feature = "access-point")]
use crate::ap::AccessPoint;

/// Producer handle
/// Cheap to copy; any number of tasks may hold one.
pub struct AtClient<'e, const N: usize> {
    mailbox: &'e Mailbox<N>,
}

impl<const N: usize> Clone for AtClient<'_, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<const N: usize> Copy for AtClient<'_, N> {}

impl<'e, const N: usize> AtClient<'e, N> {
    /// Create a new AtClient
    pub fn new(mailbox: &'e Mailbox<N>) -> Self {
        Self { mailbox }
    }

    /// Blocking: submit and wait for the transaction result
    pub async fn execute(&self, request: Request) -> CommandResult {
        let timeout = request.kind().default_timeout();
        self.execute_with_timeout(request, timeout).await
    }

    /// Blocking with an explicit timeout
    pub async fn execute_with_timeout(&self, request: Request, timeout: Duration) -> CommandResult {
        let (completion, signal) = Completion::blocking();
        self.mailbox
            .submit(CommandDescriptor::new(request, timeout, completion))
            .await;
        signal.wait().await
    }

    /// Non-blocking: submit and return once accepted
    /// `callback` runs on the dispatch worker, see [`crate::command::completion::Callback`].
    pub async fn dispatch<F>(&self, request: Request, callback: F)
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        self.mailbox
            .submit(CommandDescriptor::with_default_timeout(
                request,
                Completion::callback(callback),
            ))
            .await;
    }

    /// Non-blocking without waiting for a mailbox slot
    /// Returns QueueFull if the mailbox is full; the callback is then never called.
    pub fn try_dispatch<F>(&self, request: Request, callback: F) -> Result<(), CommandError>
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        self.mailbox.try_submit(CommandDescriptor::with_default_timeout(
            request,
            Completion::callback(callback),
        ))
    }

    /// Access point commands
    #[cfg(feature = "access-point")]
    pub fn access_point(&self) -> AccessPoint<'e, N> {
        AccessPoint::new(*self)
    }

    /// Number of commands waiting for the worker
    pub fn queued(&self) -> usize {
        self.mailbox.len()
    }
}
