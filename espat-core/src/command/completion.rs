use alloc::boxed::Box;
use alloc::sync::Arc;
use core::fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;

use super::descriptor::{CommandMode, CommandResult};

/// Completion callback for non-blocking commands
/// Runs on the dispatch worker. It must return quickly and must not await
/// a blocking command itself: the worker would wait on its own mailbox.
pub type Callback = Box<dyn FnOnce(CommandResult) + Send + 'static>;

/// Wait/notify primitive for one blocking command
pub struct CompletionSignal {
    signal: Signal<CriticalSectionRawMutex, CommandResult>,
}

impl Default for CompletionSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionSignal {
    /// Create a new CompletionSignal
    pub const fn new() -> Self {
        Self {
            signal: Signal::new(),
        }
    }

    /// Check if the worker already completed the command
    pub fn is_completed(&self) -> bool {
        self.signal.signaled()
    }

    /// Wait for the transaction result
    pub async fn wait(&self) -> CommandResult {
        self.signal.wait().await
    }

    fn notify(&self, result: CommandResult) {
        self.signal.signal(result);
    }
}

/// Completion Signal
pub enum Completion {
    /// Blocking: the producer waits on the shared signal
    Signal(Arc<CompletionSignal>),
    /// Non-blocking: the worker calls back
    Callback(Callback),
}

impl Completion {
    /// Create a blocking completion and the handle the producer waits on
    pub fn blocking() -> (Self, Arc<CompletionSignal>) {
        let signal = Arc::new(CompletionSignal::new());
        (Self::Signal(signal.clone()), signal)
    }

    /// Create a non-blocking completion
    pub fn callback<F>(callback: F) -> Self
    where
        F: FnOnce(CommandResult) + Send + 'static,
    {
        Self::Callback(Box::new(callback))
    }

    pub fn mode(&self) -> CommandMode {
        match self {
            Self::Signal(_) => CommandMode::Blocking,
            Self::Callback(_) => CommandMode::NonBlocking,
        }
    }

    /// Deliver the result. Taking `self` makes this happen at most once.
    pub(crate) fn fire(self, result: CommandResult) {
        match self {
            Self::Signal(signal) => signal.notify(result),
            Self::Callback(callback) => callback(result),
        }
    }
}

impl fmt::Debug for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signal(signal) => f
                .debug_struct("Signal")
                .field("completed", &signal.is_completed())
                .finish(),
            Self::Callback(_) => f.write_str("Callback"),
        }
    }
}
