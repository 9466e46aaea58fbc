use embassy_time::{with_deadline, Duration, Instant};

use crate::command::descriptor::{CommandKind, CommandResult, Request, Response};
use crate::common::error::{CommandError, CommandStatus};
use crate::link::{AtTransport, ResponseSlot};
use crate::mailbox::Mailbox;

/// Dispatch Worker State
/// - Idle -> Dispatching -> AwaitingResponse -> Completing -> Idle
/// - AwaitingResponse -> TimedOut -> Completing
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DispatchState {
    /// No transaction, waiting on the mailbox
    Idle,
    /// Request being written to the transport
    Dispatching,
    /// Waiting for the reply or the deadline
    AwaitingResponse,
    /// Deadline passed, link state unknown
    TimedOut,
    /// Result set, completion being fired
    Completing,
}

/// Transaction counters
#[derive(Copy, Clone, Default, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DispatchStats {
    /// Transactions completed (any result)
    pub completed: u32,
    /// Completed with Ok
    pub succeeded: u32,
    /// Completed with TimedOut
    pub timed_out: u32,
    /// Completed with any other error
    pub failed: u32,
    /// Link resynchronizations requested
    pub resyncs: u32,
}

/// The transaction currently serviced
/// Exists only between dequeue and completion.
struct PendingTransaction {
    /// Sequence number (for logs)
    seq: u32,
    kind: CommandKind,
    started_at: Instant,
    deadline: Instant,
}

impl PendingTransaction {
    /// A timeout past the end of the clock never expires
    fn new(seq: u32, kind: CommandKind, timeout: Duration) -> Self {
        let started_at = Instant::now();
        Self {
            seq,
            kind,
            started_at,
            deadline: started_at.checked_add(timeout).unwrap_or(Instant::MAX),
        }
    }
}

/// Dispatch Worker
/// Sole consumer of the mailbox. Runs one transaction at a time on the link.
pub struct DispatchWorker<'e, T: AtTransport, const N: usize> {
    /// Link Transport
    transport: T,
    /// Request Mailbox
    mailbox: &'e Mailbox<N>,
    /// Reply resolution point shared with the response parser
    responses: &'e ResponseSlot,
    state: DispatchState,
    stats: DispatchStats,
    next_seq: u32,
    /// Set by a timeout, cleared once the transport resynchronized
    resync_required: bool,
}

impl<'e, T: AtTransport, const N: usize> DispatchWorker<'e, T, N> {
    /// Create a new DispatchWorker
    pub fn new(transport: T, mailbox: &'e Mailbox<N>, responses: &'e ResponseSlot) -> Self {
        Self {
            transport,
            mailbox,
            responses,
            state: DispatchState::Idle,
            stats: DispatchStats::default(),
            next_seq: 0,
            resync_required: false,
        }
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Check if the next dispatch resynchronizes the link first
    pub fn resync_required(&self) -> bool {
        self.resync_required
    }

    /// Run the main loop
    pub async fn run(&mut self) {
        info!("dispatch worker started: mailbox depth={}", N);
        loop {
            self.service_next().await;
        }
    }

    /// Wait for the next descriptor and run its transaction to completion
    pub async fn service_next(&mut self) -> CommandStatus {
        self.transition(DispatchState::Idle);
        let descriptor = self.mailbox.take().await;

        self.transition(DispatchState::Dispatching);
        if self.resync_required {
            info!("resynchronizing link");
            self.transport.resynchronize().await;
            self.resync_required = false;
        }

        let pending = PendingTransaction::new(self.next_seq, descriptor.kind(), descriptor.timeout());
        self.next_seq = self.next_seq.wrapping_add(1);
        debug!(
            "dispatch: seq={} kind={:?} mode={:?} timeout={}ms",
            pending.seq,
            pending.kind,
            descriptor.mode(),
            descriptor.timeout().as_millis()
        );

        let result = self.transact(&pending, descriptor.request()).await;

        self.transition(DispatchState::Completing);
        let status = descriptor.complete(result);
        self.record(status);
        debug!(
            "complete: seq={} kind={:?} status={:?} elapsed={}ms",
            pending.seq,
            pending.kind,
            status,
            pending.started_at.elapsed().as_millis()
        );

        self.transition(DispatchState::Idle);
        status
    }

    /// Send the request and wait for its reply within the deadline
    async fn transact(&mut self, pending: &PendingTransaction, request: &Request) -> CommandResult {
        // open the slot first, the reply may arrive before send_request returns
        self.responses.arm(pending.kind);

        match with_deadline(pending.deadline, self.transport.send_request(request)).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                self.responses.disarm();
                warn!("send failed: seq={} err={:?}", pending.seq, err);
                return Err(CommandError::Transport(err));
            }
            Err(_) => return Err(self.time_out(pending)),
        }

        self.transition(DispatchState::AwaitingResponse);
        match with_deadline(pending.deadline, self.responses.wait()).await {
            Ok(Ok(response)) => self.accept(pending, request, response),
            Ok(Err(err)) => {
                debug!("device error: seq={} err={:?}", pending.seq, err);
                Err(CommandError::Device(err))
            }
            Err(_) => Err(self.time_out(pending)),
        }
    }

    /// Check the reply shape and fit it to the request
    fn accept(
        &self,
        pending: &PendingTransaction,
        request: &Request,
        response: Response,
    ) -> CommandResult {
        if !response.answers(pending.kind) {
            warn!("unexpected reply: seq={} kind={:?}", pending.seq, pending.kind);
            return Err(CommandError::UnexpectedResponse {
                expected: pending.kind,
            });
        }
        match (request, response) {
            (Request::ApListStations { limit }, Response::Stations(mut stations)) => {
                // the caller only has room for `limit` entries
                stations.truncate(*limit);
                Ok(Response::Stations(stations))
            }
            (_, response) => Ok(response),
        }
    }

    /// Abandon the wait; the link must be resynchronized before the next dispatch
    fn time_out(&mut self, pending: &PendingTransaction) -> CommandError {
        self.transition(DispatchState::TimedOut);
        self.responses.disarm();
        self.resync_required = true;
        self.stats.resyncs = self.stats.resyncs.wrapping_add(1);
        warn!(
            "timed out: seq={} kind={:?} after {}ms",
            pending.seq,
            pending.kind,
            pending.started_at.elapsed().as_millis()
        );
        CommandError::TimedOut
    }

    fn record(&mut self, status: CommandStatus) {
        let stats = &mut self.stats;
        stats.completed = stats.completed.wrapping_add(1);
        let counter = match status {
            CommandStatus::Ok => &mut stats.succeeded,
            CommandStatus::TimedOut => &mut stats.timed_out,
            _ => &mut stats.failed,
        };
        *counter = counter.wrapping_add(1);
    }

    fn transition(&mut self, next: DispatchState) {
        if self.state != next {
            trace!("state: {:?} -> {:?}", self.state, next);
            self.state = next;
        }
    }
}
