use std::collections::VecDeque;

/// Identifies one requested display-refresh callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameTicket(pub u64);

/// "Call me on the next display refresh" primitive provided by the host.
///
/// `cancel_frame` must take effect synchronously: a cancelled ticket is never delivered.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameTicket;
    fn cancel_frame(&mut self, ticket: FrameTicket);
}

impl<S: FrameScheduler + ?Sized> FrameScheduler for &mut S {
    fn request_frame(&mut self) -> FrameTicket {
        (**self).request_frame()
    }

    fn cancel_frame(&mut self, ticket: FrameTicket) {
        (**self).cancel_frame(ticket)
    }
}

/// Deterministic scheduler pumped by the host (or a test) via [`QueuedScheduler::pop`].
#[derive(Debug, Default)]
pub struct QueuedScheduler {
    next: u64,
    pending: VecDeque<FrameTicket>,
}

impl QueuedScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets requested and not yet delivered or cancelled, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = FrameTicket> + '_ {
        self.pending.iter().copied()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Deliver the oldest pending ticket.
    pub fn pop(&mut self) -> Option<FrameTicket> {
        self.pending.pop_front()
    }
}

impl FrameScheduler for QueuedScheduler {
    fn request_frame(&mut self) -> FrameTicket {
        let ticket = FrameTicket(self.next);
        self.next += 1;
        self.pending.push_back(ticket);
        ticket
    }

    fn cancel_frame(&mut self, ticket: FrameTicket) {
        self.pending.retain(|t| *t != ticket);
    }
}
