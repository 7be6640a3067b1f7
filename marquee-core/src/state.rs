//! Result state and request sequencing for orchestrators.
//!
//! Every orchestrator owns one `SequencedState`. Starting a request issues a
//! `Ticket` inside the same watch update that publishes `Loading`, and a
//! completed request may only publish when its ticket is still the latest.
//! That keeps visible state tied to the most recently started request even
//! when responses arrive out of order.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::watch;

/// Outcome of a remote-backed request as seen by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ResultState<T> {
    /// A request is in flight
    Loading,
    /// The latest request succeeded
    Ready(T),
    /// The latest request failed; the message is safe to show to users
    Failed(String),
}

impl<T> ResultState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// Payload of a `Ready` state.
    pub fn ready(&self) -> Option<&T> {
        match self {
            Self::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// User-facing message of a `Failed` state.
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Transforms the `Ready` payload, leaving other states untouched.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ResultState<U> {
        match self {
            Self::Loading => ResultState::Loading,
            Self::Ready(value) => ResultState::Ready(f(value)),
            Self::Failed(message) => ResultState::Failed(message),
        }
    }
}

/// Sequence number captured when a request starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Ticket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonically increasing request counter.
#[derive(Debug, Default)]
pub struct RequestSequence {
    latest: AtomicU64,
}

impl RequestSequence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues a ticket newer than every ticket issued before.
    pub fn next(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// True when no newer ticket has been issued since `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn latest(&self) -> Ticket {
        Ticket(self.latest.load(Ordering::SeqCst))
    }
}

/// Watch-backed state slot guarded by a request sequence.
#[derive(Debug)]
pub struct SequencedState<S> {
    sender: watch::Sender<S>,
    sequence: RequestSequence,
}

impl<S> SequencedState<S> {
    pub fn new(initial: S) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender,
            sequence: RequestSequence::new(),
        }
    }

    /// Starts a request: issues a ticket and applies `start` atomically.
    ///
    /// Any ticket issued earlier stops being current, so its completion can
    /// no longer publish.
    pub fn begin(&self, start: impl FnOnce(&mut S)) -> Ticket {
        let mut ticket = self.sequence.latest();
        self.sender.send_modify(|state| {
            ticket = self.sequence.next();
            start(state);
        });
        ticket
    }

    /// Applies `finish` only if `ticket` is still the latest request.
    ///
    /// Returns whether the update was published.
    pub fn publish(&self, ticket: Ticket, finish: impl FnOnce(&mut S)) -> bool {
        self.sender.send_if_modified(|state| {
            if self.sequence.is_current(ticket) {
                finish(state);
                true
            } else {
                false
            }
        })
    }

    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.sequence.is_current(ticket)
    }
}

impl<S: Clone> SequencedState<S> {
    pub fn snapshot(&self) -> S {
        self.sender.borrow().clone()
    }
}
