//! Bounded FIFO that sits between event dispatch and a connection's delivery loop.

use events::Event;
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;

/// What happens to an event pushed onto a full queue.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverflowPolicy {
    /// The producer waits until the delivery loop makes room.
    Block,
    /// The oldest queued event is evicted to make room for the new one.
    #[default]
    DropOldest,
    /// The new event is discarded.
    DropNewest,
}

#[derive(Debug, PartialEq, Eq)]
pub struct OverflowPolicyParseError;

impl FromStr for OverflowPolicy {
    type Err = OverflowPolicyParseError;

    fn from_str(policy: &str) -> Result<OverflowPolicy, Self::Err> {
        match policy.to_lowercase().replace('_', "-").as_str() {
            "block" => Ok(OverflowPolicy::Block),
            "drop-oldest" => Ok(OverflowPolicy::DropOldest),
            "drop-newest" => Ok(OverflowPolicy::DropNewest),
            _ => Err(OverflowPolicyParseError),
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OverflowPolicy::Block => write!(f, "block"),
            OverflowPolicy::DropOldest => write!(f, "drop-oldest"),
            OverflowPolicy::DropNewest => write!(f, "drop-newest"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    Queued,
    /// Queued after evicting the oldest event.
    DroppedOldest,
    /// Not queued; the queue was full.
    DroppedNewest,
    /// Not queued; the queue has been closed.
    Closed,
}

#[derive(Default)]
struct State {
    events: VecDeque<Event>,
    closed: bool,
}

pub struct EventQueue {
    state: Mutex<State>,
    capacity: usize,
    policy: OverflowPolicy,
    not_empty: Notify,
    not_full: Notify,
    dropped: AtomicU64,
}

impl EventQueue {
    /// A queue holding at most `capacity` events (at least one).
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            state: Mutex::new(State::default()),
            capacity: capacity.max(1),
            policy,
            not_empty: Notify::new(),
            not_full: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn len(&self) -> usize {
        self.lock().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().events.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Number of events discarded because the queue was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Appends `event`, applying the overflow policy when full. Only waits
    /// under [`OverflowPolicy::Block`].
    pub async fn push(&self, event: Event) -> PushOutcome {
        loop {
            let not_full = self.not_full.notified();
            tokio::pin!(not_full);
            not_full.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return PushOutcome::Closed;
                }

                if state.events.len() < self.capacity {
                    state.events.push_back(event);
                    drop(state);
                    self.not_empty.notify_one();
                    return PushOutcome::Queued;
                }

                match self.policy {
                    OverflowPolicy::DropOldest => {
                        state.events.pop_front();
                        state.events.push_back(event);
                        drop(state);
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        self.not_empty.notify_one();
                        return PushOutcome::DroppedOldest;
                    }
                    OverflowPolicy::DropNewest => {
                        drop(state);
                        self.dropped.fetch_add(1, Ordering::Relaxed);
                        return PushOutcome::DroppedNewest;
                    }
                    OverflowPolicy::Block => {}
                }
            }

            not_full.await;
        }
    }

    /// Removes the next event, waiting for one if necessary. Returns `None`
    /// once the queue is closed.
    pub async fn pop(&self) -> Option<Event> {
        loop {
            let not_empty = self.not_empty.notified();
            tokio::pin!(not_empty);
            not_empty.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }
                if let Some(event) = state.events.pop_front() {
                    drop(state);
                    self.not_full.notify_one();
                    return Some(event);
                }
            }

            not_empty.await;
        }
    }

    /// Discards anything still queued and wakes every waiting producer and consumer.
    pub fn close(&self) {
        {
            let mut state = self.lock();
            state.closed = true;
            state.events.clear();
        }
        self.not_empty.notify_waiters();
        self.not_full.notify_waiters();
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
