//! Wallet notifications
//!
//! Every state change emits a [`WalletEvent`]. Events are kept in an
//! append-only history and pushed to live subscribers over a broadcast
//! channel.

use crate::core::Address;
use crate::treasury::hex_bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

/// Maximum number of events buffered per subscriber
const BROADCAST_CAPACITY: usize = 256;

/// A wallet state change
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum WalletEvent {
    /// Funds were credited to the pool
    Deposit {
        sender: Address,
        amount: u128,
        balance: u128,
    },
    /// An owner proposed a transaction
    SubmitTransaction {
        owner: Address,
        index: usize,
        target: Address,
        value: u128,
        #[serde(with = "hex_bytes")]
        payload: Vec<u8>,
    },
    /// An owner confirmed a transaction
    ConfirmTransaction { owner: Address, index: usize },
    /// An owner withdrew a confirmation
    RevokeConfirmation { owner: Address, index: usize },
    /// An owner executed a transaction
    ExecuteTransaction { owner: Address, index: usize },
}

impl WalletEvent {
    /// Ledger index the event refers to, if any
    pub fn index(&self) -> Option<usize> {
        match self {
            WalletEvent::Deposit { .. } => None,
            WalletEvent::SubmitTransaction { index, .. }
            | WalletEvent::ConfirmTransaction { index, .. }
            | WalletEvent::RevokeConfirmation { index, .. }
            | WalletEvent::ExecuteTransaction { index, .. } => Some(*index),
        }
    }

    /// Address that caused the event
    pub fn actor(&self) -> Address {
        match self {
            WalletEvent::Deposit { sender, .. } => *sender,
            WalletEvent::SubmitTransaction { owner, .. }
            | WalletEvent::ConfirmTransaction { owner, .. }
            | WalletEvent::RevokeConfirmation { owner, .. }
            | WalletEvent::ExecuteTransaction { owner, .. } => *owner,
        }
    }
}

impl fmt::Display for WalletEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WalletEvent::Deposit {
                sender,
                amount,
                balance,
            } => write!(f, "Deposit {} from {} (balance {})", amount, sender, balance),
            WalletEvent::SubmitTransaction {
                owner,
                index,
                target,
                value,
                payload,
            } => write!(
                f,
                "SubmitTransaction #{} by {}: {} to {} ({} bytes of data)",
                index,
                owner,
                value,
                target,
                payload.len()
            ),
            WalletEvent::ConfirmTransaction { owner, index } => {
                write!(f, "ConfirmTransaction #{} by {}", index, owner)
            }
            WalletEvent::RevokeConfirmation { owner, index } => {
                write!(f, "RevokeConfirmation #{} by {}", index, owner)
            }
            WalletEvent::ExecuteTransaction { owner, index } => {
                write!(f, "ExecuteTransaction #{} by {}", index, owner)
            }
        }
    }
}

/// An event with its position in the history
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventRecord {
    pub sequence: u64,
    pub event: WalletEvent,
    pub timestamp: DateTime<Utc>,
}

/// Broadcaster for live event subscribers
#[derive(Debug)]
pub struct EventBroadcaster {
    sender: broadcast::Sender<EventRecord>,
}

impl EventBroadcaster {
    /// Create a new broadcaster
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self { sender }
    }

    /// Send a record to all subscribers
    pub fn broadcast(&self, record: EventRecord) {
        // No subscribers is not an error
        let _ = self.sender.send(record);
    }

    /// Subscribe to future events
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.sender.subscribe()
    }
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new()
    }
}

/// Append-only event history plus live broadcast
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    history: Vec<EventRecord>,
    #[serde(skip)]
    broadcaster: EventBroadcaster,
}

/// A copy keeps the history but gets its own channel, so events emitted
/// on it never reach the original's subscribers.
impl Clone for EventLog {
    fn clone(&self) -> Self {
        Self {
            history: self.history.clone(),
            broadcaster: EventBroadcaster::new(),
        }
    }
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and broadcast an event
    pub fn emit(&mut self, event: WalletEvent) -> &EventRecord {
        log::info!("{}", event);

        let record = EventRecord {
            sequence: self.history.len() as u64,
            event,
            timestamp: Utc::now(),
        };
        self.broadcaster.broadcast(record.clone());
        self.history.push(record);

        &self.history[self.history.len() - 1]
    }

    /// Subscribe to events emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.broadcaster.subscribe()
    }

    /// All events, oldest first
    pub fn history(&self) -> &[EventRecord] {
        &self.history
    }

    /// Events referring to ledger index `index`
    pub fn for_transaction(&self, index: usize) -> impl Iterator<Item = &EventRecord> {
        self.history
            .iter()
            .filter(move |r| r.event.index() == Some(index))
    }

    /// Number of recorded events
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether nothing was recorded yet
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}
