//! Transition lifecycle notifications.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::navigation::history::HistoryAction;
use crate::routing::Location;

/// How a transition ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SettleKind {
    Committed,
    /// A hook aborted; the committed state is unchanged.
    Aborted,
    /// Continued as a new transition to `to`.
    Redirected { to: String },
    /// A newer transition took over; the result was discarded.
    Superseded,
    /// The transition failed before committing.
    Failed { reason: String },
}

/// Emitted on the router's event channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "event")]
pub enum TransitionEvent {
    Started {
        generation: u64,
        location: Location,
        action: HistoryAction,
    },
    Settled {
        generation: u64,
        location: Location,
        outcome: SettleKind,
    },
}

impl TransitionEvent {
    pub fn generation(&self) -> u64 {
        match self {
            TransitionEvent::Started { generation, .. } | TransitionEvent::Settled { generation, .. } => *generation,
        }
    }
}

/// Broadcast hub for transition events.
///
/// Slow subscribers lag and miss events rather than blocking navigation.
#[derive(Debug)]
pub struct TransitionEvents {
    tx: broadcast::Sender<TransitionEvent>,
}

impl TransitionEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransitionEvent> {
        self.tx.subscribe()
    }

    pub fn emit(&self, event: TransitionEvent) {
        // No subscribers is fine
        let _ = self.tx.send(event);
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
