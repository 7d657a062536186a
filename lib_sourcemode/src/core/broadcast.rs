//! # Source Event Bus
//!
//! A typed, process-wide publish/subscribe facility announcing mode-controller
//! events to decoupled listeners. The dashboard's data-fetching collaborators
//! subscribe to re-evaluate their derived booleans on `ModeChanged` and to
//! force a re-fetch on `RefreshRequested`.
//!
//! Delivery is fan-out without replay: an event reaches every receiver that
//! is subscribed at emit time, and late subscribers never see past events.

use tokio::sync::broadcast;

use crate::core::state::DataMode;

/// The two notifications the mode controller emits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceEvent {
    /// A mode switch has been committed; payload is the new mode.
    ModeChanged(DataMode),
    /// A consumer asked for a data re-fetch without a mode change.
    RefreshRequested,
}

/// Handle for emitting and subscribing to [`SourceEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SourceEvent>,
}

impl EventBus {
    /// Creates a bus whose per-receiver backlog holds up to `capacity` events.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Registers a new listener. It will only observe events emitted after
    /// this call.
    pub fn subscribe(&self) -> broadcast::Receiver<SourceEvent> {
        self.tx.subscribe()
    }

    /// Delivers an event to all current subscribers. Having no subscribers
    /// is not an error; the event is simply dropped.
    pub fn emit(&self, event: SourceEvent) {
        match self.tx.send(event) {
            Ok(receivers) => log::debug!("Event delivered to {} subscriber(s)", receivers),
            Err(broadcast::error::SendError(event)) => {
                log::debug!("Event {:?} dropped: no subscribers", event)
            }
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::broadcast::error::TryRecvError;

    #[tokio::test]
    async fn subscribers_receive_events_emitted_after_subscription() {
        let bus = EventBus::new(8);

        // Emitted before anyone subscribes: dropped, not replayed.
        bus.emit(SourceEvent::ModeChanged(DataMode::Live));

        let mut rx = bus.subscribe();
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));

        bus.emit(SourceEvent::RefreshRequested);
        bus.emit(SourceEvent::ModeChanged(DataMode::Demo));

        assert_eq!(rx.try_recv().unwrap(), SourceEvent::RefreshRequested);
        assert_eq!(
            rx.try_recv().unwrap(),
            SourceEvent::ModeChanged(DataMode::Demo)
        );
        assert!(matches!(rx.try_recv(), Err(TryRecvError::Empty)));
    }
}
