// Event bus for dashboard-wide notifications
// Built on tokio broadcast channels so the UI and background tasks can both listen

use std::fmt;
use tokio::sync::broadcast;

/// Maximum capacity for the event broadcast channel
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Destination that every subscriber accepts
pub const BROADCAST: &str = "broadcast";

/// A single published event
#[derive(Debug, Clone)]
pub struct Event {
    pub source: String,
    pub destination: String,
    pub kind: EventKind,
    pub timestamp: chrono::DateTime<chrono::Local>,
}

impl Event {
    pub fn new(source: impl Into<String>, destination: impl Into<String>, kind: EventKind) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            kind,
            timestamp: chrono::Local::now(),
        }
    }

    /// Event addressed to every subscriber
    pub fn broadcast(source: impl Into<String>, kind: EventKind) -> Self {
        Self::new(source, BROADCAST, kind)
    }

    /// Check if this event is targeted to a specific destination
    pub fn is_for(&self, target: &str) -> bool {
        self.destination == BROADCAST || self.destination == target
    }
}

/// What happened
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// An agenda alarm went off
    AlarmFired {
        item_id: String,
        title: String,
        description: String,
    },

    /// The sidebar selection moved to another view
    ViewChanged(String),

    /// Login or logout
    SessionChanged { authenticated: bool },

    /// Agenda state was written to storage
    WorkspaceSaved { at: chrono::DateTime<chrono::Local> },
}

/// Event bus for publishing and subscribing to events
pub struct EventBus {
    tx: broadcast::Sender<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(EVENT_CHANNEL_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Publish an event to all subscribers
    ///
    /// Fails with `SendFailed` when nobody is subscribed.
    pub fn publish(&self, event: Event) -> Result<usize, EventError> {
        self.tx.send(event).map_err(|_| EventError::SendFailed)
    }

    /// Publish, ignoring the no-subscriber case
    pub fn emit(&self, event: Event) {
        if let Err(e) = self.publish(event) {
            tracing::trace!("Event dropped: {}", e);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors that can occur during event operations
#[derive(Debug, Clone)]
pub enum EventError {
    SendFailed,
}

impl fmt::Display for EventError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventError::SendFailed => write!(f, "Failed to send event"),
        }
    }
}

impl std::error::Error for EventError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn saved() -> EventKind {
        EventKind::WorkspaceSaved {
            at: chrono::Local::now(),
        }
    }

    #[test]
    fn test_event_targeting() {
        let targeted = Event::new("alarms", "ui", EventKind::ViewChanged("agenda".to_string()));
        assert!(targeted.is_for("ui"));
        assert!(!targeted.is_for("storage"));

        let everyone = Event::broadcast("session", EventKind::SessionChanged { authenticated: true });
        assert!(everyone.is_for("ui"));
        assert!(everyone.is_for("anyone"));
    }

    #[test]
    fn test_publish_without_subscribers_fails() {
        let bus = EventBus::new();
        assert!(bus.publish(Event::broadcast("test", saved())).is_err());

        // emit swallows the same failure
        bus.emit(Event::broadcast("test", saved()));
    }

    #[test]
    fn test_multiple_subscribers_receive_alarm() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let kind = EventKind::AlarmFired {
            item_id: "a1".to_string(),
            title: "Standup".to_string(),
            description: String::new(),
        };
        assert_eq!(bus.publish(Event::broadcast("alarms", kind.clone())).unwrap(), 2);

        assert_eq!(rx1.try_recv().unwrap().kind, kind);
        assert_eq!(rx2.try_recv().unwrap().kind, kind);
    }

    #[tokio::test]
    async fn test_publish_from_task() {
        let bus = Arc::new(EventBus::new());
        let mut rx = bus.subscribe();
        let publisher = bus.clone();

        tokio::spawn(async move {
            publisher
                .publish(Event::broadcast("task", EventKind::ViewChanged("video".to_string())))
                .unwrap();
        })
        .await
        .unwrap();

        let event = rx.recv().await.unwrap();
        assert_eq!(event.kind, EventKind::ViewChanged("video".to_string()));
    }
}
