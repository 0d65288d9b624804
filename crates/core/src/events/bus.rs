use tokio::sync::broadcast;

use super::QueueEvent;

/// Broadcast bus for queue events.
///
/// Cheaply cloneable; the orchestrator and its driver tasks share one bus.
/// Emitting with no subscribers is not an error, and a slow subscriber that
/// lags behind the channel capacity misses old events rather than blocking
/// the queue.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<QueueEvent>,
}

impl EventBus {
    /// Create a new bus holding up to `capacity` undelivered events per
    /// subscriber.
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all events emitted after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn emit(&self, event: QueueEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("queue event dropped, no subscribers");
        }
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::JobState;

    fn job_event(id: &str) -> QueueEvent {
        QueueEvent::JobUpdated {
            job_id: id.to_string(),
            state: JobState::Pending,
            progress: 0.0,
        }
    }

    #[tokio::test]
    async fn test_subscriber_receives_events() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.emit(job_event("a"));
        bus.emit(job_event("b"));

        assert_eq!(rx.recv().await.unwrap(), job_event("a"));
        assert_eq!(rx.recv().await.unwrap(), job_event("b"));
    }

    #[tokio::test]
    async fn test_emit_without_subscribers_does_not_panic() {
        let bus = EventBus::new(4);
        bus.emit(job_event("a"));
        assert_eq!(bus.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_multiple_subscribers_see_same_events() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.emit(job_event("a"));

        assert_eq!(rx1.recv().await.unwrap(), job_event("a"));
        assert_eq!(rx2.recv().await.unwrap(), job_event("a"));
    }

    #[tokio::test]
    async fn test_clone_shares_channel() {
        let bus = EventBus::new(16);
        let clone = bus.clone();
        let mut rx = bus.subscribe();

        clone.emit(job_event("a"));
        assert_eq!(rx.recv().await.unwrap(), job_event("a"));
    }
}
