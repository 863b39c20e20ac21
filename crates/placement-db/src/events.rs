//! Broadcast of committed status changes.
//!
//! - **At-most-once delivery**: slow receivers may miss events (`RecvError::Lagged`).
//! - **Post-commit**: an event is only emitted after its transaction committed.
//! - **Non-blocking**: emitting with no subscribers is a no-op.

use placement_core::events::StatusChanged;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<StatusChanged>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Emit to all current subscribers. Returns how many received it.
    pub fn emit(&self, event: StatusChanged) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StatusChanged> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use placement_core::enums::{ApprovalStatus, TransitionOrigin};

    fn event() -> StatusChanged {
        StatusChanged {
            approval_id: "apr-00000001".into(),
            enrollment_id: "enr-1".into(),
            from: ApprovalStatus::Registered,
            to: ApprovalStatus::AdvisorApproved,
            changed_by: "ins-advisor".into(),
            origin: TransitionOrigin::Advisor,
            reason: "ok".into(),
            changed_at: Utc::now(),
        }
    }

    #[test]
    fn emit_without_subscribers_is_noop() {
        let bus = EventBus::new();
        assert_eq!(bus.emit(event()), 0);
    }

    #[tokio::test]
    async fn subscribers_receive_events() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        assert_eq!(bus.emit(event()), 1);
        let received = rx.recv().await.unwrap();
        assert_eq!(received.to, ApprovalStatus::AdvisorApproved);
    }
}
