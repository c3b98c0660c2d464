//! Session lifecycle events
//!
//! The request client never touches navigation itself. When the session
//! becomes unrecoverable it emits [`SessionEvent::Invalidated`] on a
//! broadcast channel; the hosting application subscribes and decides how
//! to send the user back to login.

use tokio::sync::broadcast;

/// Events emitted by the session client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Stored credentials were cleared and the user must re-authenticate.
    Invalidated,
}

/// Broadcast fan-out for session events.
///
/// Sending with zero subscribers is not an error: a headless consumer
/// (tests, CLI tooling) may never subscribe.
pub(crate) struct SessionEvents {
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionEvents {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_invalidated() {
        let events = SessionEvents::new();
        let mut rx = events.subscribe();
        events.emit(SessionEvent::Invalidated);
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::Invalidated);
    }

    #[test]
    fn emit_without_subscribers_does_not_panic() {
        let events = SessionEvents::new();
        events.emit(SessionEvent::Invalidated);
    }
}
