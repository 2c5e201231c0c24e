use chrono::{DateTime, Utc};

use prizedesk_core::ServiceError;

/// Whether the event still accepts awards and roster changes.
pub trait EventGate: Send + Sync {
    fn is_event_open(&self) -> bool;
}

/// Event window from configuration: open until `ends_at`, or forever when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventWindow {
    ends_at: Option<DateTime<Utc>>,
}

impl EventWindow {
    pub fn new(ends_at: Option<DateTime<Utc>>) -> Self {
        Self { ends_at }
    }

    pub fn open_ended() -> Self {
        Self { ends_at: None }
    }

    pub fn ends_at(&self) -> Option<DateTime<Utc>> {
        self.ends_at
    }

    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        match self.ends_at {
            Some(end) => now <= end,
            None => true,
        }
    }
}

impl EventGate for EventWindow {
    fn is_event_open(&self) -> bool {
        self.is_open_at(Utc::now())
    }
}

/// Reject writes once the event has closed.
pub fn ensure_open(gate: &dyn EventGate) -> Result<(), ServiceError> {
    if gate.is_event_open() {
        Ok(())
    } else {
        Err(ServiceError::ReadOnly(
            "the event has ended; awards and roster changes are closed".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn open_ended_window_is_always_open() {
        let window = EventWindow::open_ended();
        assert!(window.is_event_open());
        assert!(ensure_open(&window).is_ok());
    }

    #[test]
    fn window_closes_after_end() {
        let end = Utc::now();
        let window = EventWindow::new(Some(end));
        assert!(window.is_open_at(end - Duration::minutes(1)));
        assert!(window.is_open_at(end));
        assert!(!window.is_open_at(end + Duration::seconds(1)));
    }

    #[test]
    fn closed_window_rejects_writes() {
        let window = EventWindow::new(Some(Utc::now() - Duration::hours(1)));
        let err = ensure_open(&window).unwrap_err();
        assert!(matches!(err, ServiceError::ReadOnly(_)));
    }
}
