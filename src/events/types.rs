//! Event records.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Discriminant used for subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    MovesFetched,
    StringsConcatenated,
}

impl EventKind {
    pub const ALL: [EventKind; 2] = [EventKind::MovesFetched, EventKind::StringsConcatenated];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::MovesFetched => "moves_fetched",
            EventKind::StringsConcatenated => "strings_concatenated",
        }
    }
}

/// A scheduled fetch returned a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MovesFetched {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    /// Upstream path that was fetched, e.g. "/move".
    pub resource: String,
    /// Raw upstream body.
    pub payload: String,
}

/// The concat endpoint produced a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringsConcatenated {
    pub id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub params: Vec<String>,
    pub result: String,
}

/// Immutable event handed to listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MovesFetched(MovesFetched),
    StringsConcatenated(StringsConcatenated),
}

impl Event {
    pub fn moves_fetched(resource: impl Into<String>, payload: impl Into<String>) -> Self {
        Event::MovesFetched(MovesFetched {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            resource: resource.into(),
            payload: payload.into(),
        })
    }

    pub fn strings_concatenated(params: Vec<String>, result: impl Into<String>) -> Self {
        Event::StringsConcatenated(StringsConcatenated {
            id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            params,
            result: result.into(),
        })
    }

    pub fn kind(&self) -> EventKind {
        match self {
            Event::MovesFetched(_) => EventKind::MovesFetched,
            Event::StringsConcatenated(_) => EventKind::StringsConcatenated,
        }
    }

    pub fn id(&self) -> Uuid {
        match self {
            Event::MovesFetched(e) => e.id,
            Event::StringsConcatenated(e) => e.id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_set_kind_and_unique_ids() {
        let a = Event::moves_fetched("/move", "{}");
        let b = Event::strings_concatenated(vec!["uno".into()], "uno");
        assert_eq!(a.kind(), EventKind::MovesFetched);
        assert_eq!(b.kind(), EventKind::StringsConcatenated);
        assert_ne!(a.id(), b.id());
        assert_eq!(b.kind().as_str(), "strings_concatenated");
    }
}
