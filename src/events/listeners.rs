//! Built-in listeners.

use futures_util::future::BoxFuture;

use crate::events::bus::{Listener, ListenerError};
use crate::events::types::Event;

/// Writes every event to the log, truncating large payloads.
#[derive(Debug, Clone)]
pub struct LoggingListener {
    max_payload_chars: usize,
}

impl LoggingListener {
    pub fn new(max_payload_chars: usize) -> Self {
        Self { max_payload_chars }
    }

    fn preview<'a>(&self, payload: &'a str) -> (&'a str, bool) {
        match payload.char_indices().nth(self.max_payload_chars) {
            Some((cut, _)) => (&payload[..cut], true),
            None => (payload, false),
        }
    }
}

impl Listener for LoggingListener {
    fn name(&self) -> &str {
        "logging"
    }

    fn on_event<'a>(&'a self, event: &'a Event) -> BoxFuture<'a, Result<(), ListenerError>> {
        Box::pin(async move {
            match event {
                Event::MovesFetched(e) => {
                    let (preview, truncated) = self.preview(&e.payload);
                    tracing::info!(
                        event_id = %e.id,
                        resource = %e.resource,
                        bytes = e.payload.len(),
                        truncated,
                        payload = preview,
                        "[EVENT BUS] Moves fetched"
                    );
                }
                Event::StringsConcatenated(e) => {
                    tracing::info!(
                        event_id = %e.id,
                        params = ?e.params,
                        result = %e.result,
                        "[EVENT BUS] Strings concatenated"
                    );
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        let listener = LoggingListener::new(3);
        assert_eq!(listener.preview("ñandú"), ("ñan", true));
        assert_eq!(listener.preview("abc"), ("abc", false));
    }

    #[tokio::test]
    async fn test_handles_both_kinds() {
        let listener = LoggingListener::new(8);
        let moves = Event::moves_fetched("/move", "{\"results\":[]}");
        let concat = Event::strings_concatenated(vec!["a".into(), "b".into()], "a b");
        assert_eq!(listener.on_event(&moves).await, Ok(()));
        assert_eq!(listener.on_event(&concat).await, Ok(()));
    }
}
