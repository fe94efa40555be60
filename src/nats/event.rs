//! Completion event published after a batch run

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of the "batch ran" notification.
///
/// The event carries no per-game data: consumers only learn that a batch
/// finished and should rescan the flattened output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Unique id for tracking, fresh for every event
    pub event_uuid: Uuid,

    /// Same as the subject the event is published on
    pub event_type: String,
}

impl CompletionEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_uuid: Uuid::new_v4(),
            event_type: event_type.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_body() {
        let event = CompletionEvent::new("all_games_parsed");
        let body = serde_json::to_value(&event).unwrap();

        assert_eq!(body["event_type"], json!("all_games_parsed"));
        assert_eq!(body.as_object().unwrap().len(), 2);

        let uuid = body["event_uuid"].as_str().unwrap();
        assert_eq!(Uuid::parse_str(uuid).unwrap().get_version_num(), 4);
    }

    #[test]
    fn test_events_are_unique() {
        let a = CompletionEvent::new("all_games_parsed");
        let b = CompletionEvent::new("all_games_parsed");

        assert_ne!(a.event_uuid, b.event_uuid);
    }
}
