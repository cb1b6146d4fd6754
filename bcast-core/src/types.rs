//! Core types: persisted collections (messages, groups) and inbound events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A broadcastable message as stored on disk. Never mutated in place;
/// created by the composer, deleted by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredMessage {
    /// Unique, monotonically assigned as `max(existing) + 1`; never reused.
    pub id: u64,
    pub text: String,
    /// Raw image bytes; encoded as base64 in the JSON file. Must agree with `has_image`.
    #[serde(default, with = "base64_bytes")]
    pub image: Option<Vec<u8>>,
    pub has_image: bool,
    pub created_at: DateTime<Utc>,
    /// Admin identifier (string form of the user id).
    pub created_by: String,
}

/// A destination group registered to receive broadcasts. No removal path:
/// stale groups persist and failed sends are only counted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub chat_id: i64,
    pub title: String,
    pub added_at: DateTime<Utc>,
}

/// The chat an event arrived from.
#[derive(Debug, Clone)]
pub struct ChatRef {
    pub id: i64,
    pub title: Option<String>,
    /// Group or supergroup. Compose sessions never run in group chats.
    pub is_group: bool,
}

/// Inbound event as seen by the engine; the transport adapter builds these.
#[derive(Debug, Clone)]
pub struct Event {
    pub user_id: i64,
    pub chat: ChatRef,
    pub payload: Payload,
}

/// Event payload. Commands are parsed out of `Text` by the router.
#[derive(Debug, Clone)]
pub enum Payload {
    Text(String),
    Photo(Vec<u8>),
}

/// Serde helper: `Option<Vec<u8>>` as an optional base64 string, so the
/// JSON files round-trip raw image bytes exactly.
pub mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            Some(s) => STANDARD
                .decode(s.as_bytes())
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_message_round_trips_image_bytes() {
        let message = StoredMessage {
            id: 7,
            text: "hello".to_string(),
            image: Some(vec![0, 1, 2, 254, 255]),
            has_image: true,
            created_at: Utc::now(),
            created_by: "42".to_string(),
        };

        let json = serde_json::to_string(&message).unwrap();
        let back: StoredMessage = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, 7);
        assert_eq!(back.image, Some(vec![0, 1, 2, 254, 255]));
        assert!(back.has_image);
    }

    #[test]
    fn test_message_without_image_serializes_null() {
        let message = StoredMessage {
            id: 1,
            text: "plain".to_string(),
            image: None,
            has_image: false,
            created_at: Utc::now(),
            created_by: "42".to_string(),
        };

        let json = serde_json::to_string(&message).unwrap();
        assert!(json.contains("\"image\":null"));
        let back: StoredMessage = serde_json::from_str(&json).unwrap();
        assert!(back.image.is_none());
    }
}
