//! Codec trait and the JSON implementation.
//!
//! WebSocket text frames carry one encoded event each. The rest of the
//! system only sees [`Codec`], so the gateway and the tests never call
//! `serde_json` directly for framing.

use serde::{Serialize, de::DeserializeOwned};

use crate::ProtocolError;

/// Turns events into text frames and back.
///
/// `Send + Sync + 'static` because a single codec is shared by every
/// connection task.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into a text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Encode`] if the value can't be represented.
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError>;

    /// Parses a text frame.
    ///
    /// # Errors
    /// Returns [`ProtocolError::Decode`] on malformed or mistyped input.
    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError>;
}

/// A [`Codec`] backed by `serde_json`.
///
/// ```rust
/// use playsync_protocol::{ClientEvent, Codec, JsonCodec};
///
/// let event: ClientEvent = JsonCodec.decode(r#"{"event":"create_room"}"#).unwrap();
/// assert_eq!(event, ClientEvent::CreateRoom);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<String, ProtocolError> {
        serde_json::to_string(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, text: &str) -> Result<T, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ClientEvent, RoomCode, ServerEvent};

    #[test]
    fn test_decode_client_event() {
        let text = r#"{"event":"get_room","data":{"room_id":"abcd2345"}}"#;
        let event: ClientEvent = JsonCodec.decode(text).unwrap();
        assert_eq!(
            event,
            ClientEvent::GetRoom {
                room_id: RoomCode::new("ABCD2345")
            }
        );
    }

    #[test]
    fn test_encode_server_event() {
        let text = JsonCodec
            .encode(&ServerEvent::Connected { connection_id: 9 })
            .unwrap();
        assert_eq!(text, r#"{"event":"connected","data":{"connection_id":9}}"#);
    }

    #[test]
    fn test_decode_garbage_is_decode_error() {
        let result: Result<ClientEvent, _> = JsonCodec.decode("not json {");
        assert!(matches!(result, Err(ProtocolError::Decode(_))));
    }
}
