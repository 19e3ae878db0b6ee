//! WebSocket Event DTOs - Events pushed to online clients

use crate::dtos::{CallDTO, MessageDTO, NotificationDTO};
use serde::{Deserialize, Serialize};

/// Tagged union serialised as
/// { "type": "new_message", "data": { ... } }
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum WsEventDTO {
    Notification(NotificationDTO),
    NewMessage(MessageDTO),
    CallUpdate(CallDTO),
    Pong,
    Error { code: u16, message: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event = WsEventDTO::Error {
            code: 400,
            message: "bad".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["data"]["code"], 400);

        let pong = serde_json::to_value(&WsEventDTO::Pong).unwrap();
        assert_eq!(pong, serde_json::json!({ "type": "pong" }));
    }
}
