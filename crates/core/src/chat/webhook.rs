//! Evolution API webhook payloads.

use serde::Deserialize;
use serde_json::Value;

pub const MESSAGES_UPSERT: &str = "messages.upsert";

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    #[serde(default)]
    pub event: String,
    #[serde(default)]
    pub instance: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpsert {
    #[serde(default)]
    pub key: MessageKey,
    #[serde(default)]
    pub push_name: Option<String>,
    #[serde(default)]
    pub message_type: Option<String>,
    #[serde(default)]
    pub message: Option<MessageContent>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageKey {
    #[serde(default)]
    pub remote_jid: String,
    #[serde(default)]
    pub from_me: bool,
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageContent {
    #[serde(default)]
    pub conversation: Option<String>,
    #[serde(default)]
    pub extended_text_message: Option<ExtendedTextMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtendedTextMessage {
    #[serde(default)]
    pub text: Option<String>,
}

/// A plain text message from someone other than the bot itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomingText {
    /// Full JID, e.g. `5511999999999@s.whatsapp.net`.
    pub sender: String,
    pub text: String,
}

impl MessageContent {
    pub fn text(&self) -> Option<&str> {
        self.conversation
            .as_deref()
            .or_else(|| {
                self.extended_text_message
                    .as_ref()
                    .and_then(|m| m.text.as_deref())
            })
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

impl WebhookEvent {
    /// Extracts the text message this event carries, if any. Other event
    /// types, our own messages and non-text messages yield `None`.
    pub fn incoming_text(&self) -> Option<IncomingText> {
        if self.event != MESSAGES_UPSERT {
            return None;
        }
        let upsert = serde_json::from_value::<MessageUpsert>(self.data.clone()).ok()?;
        if upsert.key.from_me || upsert.key.remote_jid.trim().is_empty() {
            return None;
        }
        let text = upsert.message.as_ref()?.text()?;
        Some(IncomingText {
            sender: upsert.key.remote_jid.trim().to_string(),
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(v: Value) -> WebhookEvent {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn extracts_conversation_text() {
        let e = event(json!({
            "event": "messages.upsert",
            "instance": "testing",
            "data": {
                "key": {"remoteJid": "5511999999999@s.whatsapp.net", "fromMe": false, "id": "ABC"},
                "pushName": "Luis",
                "messageType": "conversation",
                "message": {"conversation": "  Investimento  "}
            }
        }));
        let msg = e.incoming_text().unwrap();
        assert_eq!(msg.sender, "5511999999999@s.whatsapp.net");
        assert_eq!(msg.text, "Investimento");
    }

    #[test]
    fn extracts_extended_text() {
        let e = event(json!({
            "event": "messages.upsert",
            "data": {
                "key": {"remoteJid": "551188887777@s.whatsapp.net"},
                "messageType": "extendedTextMessage",
                "message": {"extendedTextMessage": {"text": "oi"}}
            }
        }));
        assert_eq!(e.incoming_text().unwrap().text, "oi");
    }

    #[test]
    fn ignores_own_messages_and_other_events() {
        let own = event(json!({
            "event": "messages.upsert",
            "data": {
                "key": {"remoteJid": "5511@s.whatsapp.net", "fromMe": true},
                "message": {"conversation": "1"}
            }
        }));
        assert!(own.incoming_text().is_none());

        let status = event(json!({"event": "connection.update", "data": {"state": "open"}}));
        assert!(status.incoming_text().is_none());
    }

    #[test]
    fn ignores_media_and_missing_sender() {
        let image = event(json!({
            "event": "messages.upsert",
            "data": {
                "key": {"remoteJid": "5511@s.whatsapp.net"},
                "messageType": "imageMessage",
                "message": {"imageMessage": {"url": "x"}}
            }
        }));
        assert!(image.incoming_text().is_none());

        let anonymous = event(json!({
            "event": "messages.upsert",
            "data": {"message": {"conversation": "oi"}}
        }));
        assert!(anonymous.incoming_text().is_none());
    }
}
