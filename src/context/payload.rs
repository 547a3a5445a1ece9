use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Duration;

use super::message::MessageReference;

/// Interaction response flag: only the invoking user sees the message.
pub const EPHEMERAL_FLAG: u64 = 1 << 6;

/// https://discord.com/developers/docs/resources/message#allowed-mentions-object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowedMentions {
    #[serde(default)]
    pub parse: Vec<String>,
    #[serde(default)]
    pub replied_user: bool,
}

impl AllowedMentions {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Everything `send` accepts besides content.
///
/// Some fields only make sense on one surface: `ephemeral` is dropped for channel messages,
/// while `reference`, `delete_after`, `allowed_mentions` and `nonce` are dropped for
/// interaction responses.
#[derive(Debug, Clone, Default)]
pub struct SendOptions {
    pub tts: bool,
    pub embeds: Vec<Value>,
    pub ephemeral: bool,
    pub reference: Option<MessageReference>,
    pub delete_after: Option<Duration>,
    pub allowed_mentions: Option<AllowedMentions>,
    pub nonce: Option<String>,
}

impl SendOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ephemeral(mut self) -> Self {
        self.ephemeral = true;
        self
    }

    pub fn tts(mut self) -> Self {
        self.tts = true;
        self
    }

    pub fn embed(mut self, embed: Value) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn reference(mut self, reference: MessageReference) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn delete_after(mut self, delay: Duration) -> Self {
        self.delete_after = Some(delay);
        self
    }

    pub fn allowed_mentions(mut self, mentions: AllowedMentions) -> Self {
        self.allowed_mentions = Some(mentions);
        self
    }

    pub fn nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    pub(crate) fn into_interaction(self, content: Option<String>) -> InteractionMessage {
        if self.reference.is_some()
            || self.delete_after.is_some()
            || self.allowed_mentions.is_some()
            || self.nonce.is_some()
        {
            tracing::debug!("dropping channel-only send options for an interaction response");
        }
        InteractionMessage {
            content,
            tts: self.tts,
            embeds: self.embeds,
            ephemeral: self.ephemeral,
        }
    }

    pub(crate) fn into_channel(self, content: Option<String>) -> MessagePayload {
        MessagePayload {
            content,
            tts: self.tts,
            embeds: self.embeds,
            message_reference: self.reference,
            allowed_mentions: self.allowed_mentions,
            nonce: self.nonce,
        }
    }
}

/// Body of an initial response or a followup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InteractionMessage {
    pub content: Option<String>,
    pub tts: bool,
    pub embeds: Vec<Value>,
    pub ephemeral: bool,
}

impl InteractionMessage {
    /// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-response-object-messages
    pub fn data(&self) -> Value {
        let mut data = json!({ "tts": self.tts });
        if let Some(content) = &self.content {
            data["content"] = json!(content);
        }
        if !self.embeds.is_empty() {
            data["embeds"] = json!(self.embeds);
        }
        if self.ephemeral {
            data["flags"] = json!(EPHEMERAL_FLAG);
        }
        data
    }
}

/// https://discord.com/developers/docs/resources/message#create-message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub tts: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_mentions: Option<AllowedMentions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonce: Option<String>,
}

/// https://discord.com/developers/docs/resources/message#edit-message
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MessageEdit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub embeds: Option<Vec<Value>>,
}

impl MessageEdit {
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            embeds: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interaction_drops_channel_only_fields() {
        let message = SendOptions::new()
            .ephemeral()
            .nonce("abc")
            .delete_after(Duration::from_secs(5))
            .into_interaction(Some("hi".into()));
        let data = message.data();
        assert_eq!(data["content"], "hi");
        assert_eq!(data["flags"], EPHEMERAL_FLAG);
        assert!(data.get("nonce").is_none());
    }

    #[test]
    fn channel_drops_ephemeral() {
        let payload = SendOptions::new()
            .ephemeral()
            .nonce("abc")
            .into_channel(Some("hi".into()));
        let body = serde_json::to_value(&payload).unwrap();
        assert_eq!(body["nonce"], "abc");
        assert!(body.get("flags").is_none());
    }
}
