//! Wire types for the pieces of the Discord API this crate touches.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::message::User;

/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object-interaction-type
pub const INTERACTION_APPLICATION_COMMAND: u8 = 2;

#[derive(Debug, Clone, Deserialize)]
pub struct InteractionPayload {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub data: Option<CommandData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub channel_id: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
    #[serde(default)]
    pub user: Option<User>,
    pub token: String,
}

impl InteractionPayload {
    /// The invoking user: the member's user in guilds, `user` in DMs.
    pub fn invoker(&self) -> Option<&User> {
        self.member
            .as_ref()
            .and_then(|m| m.user.as_ref())
            .or(self.user.as_ref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    #[serde(default)]
    pub user: Option<User>,
}

/// https://discord.com/developers/docs/interactions/receiving-and-responding#interaction-object-application-command-data-structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandData {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: u8,
    #[serde(default)]
    pub options: Vec<DataOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DataOption {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub options: Vec<DataOption>,
}

#[derive(Debug, Deserialize)]
pub struct DiscordErrorResponse {
    pub message: String,
    #[serde(default)]
    pub code: Option<i32>,
    #[serde(default)]
    pub retry_after: Option<f64>,
    #[serde(default)]
    pub global: Option<bool>,
    #[serde(default)]
    pub errors: Option<Value>,
}

impl std::fmt::Display for DiscordErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code.unwrap_or(0), self.message)?;

        if let Some(retry) = self.retry_after {
            write!(f, " (retry after {:.3}s)", retry)?;
        }
        if self.global == Some(true) {
            write!(f, " [GLOBAL]")?;
        }
        if let Some(errors) = &self.errors {
            write!(f, "\nDetails: {}", serde_json::to_string_pretty(errors).unwrap_or_default())?;
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
pub struct ApplicationInfo {
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_subcommand_payload() {
        let payload: InteractionPayload = serde_json::from_value(serde_json::json!({
            "id": "1",
            "application_id": "2",
            "type": 2,
            "token": "tok",
            "guild_id": "123456789",
            "channel_id": "5",
            "member": { "user": { "id": "42", "username": "ann" } },
            "data": {
                "id": "9",
                "name": "math",
                "type": 1,
                "options": [{ "name": "add", "type": 1, "options": [
                    { "name": "a", "type": 4, "value": 2 },
                    { "name": "b", "type": 4, "value": 3 }
                ]}]
            }
        }))
        .unwrap();

        assert_eq!(payload.invoker().unwrap().id, "42");
        let data = payload.data.unwrap();
        assert_eq!(data.options[0].options[1].value, Some(serde_json::json!(3)));
    }

    #[test]
    fn error_body_display() {
        let err: DiscordErrorResponse =
            serde_json::from_str(r#"{"message":"You are being rate limited.","code":0,"retry_after":1.5,"global":true}"#)
                .unwrap();
        assert_eq!(err.to_string(), "[0] You are being rate limited. (retry after 1.500s) [GLOBAL]");
    }
}
