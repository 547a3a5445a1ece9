use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

use crate::context::payload::MessageEdit;
use crate::error::{CompatError, Result};
use crate::host::Interaction;

/// https://discord.com/developers/docs/resources/user#user-object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bot: Option<bool>,
}

/// https://discord.com/developers/docs/resources/message#message-reference-structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fail_if_not_exists: Option<bool>,
}

/// https://discord.com/developers/docs/resources/message#attachment-object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: String,
    pub url: String,
    pub filename: String,
}

/// A message that really exists in a channel.
///
/// https://discord.com/developers/docs/resources/message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelMessage {
    pub id: String,
    pub author: User,
    pub channel_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub mentions: Vec<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_reference: Option<MessageReference>,
}

/// Stand-in message built from an interaction so the legacy pipeline can resolve it.
#[derive(Clone)]
pub struct SyntheticMessage {
    pub id: String,
    pub author: User,
    pub channel_id: String,
    pub guild_id: Option<String>,
    pub content: String,
    interaction: Weak<dyn Interaction>,
}

impl SyntheticMessage {
    pub fn from_interaction(interaction: &Arc<dyn Interaction>) -> Self {
        Self {
            id: interaction.id().to_string(),
            author: interaction.user().clone(),
            channel_id: interaction.channel_id().to_string(),
            guild_id: interaction.guild_id().map(str::to_string),
            content: String::new(),
            interaction: Arc::downgrade(interaction),
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// The originating interaction, if the host still holds it.
    pub fn interaction(&self) -> Result<Arc<dyn Interaction>> {
        self.interaction.upgrade().ok_or_else(|| {
            CompatError::new("interaction_dropped")
                .push_str(format!("interaction {} is no longer alive", self.id))
        })
    }

    /// Edit the response this message stands for.
    ///
    /// Before the first response this is the response-edit call; afterwards it edits the
    /// original response.
    pub async fn edit(&self, edit: MessageEdit) -> Result<()> {
        let interaction = self.interaction()?;
        if interaction.is_responded() {
            interaction.edit_original(edit).await
        } else {
            interaction.edit_response(edit).await
        }
    }
}

impl fmt::Debug for SyntheticMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticMessage")
            .field("id", &self.id)
            .field("author", &self.author)
            .field("channel_id", &self.channel_id)
            .field("content", &self.content)
            .field("interaction_alive", &(self.interaction.strong_count() > 0))
            .finish()
    }
}

/// Either a real channel message or one synthesized from an interaction.
#[derive(Debug, Clone)]
pub enum Message {
    Channel(ChannelMessage),
    Synthetic(SyntheticMessage),
}

impl Message {
    pub fn id(&self) -> &str {
        match self {
            Self::Channel(m) => &m.id,
            Self::Synthetic(m) => &m.id,
        }
    }

    pub fn author(&self) -> &User {
        match self {
            Self::Channel(m) => &m.author,
            Self::Synthetic(m) => &m.author,
        }
    }

    pub fn channel_id(&self) -> &str {
        match self {
            Self::Channel(m) => &m.channel_id,
            Self::Synthetic(m) => &m.channel_id,
        }
    }

    pub fn guild_id(&self) -> Option<&str> {
        match self {
            Self::Channel(m) => m.guild_id.as_deref(),
            Self::Synthetic(m) => m.guild_id.as_deref(),
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::Channel(m) => &m.content,
            Self::Synthetic(m) => &m.content,
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Synthetic(_))
    }

    pub fn interaction(&self) -> Option<Arc<dyn Interaction>> {
        match self {
            Self::Channel(_) => None,
            Self::Synthetic(m) => m.interaction().ok(),
        }
    }
}
