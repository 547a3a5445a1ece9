pub mod message;
pub mod payload;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use crate::commands::LegacyCommand;
use crate::error::{CompatError, Result};
use crate::host::{Interaction, MessageSink};
use message::{ChannelMessage, Message, MessageReference, User};
use payload::{MessageEdit, SendOptions};

/// Invocation context handed to command handlers on both surfaces.
pub struct Context {
    pub message: Message,
    pub prefix: String,
    pub invoked_with: Option<String>,
    pub command: Option<Arc<LegacyCommand>>,
    arguments: String,
    interaction: Option<Arc<dyn Interaction>>,
    sink: Arc<dyn MessageSink>,
    // Held across a phase read and the platform call that changes it.
    send_lock: Mutex<()>,
    command_failed: AtomicBool,
}

impl Context {
    pub(crate) fn new(
        message: Message,
        sink: Arc<dyn MessageSink>,
        prefix: String,
        command: Option<Arc<LegacyCommand>>,
        invoked_with: Option<String>,
        arguments: String,
    ) -> Self {
        let interaction = message.interaction();
        Self {
            message,
            prefix,
            invoked_with,
            command,
            arguments,
            interaction,
            sink,
            send_lock: Mutex::new(()),
            command_failed: AtomicBool::new(false),
        }
    }

    /// Whether this context was built from an interaction.
    pub fn is_interaction(&self) -> bool {
        self.interaction.is_some()
    }

    pub fn interaction(&self) -> Option<&Arc<dyn Interaction>> {
        self.interaction.as_ref()
    }

    pub fn author(&self) -> &User {
        self.message.author()
    }

    pub fn channel_id(&self) -> &str {
        self.message.channel_id()
    }

    /// Text after the invoked command name. Empty for interactions.
    pub fn arguments(&self) -> &str {
        &self.arguments
    }

    pub fn command_failed(&self) -> bool {
        self.command_failed.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_failed(&self) {
        self.command_failed.store(true, Ordering::SeqCst);
    }

    /// Send a message on whichever surface this invocation came from.
    ///
    /// Interactions get the initial response first and followups afterwards; nothing is
    /// returned for them. Channel invocations return the sent message.
    pub async fn send(
        &self,
        content: impl Into<String>,
        options: SendOptions,
    ) -> Result<Option<ChannelMessage>> {
        let content = Some(content.into()).filter(|c| !c.is_empty());

        if let Some(interaction) = &self.interaction {
            let message = options.into_interaction(content);
            let _guard = self.send_lock.lock().await;
            if interaction.is_responded() {
                interaction.followup(message).await?;
            } else {
                interaction.respond(message).await?;
            }
            return Ok(None);
        }

        let delete_after = options.delete_after;
        let payload = options.into_channel(content);
        let sent = self
            .sink
            .send_message(self.message.channel_id(), &payload)
            .await?;

        if let Some(delay) = delete_after {
            let sink = self.sink.clone();
            let channel_id = sent.channel_id.clone();
            let message_id = sent.id.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if let Err(e) = sink.delete_message(&channel_id, &message_id).await {
                    e.log();
                }
            });
        }

        Ok(Some(sent))
    }

    /// Reply to the invocation. Interactions have no threaded replies, so this is `send`.
    pub async fn reply(
        &self,
        content: impl Into<String>,
        options: SendOptions,
    ) -> Result<Option<ChannelMessage>> {
        if self.is_interaction() {
            return self.send(content, options).await;
        }

        let reference = MessageReference {
            message_id: Some(self.message.id().to_string()),
            channel_id: Some(self.message.channel_id().to_string()),
            guild_id: self.message.guild_id().map(str::to_string),
            fail_if_not_exists: Some(false),
        };
        self.send(content, options.reference(reference)).await
    }

    /// Defer the interaction response. Does nothing for channel invocations.
    pub async fn defer(&self, loading: bool, ephemeral: bool) -> Result<()> {
        let Some(interaction) = &self.interaction else {
            return Ok(());
        };

        let _guard = self.send_lock.lock().await;
        if interaction.is_responded() {
            return Err(CompatError::new("interaction_responded")
                .push_str(format!("interaction {} has already been responded to", interaction.id())));
        }
        interaction.defer(loading, ephemeral).await
    }

    /// Edit the invoking message: the interaction response for synthetic messages, the
    /// channel message otherwise.
    pub async fn edit_message(&self, edit: MessageEdit) -> Result<()> {
        match &self.message {
            Message::Synthetic(message) => {
                let _guard = self.send_lock.lock().await;
                message.edit(edit).await
            }
            Message::Channel(message) => {
                self.sink
                    .edit_message(&message.channel_id, &message.id, &edit)
                    .await
            }
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("message", &self.message)
            .field("prefix", &self.prefix)
            .field("invoked_with", &self.invoked_with)
            .field("command", &self.command.as_ref().map(|c| c.qualified_name()))
            .field("is_interaction", &self.is_interaction())
            .finish()
    }
}
