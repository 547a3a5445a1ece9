//! Seams to the hosting framework and platform.

use async_trait::async_trait;
use tracing::{info, warn};

use crate::context::Context;
use crate::context::message::{ChannelMessage, User};
use crate::context::payload::{InteractionMessage, MessageEdit, MessagePayload};
use crate::error::{CommandError, Result};

/// One structured invocation delivered by the platform.
///
/// The response phase lives here: `is_responded` must flip only after a response or
/// deferral has been accepted by the platform.
#[async_trait]
pub trait Interaction: Send + Sync {
    fn id(&self) -> &str;
    fn user(&self) -> &User;
    fn channel_id(&self) -> &str;
    fn guild_id(&self) -> Option<&str>;
    fn is_responded(&self) -> bool;

    async fn respond(&self, message: InteractionMessage) -> Result<()>;
    async fn followup(&self, message: InteractionMessage) -> Result<()>;
    async fn edit_response(&self, edit: MessageEdit) -> Result<()>;
    async fn edit_original(&self, edit: MessageEdit) -> Result<()>;
    async fn defer(&self, loading: bool, ephemeral: bool) -> Result<()>;
}

/// Legacy channel-message send path.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send_message(&self, channel_id: &str, payload: &MessagePayload) -> Result<ChannelMessage>;
    async fn edit_message(&self, channel_id: &str, message_id: &str, edit: &MessageEdit) -> Result<()>;
    async fn delete_message(&self, channel_id: &str, message_id: &str) -> Result<()>;
}

/// Notifications emitted around every invocation, in this order:
/// `command`, then `command_completion` or `command_error`.
#[derive(Debug)]
pub enum CommandEvent<'a> {
    Command(&'a Context),
    CommandCompletion(&'a Context),
    CommandError(&'a Context, &'a CommandError),
}

impl CommandEvent<'_> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Command(_) => "command",
            Self::CommandCompletion(_) => "command_completion",
            Self::CommandError(..) => "command_error",
        }
    }

    pub fn context(&self) -> &Context {
        match self {
            Self::Command(ctx) | Self::CommandCompletion(ctx) | Self::CommandError(ctx, _) => ctx,
        }
    }
}

/// The legacy framework pieces the bridge calls back into.
#[async_trait]
pub trait Host: Send + Sync {
    /// Prefixes accepted for a real channel message.
    async fn prefixes(&self, _message: &ChannelMessage) -> Vec<String> {
        vec!["!".to_string()]
    }

    /// Global checks that run once per invocation.
    async fn evaluate_once(&self, _ctx: &Context) -> std::result::Result<bool, CommandError> {
        Ok(true)
    }

    async fn emit(&self, _event: CommandEvent<'_>) {}
}

/// Host with fixed prefixes that reports events through `tracing`.
#[derive(Debug, Clone)]
pub struct TracingHost {
    prefixes: Vec<String>,
}

impl TracingHost {
    pub fn new(prefixes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for TracingHost {
    fn default() -> Self {
        Self::new(["!"])
    }
}

#[async_trait]
impl Host for TracingHost {
    async fn prefixes(&self, _message: &ChannelMessage) -> Vec<String> {
        self.prefixes.clone()
    }

    async fn emit(&self, event: CommandEvent<'_>) {
        let ctx = event.context();
        match &event {
            CommandEvent::CommandError(_, error) => warn!(
                event = event.name(),
                user = %ctx.author().id,
                "{}: {}",
                ctx.message.content(),
                error
            ),
            _ => info!(event = event.name(), user = %ctx.author().id, "{}", ctx.message.content()),
        }
    }
}
