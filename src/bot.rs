use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::commands::injector::{Injector, PendingInjection};
use crate::commands::convert::{self, next_word};
use crate::commands::{LegacyCommand, entry};
use crate::context::Context;
use crate::context::message::{ChannelMessage, Message};
use crate::discord::model::CommandData;
use crate::error::{CompatError, Result};
use crate::host::{Host, Interaction, MessageSink};
use crate::tree::CommandTree;

/// Prefix the synthetic message of an interaction carries.
pub const SLASH_PREFIX: &str = "/";

/// Legacy command registry that also serves structured commands.
pub struct CompatBot {
    host: Arc<dyn Host>,
    sink: Arc<dyn MessageSink>,
    injector: Injector,
    commands: DashMap<String, Arc<LegacyCommand>>,
}

impl CompatBot {
    pub fn new(host: Arc<dyn Host>, sink: Arc<dyn MessageSink>) -> Self {
        Self::with_injector(host, sink, Injector::new())
    }

    pub fn with_injector(host: Arc<dyn Host>, sink: Arc<dyn MessageSink>, injector: Injector) -> Self {
        Self {
            host,
            sink,
            injector,
            commands: DashMap::new(),
        }
    }

    pub fn host(&self) -> &Arc<dyn Host> {
        &self.host
    }

    pub fn injector(&self) -> &Injector {
        &self.injector
    }

    pub fn tree(&self) -> &Arc<CommandTree> {
        self.injector.tree()
    }

    /// Look a command up by its qualified name, e.g. `math add`.
    pub fn get_command(&self, qualified_name: &str) -> Option<Arc<LegacyCommand>> {
        self.commands.get(qualified_name).map(|c| c.value().clone())
    }

    pub fn commands(&self) -> Vec<Arc<LegacyCommand>> {
        self.commands.iter().map(|c| c.value().clone()).collect()
    }

    /// Register `command`, running any injection requested before it had a bot.
    ///
    /// Parents must be added before their children.
    pub fn add_command(&self, command: Arc<LegacyCommand>) -> Result<()> {
        let name = command.qualified_name();
        if self.commands.contains_key(&name) {
            return Err(CompatError::new("command_registered")
                .push_str(format!("a command named {:?} is already registered", name)));
        }

        // Kept until the injection succeeds so a corrected command can be added again.
        if let Some(pending) = command.pending() {
            match pending {
                PendingInjection::Unbound(params) => self.injector.inject(&command, params)?,
                PendingInjection::Bound(injector, params) => injector.inject(&command, params)?,
            };
            command.clear_pending();
        }

        command.attach_injector(self.injector.clone());
        debug!(command = %name, "added command");
        self.commands.insert(name, command);
        Ok(())
    }

    pub async fn get_prefix(&self, message: &Message) -> Vec<String> {
        match message {
            Message::Synthetic(_) => vec![SLASH_PREFIX.to_string()],
            Message::Channel(m) => self.host.prefixes(m).await,
        }
    }

    /// Resolve the invocation `message` stands for.
    ///
    /// `None` when no prefix matches. A context without a command means the prefix matched
    /// but the text names no registered command.
    pub async fn get_context(&self, message: Message) -> Option<Context> {
        let prefixes = self.get_prefix(&message).await;
        let content = message.content();
        let prefix = prefixes
            .into_iter()
            .filter(|p| !p.is_empty() && content.starts_with(p.as_str()))
            .max_by_key(String::len)?;

        let mut rest = content[prefix.len()..].trim_start();
        let mut path = String::new();
        let mut command = None;
        let mut invoked_with = None;

        while let Some((word, after)) = next_word(rest) {
            let candidate = if path.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", path, word)
            };
            let Some(found) = self.get_command(&candidate) else {
                break;
            };
            command = Some(found);
            invoked_with = Some(word.to_string());
            path = candidate;
            rest = after;
        }

        let arguments = rest.trim().to_string();
        Some(Context::new(
            message,
            self.sink.clone(),
            prefix,
            command,
            invoked_with,
            arguments,
        ))
    }

    /// Legacy entry: run the command a channel message invokes, if any.
    pub async fn process_commands(&self, message: ChannelMessage) -> Result<()> {
        if message.author.bot == Some(true) {
            return Ok(());
        }

        let Some(ctx) = self.get_context(Message::Channel(message)).await else {
            return Ok(());
        };
        let Some(command) = ctx.command.clone() else {
            return Ok(());
        };

        let args = convert::parse_arguments(&ctx, &command, self.injector.namespace()).await;
        entry::run(self.host.as_ref(), Arc::new(ctx), &command, &command, args).await
    }

    /// Structured entry: route an application command interaction through this bot's tree.
    pub async fn handle_interaction(&self, interaction: Arc<dyn Interaction>, data: &CommandData) -> Result<bool> {
        self.tree().dispatch(self, interaction, data).await
    }
}
