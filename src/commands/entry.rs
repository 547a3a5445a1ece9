//! The callback a structured command is registered with.
//!
//! It re-enters the legacy pipeline so checks, error hooks and completion events behave the
//! same whether a command was typed or invoked as an interaction.

use serde_json::{Map, Value};
use std::sync::{Arc, Weak};
use tracing::{error, warn};

use super::schema::CommandSchema;
use super::{Args, LegacyCommand};
use crate::bot::CompatBot;
use crate::context::Context;
use crate::context::message::{Message, SyntheticMessage};
use crate::error::{CommandError, HandlerError, Result};
use crate::host::{CommandEvent, Host, Interaction};

pub(crate) const GLOBAL_CHECK_FAILED: &str = "The global check once functions failed.";

#[derive(Debug, Clone)]
pub struct EntryPoint {
    command: Weak<LegacyCommand>,
}

impl EntryPoint {
    pub(crate) fn new(command: Weak<LegacyCommand>) -> Self {
        Self { command }
    }

    /// Run the legacy command for `interaction`. `values` are keyed by option name.
    pub async fn invoke(
        &self,
        bot: &CompatBot,
        schema: &CommandSchema,
        interaction: Arc<dyn Interaction>,
        values: &Map<String, Value>,
    ) -> Result<()> {
        let Some(command) = self.command.upgrade() else {
            warn!(schema = %schema.name, "legacy command was dropped, ignoring interaction");
            return Ok(());
        };

        let message = SyntheticMessage::from_interaction(&interaction)
            .with_content(format!("/{}", command.qualified_name()));

        let Some(ctx) = bot.get_context(Message::Synthetic(message)).await else {
            return Ok(());
        };
        let Some(resolved) = ctx.command.clone() else {
            return Ok(());
        };

        let args = schema.args_from(values);
        run(bot.host().as_ref(), Arc::new(ctx), &command, &resolved, Ok(args)).await
    }
}

/// Shared invocation pipeline.
///
/// `owner` supplies the handler, `resolved` receives error dispatch. `args` is evaluated
/// only after the global checks pass.
pub(crate) async fn run(
    host: &dyn Host,
    ctx: Arc<Context>,
    owner: &LegacyCommand,
    resolved: &LegacyCommand,
    args: std::result::Result<Args, CommandError>,
) -> Result<()> {
    host.emit(CommandEvent::Command(&ctx)).await;

    let outcome = match host.evaluate_once(&ctx).await {
        Ok(true) => match args {
            Ok(args) => owner.callback().call(ctx.clone(), args).await,
            Err(e) => Err(e.into()),
        },
        Ok(false) => Err(CommandError::CheckFailure(GLOBAL_CHECK_FAILED.to_string()).into()),
        Err(e) => Err(e.into()),
    };

    match outcome {
        Ok(()) => {
            host.emit(CommandEvent::CommandCompletion(&ctx)).await;
            Ok(())
        }
        Err(HandlerError::Command(e)) => {
            resolved.dispatch_error(host, ctx, e).await;
            Ok(())
        }
        Err(HandlerError::Internal(e)) => {
            error!(command = %resolved.qualified_name(), "handler failed:\n{}", e.tree());
            Err(e)
        }
    }
}
