//! One command definition, two surfaces.
//!
//! Legacy prefix commands declared with [`CommandBuilder`] (or the [`command`] attribute)
//! are converted into structured application commands by an [`Injector`]. Interactions for
//! those commands are routed back through the legacy pipeline with a [`Context`] whose
//! `send`, `reply`, `defer` and `edit_message` talk to the right response phase.

extern crate self as discord_compat;

pub mod bot;
pub mod commands;
pub mod config;
pub mod context;
pub mod discord;
pub mod error;
pub mod host;
pub mod options;
pub mod tree;

pub use bot::CompatBot;
pub use commands::injector::{InjectParams, Injector, PendingInjection};
pub use commands::schema::{CommandSchema, CommandType, Scope};
pub use commands::{Args, Callback, CommandBuilder, LegacyCommand, Param, inject, override_option};
pub use config::CompatConfig;
pub use context::Context;
pub use context::message::{ChannelMessage, Message, SyntheticMessage, User};
pub use context::payload::{MessageEdit, SendOptions};
pub use error::{CommandError, CompatError, HandlerError, Result};
pub use host::{CommandEvent, Host, Interaction, MessageSink, TracingHost};
pub use options::{ChannelType, Namespace, OptionOverride, OptionType, Range, describe};
pub use tree::CommandTree;

pub use proc_macros::command;
#[doc(hidden)]
pub use serde_json;
