use serde_json::{Map, Value, json};
use std::fmt;

use super::Args;
use super::entry::EntryPoint;
use crate::options::ApplicationOption;

/// https://discord.com/developers/docs/interactions/application-commands#application-command-object-application-command-types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum CommandType {
    #[default]
    ChatInput,
    User,
    Message,
}

impl CommandType {
    pub fn code(&self) -> u8 {
        match self {
            Self::ChatInput => 1,
            Self::User => 2,
            Self::Message => 3,
        }
    }
}

/// Where a structured command is registered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Scope {
    #[default]
    Global,
    Guild(u64),
}

impl Scope {
    pub fn from_guild(guild_id: Option<u64>) -> Self {
        guild_id.map_or(Self::Global, Self::Guild)
    }
}

/// A structured command derived from a legacy one. Immutable once registered.
pub struct CommandSchema {
    /// Registration id, unrelated to `name`.
    pub id: String,
    pub name: String,
    pub kind: CommandType,
    pub description: String,
    /// Id of the schema this one is nested under.
    pub parent: Option<String>,
    pub default_permission: bool,
    pub scope: Scope,
    pub options: Vec<ApplicationOption>,
    pub(crate) callback: EntryPoint,
}

impl CommandSchema {
    pub fn option(&self, name: &str) -> Option<&ApplicationOption> {
        self.options.iter().find(|o| o.name == name)
    }

    /// Handler arguments from option values keyed by option name.
    ///
    /// Missing values take the option default, or null.
    pub fn args_from(&self, values: &Map<String, Value>) -> Args {
        let mut args = Args::new();
        for option in &self.options {
            let value = values
                .get(&option.name)
                .cloned()
                .or_else(|| option.default.clone())
                .unwrap_or(Value::Null);
            args.insert(option.param.clone(), value);
        }
        args
    }

    /// Options as they appear on the wire.
    pub fn option_payloads(&self) -> Vec<Value> {
        self.options.iter().map(ApplicationOption::payload).collect()
    }

    /// https://discord.com/developers/docs/interactions/application-commands#create-global-application-command
    pub fn payload(&self) -> Value {
        match self.kind {
            CommandType::ChatInput => json!({
                "name": self.name,
                "type": self.kind.code(),
                "description": self.description,
                "options": self.option_payloads(),
                "default_permission": self.default_permission,
            }),
            // Context-menu commands carry neither description nor options.
            CommandType::User | CommandType::Message => json!({
                "name": self.name,
                "type": self.kind.code(),
                "description": "",
                "default_permission": self.default_permission,
            }),
        }
    }
}

impl fmt::Debug for CommandSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSchema")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("parent", &self.parent)
            .field("scope", &self.scope)
            .field("options", &self.options)
            .finish()
    }
}
