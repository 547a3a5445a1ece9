//! Registry of structured commands, and routing of interactions back to them.

use dashmap::DashMap;
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::bot::CompatBot;
use crate::commands::schema::{CommandSchema, Scope};
use crate::discord::model::{CommandData, DataOption};
use crate::error::{CompatError, Result};
use crate::host::Interaction;

const SUB_COMMAND: u8 = 1;
const SUB_COMMAND_GROUP: u8 = 2;

#[derive(Debug)]
pub struct CommandTree {
    name: String,
    commands: DashMap<String, Arc<CommandSchema>>,
}

impl CommandTree {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            commands: DashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn register(&self, schema: Arc<CommandSchema>) -> Result<()> {
        if let Some(parent) = &schema.parent {
            let Some(parent) = self.get(parent) else {
                return Err(CompatError::new("unknown_parent").push_str(format!(
                    "{:?} names parent {} which is not registered in {:?}",
                    schema.name, parent, self.name
                )));
            };
            // Discord only nests subcommands inside their parent's payload.
            if parent.scope != schema.scope {
                return Err(CompatError::new("scope_mismatch").push_str(format!(
                    "{:?} is scoped to {:?} but its parent {:?} is scoped to {:?}",
                    schema.name, schema.scope, parent.name, parent.scope
                )));
            }
        }

        if self
            .find(&schema.name, schema.parent.as_deref(), schema.scope)
            .is_some()
        {
            return Err(CompatError::new("duplicate_command").push_str(format!(
                "{:?} is already registered in {:?} for {:?}",
                schema.name, self.name, schema.scope
            )));
        }

        self.commands.insert(schema.id.clone(), schema);
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<Arc<CommandSchema>> {
        self.commands.get(id).map(|s| s.value().clone())
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn find(&self, name: &str, parent: Option<&str>, scope: Scope) -> Option<Arc<CommandSchema>> {
        self.commands
            .iter()
            .find(|s| s.name == name && s.parent.as_deref() == parent && s.scope == scope)
            .map(|s| s.value().clone())
    }

    /// Direct children of `id`, by name.
    pub fn children(&self, id: &str) -> Vec<Arc<CommandSchema>> {
        let mut children: Vec<_> = self
            .commands
            .iter()
            .filter(|s| s.parent.as_deref() == Some(id))
            .map(|s| s.value().clone())
            .collect();
        children.sort_by(|a, b| a.name.cmp(&b.name));
        children
    }

    /// Scopes that hold at least one top-level command.
    pub fn scopes(&self) -> Vec<Scope> {
        let scopes: BTreeSet<_> = self
            .commands
            .iter()
            .filter(|s| s.parent.is_none())
            .map(|s| match s.scope {
                Scope::Global => None,
                Scope::Guild(id) => Some(id),
            })
            .collect();
        scopes.into_iter().map(Scope::from_guild).collect()
    }

    /// Bodies for a bulk overwrite of `scope`, children nested as subcommands.
    pub fn payloads(&self, scope: Scope) -> Vec<Value> {
        let mut roots: Vec<_> = self
            .commands
            .iter()
            .filter(|s| s.parent.is_none() && s.scope == scope)
            .map(|s| s.value().clone())
            .collect();
        roots.sort_by(|a, b| a.name.cmp(&b.name));

        roots
            .iter()
            .map(|root| {
                let mut body = root.payload();
                let children = self.children(&root.id);
                if !children.is_empty() {
                    body["options"] = json!(children.iter().map(|c| self.nested(c)).collect::<Vec<_>>());
                }
                body
            })
            .collect()
    }

    fn nested(&self, schema: &CommandSchema) -> Value {
        let children = self.children(&schema.id);
        let (kind, options) = if children.is_empty() {
            (SUB_COMMAND, schema.option_payloads())
        } else {
            (
                SUB_COMMAND_GROUP,
                children.iter().map(|c| self.nested(c)).collect(),
            )
        };
        json!({
            "type": kind,
            "name": schema.name,
            "description": schema.description,
            "options": options,
        })
    }

    /// Route an application command interaction to the schema it names.
    ///
    /// Returns `false` when no registered schema matches.
    pub async fn dispatch(
        &self,
        bot: &CompatBot,
        interaction: Arc<dyn Interaction>,
        data: &CommandData,
    ) -> Result<bool> {
        let guild = interaction.guild_id().and_then(|g| g.parse::<u64>().ok());
        let root = guild
            .and_then(|g| self.find(&data.name, None, Scope::Guild(g)))
            .or_else(|| self.find(&data.name, None, Scope::Global));

        let Some(mut schema) = root else {
            warn!(command = %data.name, tree = %self.name, "no application command registered");
            return Ok(false);
        };

        let mut options: &[DataOption] = &data.options;
        while let Some(sub) = options
            .iter()
            .find(|o| o.kind == SUB_COMMAND || o.kind == SUB_COMMAND_GROUP)
        {
            let Some(child) = self.find(&sub.name, Some(&schema.id), schema.scope) else {
                warn!(command = %data.name, subcommand = %sub.name, "unknown subcommand");
                return Ok(false);
            };
            schema = child;
            options = &sub.options;
        }

        let values: Map<String, Value> = options
            .iter()
            .filter_map(|o| o.value.clone().map(|v| (o.name.clone(), v)))
            .collect();

        debug!(command = %schema.name, id = %schema.id, "dispatching interaction");
        schema.callback.invoke(bot, &schema, interaction, &values).await?;
        Ok(true)
    }
}
