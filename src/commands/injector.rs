use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

use super::LegacyCommand;
use super::entry::EntryPoint;
use super::schema::{CommandSchema, CommandType, Scope};
use crate::error::{CompatError, Result};
use crate::options::{Namespace, OptionDescriptor, OptionOverride, OptionType, annotation};
use crate::tree::CommandTree;

/// Name of the tree an injector registers into when no tree is given.
pub const DEFAULT_TREE_NAME: &str = "discord-compat-injector";

const MAX_DESCRIPTION_CHARS: usize = 100;

/// Everything `inject` accepts besides the command itself.
#[derive(Debug, Clone)]
pub struct InjectParams {
    pub name: Option<String>,
    pub kind: CommandType,
    pub description: Option<String>,
    pub parent: Option<Arc<CommandSchema>>,
    pub default_permission: bool,
    /// Applied to every option where inference and overrides left a gap.
    pub option_defaults: Option<OptionOverride>,
    pub guild_id: Option<u64>,
    pub tree: Option<Arc<CommandTree>>,
    /// Parameters that get no option and are absent from the handler's arguments.
    pub excluded_options: HashSet<String>,
}

impl Default for InjectParams {
    fn default() -> Self {
        Self {
            name: None,
            kind: CommandType::ChatInput,
            description: None,
            parent: None,
            default_permission: true,
            option_defaults: None,
            guild_id: None,
            tree: None,
            excluded_options: HashSet::new(),
        }
    }
}

impl InjectParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn kind(mut self, kind: CommandType) -> Self {
        self.kind = kind;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn parent(mut self, parent: &Arc<CommandSchema>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn default_permission(mut self, default_permission: bool) -> Self {
        self.default_permission = default_permission;
        self
    }

    pub fn option_defaults(mut self, defaults: OptionOverride) -> Self {
        self.option_defaults = Some(defaults);
        self
    }

    pub fn guild(mut self, guild_id: u64) -> Self {
        self.guild_id = Some(guild_id);
        self
    }

    pub fn tree(mut self, tree: &Arc<CommandTree>) -> Self {
        self.tree = Some(tree.clone());
        self
    }

    pub fn exclude(mut self, param: impl Into<String>) -> Self {
        self.excluded_options.insert(param.into());
        self
    }
}

/// An injection requested before the command was added to a bot.
#[derive(Debug, Clone)]
pub enum PendingInjection {
    /// Runs through the injector of whichever bot the command is added to.
    Unbound(InjectParams),
    Bound(Injector, InjectParams),
}

/// Converts legacy commands into structured ones and registers them.
#[derive(Debug, Clone)]
pub struct Injector {
    tree: Arc<CommandTree>,
    namespace: Arc<Namespace>,
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl Injector {
    pub fn new() -> Self {
        Self::with_tree(Arc::new(CommandTree::new(DEFAULT_TREE_NAME)))
    }

    pub fn with_tree(tree: Arc<CommandTree>) -> Self {
        Self {
            tree,
            namespace: Arc::new(Namespace::new()),
        }
    }

    /// Hint bindings visible to every command this injector converts.
    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = Arc::new(namespace);
        self
    }

    pub fn tree(&self) -> &Arc<CommandTree> {
        &self.tree
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn inject_later(&self, params: InjectParams) -> PendingInjection {
        PendingInjection::Bound(self.clone(), params)
    }

    /// Derive, validate and register the structured form of `command`.
    pub fn inject(&self, command: &Arc<LegacyCommand>, params: InjectParams) -> Result<Arc<CommandSchema>> {
        let qualified = command.qualified_name();

        if command.application_command().is_some() {
            return Err(CompatError::new("already_injected")
                .push_str(format!("{:?} already has an application command", qualified)));
        }

        let name = params.name.clone().unwrap_or_else(|| command.name().to_string());
        let description = params
            .description
            .clone()
            .or_else(|| {
                command
                    .short_doc()
                    .map(|doc| doc.chars().take(MAX_DESCRIPTION_CHARS).collect())
            })
            .filter(|d: &String| !d.is_empty())
            .ok_or_else(|| {
                CompatError::new("missing_description").push_str(format!(
                    "tried to convert command {:?} into an application command but it has no description",
                    qualified
                ))
            })?;

        let parent = match &params.parent {
            Some(schema) => Some(schema.clone()),
            None => command
                .parent()
                .and_then(|p| p.application_command())
                .cloned(),
        };

        let scope = match (params.guild_id, &parent) {
            (Some(guild_id), _) => Scope::Guild(guild_id),
            (None, Some(parent)) => parent.scope,
            (None, None) => Scope::Global,
        };

        let defaults = params
            .option_defaults
            .clone()
            .map(OptionOverride::into_descriptor)
            .transpose()?;

        let mut options = Vec::new();
        for param in command.params() {
            if params.excluded_options.contains(&param.name) {
                debug!(command = %qualified, param = %param.name, "excluded from options");
                continue;
            }

            let inferred = self.infer(command, &param.name, param.hint.as_deref(), param.default.as_ref());
            let descriptor = command.options().with(&param.name, |current| {
                current.fill(&inferred);
                if let Some(defaults) = &defaults {
                    current.fill(defaults);
                }
                current.clone()
            });

            options.push(descriptor.finalize(&param.name)?);
        }

        let schema = Arc::new(CommandSchema {
            id: uuid::Uuid::new_v4().simple().to_string(),
            name,
            kind: params.kind,
            description,
            parent: parent.as_ref().map(|p| p.id.clone()),
            default_permission: params.default_permission,
            scope,
            options,
            callback: EntryPoint::new(Arc::downgrade(command)),
        });

        let tree = params.tree.as_ref().unwrap_or(&self.tree);
        tree.register(schema.clone())?;
        command.set_application_command(schema.clone())?;

        info!(
            command = %qualified,
            id = %schema.id,
            tree = %tree.name(),
            scope = ?schema.scope,
            "registered application command"
        );

        Ok(schema)
    }

    fn infer(
        &self,
        command: &LegacyCommand,
        param: &str,
        hint: Option<&str>,
        default: Option<&serde_json::Value>,
    ) -> OptionDescriptor {
        let mut inferred = match default {
            None => OptionDescriptor {
                required: Some(true),
                ..Default::default()
            },
            Some(value) => OptionDescriptor {
                required: Some(false),
                default: Some(value.clone()),
                ..Default::default()
            },
        };

        if let Some(hint) = hint {
            match annotation::resolve(hint, &self.namespace, command.namespace()) {
                Ok(fragment) => inferred.fill(&fragment),
                Err(e) => {
                    debug!(param, hint, error = %e, "unsupported hint, using a string option");
                    inferred.kind = Some(OptionType::String);
                }
            }
        }

        inferred
    }
}
