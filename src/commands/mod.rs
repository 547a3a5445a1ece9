pub mod convert;
pub mod entry;
pub mod injector;
pub mod schema;

use futures_util::future::BoxFuture;
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use crate::context::Context;
use crate::error::{CommandError, CompatError, HandlerError, Result};
use crate::host::{CommandEvent, Host};
use crate::options::{Namespace, OptionOverride, OptionStore, describe};
use injector::{InjectParams, Injector, PendingInjection};
use schema::CommandSchema;

pub type HandlerFuture = BoxFuture<'static, std::result::Result<(), HandlerError>>;
type FreeHandler = Arc<dyn Fn(Arc<Context>, Args) -> HandlerFuture + Send + Sync>;
type CogHandler = Arc<dyn Fn(Arc<dyn Any + Send + Sync>, Arc<Context>, Args) -> HandlerFuture + Send + Sync>;
pub type ErrorHook = Arc<dyn Fn(Arc<Context>, CommandError) -> BoxFuture<'static, ()> + Send + Sync>;

/// A command handler, optionally bound to the cog that owns it.
#[derive(Clone)]
pub enum Callback {
    Free(FreeHandler),
    Bound {
        cog: Arc<dyn Any + Send + Sync>,
        handler: CogHandler,
    },
}

impl Callback {
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Arc<Context>, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        Self::Free(Arc::new(
            move |ctx: Arc<Context>, args: Args| -> HandlerFuture { Box::pin(f(ctx, args)) },
        ))
    }

    /// Handler that receives `cog` as its first argument.
    pub fn bound<C, F, Fut>(cog: Arc<C>, f: F) -> Self
    where
        C: Send + Sync + 'static,
        F: Fn(Arc<C>, Arc<Context>, Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = std::result::Result<(), HandlerError>> + Send + 'static,
    {
        let handler: CogHandler = Arc::new(
            move |cog: Arc<dyn Any + Send + Sync>, ctx: Arc<Context>, args: Args| -> HandlerFuture {
                match cog.downcast::<C>() {
                    Ok(cog) => Box::pin(f(cog, ctx, args)),
                    Err(_) => Box::pin(async {
                        Err(HandlerError::Internal(CompatError::new("cog_type_mismatch")))
                    }),
                }
            },
        );
        Self::Bound { cog, handler }
    }

    pub fn cog(&self) -> Option<&Arc<dyn Any + Send + Sync>> {
        match self {
            Self::Free(_) => None,
            Self::Bound { cog, .. } => Some(cog),
        }
    }

    pub(crate) async fn call(&self, ctx: Arc<Context>, args: Args) -> std::result::Result<(), HandlerError> {
        match self {
            Self::Free(handler) => handler(ctx, args).await,
            Self::Bound { cog, handler } => handler(cog.clone(), ctx, args).await,
        }
    }
}

/// One parameter of a legacy command, excluding the context.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub hint: Option<String>,
    pub default: Option<Value>,
}

impl Param {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hint: None,
            default: None,
        }
    }

    pub fn hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// Argument values keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    values: Map<String, Value>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, param: impl Into<String>, value: Value) {
        self.values.insert(param.into(), value);
    }

    pub fn raw(&self, param: &str) -> Option<&Value> {
        self.values.get(param)
    }

    pub fn contains(&self, param: &str) -> bool {
        self.values.contains_key(param)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Deserialize the value for `param`. Absent values read as `null`, so `Option<T>`
    /// parameters come back as `None`.
    pub fn get<T: DeserializeOwned>(&self, param: &str) -> std::result::Result<T, CommandError> {
        match self.values.get(param) {
            Some(value) => serde_json::from_value(value.clone()).map_err(|_| CommandError::BadArgument {
                argument: value.to_string(),
                expected: format!("a valid value for {}", param),
            }),
            None => serde_json::from_value(Value::Null)
                .map_err(|_| CommandError::MissingArgument(param.to_string())),
        }
    }
}

impl From<Map<String, Value>> for Args {
    fn from(values: Map<String, Value>) -> Self {
        Self { values }
    }
}

/// A legacy text command, plus the state the bridge keeps for it.
pub struct LegacyCommand {
    name: String,
    help: Option<String>,
    brief: Option<String>,
    params: Vec<Param>,
    parent: Option<Arc<LegacyCommand>>,
    callback: Callback,
    on_error: Option<ErrorHook>,
    options: OptionStore,
    namespace: Namespace,
    pending: Mutex<Option<PendingInjection>>,
    injector: OnceCell<Injector>,
    application_command: OnceCell<Arc<CommandSchema>>,
}

impl LegacyCommand {
    pub fn builder(name: impl Into<String>) -> CommandBuilder {
        CommandBuilder::new(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Space-separated path from the root group, e.g. `math add`.
    pub fn qualified_name(&self) -> String {
        match &self.parent {
            Some(parent) => format!("{} {}", parent.qualified_name(), self.name),
            None => self.name.clone(),
        }
    }

    pub fn help(&self) -> Option<&str> {
        self.help.as_deref()
    }

    /// The brief, or the first line of the help text.
    pub fn short_doc(&self) -> Option<&str> {
        self.brief
            .as_deref()
            .or_else(|| self.help.as_deref().and_then(|h| h.lines().next()))
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn parent(&self) -> Option<&Arc<LegacyCommand>> {
        self.parent.as_ref()
    }

    pub fn callback(&self) -> &Callback {
        &self.callback
    }

    pub fn options(&self) -> &OptionStore {
        &self.options
    }

    /// Hint bindings local to this command.
    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    /// Patch the option inferred for `param`. Only fields set on `option` change.
    pub fn override_option(&self, param: &str, option: OptionOverride) -> Result<()> {
        self.options.apply_override(param, option)
    }

    pub fn describe(&self, param: &str, description: impl Into<String>) -> Result<()> {
        self.override_option(param, describe(description))
    }

    /// The structured command generated for this command, once injected.
    pub fn application_command(&self) -> Option<&Arc<CommandSchema>> {
        self.application_command.get()
    }

    pub(crate) fn set_application_command(&self, schema: Arc<CommandSchema>) -> Result<()> {
        self.application_command.set(schema).map_err(|_| {
            CompatError::new("already_injected")
                .push_str(format!("{:?} already has an application command", self.qualified_name()))
        })
    }

    pub fn injector(&self) -> Option<&Injector> {
        self.injector.get()
    }

    pub(crate) fn attach_injector(&self, injector: Injector) {
        let _ = self.injector.set(injector);
    }

    pub(crate) fn pending(&self) -> Option<PendingInjection> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn clear_pending(&self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    pub(crate) fn set_pending(&self, pending: PendingInjection) {
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(pending);
    }

    pub fn has_pending_injection(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Report `error`: local hook first, then the `command_error` event.
    pub async fn dispatch_error(&self, host: &dyn Host, ctx: Arc<Context>, error: CommandError) {
        ctx.mark_failed();
        if let Some(hook) = &self.on_error {
            hook(ctx.clone(), error.clone()).await;
        }
        host.emit(CommandEvent::CommandError(&ctx, &error)).await;
    }
}

impl fmt::Debug for LegacyCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LegacyCommand")
            .field("name", &self.qualified_name())
            .field("params", &self.params)
            .field("bound", &self.callback.cog().is_some())
            .field(
                "application_command",
                &self.application_command.get().map(|s| s.id.as_str()),
            )
            .finish()
    }
}

/// Declares a command before it exists, collecting overrides and a pending injection.
pub struct CommandBuilder {
    name: String,
    help: Option<String>,
    brief: Option<String>,
    params: Vec<Param>,
    parent: Option<Arc<LegacyCommand>>,
    callback: Option<Callback>,
    on_error: Option<ErrorHook>,
    options: OptionStore,
    namespace: Namespace,
    pending: Option<PendingInjection>,
    error: Option<CompatError>,
}

impl CommandBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            help: None,
            brief: None,
            params: Vec::new(),
            parent: None,
            callback: None,
            on_error: None,
            options: OptionStore::new(),
            namespace: Namespace::new(),
            pending: None,
            error: None,
        }
    }

    pub fn help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn brief(mut self, brief: impl Into<String>) -> Self {
        self.brief = Some(brief.into());
        self
    }

    pub fn param(mut self, param: Param) -> Self {
        self.params.push(param);
        self
    }

    pub fn parent(mut self, parent: &Arc<LegacyCommand>) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = Some(callback);
        self
    }

    pub fn on_error<F, Fut>(mut self, hook: F) -> Self
    where
        F: Fn(Arc<Context>, CommandError) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.on_error = Some(Arc::new(
            move |ctx: Arc<Context>, error: CommandError| -> BoxFuture<'static, ()> {
                Box::pin(hook(ctx, error))
            },
        ));
        self
    }

    /// Bind a hint name for this command only.
    pub fn alias(mut self, name: impl Into<String>, hint: impl Into<String>) -> Self {
        self.namespace.alias(name, hint);
        self
    }

    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespace = namespace;
        self
    }

    pub fn override_option(self, param: &str, option: OptionOverride) -> Result<Self> {
        self.options.apply_override(param, option)?;
        Ok(self)
    }

    /// Shortcut for an override that only sets a description.
    ///
    /// Goes through the same override path as [`override_option`](Self::override_option); a
    /// failure is reported by [`build`](Self::build).
    pub fn describe(mut self, param: &str, description: impl Into<String>) -> Self {
        if let Err(e) = self.options.apply_override(param, describe(description)) {
            self.error.get_or_insert(e);
        }
        self
    }

    /// Register as a structured command once the command is added to a bot.
    pub fn inject(mut self, params: InjectParams) -> Self {
        self.pending = Some(PendingInjection::Unbound(params));
        self
    }

    /// Like [`inject`](Self::inject), but through a specific injector.
    pub fn inject_with(mut self, injector: &Injector, params: InjectParams) -> Self {
        self.pending = Some(injector.inject_later(params));
        self
    }

    pub fn build(self) -> Result<Arc<LegacyCommand>> {
        if let Some(e) = self.error {
            return Err(e);
        }
        let callback = self.callback.ok_or_else(|| {
            CompatError::new("missing_callback").push_str(format!("command {:?} has no callback", self.name))
        })?;

        Ok(Arc::new(LegacyCommand {
            name: self.name,
            help: self.help,
            brief: self.brief,
            params: self.params,
            parent: self.parent,
            callback,
            on_error: self.on_error,
            options: self.options,
            namespace: self.namespace,
            pending: Mutex::new(self.pending),
            injector: OnceCell::new(),
            application_command: OnceCell::new(),
        }))
    }
}

/// Inject `command` now if it already belongs to a bot, otherwise when it is added to one.
pub fn inject(command: &Arc<LegacyCommand>, params: InjectParams) -> Result<Option<Arc<CommandSchema>>> {
    match command.injector() {
        Some(injector) => injector.inject(command, params).map(Some),
        None => {
            command.set_pending(PendingInjection::Unbound(params));
            Ok(None)
        }
    }
}

/// Free-function form of [`LegacyCommand::override_option`].
pub fn override_option(command: &LegacyCommand, param: &str, option: OptionOverride) -> Result<()> {
    command.override_option(param, option)
}
