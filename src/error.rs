use std::panic::Location;
use std::{fmt, sync::Arc};

#[derive(Debug, Clone)]
pub enum Cause {
    Any(CompatError),
    Std(Arc<dyn std::error::Error + Send + Sync>),
}

/// Keyed error with a cause chain and the location that raised it.
///
/// Configuration mistakes (missing descriptions, conflicting overrides), transport failures
/// and response-state conflicts all surface as a `CompatError`.
#[derive(Debug, Clone)]
pub struct CompatError {
    pub key: &'static str,
    pub causes: Vec<Cause>,
    pub file: &'static str,
    pub line: u32,
}

impl CompatError {
    #[track_caller]
    #[inline]
    pub fn new(key: &'static str) -> Self {
        let loc = Location::caller();
        Self {
            key,
            causes: Vec::new(),
            file: loc.file(),
            line: loc.line(),
        }
    }

    #[inline]
    pub fn push_any(mut self, cause: CompatError) -> Self {
        self.causes.push(Cause::Any(cause));
        self
    }

    #[inline]
    pub fn push_str(mut self, message: impl Into<String>) -> Self {
        self.causes
            .push(Cause::Std(Arc::new(std::io::Error::other(message.into()))));
        self
    }

    #[inline]
    pub fn push_std(mut self, cause: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.causes.push(Cause::Std(Arc::new(cause)));
        self
    }

    /// Render the error with an ASCII tree of causes.
    pub fn tree(&self) -> String {
        let mut out = format!("{}:{} - {}\n", self.file, self.line, self.key);
        self.render_causes("", &mut out);
        out
    }

    fn render_causes(&self, prefix: &str, out: &mut String) {
        for (i, cause) in self.causes.iter().enumerate() {
            let is_last = i == self.causes.len() - 1;
            let branch = if is_last { "└── " } else { "├── " };
            let extension = if is_last { "    " } else { "│   " };

            match cause {
                Cause::Any(e) => {
                    out.push_str(&format!("{}{}[{}:{}] {}\n", prefix, branch, e.file, e.line, e.key));
                    e.render_causes(&format!("{}{}", prefix, extension), out);
                }
                Cause::Std(e) => {
                    out.push_str(&format!("{}{}{}\n", prefix, branch, e));

                    let mut source = e.source();
                    let mut depth = 0;
                    while let Some(err) = source {
                        out.push_str(&format!(
                            "{}{}{}↳ {}\n",
                            prefix,
                            extension,
                            "  ".repeat(depth + 1),
                            err
                        ));
                        source = err.source();
                        depth += 1;
                    }
                }
            }
        }
    }

    /// Log the error tree at error level.
    pub fn log(&self) {
        tracing::error!("{}", self.tree().trim_end());
    }
}

impl fmt::Display for CompatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}:{}] {}", self.file, self.line, self.key)?;
        if let Some(Cause::Std(first)) = self.causes.first() {
            write!(f, ": {}", first)?;
        } else if !self.causes.is_empty() {
            write!(f, " (causes: {})", self.causes.len())?;
        }
        Ok(())
    }
}

impl std::error::Error for CompatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.causes.iter().find_map(|c| match c {
            Cause::Any(e) => Some(e as &dyn std::error::Error),
            Cause::Std(e) => Some(e.as_ref() as &(dyn std::error::Error + 'static)),
        })
    }
}

impl From<reqwest::Error> for CompatError {
    #[track_caller]
    fn from(e: reqwest::Error) -> Self {
        CompatError::new("reqwest").push_std(e)
    }
}

impl From<serde_json::Error> for CompatError {
    #[track_caller]
    fn from(e: serde_json::Error) -> Self {
        CompatError::new("serde_json").push_std(e)
    }
}

impl From<url::ParseError> for CompatError {
    #[track_caller]
    fn from(e: url::ParseError) -> Self {
        CompatError::new("url_parse").push_std(e)
    }
}

impl From<std::env::VarError> for CompatError {
    #[track_caller]
    fn from(e: std::env::VarError) -> Self {
        CompatError::new("env_var").push_std(e)
    }
}

pub type Result<T> = std::result::Result<T, CompatError>;

/// The legacy command error family.
///
/// Only these are caught by the dispatch pipeline and handed to a command's error hook;
/// anything else a handler returns propagates to the caller untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandError {
    /// A check (global or per-command) refused to run the command.
    CheckFailure(String),
    /// A text argument could not be converted.
    BadArgument { argument: String, expected: String },
    /// A required parameter received no value on the text path.
    MissingArgument(String),
    /// Raised by user code.
    Failed(String),
}

impl CommandError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CheckFailure(msg) => write!(f, "{}", msg),
            Self::BadArgument { argument, expected } => {
                write!(f, "Expected {}, but got {:?} instead", expected, argument)
            }
            Self::MissingArgument(param) => {
                write!(f, "{} is a required argument that is missing.", param)
            }
            Self::Failed(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CommandError {}

/// What a command handler may fail with.
#[derive(Debug, Clone)]
pub enum HandlerError {
    Command(CommandError),
    Internal(CompatError),
}

impl From<CommandError> for HandlerError {
    fn from(e: CommandError) -> Self {
        Self::Command(e)
    }
}

impl From<CompatError> for HandlerError {
    fn from(e: CompatError) -> Self {
        Self::Internal(e)
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Command(e) => write!(f, "{}", e),
            Self::Internal(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for HandlerError {}
