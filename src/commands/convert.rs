//! Text-path argument conversion.

use async_trait::async_trait;
use serde_json::Value;

use super::{Args, LegacyCommand, Param};
use crate::context::Context;
use crate::error::CommandError;
use crate::options::{Namespace, OptionType, Range, annotation};

/// Turns one text token into a handler argument.
#[async_trait]
pub trait Converter: Send + Sync {
    async fn convert(&self, ctx: &Context, argument: &str) -> Result<Value, CommandError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextConverter {
    Range(Range),
    Integer,
    Number,
    Boolean,
    Text,
}

impl TextConverter {
    /// Pick a converter from the option the parameter would become.
    ///
    /// Only a `Range<..>` hint gets the range converter; bounds set by overrides are left to
    /// the platform on the slash path.
    pub fn for_param(command: &LegacyCommand, param: &Param, global: &Namespace) -> Self {
        let local = command.namespace();
        if let Some(range) = param
            .hint
            .as_deref()
            .and_then(|hint| annotation::resolve_range(hint, global, local))
        {
            return Self::Range(range);
        }

        let mut descriptor = command.options().get(&param.name).unwrap_or_default();
        if let Some(fragment) = param
            .hint
            .as_deref()
            .and_then(|hint| annotation::resolve(hint, global, local).ok())
        {
            descriptor.fill(&fragment);
        }

        match descriptor.kind {
            Some(OptionType::Integer) => Self::Integer,
            Some(OptionType::Number) => Self::Number,
            Some(OptionType::Boolean) => Self::Boolean,
            _ => Self::Text,
        }
    }

    fn consumes_rest(&self) -> bool {
        matches!(self, Self::Text)
    }
}

fn parse_bool(argument: &str) -> Option<bool> {
    match argument.to_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" | "enable" | "on" => Some(true),
        "no" | "n" | "false" | "f" | "0" | "disable" | "off" => Some(false),
        _ => None,
    }
}

#[async_trait]
impl Converter for TextConverter {
    async fn convert(&self, ctx: &Context, argument: &str) -> Result<Value, CommandError> {
        let bad = |expected: &str| CommandError::BadArgument {
            argument: argument.to_string(),
            expected: expected.to_string(),
        };

        match self {
            Self::Range(range) => range.convert(ctx, argument).await,
            Self::Integer => argument
                .parse::<i64>()
                .map(Value::from)
                .map_err(|_| bad("an integer")),
            Self::Number => argument
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::from)
                .ok_or_else(|| bad("a number")),
            Self::Boolean => parse_bool(argument)
                .map(Value::Bool)
                .ok_or_else(|| bad("a boolean")),
            Self::Text => Ok(Value::String(argument.to_string())),
        }
    }
}

pub(crate) fn next_word(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    Some(input.split_once(char::is_whitespace).unwrap_or((input, "")))
}

/// Split the context's argument text over the command's parameters.
///
/// One whitespace-separated token per parameter; a trailing text parameter takes the rest of
/// the line. Missing tokens fall back to the parameter default.
pub async fn parse_arguments(
    ctx: &Context,
    command: &LegacyCommand,
    global: &Namespace,
) -> Result<Args, CommandError> {
    let params = command.params();
    let mut rest = ctx.arguments();
    let mut args = Args::new();

    for (i, param) in params.iter().enumerate() {
        let converter = TextConverter::for_param(command, param, global);

        let token = if i + 1 == params.len() && converter.consumes_rest() {
            Some(rest.trim()).filter(|r| !r.is_empty())
        } else {
            next_word(rest).map(|(word, after)| {
                rest = after;
                word
            })
        };

        let value = match (token, &param.default) {
            (Some(token), _) => converter.convert(ctx, token).await?,
            (None, Some(default)) => default.clone(),
            (None, None) => return Err(CommandError::MissingArgument(param.name.clone())),
        };
        args.insert(param.name.clone(), value);
    }

    Ok(args)
}
