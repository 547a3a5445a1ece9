//! Textual type hints to option fragments.
//!
//! A hint is the Rust type written on a command parameter (`i64`, `Option<String>`,
//! `Range<1, 10>`, `TextChannel`) or a name bound in a [`Namespace`]. Resolution is pure and
//! best effort: callers treat an error as "use a plain string option".

use std::collections::HashMap;

use super::descriptor::{ChannelType, Choice, OptionDescriptor, OptionType};
use super::range::Range;
use crate::error::{CompatError, Result};

const MAX_ALIAS_DEPTH: usize = 16;

#[derive(Debug, Clone, PartialEq)]
pub enum Binding {
    /// Another hint, resolved lazily (forward references are fine).
    Alias(String),
    /// A ready-made fragment, e.g. a fixed set of choices.
    Fragment(OptionDescriptor),
}

/// Name bindings consulted for hints that are not built in.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Namespace {
    bindings: HashMap<String, Binding>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alias(&mut self, name: impl Into<String>, hint: impl Into<String>) -> &mut Self {
        self.bindings.insert(name.into(), Binding::Alias(hint.into()));
        self
    }

    pub fn fragment(&mut self, name: impl Into<String>, fragment: OptionDescriptor) -> &mut Self {
        self.bindings.insert(name.into(), Binding::Fragment(fragment));
        self
    }

    /// Bind `name` to a string option restricted to `choices`.
    pub fn choices<I, C>(&mut self, name: impl Into<String>, choices: I) -> &mut Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Choice>,
    {
        let choices: Vec<Choice> = choices.into_iter().map(Into::into).collect();
        let kind = match choices.first().map(|c| &c.value) {
            Some(serde_json::Value::Number(n)) if n.is_i64() => OptionType::Integer,
            Some(serde_json::Value::Number(_)) => OptionType::Number,
            _ => OptionType::String,
        };
        self.fragment(
            name,
            OptionDescriptor {
                kind: Some(kind),
                choices: Some(choices),
                ..Default::default()
            },
        )
    }

    pub fn get(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

/// Resolve `hint` into the type-related fields of an option.
///
/// `local` bindings shadow `global` ones.
pub fn resolve(hint: &str, global: &Namespace, local: &Namespace) -> Result<OptionDescriptor> {
    resolve_at(hint, global, local, 0)
}

fn resolve_at(hint: &str, global: &Namespace, local: &Namespace, depth: usize) -> Result<OptionDescriptor> {
    if depth > MAX_ALIAS_DEPTH {
        return Err(CompatError::new("annotation_cycle").push_str(hint.to_string()));
    }

    let parsed = TypeHint::parse(hint)?;

    match (parsed.name.as_str(), parsed.args.as_slice()) {
        ("Option" | "Box" | "Arc" | "Rc", [inner]) => resolve_at(inner, global, local, depth + 1),
        ("Range", args) => range_from_args(args)
            .map(|r| r.fragment())
            .map_err(|e| CompatError::new("unsupported_annotation").push_any(e)),
        (name, []) => {
            if let Some(fragment) = builtin(name) {
                return Ok(fragment);
            }
            match local.get(name).or_else(|| global.get(name)) {
                Some(Binding::Alias(target)) => resolve_at(target, global, local, depth + 1),
                Some(Binding::Fragment(fragment)) => Ok(fragment.clone()),
                None => Err(CompatError::new("unsupported_annotation").push_str(hint.to_string())),
            }
        }
        _ => Err(CompatError::new("unsupported_annotation").push_str(hint.to_string())),
    }
}

/// The [`Range`] named by `hint`, looking through `Option`-like wrappers and aliases.
pub fn resolve_range(hint: &str, global: &Namespace, local: &Namespace) -> Option<Range> {
    range_at(hint, global, local, 0)
}

fn range_at(hint: &str, global: &Namespace, local: &Namespace, depth: usize) -> Option<Range> {
    if depth > MAX_ALIAS_DEPTH {
        return None;
    }

    let parsed = TypeHint::parse(hint).ok()?;
    match (parsed.name.as_str(), parsed.args.as_slice()) {
        ("Option" | "Box" | "Arc" | "Rc", [inner]) => range_at(inner, global, local, depth + 1),
        ("Range", args) => range_from_args(args).ok(),
        (name, []) if builtin(name).is_none() => match local.get(name).or_else(|| global.get(name)) {
            Some(Binding::Alias(target)) => range_at(target, global, local, depth + 1),
            _ => None,
        },
        _ => None,
    }
}

fn of_kind(kind: OptionType) -> OptionDescriptor {
    OptionDescriptor {
        kind: Some(kind),
        ..Default::default()
    }
}

fn channels(types: &[ChannelType]) -> OptionDescriptor {
    OptionDescriptor {
        kind: Some(OptionType::Channel),
        channel_types: Some(types.to_vec()),
        ..Default::default()
    }
}

fn builtin(name: &str) -> Option<OptionDescriptor> {
    let fragment = match name {
        "String" | "str" | "char" | "Cow" => of_kind(OptionType::String),
        n if is_integer(n) => of_kind(OptionType::Integer),
        n if is_float(n) => of_kind(OptionType::Number),
        "bool" => of_kind(OptionType::Boolean),
        "User" | "Member" => of_kind(OptionType::User),
        "Role" => of_kind(OptionType::Role),
        "Mentionable" => of_kind(OptionType::Mentionable),
        "Attachment" => of_kind(OptionType::Attachment),
        "Channel" | "GuildChannel" => of_kind(OptionType::Channel),
        "TextChannel" => channels(&[ChannelType::Text]),
        "NewsChannel" => channels(&[ChannelType::News]),
        "VoiceChannel" => channels(&[ChannelType::Voice]),
        "StageChannel" => channels(&[ChannelType::StageVoice]),
        "CategoryChannel" => channels(&[ChannelType::Category]),
        "ForumChannel" => channels(&[ChannelType::Forum]),
        "Thread" => channels(&[
            ChannelType::NewsThread,
            ChannelType::PublicThread,
            ChannelType::PrivateThread,
        ]),
        _ => return None,
    };
    Some(fragment)
}

fn is_integer(name: &str) -> bool {
    matches!(
        name,
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64" | "u128" | "usize"
    )
}

fn is_float(name: &str) -> bool {
    matches!(name, "f32" | "f64")
}

/// `Range<min, max>` or `Range<T, min, max>`.
fn range_from_args(args: &[String]) -> Result<Range> {
    match args {
        [min, max] => match (min.parse::<i64>(), max.parse::<i64>()) {
            (Ok(min), Ok(max)) => Range::int(min, max),
            _ => Range::number(parse_float(min)?, parse_float(max)?),
        },
        [kind, min, max] if is_integer(kind) => {
            let min = min
                .parse::<i64>()
                .map_err(|e| CompatError::new("range_bound").push_std(e))?;
            let max = max
                .parse::<i64>()
                .map_err(|e| CompatError::new("range_bound").push_std(e))?;
            Range::int(min, max)
        }
        [kind, min, max] if is_float(kind) => Range::number(parse_float(min)?, parse_float(max)?),
        _ => Err(CompatError::new("range_arity").push_str(format!("{} arguments", args.len()))),
    }
}

fn parse_float(s: &str) -> Result<f64> {
    s.parse::<f64>()
        .map_err(|e| CompatError::new("range_bound").push_std(e))
}

/// `name<arg, arg>` with whitespace, references and path prefixes stripped.
#[derive(Debug, PartialEq)]
struct TypeHint {
    name: String,
    args: Vec<String>,
}

impl TypeHint {
    fn parse(text: &str) -> Result<Self> {
        let text = strip_reference(text.trim());
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();

        if compact.is_empty() {
            return Err(CompatError::new("empty_annotation"));
        }

        let (path, args) = match compact.find('<') {
            Some(open) => {
                if !compact.ends_with('>') {
                    return Err(CompatError::new("malformed_annotation").push_str(compact.clone()));
                }
                let inner = &compact[open + 1..compact.len() - 1];
                (&compact[..open], split_top_level(inner)?)
            }
            None => (compact.as_str(), Vec::new()),
        };

        let name = path.rsplit("::").next().unwrap_or(path);
        if name.is_empty() || !name.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(CompatError::new("malformed_annotation").push_str(compact.clone()));
        }

        Ok(Self {
            name: name.to_string(),
            args,
        })
    }
}

fn strip_reference(text: &str) -> &str {
    let Some(rest) = text.strip_prefix('&') else {
        return text;
    };
    let rest = rest.trim_start();
    let rest = match rest.strip_prefix('\'') {
        Some(lifetime) => lifetime
            .find(char::is_whitespace)
            .map(|i| lifetime[i..].trim_start())
            .unwrap_or(""),
        None => rest,
    };
    rest.strip_prefix("mut ").map(str::trim_start).unwrap_or(rest)
}

fn split_top_level(inner: &str) -> Result<Vec<String>> {
    let mut args = Vec::new();
    let mut depth = 0usize;
    let mut current = String::new();

    for c in inner.chars() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| CompatError::new("malformed_annotation").push_str(inner.to_string()))?;
            }
            ',' if depth == 0 => {
                args.push(std::mem::take(&mut current));
                continue;
            }
            _ => {}
        }
        current.push(c);
    }

    if depth != 0 {
        return Err(CompatError::new("malformed_annotation").push_str(inner.to_string()));
    }
    if !current.is_empty() {
        args.push(current);
    }
    Ok(args)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(hint: &str) -> Result<OptionDescriptor> {
        resolve(hint, &Namespace::new(), &Namespace::new())
    }

    #[test]
    fn primitives() {
        assert_eq!(bare("i64").unwrap().kind, Some(OptionType::Integer));
        assert_eq!(bare("f32").unwrap().kind, Some(OptionType::Number));
        assert_eq!(bare("bool").unwrap().kind, Some(OptionType::Boolean));
        assert_eq!(bare("& 'static str").unwrap().kind, Some(OptionType::String));
        assert_eq!(bare("std::string::String").unwrap().kind, Some(OptionType::String));
    }

    #[test]
    fn option_unwraps_to_inner() {
        assert_eq!(bare("Option < u32 >").unwrap().kind, Some(OptionType::Integer));
    }

    #[test]
    fn range_reads_bounds() {
        let f = bare("Range<1, 10>").unwrap();
        assert_eq!(f.kind, Some(OptionType::Integer));
        assert_eq!(f.min_value, Some(1.0));
        assert_eq!(f.max_value, Some(10.0));

        let f = bare("Range<f64, 0, 2.5>").unwrap();
        assert_eq!(f.kind, Some(OptionType::Number));
        assert_eq!(f.max_value, Some(2.5));
    }

    #[test]
    fn only_range_hints_name_a_range() {
        let mut global = Namespace::new();
        global.alias("Dice", "Option<Range<1, 6>>").alias("Ratio", "f64");
        let none = Namespace::new();

        let dice = resolve_range("Dice", &global, &none).unwrap();
        assert_eq!((dice.min_value(), dice.max_value()), (1.0, 6.0));
        assert!(resolve_range("Ratio", &global, &none).is_none());
        assert!(resolve_range("i64", &global, &none).is_none());
        assert!(resolve_range("Range<5, 1>", &global, &none).is_none());
    }

    #[test]
    fn thread_has_channel_filter() {
        let f = bare("Thread").unwrap();
        assert_eq!(f.kind, Some(OptionType::Channel));
        assert_eq!(f.channel_types.unwrap().len(), 3);
    }

    #[test]
    fn unknown_hints_fail() {
        assert_eq!(bare("Vec<String>").unwrap_err().key, "unsupported_annotation");
        assert_eq!(bare("Widget").unwrap_err().key, "unsupported_annotation");
        assert!(bare("Range<10, 1>").is_err());
        assert!(bare("HashMap<String").is_err());
    }

    #[test]
    fn local_shadows_global() {
        let mut global = Namespace::new();
        global.alias("Amount", "f64");
        let mut local = Namespace::new();
        local.alias("Amount", "Range<1, 5>");

        let f = resolve("Amount", &global, &local).unwrap();
        assert_eq!(f.kind, Some(OptionType::Integer));
        assert_eq!(f.max_value, Some(5.0));

        let f = resolve("Amount", &global, &Namespace::new()).unwrap();
        assert_eq!(f.kind, Some(OptionType::Number));
    }

    #[test]
    fn forward_alias_chain_and_cycle() {
        let mut global = Namespace::new();
        global.alias("A", "B").alias("B", "Option<Count>").alias("Count", "u8");
        assert_eq!(
            resolve("A", &global, &Namespace::new()).unwrap().kind,
            Some(OptionType::Integer)
        );

        global.alias("Loop", "Loop");
        assert_eq!(
            resolve("Loop", &global, &Namespace::new()).unwrap_err().key,
            "annotation_cycle"
        );
    }

    #[test]
    fn choice_bindings() {
        let mut global = Namespace::new();
        global.choices("Color", ["red", "blue"]);
        let f = resolve("Color", &global, &Namespace::new()).unwrap();
        assert_eq!(f.kind, Some(OptionType::String));
        assert_eq!(f.choices.unwrap().len(), 2);
    }
}
