use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumString};

use crate::error::{CompatError, Result};

/// https://discord.com/developers/docs/interactions/application-commands#application-command-object-application-command-option-type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OptionType {
    String,
    Integer,
    Number,
    Boolean,
    User,
    Channel,
    Role,
    Mentionable,
    Attachment,
}

impl OptionType {
    pub fn code(&self) -> u8 {
        match self {
            Self::String => 3,
            Self::Integer => 4,
            Self::Boolean => 5,
            Self::User => 6,
            Self::Channel => 7,
            Self::Role => 8,
            Self::Mentionable => 9,
            Self::Number => 10,
            Self::Attachment => 11,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Number)
    }
}

/// https://discord.com/developers/docs/resources/channel#channel-object-channel-types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, AsRefStr, EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ChannelType {
    Text,
    Dm,
    Voice,
    GroupDm,
    Category,
    News,
    NewsThread,
    PublicThread,
    PrivateThread,
    StageVoice,
    Forum,
}

impl ChannelType {
    pub fn code(&self) -> u8 {
        match self {
            Self::Text => 0,
            Self::Dm => 1,
            Self::Voice => 2,
            Self::GroupDm => 3,
            Self::Category => 4,
            Self::News => 5,
            Self::NewsThread => 10,
            Self::PublicThread => 11,
            Self::PrivateThread => 12,
            Self::StageVoice => 13,
            Self::Forum => 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub name: String,
    pub value: Value,
}

impl Choice {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl From<&str> for Choice {
    fn from(s: &str) -> Self {
        Self::new(s, s)
    }
}

impl From<(&str, i64)> for Choice {
    fn from((name, value): (&str, i64)) -> Self {
        Self::new(name, value)
    }
}

impl From<(&str, &str)> for Choice {
    fn from((name, value): (&str, &str)) -> Self {
        Self::new(name, value)
    }
}

/// Per-parameter option metadata. `None` means "not set yet".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptionDescriptor {
    pub kind: Option<OptionType>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub required: Option<bool>,
    pub default: Option<Value>,
    pub choices: Option<Vec<Choice>>,
    pub channel_types: Option<Vec<ChannelType>>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

macro_rules! for_each_field {
    ($mac:ident, $dst:expr, $src:expr) => {
        $mac!($dst, $src, kind);
        $mac!($dst, $src, name);
        $mac!($dst, $src, description);
        $mac!($dst, $src, required);
        $mac!($dst, $src, default);
        $mac!($dst, $src, choices);
        $mac!($dst, $src, channel_types);
        $mac!($dst, $src, min_value);
        $mac!($dst, $src, max_value);
    };
}

macro_rules! overwrite {
    ($dst:expr, $src:expr, $field:ident) => {
        if let Some(v) = &$src.$field {
            $dst.$field = Some(v.clone());
        }
    };
}

macro_rules! fill {
    ($dst:expr, $src:expr, $field:ident) => {
        if $dst.$field.is_none() {
            $dst.$field = $src.$field.clone();
        }
    };
}

impl OptionDescriptor {
    /// Copy every field set on `other`, leaving the rest untouched.
    pub fn apply(&mut self, other: &OptionDescriptor) {
        for_each_field!(overwrite, self, other);
    }

    /// Copy fields from `other` only where this descriptor has none.
    pub fn fill(&mut self, other: &OptionDescriptor) {
        for_each_field!(fill, self, other);
    }

    /// Bounds ordering, shared by overrides and finalization.
    pub fn check_bounds(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min_value, self.max_value) {
            if min > max {
                return Err(CompatError::new("invalid_bounds")
                    .push_str(format!("min_value {} is greater than max_value {}", min, max)));
            }
        }
        Ok(())
    }

    /// Freeze into an immutable option. `param` is the legacy parameter this describes.
    pub fn finalize(&self, param: &str) -> Result<ApplicationOption> {
        let description = match self.description.as_deref() {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => {
                return Err(CompatError::new("missing_option_description")
                    .push_str(format!("option for parameter {:?} has no description", param)));
            }
        };

        self.check_bounds()?;

        let kind = self.kind.unwrap_or(OptionType::String);

        if self.channel_types.is_some() && kind != OptionType::Channel {
            return Err(CompatError::new("channel_types_on_non_channel")
                .push_str(format!("parameter {:?} is a {} option", param, kind)));
        }
        if (self.min_value.is_some() || self.max_value.is_some()) && !kind.is_numeric() {
            return Err(CompatError::new("bounds_on_non_numeric")
                .push_str(format!("parameter {:?} is a {} option", param, kind)));
        }

        let required = self.required.unwrap_or(false);

        Ok(ApplicationOption {
            param: param.to_string(),
            kind,
            name: self.name.clone().unwrap_or_else(|| param.to_string()),
            description,
            required,
            default: if required {
                None
            } else {
                self.default.clone()
            },
            choices: self.choices.clone().unwrap_or_default(),
            channel_types: self.channel_types.clone().unwrap_or_default(),
            min_value: self.min_value,
            max_value: self.max_value,
        })
    }
}

/// A finalized option, part of a registered schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplicationOption {
    /// Legacy parameter name; identity of the option.
    pub param: String,
    pub kind: OptionType,
    /// Presentation name shown to users.
    pub name: String,
    pub description: String,
    pub required: bool,
    pub default: Option<Value>,
    pub choices: Vec<Choice>,
    pub channel_types: Vec<ChannelType>,
    pub min_value: Option<f64>,
    pub max_value: Option<f64>,
}

impl ApplicationOption {
    /// https://discord.com/developers/docs/interactions/application-commands#application-command-object-application-command-option-structure
    pub fn payload(&self) -> Value {
        let mut body = json!({
            "type": self.kind.code(),
            "name": self.name,
            "description": self.description,
            "required": self.required,
        });

        if !self.choices.is_empty() {
            body["choices"] = json!(self.choices);
        }
        if !self.channel_types.is_empty() {
            body["channel_types"] =
                json!(self.channel_types.iter().map(ChannelType::code).collect::<Vec<_>>());
        }
        if let Some(min) = self.min_value {
            body["min_value"] = numeric(self.kind, min);
        }
        if let Some(max) = self.max_value {
            body["max_value"] = numeric(self.kind, max);
        }
        body
    }
}

fn numeric(kind: OptionType, value: f64) -> Value {
    if kind == OptionType::Integer && value.fract() == 0.0 {
        json!(value as i64)
    } else {
        json!(value)
    }
}
