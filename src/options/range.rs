use async_trait::async_trait;
use serde_json::Value;

use super::descriptor::{OptionDescriptor, OptionType};
use crate::commands::convert::Converter;
use crate::context::Context;
use crate::error::{CommandError, CompatError, Result};

/// A bounded numeric option.
///
/// As a hint (`Range<1, 10>`) it contributes kind and bounds to the inferred option. On the
/// text path it converts a token, accepting integers only, even for `number` ranges.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    kind: OptionType,
    min_value: f64,
    max_value: f64,
}

impl Range {
    pub fn int(min_value: i64, max_value: i64) -> Result<Self> {
        Self::checked(OptionType::Integer, min_value as f64, max_value as f64)
    }

    pub fn number(min_value: f64, max_value: f64) -> Result<Self> {
        Self::checked(OptionType::Number, min_value, max_value)
    }

    fn checked(kind: OptionType, min_value: f64, max_value: f64) -> Result<Self> {
        if min_value.is_nan() || max_value.is_nan() || min_value > max_value {
            return Err(CompatError::new("invalid_bounds")
                .push_str(format!("min_value {} is greater than max_value {}", min_value, max_value)));
        }
        Ok(Self {
            kind,
            min_value,
            max_value,
        })
    }

    pub fn kind(&self) -> OptionType {
        self.kind
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn fragment(&self) -> OptionDescriptor {
        OptionDescriptor {
            kind: Some(self.kind),
            min_value: Some(self.min_value),
            max_value: Some(self.max_value),
            ..Default::default()
        }
    }

    /// Parse a text token.
    pub fn parse(&self, argument: &str) -> std::result::Result<i64, CommandError> {
        if let Ok(n) = argument.trim().parse::<i64>() {
            if self.min_value <= n as f64 && n as f64 <= self.max_value {
                return Ok(n);
            }
        }

        Err(CommandError::BadArgument {
            argument: argument.to_string(),
            expected: format!("a number between {} and {}", self.min_value, self.max_value),
        })
    }
}

#[async_trait]
impl Converter for Range {
    async fn convert(&self, _ctx: &Context, argument: &str) -> std::result::Result<Value, CommandError> {
        self.parse(argument).map(Value::from)
    }
}
