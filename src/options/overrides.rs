use serde_json::Value;

use super::descriptor::{ChannelType, Choice, OptionDescriptor, OptionType};
use crate::error::{CompatError, Result};

/// Explicit, partial patch for an inferred option.
///
/// Only the fields that were set are copied onto the stored descriptor.
#[derive(Debug, Clone, Default)]
pub struct OptionOverride {
    kind: Option<OptionType>,
    name: Option<String>,
    description: Option<String>,
    required: Option<bool>,
    optional: Option<bool>,
    choices: Option<Vec<Choice>>,
    channel_types: Option<Vec<ChannelType>>,
    min_value: Option<f64>,
    max_value: Option<f64>,
    default: Option<Value>,
}

impl OptionOverride {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: OptionType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    /// Inverse of [`required`](Self::required). Cannot be combined with it.
    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    pub fn choices<I, C>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Choice>,
    {
        self.choices = Some(choices.into_iter().map(Into::into).collect());
        self
    }

    pub fn channel_types(mut self, types: impl IntoIterator<Item = ChannelType>) -> Self {
        self.channel_types = Some(types.into_iter().collect());
        self
    }

    pub fn min_value(mut self, min: f64) -> Self {
        self.min_value = Some(min);
        self
    }

    pub fn max_value(mut self, max: f64) -> Self {
        self.max_value = Some(max);
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Build the transient descriptor, running the same validation inference goes through.
    pub fn into_descriptor(self) -> Result<OptionDescriptor> {
        let required = match (self.required, self.optional) {
            (Some(_), Some(_)) => {
                return Err(CompatError::new("conflicting_required_optional")
                    .push_str("`required` and `optional` cannot both be supplied"));
            }
            (Some(required), None) => Some(required),
            (None, Some(optional)) => Some(!optional),
            (None, None) => None,
        };

        let descriptor = OptionDescriptor {
            kind: self.kind,
            name: self.name,
            description: self.description,
            required,
            default: self.default,
            choices: self.choices,
            channel_types: self.channel_types,
            min_value: self.min_value,
            max_value: self.max_value,
        };
        descriptor.check_bounds()?;
        Ok(descriptor)
    }

    /// Validate and copy the set fields onto `target`.
    pub fn apply(self, target: &mut OptionDescriptor) -> Result<()> {
        let patch = self.into_descriptor()?;
        let mut patched = target.clone();
        patched.apply(&patch);
        patched.check_bounds()?;
        *target = patched;
        Ok(())
    }
}

/// Shortcut for an override that only sets the description.
pub fn describe(description: impl Into<String>) -> OptionOverride {
    OptionOverride::new().description(description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_fields_are_copied() {
        let mut target = OptionDescriptor {
            kind: Some(OptionType::Integer),
            required: Some(true),
            min_value: Some(0.0),
            ..Default::default()
        };
        let before = target.clone();

        describe("how many").apply(&mut target).unwrap();

        assert_eq!(target.description.as_deref(), Some("how many"));
        assert_eq!(target.kind, before.kind);
        assert_eq!(target.required, before.required);
        assert_eq!(target.min_value, before.min_value);
    }

    #[test]
    fn required_and_optional_are_exclusive() {
        for _ in 0..3 {
            let err = OptionOverride::new()
                .required(true)
                .optional(false)
                .into_descriptor()
                .unwrap_err();
            assert_eq!(err.key, "conflicting_required_optional");
        }
    }

    #[test]
    fn optional_inverts_required() {
        let d = OptionOverride::new().optional(true).into_descriptor().unwrap();
        assert_eq!(d.required, Some(false));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = OptionOverride::new()
            .min_value(10.0)
            .max_value(1.0)
            .into_descriptor()
            .unwrap_err();
        assert_eq!(err.key, "invalid_bounds");
    }

    #[test]
    fn bound_crossing_an_inferred_bound_is_rejected() {
        let mut target = OptionDescriptor {
            min_value: Some(5.0),
            ..Default::default()
        };
        let err = OptionOverride::new().max_value(1.0).apply(&mut target).unwrap_err();
        assert_eq!(err.key, "invalid_bounds");
        assert_eq!(target.max_value, None);
    }

    #[test]
    fn choices_accept_plain_strings() {
        let d = OptionOverride::new()
            .choices(["red", "green"])
            .into_descriptor()
            .unwrap();
        let choices = d.choices.unwrap();
        assert_eq!(choices[1], Choice::new("green", "green"));
    }
}
