use dashmap::DashMap;

use super::descriptor::OptionDescriptor;
use super::overrides::OptionOverride;
use crate::error::Result;

/// Option descriptors of one command, keyed by legacy parameter name.
#[derive(Debug, Default)]
pub struct OptionStore {
    descriptors: DashMap<String, OptionDescriptor>,
}

impl OptionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` on the descriptor for `param`, creating an unset one first if needed.
    pub fn with<R>(&self, param: &str, f: impl FnOnce(&mut OptionDescriptor) -> R) -> R {
        let mut entry = self.descriptors.entry(param.to_string()).or_default();
        f(entry.value_mut())
    }

    /// Snapshot of the descriptor for `param`, creating an unset one first if needed.
    pub fn get_or_create(&self, param: &str) -> OptionDescriptor {
        self.with(param, |d| d.clone())
    }

    pub fn get(&self, param: &str) -> Option<OptionDescriptor> {
        self.descriptors.get(param).map(|d| d.value().clone())
    }

    pub fn contains(&self, param: &str) -> bool {
        self.descriptors.contains_key(param)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Validate `option` and copy its set fields onto the descriptor for `param`.
    pub fn apply_override(&self, param: &str, option: OptionOverride) -> Result<()> {
        self.with(param, |current| option.apply(current))
    }
}
