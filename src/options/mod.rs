pub mod annotation;
pub mod descriptor;
pub mod overrides;
pub mod range;
pub mod store;

pub use annotation::{Binding, Namespace};
pub use descriptor::{ApplicationOption, ChannelType, Choice, OptionDescriptor, OptionType};
pub use overrides::{OptionOverride, describe};
pub use range::Range;
pub use store::OptionStore;
