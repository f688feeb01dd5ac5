mod catalog;
mod filters;
mod library;
mod proxy;

pub use catalog::{Classifications, LibraryDescriptor, ResourceDescriptor};
pub use filters::{AdvancedFilter, FilterOperator, FilterRule};
pub use library::{ResourceType, ValidationError, VirtualLibrary};
pub use proxy::ProxyConfig;

use serde::{Deserialize, Deserializer};

/// Treat an explicit `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// True when an optional text field is absent or empty.
pub(crate) fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, str::is_empty)
}
