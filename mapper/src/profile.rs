//! Mapping profiles.

use crate::error::Result;
use crate::store::ConfigurationStore;

/// A named group of pair registrations, typically one per feature area.
///
/// Profiles are applied to a store with
/// [`ConfigurationStore::add_profile`] before the store is sealed.
pub trait Profile {
    fn name(&self) -> &str;

    fn configure(&self, store: &mut ConfigurationStore) -> Result<()>;
}
