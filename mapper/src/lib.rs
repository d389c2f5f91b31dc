//! # Mapper
//!
//! A convention-based object-to-object mapping engine.
//!
//! Types describe their members with the [`mappable!`] macro. Mapping rules
//! for ordered (source, destination) type pairs are registered on a
//! [`ConfigurationStore`], usually grouped into [`Profile`]s. A [`Mapper`]
//! seals the store, compiles one plan per pair on first use and runs it.
//!
//! ```ignore
//! let mut store = ConfigurationStore::new();
//! store
//!     .register_pair::<User, UserDto>()?
//!     .map_from("full_name", |u: &User| format!("{} {}", u.first_name, u.last_name));
//! let mapper = Mapper::new(store)?;
//! let dto: UserDto = mapper.map(&user)?;
//! ```
//!
//! ## Modules
//!
//! - [`descriptor`]: member descriptors and the type registry
//! - [`store`]: pair registration, sealing and validation
//! - [`plan`]: plan compilation and caching
//! - [`executor`]: plan execution over `serde_json::Value` trees
//! - [`adapters`]: resolvers, converters, expressions, conditions, hooks
//! - [`converters`]: standard chrono and uuid converters

pub mod adapters;
pub mod config;
pub mod context;
pub mod converters;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod executor;
pub mod naming;
pub mod plan;
pub mod profile;
pub mod store;

#[cfg(test)]
mod test_utils;

pub use adapters::{TypeConverter, ValueResolver};
pub use config::MapperConfig;
pub use context::MappingContext;
pub use descriptor::{
    Mappable, MemberDescriptor, Semantic, SemanticType, TypeDescriptor, TypeKey, TypeRegistry,
};
pub use engine::Mapper;
pub use error::{MappingError, Result};
pub use plan::{CompiledPlan, PlanCompiler};
pub use profile::Profile;
pub use store::validation::{IssueKind, ValidationIssue, ValidationReport};
pub use store::{ConfigurationStore, MemberOptions, PairKey, TypePairBuilder};
