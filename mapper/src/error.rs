//! # Mapping Errors
//!
//! Every failure the engine can surface, from configuration problems found
//! while registering and sealing, to execution failures raised while a
//! mapping call runs. Configuration and execution errors are always
//! returned to the caller; the engine never swallows them.

use std::fmt;

use thiserror::Error;

use crate::descriptor::SemanticType;
use crate::store::validation::ValidationReport;
use crate::store::PairKey;

/// Boxed cause carried by errors that wrap a caller-supplied capability.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = MappingError> = std::result::Result<T, E>;

/// A base pair referenced through `include_base` that was never registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingBase {
    /// The pair that asked for the inclusion
    pub derived: PairKey,
    /// The base pair that could not be found
    pub base: PairKey,
}

impl fmt::Display for MissingBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (included by {})", self.base, self.derived)
    }
}

#[derive(Debug, Error)]
pub enum MappingError {
    #[error("type `{type_name}` exposes no accessible members")]
    Reflection { type_name: &'static str },

    #[error("mapping configuration is sealed; cannot register {registration}")]
    AlreadySealed { registration: String },

    #[error("included base mappings are not registered: {}", join(.missing, ", "))]
    UnresolvedBaseMapping { missing: Vec<MissingBase> },

    #[error("cyclic mapping detected: {}", join(.cycle, " => "))]
    CyclicMapping { cycle: Vec<PairKey> },

    #[error("member `{member}` of {pair} cannot be converted from {source_type} to {destination_type}")]
    UnconvertibleMember {
        pair: PairKey,
        member: String,
        source_type: SemanticType,
        destination_type: SemanticType,
    },

    #[error("source object for {pair} is absent")]
    NullSource { pair: PairKey },

    #[error("resolver for member `{member}` of {pair} failed")]
    ResolverExecution {
        pair: PairKey,
        member: String,
        #[source]
        source: BoxError,
    },

    #[error("converter for member `{member}` of {pair} failed")]
    ConverterExecution {
        pair: PairKey,
        member: String,
        #[source]
        source: BoxError,
    },

    #[error("no mapping registered for {pair}")]
    MissingMapping { pair: PairKey },

    #[error("maximum mapping depth {max_depth} exceeded while mapping {pair}")]
    MaxDepthExceeded { pair: PairKey, max_depth: usize },

    #[error("failed to convert `{type_name}` to or from its mapped representation")]
    Serialization {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("mapping configuration failed validation with {} issue(s)", .report.len())]
    ValidationFailed { report: ValidationReport },

    #[error("invalid mapper configuration")]
    InvalidConfig {
        #[source]
        source: serde_json::Error,
    },
}

fn join<T: fmt::Display>(items: &[T], separator: &str) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(separator)
}
