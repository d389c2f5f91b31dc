//! Mapper configuration.

use serde::{Deserialize, Serialize};

use crate::error::{MappingError, Result};

/// Configuration for [`Mapper`](crate::Mapper)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Fail construction when validation reports any issue
    pub strict_validation: bool,
    /// Validate every pair when the mapper is built
    pub validate_on_build: bool,
    /// Maximum nesting of object mappings within one call
    pub max_depth: usize,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            strict_validation: false,
            validate_on_build: true,
            max_depth: 32,
        }
    }
}

impl MapperConfig {
    /// Strict configuration: every validation issue is fatal
    pub fn strict() -> Self {
        Self {
            strict_validation: true,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|source| MappingError::InvalidConfig { source })
    }
}
