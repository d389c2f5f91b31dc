//! # Mapping Configuration Store
//!
//! Holds every registered type pair, the converters bound to semantic type
//! pairs, and the sealed flag that closes the store to further registration.
//!
//! ## Key Responsibilities
//!
//! - **Registration**: begin or resume a pair's rule set through a
//!   [`TypePairBuilder`]; repeated registration of a pair merges rules
//! - **Sealing**: materialize reverse pairs, check that every included base
//!   pair exists, reject include cycles, then refuse further registration
//! - **Validation**: see [`validation`]
//!
//! The store is built single-threaded at startup and then shared read-only
//! behind an `Arc`; nothing in it is mutated once sealed.

pub mod builder;
pub mod pair;
pub mod rule;
pub mod validation;

use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::adapters::{ConverterAdapter, ConverterBinding, FnConverter, TypeConverter};
use crate::context::MappingContext;
use crate::descriptor::{Mappable, Semantic, SemanticType, TypeKey};
use crate::error::{MappingError, MissingBase, Result};
use crate::profile::Profile;

pub use builder::{MemberOptions, TypePairBuilder};
pub use pair::{DestinationFactory, TypePairConfig};
pub use rule::{FillStrategy, MappingRule, MemberPath};

/// Ordered (source type, destination type) identity of a mapping.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub source: TypeKey,
    pub destination: TypeKey,
}

impl PairKey {
    pub fn new(source: TypeKey, destination: TypeKey) -> Self {
        Self {
            source,
            destination,
        }
    }

    pub fn of<S: 'static, D: 'static>() -> Self {
        Self::new(TypeKey::of::<S>(), TypeKey::of::<D>())
    }

    /// The mirrored pair
    pub fn reversed(&self) -> Self {
        Self::new(self.destination, self.source)
    }
}

impl fmt::Debug for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

impl fmt::Display for PairKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination)
    }
}

#[derive(Debug, Default)]
pub struct ConfigurationStore {
    pairs: Vec<TypePairConfig>,
    index: HashMap<PairKey, usize>,
    converters: HashMap<(SemanticType, SemanticType), ConverterBinding>,
    sealed: bool,
}

impl ConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin or resume the rule set for the pair `S -> D`.
    ///
    /// Registering the same pair again appends to its existing rules, so a
    /// later rule for a member shadows an earlier one.
    pub fn register_pair<S, D>(&mut self) -> Result<TypePairBuilder<'_, S, D>>
    where
        S: Mappable,
        D: Mappable + Default,
    {
        let key = PairKey::of::<S, D>();
        self.ensure_open(|| format!("type pair {}", key))?;

        let index = match self.index.get(&key) {
            Some(&index) => {
                debug!(pair = %key, "Resuming type pair registration");
                index
            }
            None => self.insert_pair(TypePairConfig::new::<S, D>()),
        };
        Ok(TypePairBuilder::new(&mut self.pairs[index]))
    }

    /// Bind a converter to the exact semantic type pair `S -> D`.
    ///
    /// A later converter for the same type pair replaces the earlier one.
    pub fn add_converter<S, D, C>(&mut self, converter: C) -> Result<()>
    where
        S: Semantic + DeserializeOwned + 'static,
        D: Semantic + Serialize + 'static,
        C: TypeConverter<S, D> + 'static,
    {
        let binding = ConverterBinding::new::<S, D>(ConverterAdapter::<S, D, C>::new(converter));
        self.insert_converter(binding)
    }

    /// Bind a conversion closure to the exact semantic type pair `S -> D`.
    pub fn add_converter_fn<S, D, F>(&mut self, convert: F) -> Result<()>
    where
        S: Semantic + DeserializeOwned + 'static,
        D: Semantic + Serialize + 'static,
        F: Fn(S) -> anyhow::Result<D> + Send + Sync + 'static,
    {
        let binding = ConverterBinding::new::<S, D>(FnConverter::<S, D, F>::new(convert));
        self.insert_converter(binding)
    }

    /// Let a profile register its pairs and converters.
    pub fn add_profile(&mut self, profile: &dyn Profile) -> Result<()> {
        self.ensure_open(|| format!("profile `{}`", profile.name()))?;
        info!(profile = profile.name(), "Registering mapping profile");
        profile.configure(self)
    }

    /// Close the store to further registration.
    ///
    /// Materializes the mirrored pair of every bidirectional pair, then
    /// checks that every included base pair is registered and that base
    /// inclusion has no cycles. Sealing twice is a no-op.
    pub fn seal(&mut self) -> Result<()> {
        if self.sealed {
            return Ok(());
        }

        self.materialize_reverse_pairs();
        self.check_bases()?;
        self.check_include_cycles()?;

        self.sealed = true;
        info!(
            pairs = self.pairs.len(),
            converters = self.converters.len(),
            "Mapping configuration sealed"
        );
        Ok(())
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    pub fn pair(&self, key: &PairKey) -> Option<&TypePairConfig> {
        self.index.get(key).map(|&index| &self.pairs[index])
    }

    pub fn contains_pair(&self, key: &PairKey) -> bool {
        self.index.contains_key(key)
    }

    /// Registered pairs in registration order
    pub fn pairs(&self) -> impl Iterator<Item = &TypePairConfig> {
        self.pairs.iter()
    }

    pub fn converter(
        &self,
        source: &SemanticType,
        destination: &SemanticType,
    ) -> Option<&ConverterBinding> {
        self.converters.get(&(source.clone(), destination.clone()))
    }

    /// Run a registered converter outside of a mapping plan
    pub fn convert<S, D>(&self, value: S) -> Result<D>
    where
        S: Semantic + Serialize + 'static,
        D: Semantic + DeserializeOwned + 'static,
    {
        let key = PairKey::of::<S, D>();
        let binding = self
            .converter(&S::semantic_type(), &D::semantic_type())
            .ok_or(MappingError::MissingMapping { pair: key })?;
        let encoded = serde_json::to_value(&value).map_err(|source| MappingError::Serialization {
            type_name: std::any::type_name::<S>(),
            source,
        })?;
        let converted = binding
            .convert(&encoded, &MappingContext::new())
            .map_err(|source| MappingError::ConverterExecution {
                pair: key,
                member: String::new(),
                source: source.into_source(),
            })?;
        serde_json::from_value(converted).map_err(|source| MappingError::Serialization {
            type_name: std::any::type_name::<D>(),
            source,
        })
    }

    fn ensure_open(&self, registration: impl FnOnce() -> String) -> Result<()> {
        if self.sealed {
            return Err(MappingError::AlreadySealed {
                registration: registration(),
            });
        }
        Ok(())
    }

    fn insert_pair(&mut self, config: TypePairConfig) -> usize {
        let index = self.pairs.len();
        debug!(pair = %config.key(), "Registered type pair");
        self.index.insert(config.key(), index);
        self.pairs.push(config);
        index
    }

    fn insert_converter(&mut self, binding: ConverterBinding) -> Result<()> {
        let types = (binding.source().clone(), binding.destination().clone());
        self.ensure_open(|| format!("converter {} -> {}", types.0, types.1))?;
        if self.converters.insert(types.clone(), binding).is_some() {
            debug!(source = %types.0, destination = %types.1, "Replaced converter");
        }
        Ok(())
    }

    fn materialize_reverse_pairs(&mut self) {
        let mut mirrored = Vec::new();
        for config in &mut self.pairs {
            if let Some(reverse) = config.take_reverse() {
                mirrored.push(reverse);
            }
        }

        for (reverse, mirrored_rules) in mirrored {
            let key = reverse.key();
            match self.index.get(&key) {
                Some(&index) => {
                    // Explicit rules on the reverse pair were added later,
                    // so they shadow the mirrored ones.
                    self.pairs[index].prepend_rules(mirrored_rules);
                    debug!(pair = %key, "Merged mirrored rules into explicit reverse pair");
                }
                None => {
                    let mut reverse = reverse;
                    reverse.prepend_rules(mirrored_rules);
                    self.insert_pair(reverse);
                }
            }
        }

        for config in &self.pairs {
            for rule in config.rules() {
                if rule.is_reversible() && !rule.strategy().is_mirrorable() {
                    warn!(
                        pair = %config.key(),
                        member = rule.member(),
                        "Only single member redirections can be reversed; rule is not mirrored"
                    );
                }
            }
        }
    }

    fn check_bases(&self) -> Result<()> {
        let missing: Vec<MissingBase> = self
            .pairs
            .iter()
            .filter_map(|config| {
                let base = config.base()?;
                (!self.index.contains_key(&base)).then_some(MissingBase {
                    derived: config.key(),
                    base,
                })
            })
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(MappingError::UnresolvedBaseMapping { missing })
        }
    }

    /// Each pair has at most one base, so include chains are walked directly.
    fn check_include_cycles(&self) -> Result<()> {
        for config in &self.pairs {
            let mut chain = vec![config.key()];
            let mut seen: HashSet<PairKey> = chain.iter().copied().collect();
            let mut current = config.base();

            while let Some(base) = current {
                chain.push(base);
                if !seen.insert(base) {
                    let start = chain.iter().position(|k| *k == base).unwrap_or(0);
                    return Err(MappingError::CyclicMapping {
                        cycle: chain[start..].to_vec(),
                    });
                }
                current = self.pair(&base).and_then(TypePairConfig::base);
            }
        }
        Ok(())
    }
}
