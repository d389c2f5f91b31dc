//! Per-pair configuration record.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::adapters::DynHook;
use crate::descriptor::{Mappable, ObjectType};
use crate::naming;
use crate::store::rule::{FillStrategy, MappingRule, MemberPath};
use crate::store::PairKey;

/// Allocates a fresh destination instance as a `Value` tree.
#[derive(Clone, Copy)]
pub struct DestinationFactory {
    type_name: &'static str,
    create: fn() -> Result<Value, serde_json::Error>,
}

fn new_destination<D: Serialize + Default>() -> Result<Value, serde_json::Error> {
    serde_json::to_value(D::default())
}

impl DestinationFactory {
    pub fn of<D: Serialize + Default + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<D>(),
            create: new_destination::<D>,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn create(&self) -> Result<Value, serde_json::Error> {
        (self.create)()
    }
}

impl fmt::Debug for DestinationFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DestinationFactory({})", self.type_name)
    }
}

/// Everything registered for one ordered type pair.
#[derive(Debug, Clone)]
pub struct TypePairConfig {
    key: PairKey,
    source: ObjectType,
    destination: ObjectType,
    rules: Vec<MappingRule>,
    base: Option<PairKey>,
    before: Option<Arc<dyn DynHook>>,
    after: Option<Arc<dyn DynHook>>,
    bidirectional: bool,
    factory: DestinationFactory,
    reverse_factory: Option<DestinationFactory>,
}

impl TypePairConfig {
    pub(crate) fn new<S: Mappable, D: Mappable + Default>() -> Self {
        Self::from_parts(
            ObjectType::of::<S>(),
            ObjectType::of::<D>(),
            DestinationFactory::of::<D>(),
        )
    }

    fn from_parts(
        source: ObjectType,
        destination: ObjectType,
        factory: DestinationFactory,
    ) -> Self {
        Self {
            key: PairKey::new(source.key(), destination.key()),
            source,
            destination,
            rules: Vec::new(),
            base: None,
            before: None,
            after: None,
            bidirectional: false,
            factory,
            reverse_factory: None,
        }
    }

    pub fn key(&self) -> PairKey {
        self.key
    }

    pub fn source(&self) -> &ObjectType {
        &self.source
    }

    pub fn destination(&self) -> &ObjectType {
        &self.destination
    }

    /// Rules in registration order
    pub fn rules(&self) -> &[MappingRule] {
        &self.rules
    }

    /// The effective rule for a destination member: the last one registered
    pub fn rule_for(&self, member: &str) -> Option<&MappingRule> {
        self.rules
            .iter()
            .rev()
            .find(|rule| naming::names_match(rule.member(), member))
    }

    pub fn base(&self) -> Option<PairKey> {
        self.base
    }

    pub fn before(&self) -> Option<&Arc<dyn DynHook>> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&Arc<dyn DynHook>> {
        self.after.as_ref()
    }

    pub fn is_bidirectional(&self) -> bool {
        self.bidirectional
    }

    pub fn factory(&self) -> DestinationFactory {
        self.factory
    }

    pub(crate) fn push_rule(&mut self, rule: MappingRule) {
        self.rules.push(rule);
    }

    pub(crate) fn prepend_rules(&mut self, mut rules: Vec<MappingRule>) {
        rules.append(&mut self.rules);
        self.rules = rules;
    }

    pub(crate) fn set_base(&mut self, base: PairKey) {
        self.base = Some(base);
    }

    pub(crate) fn set_before(&mut self, hook: Arc<dyn DynHook>) {
        self.before = Some(hook);
    }

    pub(crate) fn set_after(&mut self, hook: Arc<dyn DynHook>) {
        self.after = Some(hook);
    }

    pub(crate) fn set_reverse(&mut self, factory: DestinationFactory) {
        self.bidirectional = true;
        self.reverse_factory = Some(factory);
    }

    /// Build the mirrored pair and the mirror of every reversible
    /// single-member rule. Returns `None` once taken or if not bidirectional.
    pub(crate) fn take_reverse(&mut self) -> Option<(TypePairConfig, Vec<MappingRule>)> {
        let factory = self.reverse_factory.take()?;
        let reverse = Self::from_parts(self.destination, self.source, factory);

        let mut mirrored: Vec<MappingRule> = Vec::new();
        for (position, rule) in self.rules.iter().enumerate() {
            if !rule.is_reversible() {
                continue;
            }
            // Shadowed rules are not the effective configuration.
            let shadowed = self.rules[position + 1..]
                .iter()
                .any(|later| naming::names_match(later.member(), rule.member()));
            if shadowed {
                continue;
            }
            if let FillStrategy::FromMember(path) = rule.strategy() {
                if let Some(source_member) = path.single() {
                    mirrored.push(MappingRule::new(
                        source_member,
                        FillStrategy::FromMember(MemberPath::parse(rule.member())),
                    ));
                }
            }
        }
        Some((reverse, mirrored))
    }
}
