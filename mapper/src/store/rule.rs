//! Mapping rules: how one destination member is filled.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::adapters::{DynCondition, DynExpression, DynResolver};

/// A dotted path of source members, e.g. `category.name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberPath(Vec<String>);

impl MemberPath {
    pub fn parse(path: &str) -> Self {
        Self(
            path.split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn from_segments(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// The only segment of a one-member path
    pub fn single(&self) -> Option<&str> {
        match self.0.as_slice() {
            [only] => Some(only.as_str()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Follow the path through a `Value` tree. `None` if any step is
    /// missing or null.
    pub fn read<'v>(&self, root: &'v Value) -> Option<&'v Value> {
        let mut current = root;
        for segment in &self.0 {
            current = current.as_object()?.get(segment)?;
            if current.is_null() {
                return None;
            }
        }
        Some(current)
    }
}

impl fmt::Display for MemberPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Where a destination member's value comes from.
#[derive(Clone)]
pub enum FillStrategy {
    /// Same-named source member (or flattened chain); the default
    Convention,
    FromMember(MemberPath),
    Expression(Arc<dyn DynExpression>),
    Resolver(Arc<dyn DynResolver>),
    Constant(Value),
    Ignore,
}

impl FillStrategy {
    /// Only plain single-member redirections have an obvious inverse
    pub fn is_mirrorable(&self) -> bool {
        matches!(self, FillStrategy::FromMember(path) if path.single().is_some())
    }
}

impl fmt::Debug for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FillStrategy::Convention => f.write_str("Convention"),
            FillStrategy::FromMember(path) => write!(f, "FromMember({})", path),
            FillStrategy::Expression(_) => f.write_str("Expression"),
            FillStrategy::Resolver(resolver) => write!(f, "Resolver({:?})", resolver),
            FillStrategy::Constant(value) => write!(f, "Constant({})", value),
            FillStrategy::Ignore => f.write_str("Ignore"),
        }
    }
}

/// One declared destination member rule.
#[derive(Debug, Clone)]
pub struct MappingRule {
    member: String,
    strategy: FillStrategy,
    condition: Option<Arc<dyn DynCondition>>,
    null_substitute: Option<Value>,
    reversible: bool,
}

impl MappingRule {
    pub fn new(member: impl Into<String>, strategy: FillStrategy) -> Self {
        Self {
            member: member.into(),
            strategy,
            condition: None,
            null_substitute: None,
            reversible: false,
        }
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn strategy(&self) -> &FillStrategy {
        &self.strategy
    }

    pub fn condition(&self) -> Option<&Arc<dyn DynCondition>> {
        self.condition.as_ref()
    }

    pub fn null_substitute(&self) -> Option<&Value> {
        self.null_substitute.as_ref()
    }

    pub fn is_reversible(&self) -> bool {
        self.reversible
    }

    pub(crate) fn set_strategy(&mut self, strategy: FillStrategy) {
        self.strategy = strategy;
    }

    pub(crate) fn set_condition(&mut self, condition: Arc<dyn DynCondition>) {
        self.condition = Some(condition);
    }

    pub(crate) fn set_null_substitute(&mut self, value: Value) {
        self.null_substitute = Some(value);
    }

    pub(crate) fn set_reversible(&mut self) {
        self.reversible = true;
    }
}
