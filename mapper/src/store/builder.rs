//! Fluent registration of one type pair's rules.

use std::marker::PhantomData;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::adapters::{
    FnCondition, FnExpression, FnExpressionWith, FnHook, ResolverAdapter, ValueResolver,
};
use crate::context::MappingContext;
use crate::descriptor::Mappable;
use crate::store::pair::{DestinationFactory, TypePairConfig};
use crate::store::rule::{FillStrategy, MappingRule, MemberPath};
use crate::store::PairKey;

/// Options for a single destination member, used with
/// [`TypePairBuilder::for_member`].
pub struct MemberOptions<S, D> {
    rule: MappingRule,
    _types: PhantomData<fn() -> (S, D)>,
}

impl<S: Mappable, D: Mappable> MemberOptions<S, D> {
    fn new(member: &str) -> Self {
        Self {
            rule: MappingRule::new(member, FillStrategy::Convention),
            _types: PhantomData,
        }
    }

    /// Fill from an expression over the source
    pub fn map_from<T, F>(mut self, expression: F) -> Self
    where
        T: Serialize + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        let expression = FnExpression::<S, T, F>::new(expression);
        self.rule
            .set_strategy(FillStrategy::Expression(Arc::new(expression)));
        self
    }

    /// Fill from an expression over the source, the destination built so far
    /// and the mapping context
    pub fn map_from_with<T, F>(mut self, expression: F) -> Self
    where
        T: Serialize + 'static,
        F: Fn(&S, &D, &MappingContext) -> T + Send + Sync + 'static,
    {
        let expression = FnExpressionWith::<S, D, T, F>::new(expression);
        self.rule
            .set_strategy(FillStrategy::Expression(Arc::new(expression)));
        self
    }

    /// Fill from a source member or dotted member path, e.g. `address.city`
    pub fn map_from_member(mut self, path: &str) -> Self {
        self.rule
            .set_strategy(FillStrategy::FromMember(MemberPath::parse(path)));
        self
    }

    pub fn resolve_using<R>(mut self, resolver: R) -> Self
    where
        R: ValueResolver<S, D> + 'static,
    {
        let resolver = ResolverAdapter::<S, D, R>::new(resolver);
        self.rule
            .set_strategy(FillStrategy::Resolver(Arc::new(resolver)));
        self
    }

    /// Always fill with a fixed value
    pub fn use_value(mut self, value: impl Into<Value>) -> Self {
        self.rule.set_strategy(FillStrategy::Constant(value.into()));
        self
    }

    /// Only fill when the predicate holds for the source; otherwise the
    /// member keeps whatever value it had
    pub fn condition<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.rule
            .set_condition(Arc::new(FnCondition::<S, F>::new(predicate)));
        self
    }

    /// Value used when the source value is absent or null
    pub fn null_substitute(mut self, value: impl Into<Value>) -> Self {
        self.rule.set_null_substitute(value.into());
        self
    }

    pub fn ignore(mut self) -> Self {
        self.rule.set_strategy(FillStrategy::Ignore);
        self
    }

    /// Mirror this rule onto the reverse pair. Only single member
    /// redirections (`map_from_member("name")`) can be mirrored.
    pub fn reversible(mut self) -> Self {
        self.rule.set_reversible();
        self
    }
}

/// Registers rules for the pair `S -> D`.
///
/// Every method appends a rule; a later rule for the same destination member
/// shadows an earlier one.
pub struct TypePairBuilder<'a, S, D> {
    config: &'a mut TypePairConfig,
    _types: PhantomData<fn() -> (S, D)>,
}

impl<'a, S: Mappable, D: Mappable> TypePairBuilder<'a, S, D> {
    pub(crate) fn new(config: &'a mut TypePairConfig) -> Self {
        Self {
            config,
            _types: PhantomData,
        }
    }

    pub fn key(&self) -> PairKey {
        self.config.key()
    }

    /// Configure one destination member
    pub fn for_member<F>(self, member: &str, configure: F) -> Self
    where
        F: FnOnce(MemberOptions<S, D>) -> MemberOptions<S, D>,
    {
        let options = configure(MemberOptions::new(member));
        self.config.push_rule(options.rule);
        self
    }

    pub fn map_from<T, F>(self, member: &str, expression: F) -> Self
    where
        T: Serialize + 'static,
        F: Fn(&S) -> T + Send + Sync + 'static,
    {
        self.for_member(member, |opt| opt.map_from(expression))
    }

    pub fn map_from_with<T, F>(self, member: &str, expression: F) -> Self
    where
        T: Serialize + 'static,
        F: Fn(&S, &D, &MappingContext) -> T + Send + Sync + 'static,
    {
        self.for_member(member, |opt| opt.map_from_with(expression))
    }

    pub fn map_from_member(self, member: &str, path: &str) -> Self {
        self.for_member(member, |opt| opt.map_from_member(path))
    }

    pub fn resolve_using<R>(self, member: &str, resolver: R) -> Self
    where
        R: ValueResolver<S, D> + 'static,
    {
        self.for_member(member, |opt| opt.resolve_using(resolver))
    }

    pub fn use_value(self, member: &str, value: impl Into<Value>) -> Self {
        self.for_member(member, |opt| opt.use_value(value))
    }

    /// Conventional fill, applied only when the predicate holds
    pub fn condition<F>(self, member: &str, predicate: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        self.for_member(member, |opt| opt.condition(predicate))
    }

    pub fn ignore(self, member: &str) -> Self {
        self.for_member(member, MemberOptions::ignore)
    }

    /// Hook run on a destination before any member is filled
    pub fn before<F>(self, hook: F) -> Self
    where
        F: Fn(&S, &mut D) + Send + Sync + 'static,
    {
        self.config
            .set_before(Arc::new(FnHook::<S, D, F>::new(hook)));
        self
    }

    /// Hook run on a destination after every member is filled
    pub fn after<F>(self, hook: F) -> Self
    where
        F: Fn(&S, &mut D) + Send + Sync + 'static,
    {
        self.config
            .set_after(Arc::new(FnHook::<S, D, F>::new(hook)));
        self
    }

    /// Inherit the steps of the `BS -> BD` pair for members this pair does
    /// not configure itself. The base pair may be registered later.
    pub fn include_base<BS: Mappable, BD: Mappable>(self) -> Self {
        self.config.set_base(PairKey::of::<BS, BD>());
        self
    }
}

impl<'a, S: Mappable + Default, D: Mappable> TypePairBuilder<'a, S, D> {
    /// Also register `D -> S` by convention when the store is sealed.
    pub fn reverse(self) -> Self {
        self.config.set_reverse(DestinationFactory::of::<S>());
        self
    }
}
