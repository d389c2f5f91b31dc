//! # Custom Logic Adapters
//!
//! Pluggable capabilities attached to a type pair: value resolvers, type
//! converters, member expressions, conditions and before/after hooks.
//!
//! Callers implement the typed traits ([`ValueResolver`], [`TypeConverter`])
//! or pass closures. The adapters in this module erase those types so the
//! executor can invoke them on `Value` trees: arguments are decoded into
//! the caller's types with serde and results are encoded back.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::context::MappingContext;
use crate::descriptor::{Semantic, SemanticType};
use crate::error::BoxError;

/// Computes the value of one destination member.
///
/// Failures are surfaced to the caller as
/// [`MappingError::ResolverExecution`](crate::MappingError::ResolverExecution);
/// the engine never substitutes a default for a failed resolver.
pub trait ValueResolver<S, D>: Send + Sync {
    type Output: Serialize;

    fn resolve(
        &self,
        source: &S,
        destination: &D,
        member: &str,
        context: &MappingContext,
    ) -> anyhow::Result<Self::Output>;
}

/// Converts a value of one type into another, reusable across members.
pub trait TypeConverter<S, D>: Send + Sync {
    fn convert(&self, source: S, context: &MappingContext) -> anyhow::Result<D>;
}

/// Failure inside an adapter, before it is attributed to a member.
#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("value could not be represented as `{type_name}`")]
    Serialization {
        type_name: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Failed(#[from] anyhow::Error),
}

impl AdapterError {
    /// The underlying cause, unwrapped from capability failures
    pub fn into_source(self) -> BoxError {
        match self {
            AdapterError::Failed(error) => error.into(),
            other => Box::new(other),
        }
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, AdapterError> {
    T::deserialize(value).map_err(|source| AdapterError::Serialization {
        type_name: std::any::type_name::<T>(),
        source,
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Value, AdapterError> {
    serde_json::to_value(value).map_err(|source| AdapterError::Serialization {
        type_name: std::any::type_name::<T>(),
        source,
    })
}

// ============================================================================
// Type-erased capabilities
// ============================================================================

pub trait DynExpression: Send + Sync {
    fn evaluate(
        &self,
        source: &Value,
        destination: &Value,
        context: &MappingContext,
    ) -> Result<Value, AdapterError>;
}

pub trait DynResolver: Send + Sync {
    fn resolve(
        &self,
        source: &Value,
        destination: &Value,
        member: &str,
        context: &MappingContext,
    ) -> Result<Value, AdapterError>;

    fn type_name(&self) -> &'static str;
}

pub trait DynConverter: Send + Sync {
    fn convert(&self, value: &Value, context: &MappingContext) -> Result<Value, AdapterError>;
}

pub trait DynCondition: Send + Sync {
    fn test(&self, source: &Value) -> Result<bool, AdapterError>;
}

pub trait DynHook: Send + Sync {
    fn call(
        &self,
        source: &Value,
        destination: &mut Value,
        context: &MappingContext,
    ) -> Result<(), AdapterError>;
}

impl fmt::Debug for dyn DynExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Expression")
    }
}

impl fmt::Debug for dyn DynResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.type_name())
    }
}

impl fmt::Debug for dyn DynConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Converter")
    }
}

impl fmt::Debug for dyn DynCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Condition")
    }
}

impl fmt::Debug for dyn DynHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Hook")
    }
}

// ============================================================================
// Closure and trait adapters
// ============================================================================

/// `Fn(&S) -> T` expression
pub(crate) struct FnExpression<S, T, F> {
    f: F,
    _types: PhantomData<fn(&S) -> T>,
}

impl<S, T, F> FnExpression<S, T, F> {
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }
}

impl<S, T, F> DynExpression for FnExpression<S, T, F>
where
    S: DeserializeOwned,
    T: Serialize,
    F: Fn(&S) -> T + Send + Sync,
{
    fn evaluate(
        &self,
        source: &Value,
        _destination: &Value,
        _context: &MappingContext,
    ) -> Result<Value, AdapterError> {
        let source: S = decode(source)?;
        encode(&(self.f)(&source))
    }
}

/// `Fn(&S, &D, &MappingContext) -> T` expression
pub(crate) struct FnExpressionWith<S, D, T, F> {
    f: F,
    _types: PhantomData<fn(&S, &D) -> T>,
}

impl<S, D, T, F> FnExpressionWith<S, D, T, F> {
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }
}

impl<S, D, T, F> DynExpression for FnExpressionWith<S, D, T, F>
where
    S: DeserializeOwned,
    D: DeserializeOwned,
    T: Serialize,
    F: Fn(&S, &D, &MappingContext) -> T + Send + Sync,
{
    fn evaluate(
        &self,
        source: &Value,
        destination: &Value,
        context: &MappingContext,
    ) -> Result<Value, AdapterError> {
        let source: S = decode(source)?;
        let destination: D = decode(destination)?;
        encode(&(self.f)(&source, &destination, context))
    }
}

pub(crate) struct FnCondition<S, F> {
    f: F,
    _types: PhantomData<fn(&S) -> bool>,
}

impl<S, F> FnCondition<S, F> {
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }
}

impl<S, F> DynCondition for FnCondition<S, F>
where
    S: DeserializeOwned,
    F: Fn(&S) -> bool + Send + Sync,
{
    fn test(&self, source: &Value) -> Result<bool, AdapterError> {
        let source: S = decode(source)?;
        Ok((self.f)(&source))
    }
}

/// `Fn(&S, &mut D)` hook; changes to the destination are kept
pub(crate) struct FnHook<S, D, F> {
    f: F,
    _types: PhantomData<fn(&S, &mut D)>,
}

impl<S, D, F> FnHook<S, D, F> {
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }
}

impl<S, D, F> DynHook for FnHook<S, D, F>
where
    S: DeserializeOwned,
    D: Serialize + DeserializeOwned,
    F: Fn(&S, &mut D) + Send + Sync,
{
    fn call(
        &self,
        source: &Value,
        destination: &mut Value,
        _context: &MappingContext,
    ) -> Result<(), AdapterError> {
        let source: S = decode(source)?;
        let mut typed: D = decode(destination)?;
        (self.f)(&source, &mut typed);
        *destination = encode(&typed)?;
        Ok(())
    }
}

pub(crate) struct ResolverAdapter<S, D, R> {
    resolver: R,
    _types: PhantomData<fn(&S, &D)>,
}

impl<S, D, R> ResolverAdapter<S, D, R> {
    pub(crate) fn new(resolver: R) -> Self {
        Self {
            resolver,
            _types: PhantomData,
        }
    }
}

impl<S, D, R> DynResolver for ResolverAdapter<S, D, R>
where
    S: DeserializeOwned,
    D: DeserializeOwned,
    R: ValueResolver<S, D>,
{
    fn resolve(
        &self,
        source: &Value,
        destination: &Value,
        member: &str,
        context: &MappingContext,
    ) -> Result<Value, AdapterError> {
        let source: S = decode(source)?;
        let destination: D = decode(destination)?;
        let resolved = self.resolver.resolve(&source, &destination, member, context)?;
        encode(&resolved)
    }

    fn type_name(&self) -> &'static str {
        std::any::type_name::<R>()
    }
}

pub(crate) struct ConverterAdapter<S, D, C> {
    converter: C,
    _types: PhantomData<fn(S) -> D>,
}

impl<S, D, C> ConverterAdapter<S, D, C> {
    pub(crate) fn new(converter: C) -> Self {
        Self {
            converter,
            _types: PhantomData,
        }
    }
}

impl<S, D, C> DynConverter for ConverterAdapter<S, D, C>
where
    S: DeserializeOwned,
    D: Serialize,
    C: TypeConverter<S, D>,
{
    fn convert(&self, value: &Value, context: &MappingContext) -> Result<Value, AdapterError> {
        let source: S = decode(value)?;
        let converted = self.converter.convert(source, context)?;
        encode(&converted)
    }
}

pub(crate) struct FnConverter<S, D, F> {
    f: F,
    _types: PhantomData<fn(S) -> D>,
}

impl<S, D, F> FnConverter<S, D, F> {
    pub(crate) fn new(f: F) -> Self {
        Self {
            f,
            _types: PhantomData,
        }
    }
}

impl<S, D, F> DynConverter for FnConverter<S, D, F>
where
    S: DeserializeOwned,
    D: Serialize,
    F: Fn(S) -> anyhow::Result<D> + Send + Sync,
{
    fn convert(&self, value: &Value, _context: &MappingContext) -> Result<Value, AdapterError> {
        let source: S = decode(value)?;
        let converted = (self.f)(source)?;
        encode(&converted)
    }
}

/// A converter bound to an exact (source, destination) semantic type pair.
#[derive(Clone)]
pub struct ConverterBinding {
    source: SemanticType,
    destination: SemanticType,
    converter: Arc<dyn DynConverter>,
}

impl ConverterBinding {
    pub(crate) fn new<S, D>(converter: impl DynConverter + 'static) -> Self
    where
        S: Semantic,
        D: Semantic,
    {
        Self {
            source: S::semantic_type(),
            destination: D::semantic_type(),
            converter: Arc::new(converter),
        }
    }

    pub fn source(&self) -> &SemanticType {
        &self.source
    }

    pub fn destination(&self) -> &SemanticType {
        &self.destination
    }

    pub fn convert(&self, value: &Value, context: &MappingContext) -> Result<Value, AdapterError> {
        self.converter.convert(value, context)
    }
}

impl fmt::Debug for ConverterBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConverterBinding({} -> {})", self.source, self.destination)
    }
}
