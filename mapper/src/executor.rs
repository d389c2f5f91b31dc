//! # Mapping Executor
//!
//! Runs a [`CompiledPlan`] against a source `Value`, either into a freshly
//! allocated destination or into one supplied by the caller.
//!
//! ## Key Responsibilities
//!
//! - **Ordering**: before hook, fill steps in plan order, after hook
//! - **Null propagation**: an absent source value sets optional members to
//!   `null` and leaves required members untouched; a nested object is never
//!   replaced by an empty instance
//! - **Conditions**: a false condition leaves the member as it was
//! - **Nesting**: nested objects and sequence elements are mapped through
//!   their own compiled plans, bounded by the configured maximum depth
//! - **Failures**: resolver and converter errors abort the whole call

use serde_json::Value;
use tracing::{error, trace};

use crate::adapters::AdapterError;
use crate::context::MappingContext;
use crate::error::{BoxError, MappingError, Result};
use crate::plan::{CompiledPlan, FillStep, PlanCompiler, StepAction, Transform};
use crate::store::PairKey;

const BEFORE_HOOK: &str = "<before>";
const AFTER_HOOK: &str = "<after>";

/// Attribute an adapter failure: decoding problems stay serialization
/// errors, capability failures are wrapped by `wrap`.
fn attribute(error: AdapterError, wrap: impl FnOnce(BoxError) -> MappingError) -> MappingError {
    match error {
        AdapterError::Serialization { type_name, source } => {
            MappingError::Serialization { type_name, source }
        }
        failed => wrap(failed.into_source()),
    }
}

fn resolver_failure(pair: PairKey, member: &str) -> impl FnOnce(BoxError) -> MappingError + '_ {
    move |source| MappingError::ResolverExecution {
        pair,
        member: member.to_string(),
        source,
    }
}

pub struct Executor<'a> {
    compiler: &'a PlanCompiler,
    max_depth: usize,
}

impl<'a> Executor<'a> {
    pub fn new(compiler: &'a PlanCompiler, max_depth: usize) -> Self {
        Self {
            compiler,
            max_depth,
        }
    }

    /// Map `source` into a new destination allocated by the plan's factory.
    pub fn map(
        &self,
        plan: &CompiledPlan,
        source: &Value,
        context: &mut MappingContext,
    ) -> Result<Value> {
        if source.is_null() {
            return Err(MappingError::NullSource { pair: plan.key() });
        }
        let mut destination = self.allocate(plan)?;
        self.run(plan, source, &mut destination, context)?;
        Ok(destination)
    }

    /// Map `source` into an existing destination. Members without a step,
    /// and members whose condition fails, keep their current values.
    pub fn map_into(
        &self,
        plan: &CompiledPlan,
        source: &Value,
        destination: &mut Value,
        context: &mut MappingContext,
    ) -> Result<()> {
        if source.is_null() {
            return Err(MappingError::NullSource { pair: plan.key() });
        }
        self.run(plan, source, destination, context)
    }

    fn allocate(&self, plan: &CompiledPlan) -> Result<Value> {
        let factory = plan.factory();
        factory.create().map_err(|source| MappingError::Serialization {
            type_name: factory.type_name(),
            source,
        })
    }

    fn run(
        &self,
        plan: &CompiledPlan,
        source: &Value,
        destination: &mut Value,
        context: &mut MappingContext,
    ) -> Result<()> {
        context.enter(plan.key(), self.max_depth)?;
        let result = self.run_steps(plan, source, destination, context);
        context.leave();
        result
    }

    fn run_steps(
        &self,
        plan: &CompiledPlan,
        source: &Value,
        destination: &mut Value,
        context: &mut MappingContext,
    ) -> Result<()> {
        let pair = plan.key();

        if let Some(hook) = plan.before() {
            hook.call(source, destination, context)
                .map_err(|e| attribute(e, resolver_failure(pair, BEFORE_HOOK)))?;
        }

        for step in plan.steps() {
            self.apply(pair, step, source, destination, context)?;
        }

        if let Some(hook) = plan.after() {
            hook.call(source, destination, context)
                .map_err(|e| attribute(e, resolver_failure(pair, AFTER_HOOK)))?;
        }
        Ok(())
    }

    fn apply(
        &self,
        pair: PairKey,
        step: &FillStep,
        source: &Value,
        destination: &mut Value,
        context: &mut MappingContext,
    ) -> Result<()> {
        let member = step.member();

        if let Some(condition) = step.condition() {
            let holds = condition
                .test(source)
                .map_err(|e| attribute(e, resolver_failure(pair, member)))?;
            if !holds {
                trace!(pair = %pair, member, "Condition not met; member left unchanged");
                return Ok(());
            }
        }

        let value = match step.action() {
            StepAction::Copy { path, transform } => match path.read(source) {
                Some(value) => {
                    let existing = destination.get(member);
                    self.transform(pair, member, transform, value, existing, context)?
                }
                None => None,
            },
            StepAction::Expression(expression) => Some(
                expression
                    .evaluate(source, destination, context)
                    .map_err(|e| attribute(e, resolver_failure(pair, member)))?,
            ),
            StepAction::Resolver(resolver) => {
                let resolved = resolver
                    .resolve(source, destination, member, context)
                    .map_err(|e| {
                        error!(
                            pair = %pair,
                            member,
                            resolver = ?resolver,
                            "Resolver failed: {}",
                            e
                        );
                        attribute(e, resolver_failure(pair, member))
                    })?;
                Some(resolved)
            }
            StepAction::Constant(value) => Some(value.clone()),
        };

        let value = value
            .filter(|value| !value.is_null())
            .or_else(|| step.null_substitute().cloned());

        match value {
            Some(value) => {
                trace!(pair = %pair, member, "Filled member");
                set_member(destination, member, value);
            }
            None if step.destination_type().is_optional() => {
                trace!(pair = %pair, member, "Source absent; member cleared");
                set_member(destination, member, Value::Null);
            }
            None => {
                trace!(pair = %pair, member, "Source absent; member left unchanged");
            }
        }
        Ok(())
    }

    /// Returns `None` when the value cannot be carried over (e.g. a
    /// non-array where a sequence was expected).
    fn transform(
        &self,
        pair: PairKey,
        member: &str,
        transform: &Transform,
        value: &Value,
        existing: Option<&Value>,
        context: &mut MappingContext,
    ) -> Result<Option<Value>> {
        match transform {
            Transform::Identity => Ok(Some(value.clone())),
            Transform::Convert(binding) => {
                let converted = binding.convert(value, context).map_err(|e| {
                    error!(pair = %pair, member, converter = ?binding, "Converter failed: {}", e);
                    attribute(e, |source| MappingError::ConverterExecution {
                        pair,
                        member: member.to_string(),
                        source,
                    })
                })?;
                Ok(Some(converted))
            }
            Transform::Nested(nested) => {
                let plan = self.compiler.compile(nested)?;
                let mut target = match existing {
                    Some(current) if current.is_object() => current.clone(),
                    _ => self.allocate(&plan)?,
                };
                self.run(&plan, value, &mut target, context)?;
                Ok(Some(target))
            }
            Transform::Sequence(inner) => {
                let Some(items) = value.as_array() else {
                    return Ok(None);
                };
                let mut mapped = Vec::with_capacity(items.len());
                for item in items {
                    if item.is_null() {
                        mapped.push(Value::Null);
                        continue;
                    }
                    let element = self.transform(pair, member, inner, item, None, context)?;
                    mapped.push(element.unwrap_or(Value::Null));
                }
                Ok(Some(Value::Array(mapped)))
            }
        }
    }
}

fn set_member(destination: &mut Value, member: &str, value: Value) {
    if let Some(object) = destination.as_object_mut() {
        object.insert(member.to_string(), value);
    }
}
