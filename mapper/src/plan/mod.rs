//! # Plan Compiler
//!
//! Turns a registered type pair into a [`CompiledPlan`]: the ordered fill
//! steps for every destination member that can be filled, plus diagnostics
//! for the members that cannot.
//!
//! ## Key Responsibilities
//!
//! - **Resolution**: explicit rule, then included base step, then naming
//!   convention, then flattening (see [`build`])
//! - **Type compatibility**: choose a [`Transform`] between the source and
//!   destination member types, or report the member as unconvertible
//! - **Memoization**: compile each pair once, on first use (see
//!   [`PlanCompiler`])

pub mod build;
pub mod compiler;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::adapters::{ConverterBinding, DynCondition, DynExpression, DynHook, DynResolver};
use crate::descriptor::SemanticType;
use crate::store::validation::ValidationIssue;
use crate::store::{DestinationFactory, MemberPath, PairKey};

pub use compiler::PlanCompiler;

/// How a copied source value becomes a destination value.
#[derive(Debug, Clone)]
pub enum Transform {
    Identity,
    Convert(ConverterBinding),
    /// Map through another registered pair
    Nested(PairKey),
    /// Apply the inner transform to every element, preserving order
    Sequence(Box<Transform>),
}

impl Transform {
    /// The nested pair reached by this transform, if any
    pub fn nested_pair(&self) -> Option<PairKey> {
        match self {
            Transform::Nested(key) => Some(*key),
            Transform::Sequence(inner) => inner.nested_pair(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum StepAction {
    Copy { path: MemberPath, transform: Transform },
    Expression(Arc<dyn DynExpression>),
    Resolver(Arc<dyn DynResolver>),
    Constant(Value),
}

/// Why a step is in the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOrigin {
    Explicit,
    /// Inherited from an included base pair
    Base(PairKey),
    Convention,
    Flattened,
}

/// Fills one destination member.
#[derive(Debug, Clone)]
pub struct FillStep {
    member: String,
    destination_type: SemanticType,
    condition: Option<Arc<dyn DynCondition>>,
    null_substitute: Option<Value>,
    action: StepAction,
    origin: StepOrigin,
}

impl FillStep {
    pub(crate) fn new(
        member: &str,
        destination_type: &SemanticType,
        action: StepAction,
        origin: StepOrigin,
    ) -> Self {
        Self {
            member: member.to_string(),
            destination_type: destination_type.clone(),
            condition: None,
            null_substitute: None,
            action,
            origin,
        }
    }

    pub(crate) fn with_rule_options(
        mut self,
        condition: Option<&Arc<dyn DynCondition>>,
        null_substitute: Option<&Value>,
    ) -> Self {
        self.condition = condition.cloned();
        self.null_substitute = null_substitute.cloned();
        self
    }

    pub(crate) fn inherited(mut self, base: PairKey) -> Self {
        if !matches!(self.origin, StepOrigin::Base(_)) {
            self.origin = StepOrigin::Base(base);
        }
        self
    }

    pub fn member(&self) -> &str {
        &self.member
    }

    pub fn destination_type(&self) -> &SemanticType {
        &self.destination_type
    }

    pub fn condition(&self) -> Option<&Arc<dyn DynCondition>> {
        self.condition.as_ref()
    }

    pub fn null_substitute(&self) -> Option<&Value> {
        self.null_substitute.as_ref()
    }

    pub fn action(&self) -> &StepAction {
        &self.action
    }

    pub fn origin(&self) -> StepOrigin {
        self.origin
    }

    /// Source path for copy steps
    pub fn source_path(&self) -> Option<&MemberPath> {
        match &self.action {
            StepAction::Copy { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// The executable mapping for one type pair.
#[derive(Debug, Clone)]
pub struct CompiledPlan {
    key: PairKey,
    steps: Vec<FillStep>,
    ignored: Vec<String>,
    issues: Vec<ValidationIssue>,
    before: Option<Arc<dyn DynHook>>,
    after: Option<Arc<dyn DynHook>>,
    factory: DestinationFactory,
}

impl CompiledPlan {
    pub fn key(&self) -> PairKey {
        self.key
    }

    /// Steps in destination member order
    pub fn steps(&self) -> &[FillStep] {
        &self.steps
    }

    pub fn step(&self, member: &str) -> Option<&FillStep> {
        self.steps.iter().find(|step| step.member == member)
    }

    /// Members explicitly ignored
    pub fn ignored(&self) -> &[String] {
        &self.ignored
    }

    pub fn ignores(&self, member: &str) -> bool {
        self.ignored.iter().any(|m| m == member)
    }

    /// Unmapped, unconvertible and misconfigured members found while
    /// compiling
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn before(&self) -> Option<&Arc<dyn DynHook>> {
        self.before.as_ref()
    }

    pub fn after(&self) -> Option<&Arc<dyn DynHook>> {
        self.after.as_ref()
    }

    pub fn factory(&self) -> DestinationFactory {
        self.factory
    }

    /// Pairs this plan maps through for members that must be present:
    /// neither optional nor inside a sequence
    pub fn required_nested_pairs(&self) -> impl Iterator<Item = PairKey> + '_ {
        self.steps.iter().filter_map(|step| match &step.action {
            StepAction::Copy {
                transform: Transform::Nested(key),
                ..
            } if !step.destination_type.is_optional() => Some(*key),
            _ => None,
        })
    }
}

impl fmt::Display for CompiledPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "plan {}", self.key)?;
        for step in &self.steps {
            let action = match &step.action {
                StepAction::Copy { path, transform } => format!("copy {} ({:?})", path, transform),
                StepAction::Expression(_) => "expression".to_string(),
                StepAction::Resolver(resolver) => format!("resolver {:?}", resolver),
                StepAction::Constant(value) => format!("constant {}", value),
            };
            let conditional = if step.condition.is_some() { " if condition" } else { "" };
            writeln!(f, "  {} <- {}{} [{:?}]", step.member, action, conditional, step.origin)?;
        }
        for member in &self.ignored {
            writeln!(f, "  {} ignored", member)?;
        }
        Ok(())
    }
}
