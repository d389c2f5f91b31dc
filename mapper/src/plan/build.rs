//! Member resolution for a single type pair.
//!
//! For every writable destination member, in declaration order:
//!
//! 1. the pair's own rule for the member (last one registered wins);
//! 2. an explicit step inherited from the included base plan;
//! 3. a readable source member with a matching name and compatible type;
//! 4. a chain of nested source members spelling the destination name
//!    (`category_name` from `category.name`), longest segment first;
//! 5. a conventional step inherited from the base plan.
//!
//! Anything left over is unmapped and only reported.

use std::sync::Arc;

use tracing::debug;

use crate::descriptor::{MemberDescriptor, SemanticType, TypeDescriptor, TypeRegistry};
use crate::error::{MappingError, Result};
use crate::naming;
use crate::plan::{CompiledPlan, FillStep, StepAction, StepOrigin, Transform};
use crate::store::validation::{IssueKind, ValidationIssue};
use crate::store::{ConfigurationStore, FillStrategy, MappingRule, MemberPath, PairKey};

/// Pick how a value of `source` type becomes a value of `destination` type.
pub fn transform_for(
    store: &ConfigurationStore,
    source: &SemanticType,
    destination: &SemanticType,
) -> Option<Transform> {
    if source == destination {
        return Some(Transform::Identity);
    }
    if let Some(binding) = store.converter(source, destination) {
        return Some(Transform::Convert(binding.clone()));
    }

    let (source_inner, destination_inner) = (source.strip_optional(), destination.strip_optional());
    if source_inner != source || destination_inner != destination {
        return transform_for(store, source_inner, destination_inner);
    }

    match (source, destination) {
        (SemanticType::Integer { .. }, SemanticType::Float) => Some(Transform::Identity),
        (SemanticType::Integer { .. }, SemanticType::Integer { .. }) => {
            source.widens_to(destination).then_some(Transform::Identity)
        }
        (SemanticType::Object(from), SemanticType::Object(to)) => {
            let key = PairKey::new(from.key(), to.key());
            store.contains_pair(&key).then_some(Transform::Nested(key))
        }
        (SemanticType::Sequence(from), SemanticType::Sequence(to)) => {
            transform_for(store, from, to).map(|inner| Transform::Sequence(Box::new(inner)))
        }
        _ => None,
    }
}

struct PlanBuilder<'a> {
    store: &'a ConfigurationStore,
    registry: &'a TypeRegistry,
    key: PairKey,
    source: Arc<TypeDescriptor>,
    plan: CompiledPlan,
}

/// Compile the plan for `key`. `base` must be the compiled plan of the
/// pair's included base, if it has one.
pub fn build_plan(
    store: &ConfigurationStore,
    registry: &TypeRegistry,
    key: &PairKey,
    base: Option<&CompiledPlan>,
) -> Result<CompiledPlan> {
    let config = store
        .pair(key)
        .ok_or(MappingError::MissingMapping { pair: *key })?;
    let source = registry.describe_object(config.source())?;
    let destination = registry.describe_object(config.destination())?;

    let mut builder = PlanBuilder {
        store,
        registry,
        key: *key,
        source,
        plan: CompiledPlan {
            key: *key,
            steps: Vec::new(),
            ignored: Vec::new(),
            issues: Vec::new(),
            before: config.before().cloned(),
            after: config.after().cloned(),
            factory: config.factory(),
        },
    };

    for rule in config.rules() {
        let known = destination
            .find(rule.member())
            .is_some_and(MemberDescriptor::is_writable);
        let reported = builder
            .plan
            .issues
            .iter()
            .any(|issue| issue.member == rule.member());
        if !known && !reported {
            builder.issue(rule.member(), IssueKind::UnknownMember);
        }
    }

    for member in destination.members().iter().filter(|m| m.is_writable()) {
        if let Some(rule) = config.rule_for(member.name()) {
            builder.apply_rule(member, rule)?;
            continue;
        }

        let inherited =
            base.and_then(|base| base.step(member.name()).map(|step| (base.key(), step)));
        if let Some((base_key, step)) = inherited {
            if matches!(step.origin(), StepOrigin::Explicit | StepOrigin::Base(_)) {
                builder.plan.steps.push(step.clone().inherited(base_key));
                continue;
            }
        }
        if base.is_some_and(|base| base.ignores(member.name())) {
            builder.plan.ignored.push(member.name().to_string());
            continue;
        }

        if builder.apply_convention(member, None)? {
            continue;
        }
        match inherited {
            Some((base_key, step)) => builder.plan.steps.push(step.clone().inherited(base_key)),
            None => builder.issue(member.name(), IssueKind::Unmapped),
        }
    }

    debug!(
        pair = %key,
        steps = builder.plan.steps.len(),
        issues = builder.plan.issues.len(),
        "Compiled mapping plan"
    );
    Ok(builder.plan)
}

impl<'a> PlanBuilder<'a> {
    fn issue(&mut self, member: &str, kind: IssueKind) {
        self.plan.issues.push(ValidationIssue {
            pair: self.key,
            member: member.to_string(),
            kind,
        });
    }

    fn push(
        &mut self,
        member: &MemberDescriptor,
        action: StepAction,
        origin: StepOrigin,
        rule: Option<&MappingRule>,
    ) {
        let step = FillStep::new(member.name(), member.semantic_type(), action, origin)
            .with_rule_options(
                rule.and_then(MappingRule::condition),
                rule.and_then(MappingRule::null_substitute),
            );
        self.plan.steps.push(step);
    }

    fn apply_rule(&mut self, member: &MemberDescriptor, rule: &MappingRule) -> Result<()> {
        match rule.strategy() {
            FillStrategy::Ignore => {
                self.plan.ignored.push(member.name().to_string());
            }
            FillStrategy::Convention => {
                if !self.apply_convention(member, Some(rule))? {
                    self.issue(member.name(), IssueKind::Unmapped);
                }
            }
            FillStrategy::FromMember(path) => {
                self.apply_member_path(member, path, rule)?;
            }
            FillStrategy::Expression(expression) => {
                let action = StepAction::Expression(expression.clone());
                self.push(member, action, StepOrigin::Explicit, Some(rule));
            }
            FillStrategy::Resolver(resolver) => {
                let action = StepAction::Resolver(resolver.clone());
                self.push(member, action, StepOrigin::Explicit, Some(rule));
            }
            FillStrategy::Constant(value) => {
                let action = StepAction::Constant(value.clone());
                self.push(member, action, StepOrigin::Explicit, Some(rule));
            }
        }
        Ok(())
    }

    /// Same-name match, then flattening. Returns whether the member was
    /// handled (mapped or reported unconvertible).
    fn apply_convention(
        &mut self,
        member: &MemberDescriptor,
        rule: Option<&MappingRule>,
    ) -> Result<bool> {
        let origin = if rule.is_some() {
            StepOrigin::Explicit
        } else {
            StepOrigin::Convention
        };

        let source = Arc::clone(&self.source);
        if let Some(source_member) = source.find_readable(member.name()) {
            match transform_for(self.store, source_member.semantic_type(), member.semantic_type()) {
                Some(transform) => {
                    let path = MemberPath::parse(source_member.name());
                    self.push(member, StepAction::Copy { path, transform }, origin, rule);
                }
                None => self.issue(
                    member.name(),
                    IssueKind::Unconvertible {
                        source_type: source_member.semantic_type().clone(),
                        destination_type: member.semantic_type().clone(),
                    },
                ),
            }
            return Ok(true);
        }

        let segments = naming::split_segments(member.name());
        if segments.len() < 2 {
            return Ok(false);
        }
        match self.flatten(&source, &segments, member.semantic_type())? {
            Some((path, transform)) => {
                let origin = if rule.is_some() {
                    StepOrigin::Explicit
                } else {
                    StepOrigin::Flattened
                };
                let path = MemberPath::from_segments(path);
                self.push(member, StepAction::Copy { path, transform }, origin, rule);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Find the longest-prefix chain of readable members spelling
    /// `segments`, backtracking to shorter prefixes when a chain dead-ends.
    fn flatten(
        &self,
        descriptor: &TypeDescriptor,
        segments: &[String],
        destination: &SemanticType,
    ) -> Result<Option<(Vec<String>, Transform)>> {
        for take in (1..=segments.len()).rev() {
            let name = segments[..take].join("_");
            let Some(candidate) = descriptor.find_readable(&name) else {
                continue;
            };
            let rest = &segments[take..];

            if rest.is_empty() {
                let transform = transform_for(self.store, candidate.semantic_type(), destination);
                if let Some(transform) = transform {
                    return Ok(Some((vec![candidate.name().to_string()], transform)));
                }
                continue;
            }

            if let Some(object) = candidate.semantic_type().as_object() {
                let nested = self.registry.describe_object(object)?;
                if let Some((mut path, transform)) = self.flatten(&nested, rest, destination)? {
                    path.insert(0, candidate.name().to_string());
                    return Ok(Some((path, transform)));
                }
            }
        }
        Ok(None)
    }

    /// Resolve an explicit member path against the source type, rewriting
    /// each segment to the member's declared name.
    fn apply_member_path(
        &mut self,
        member: &MemberDescriptor,
        path: &MemberPath,
        rule: &MappingRule,
    ) -> Result<()> {
        let mut resolved = Vec::with_capacity(path.segments().len());
        let mut descriptor = Arc::clone(&self.source);
        let mut source_type: Option<SemanticType> = None;

        for segment in path.segments() {
            // A segment after a leaf leaves `source_type` empty
            if let Some(previous) = source_type.take() {
                let Some(object) = previous.as_object() else {
                    break;
                };
                descriptor = self.registry.describe_object(object)?;
            }
            let Some(found) = descriptor.find_readable(segment) else {
                break;
            };
            resolved.push(found.name().to_string());
            source_type = Some(found.semantic_type().clone());
        }

        let Some(source_type) = source_type else {
            self.issue(member.name(), IssueKind::UnknownSourcePath { path: path.clone() });
            return Ok(());
        };

        match transform_for(self.store, &source_type, member.semantic_type()) {
            Some(transform) => {
                let action = StepAction::Copy {
                    path: MemberPath::from_segments(resolved),
                    transform,
                };
                self.push(member, action, StepOrigin::Explicit, Some(rule));
            }
            None => self.issue(
                member.name(),
                IssueKind::Unconvertible {
                    source_type,
                    destination_type: member.semantic_type().clone(),
                },
            ),
        }
        Ok(())
    }
}
