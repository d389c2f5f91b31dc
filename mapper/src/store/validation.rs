//! # Configuration Validation
//!
//! Compiles every registered pair and reports the members that would not be
//! filled as configured. Unmapped members are warnings; unconvertible
//! members and rules naming unknown members are errors, but only strict
//! callers treat any of them as fatal.
//!
//! Validation also rejects type graphs that cannot terminate: a pair whose
//! required (non-optional, non-sequence) nested members lead back to itself.

use std::collections::HashMap;
use std::fmt;

use tracing::{debug, warn};

use crate::descriptor::{SemanticType, TypeRegistry};
use crate::error::{MappingError, Result};
use crate::plan::build::build_plan;
use crate::plan::CompiledPlan;
use crate::store::{ConfigurationStore, MemberPath, PairKey};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueKind {
    /// No rule, no same-named member and no flattened chain
    Unmapped,
    /// Matched, but no converter between the member types
    Unconvertible {
        source_type: SemanticType,
        destination_type: SemanticType,
    },
    /// A rule names a member the destination does not have or cannot write
    UnknownMember,
    /// A member path rule does not resolve against the source type
    UnknownSourcePath { path: MemberPath },
}

impl IssueKind {
    pub fn is_error(&self) -> bool {
        !matches!(self, IssueKind::Unmapped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub pair: PairKey,
    pub member: String,
    pub kind: IssueKind,
}

impl ValidationIssue {
    pub fn is_error(&self) -> bool {
        self.kind.is_error()
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::Unmapped => write!(f, "{}: `{}` is unmapped", self.pair, self.member),
            IssueKind::Unconvertible {
                source_type,
                destination_type,
            } => write!(
                f,
                "{}: `{}` cannot be converted from {} to {}",
                self.pair, self.member, source_type, destination_type
            ),
            IssueKind::UnknownMember => {
                write!(f, "{}: rule for unknown member `{}`", self.pair, self.member)
            }
            IssueKind::UnknownSourcePath { path } => write!(
                f,
                "{}: `{}` maps from unknown source path `{}`",
                self.pair, self.member, path
            ),
        }
    }
}

/// Result of [`ConfigurationStore::validate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| !issue.is_error())
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|issue| issue.is_error())
    }

    /// `(pair, member)` for every unmapped destination member
    pub fn unmapped_members(&self) -> Vec<(PairKey, &str)> {
        self.issues
            .iter()
            .filter(|issue| issue.kind == IssueKind::Unmapped)
            .map(|issue| (issue.pair, issue.member.as_str()))
            .collect()
    }

    /// Treat every issue as fatal. An unconvertible member is reported as
    /// such; anything else fails with the whole report.
    pub fn into_strict(self) -> Result<ValidationReport> {
        let unconvertible = self.issues.iter().find_map(|issue| match &issue.kind {
            IssueKind::Unconvertible {
                source_type,
                destination_type,
            } => Some(MappingError::UnconvertibleMember {
                pair: issue.pair,
                member: issue.member.clone(),
                source_type: source_type.clone(),
                destination_type: destination_type.clone(),
            }),
            _ => None,
        });
        if let Some(error) = unconvertible {
            return Err(error);
        }
        if self.is_empty() {
            Ok(self)
        } else {
            Err(MappingError::ValidationFailed { report: self })
        }
    }
}

impl ConfigurationStore {
    /// Check every registered pair.
    ///
    /// Fails only for configurations that cannot be mapped at all: missing or
    /// cyclic base pairs, types that cannot be described, and required
    /// nested members that form a cycle. Everything else is reported.
    pub fn validate(&self, registry: &TypeRegistry) -> Result<ValidationReport> {
        self.check_bases()?;
        self.check_include_cycles()?;

        let mut plans: HashMap<PairKey, CompiledPlan> = HashMap::new();
        for config in self.pairs() {
            self.compile_for_validation(registry, config.key(), &mut plans)?;
        }

        let mut report = ValidationReport::default();
        for config in self.pairs() {
            if let Some(plan) = plans.get(&config.key()) {
                report.issues.extend(plan.issues().iter().cloned());
            }
        }
        for issue in report.issues() {
            warn!(pair = %issue.pair, member = %issue.member, "{}", issue);
        }

        if let Some(cycle) = find_required_cycle(self, &plans) {
            return Err(MappingError::CyclicMapping { cycle });
        }

        debug!(
            pairs = plans.len(),
            warnings = report.warnings().count(),
            errors = report.errors().count(),
            "Validated mapping configuration"
        );
        Ok(report)
    }

    /// Plans are built without the compiler cache so validation never
    /// leaves compiled plans behind.
    fn compile_for_validation(
        &self,
        registry: &TypeRegistry,
        key: PairKey,
        plans: &mut HashMap<PairKey, CompiledPlan>,
    ) -> Result<()> {
        if plans.contains_key(&key) {
            return Ok(());
        }
        let base = self.pair(&key).and_then(|config| config.base());
        if let Some(base) = base {
            self.compile_for_validation(registry, base, plans)?;
        }
        let plan = build_plan(self, registry, &key, base.and_then(|base| plans.get(&base)))?;
        plans.insert(key, plan);
        Ok(())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
    InProgress,
    Done,
}

/// Depth-first search over required nested edges, in registration order.
fn find_required_cycle(
    store: &ConfigurationStore,
    plans: &HashMap<PairKey, CompiledPlan>,
) -> Option<Vec<PairKey>> {
    fn visit(
        key: PairKey,
        plans: &HashMap<PairKey, CompiledPlan>,
        state: &mut HashMap<PairKey, Visit>,
        stack: &mut Vec<PairKey>,
    ) -> Option<Vec<PairKey>> {
        match state.get(&key) {
            Some(Visit::Done) => return None,
            Some(Visit::InProgress) => {
                let start = stack.iter().position(|k| *k == key).unwrap_or(0);
                let mut cycle = stack[start..].to_vec();
                cycle.push(key);
                return Some(cycle);
            }
            None => {}
        }

        state.insert(key, Visit::InProgress);
        stack.push(key);
        if let Some(plan) = plans.get(&key) {
            for next in plan.required_nested_pairs() {
                if let Some(cycle) = visit(next, plans, state, stack) {
                    return Some(cycle);
                }
            }
        }
        stack.pop();
        state.insert(key, Visit::Done);
        None
    }

    let mut state = HashMap::new();
    let mut stack = Vec::new();
    store
        .pairs()
        .find_map(|config| visit(config.key(), plans, &mut state, &mut stack))
}
