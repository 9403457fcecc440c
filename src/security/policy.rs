//! Request authorization policy.
//!
//! # Responsibilities
//! - Hold the ordered (pattern, requirement) rules
//! - Resolve the requirement for a request path
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc, no locks)
//! - First match wins, in declaration order
//! - Explicit fallback: no match means authentication is required

use std::fmt;

use crate::security::pattern::{PathPattern, PatternError, PatternSet};

/// What a request must present to reach its handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    /// Reachable without a principal.
    Public,
    /// Requires a validated principal.
    Authenticated,
}

impl Requirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::Public => "public",
            Requirement::Authenticated => "authenticated",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the ordered rule list.
#[derive(Debug, Clone)]
pub struct PathRule {
    pub pattern: PathPattern,
    pub requirement: Requirement,
}

impl PathRule {
    pub fn new(pattern: &str, requirement: Requirement) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: PathPattern::parse(pattern)?,
            requirement,
        })
    }
}

/// Ordered path rules with an authenticated fallback.
#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<PathRule>,
    fallback: Requirement,
}

impl AccessPolicy {
    /// Build a policy from explicit rules.
    pub fn new(rules: Vec<PathRule>) -> Self {
        Self {
            rules,
            fallback: Requirement::Authenticated,
        }
    }

    /// Build a policy in which every listed pattern is public.
    pub fn permit_all<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        let rules = PatternSet::compile(patterns)?
            .iter()
            .cloned()
            .map(|pattern| PathRule {
                pattern,
                requirement: Requirement::Public,
            })
            .collect();
        Ok(Self::new(rules))
    }

    /// Resolve the requirement for `path`.
    pub fn evaluate(&self, path: &str) -> Requirement {
        self.matching_rule(path)
            .map(|rule| rule.requirement)
            .unwrap_or(self.fallback)
    }

    /// The rule that decides `path`, if any.
    pub fn matching_rule(&self, path: &str) -> Option<&PathRule> {
        self.rules.iter().find(|rule| rule.pattern.matches(path))
    }

    pub fn rules(&self) -> &[PathRule] {
        &self.rules
    }
}
