//! Semantic validation for parsed workouts
//!
//! Runs after parsing and guidance resolution to catch problems the grammar
//! cannot enforce. Validation never fails fast: every rule runs over the
//! whole tree and the caller gets the complete diagnostic list in one pass,
//! errors ranked before warnings, so an author fixes everything at once
//! instead of resubmitting per problem.
//!
//! # Architecture
//!
//! 1. **ValidationRule trait** - each rule implements this trait
//! 2. **Validator** - collects and runs all rules
//! 3. **Diagnostic** - the output (errors and warnings, never exceptions)
//!
//! # Adding a new rule
//!
//! 1. Create a new file in `semantic_validator/rules/`
//! 2. Implement `ValidationRule` for your struct
//! 3. Register it in `Validator::new()`

pub mod rules;

use serde::Serialize;

use super::ast::{Span, Workout};


/// Severity levels for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks downstream use - the workout is not well-formed
    Error,
    /// Flagged for the author to confirm intent
    Warning,
}

/// A single validation finding.
///
/// `message` is always produced from the rule code plus contextual values,
/// never ad hoc prose, so diagnostics are stable and testable by code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Stable machine-readable code, e.g. `duplicate_tag`
    pub code: &'static str,
    /// Source location of the issue
    pub span: Span,
    /// Human-readable message
    pub message: String,
}

impl Diagnostic {
    pub fn error(code: &'static str, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            span,
            message: message.into(),
        }
    }

    pub fn warning(code: &'static str, span: Span, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            span,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.severity, Severity::Error)
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(
            f,
            "{} at offset {}: {} [{}]",
            severity, self.span.start, self.message, self.code
        )
    }
}

/// Trait that all validation rules implement.
///
/// Rules are independent: no rule's failure suppresses another, and none
/// depends on another's output.
pub trait ValidationRule: Send + Sync {
    /// Stable code for diagnostics produced by this rule
    fn id(&self) -> &'static str;

    /// Human-readable description of what this rule checks
    fn description(&self) -> &'static str;

    /// Run the check and return any findings. Empty vector means clean.
    fn check(&self, workout: &Workout) -> Vec<Diagnostic>;
}

/// The main validator that runs all registered rules.
pub struct Validator {
    rules: Vec<Box<dyn ValidationRule>>,
}

impl Validator {
    /// Create a validator with all built-in rules.
    pub fn new() -> Self {
        Self {
            rules: vec![
                // Error rules
                Box::new(rules::DuplicateTagRule),
                Box::new(rules::EmptyGroupRule),
                Box::new(rules::InvalidRangeRule),
                Box::new(rules::InvalidRepeatCountRule),
                // Warning rules
                Box::new(rules::ConflictingGuidanceRule),
                Box::new(rules::MixedModalityRule::default()),
            ],
        }
    }

    /// Run every rule and collect findings, errors first, then by offset.
    pub fn validate(&self, workout: &Workout) -> Vec<Diagnostic> {
        let mut diagnostics: Vec<Diagnostic> = self
            .rules
            .iter()
            .flat_map(|rule| rule.check(workout))
            .collect();
        diagnostics.sort_by_key(|d| (d.severity as u8, d.span.start));
        diagnostics
    }

    /// List registered rules (useful for documentation)
    #[allow(dead_code)]
    pub fn rules(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.rules.iter().map(|r| (r.id(), r.description()))
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate a workout and return all findings.
pub fn validate_workout(workout: &Workout) -> Vec<Diagnostic> {
    Validator::new().validate(workout)
}

/// Check whether a workout has any error-severity finding.
pub fn has_errors(workout: &Workout) -> bool {
    validate_workout(workout).iter().any(Diagnostic::is_error)
}
