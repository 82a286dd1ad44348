//! Rule: empty_group
//!
//! An empty group body is rejected at parse time, so this rule is
//! unreachable through the normal pipeline. It re-asserts the invariant
//! for trees built programmatically (template tooling composes segments
//! without going through the parser); seeing it on parsed input means the
//! parser invariant has been broken.

use crate::parser::ast::{Segment, Workout};

use super::super::{Diagnostic, ValidationRule};

pub struct EmptyGroupRule;

impl ValidationRule for EmptyGroupRule {
    fn id(&self) -> &'static str {
        "empty_group"
    }

    fn description(&self) -> &'static str {
        "Group and variable bodies must contain at least one segment"
    }

    fn check(&self, workout: &Workout) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for segment in &workout.segments {
            walk(self.id(), segment, &mut diagnostics);
        }
        diagnostics
    }
}

fn walk(id: &'static str, segment: &Segment, diagnostics: &mut Vec<Diagnostic>) {
    match segment {
        Segment::Variable { children, span, .. } => {
            if children.is_empty() {
                diagnostics.push(Diagnostic::error(
                    id,
                    *span,
                    "empty group body (parser invariant violation)",
                ));
            }
            for child in children {
                walk(id, child, diagnostics);
            }
        }
        Segment::Group { body, span, .. } => {
            if body.is_empty() {
                diagnostics.push(Diagnostic::error(
                    id,
                    *span,
                    "empty group body (parser invariant violation)",
                ));
            }
            for child in body {
                walk(id, child, diagnostics);
            }
        }
        Segment::Steady { .. } | Segment::Interval { .. } => {}
    }
}
