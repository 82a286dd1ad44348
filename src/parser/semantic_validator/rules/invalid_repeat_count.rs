//! Rule: invalid_repeat_count
//!
//! `0x500m` tokenizes (zero is a number) and parses; a zero repeat is
//! meaningless, so it is rejected here rather than in the grammar, where it
//! would produce a worse error message. Also covers trees composed
//! programmatically.

use crate::parser::ast::{Segment, Workout};

use super::super::{Diagnostic, ValidationRule};

pub struct InvalidRepeatCountRule;

impl ValidationRule for InvalidRepeatCountRule {
    fn id(&self) -> &'static str {
        "invalid_repeat_count"
    }

    fn description(&self) -> &'static str {
        "Repeat counts must be at least 1"
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
        Segment::Interval { repeat, span, .. } | Segment::Group { repeat, span, .. }
            if *repeat == 0 =>
        {
            diagnostics.push(Diagnostic::error(
                id,
                *span,
                "repeat count must be at least 1",
            ));
        }
        _ => {}
    }
    match segment {
        Segment::Variable { children, .. } => {
            for child in children {
                walk(id, child, diagnostics);
            }
        }
        Segment::Group { body, .. } => {
            for child in body {
                walk(id, child, diagnostics);
            }
        }
        Segment::Steady { .. } | Segment::Interval { .. } => {}
    }
}
