//! Rule: invalid_range
//!
//! Range guidance requires `low < high`. The guidance resolver collapses
//! equal bounds to an absolute target, so anything left with `low >= high`
//! was either reversed by the author (`@22..18spm`) or produced by
//! composition the resolver never saw.

use crate::parser::ast::{Segment, Workout};
use crate::parser::guidance::{Guidance, GuidanceTarget};

use super::super::{Diagnostic, ValidationRule};

pub struct InvalidRangeRule;

impl ValidationRule for InvalidRangeRule {
    fn id(&self) -> &'static str {
        "invalid_range"
    }

    fn description(&self) -> &'static str {
        "Range guidance bounds must satisfy low < high"
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
    for guidance in segment.guidance() {
        check_guidance(id, guidance, diagnostics);
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

fn check_guidance(id: &'static str, guidance: &Guidance, diagnostics: &mut Vec<Diagnostic>) {
    let bounds = match guidance.target {
        GuidanceTarget::RateRange { low, high } => Some((low, high)),
        GuidanceTarget::PaceRange {
            low_seconds,
            high_seconds,
        } => Some((low_seconds, high_seconds)),
        _ => None,
    };
    if let Some((low, high)) = bounds {
        if low >= high {
            diagnostics.push(Diagnostic::error(
                id,
                guidance.span,
                format!("invalid range: lower bound {low} is not below upper bound {high}"),
            ));
        }
    }
}
