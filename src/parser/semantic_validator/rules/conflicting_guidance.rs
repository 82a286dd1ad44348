//! Rule: conflicting_guidance
//!
//! A segment carrying both rate and pace guidance is flagged as a warning,
//! not an error: a coach may intentionally give both as complementary cues
//! ("r24 and hold 1:58"), but the combination is unusual enough that the
//! author should confirm intent.

use crate::parser::ast::{Segment, Workout};
use crate::parser::guidance::GuidanceMode;

use super::super::{Diagnostic, ValidationRule};

pub struct ConflictingGuidanceRule;

impl ValidationRule for ConflictingGuidanceRule {
    fn id(&self) -> &'static str {
        "conflicting_guidance"
    }

    fn description(&self) -> &'static str {
        "Segments carrying both rate and pace guidance are flagged for review"
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
    let guidance = segment.guidance();
    let has_rate = guidance.iter().any(|g| g.mode() == GuidanceMode::Rate);
    let has_pace = guidance.iter().any(|g| g.mode() == GuidanceMode::Pace);
    if has_rate && has_pace {
        // Point at the later of the two annotations.
        let span = guidance
            .iter()
            .map(|g| g.span)
            .max_by_key(|s| s.start)
            .unwrap_or(segment.span());
        diagnostics.push(Diagnostic::warning(
            id,
            span,
            "segment carries both rate and pace guidance",
        ));
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
