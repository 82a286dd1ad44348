//! Rule: mixed_modality_interval
//!
//! An interval whose rest runs on different equipment than its work
//! (`4x500m/Bike: 1:00r`) is legal but easy to author by accident, so it
//! warns. Whether `Other` acts as a wildcard that never conflicts is a
//! policy choice, not a grammar rule; it defaults to wildcard and can be
//! flipped per validator instance.

use crate::parser::ast::{Modality, Segment, Workout};

use super::super::{Diagnostic, ValidationRule};

pub struct MixedModalityRule {
    /// When set, `Other` on either side never conflicts.
    pub other_is_wildcard: bool,
}

impl Default for MixedModalityRule {
    fn default() -> Self {
        Self {
            other_is_wildcard: true,
        }
    }
}

impl ValidationRule for MixedModalityRule {
    fn id(&self) -> &'static str {
        "mixed_modality_interval"
    }

    fn description(&self) -> &'static str {
        "Interval rest modality should match the work modality"
    }

    fn check(&self, workout: &Workout) -> Vec<Diagnostic> {
        let mut diagnostics = Vec::new();
        for segment in &workout.segments {
            self.walk(segment, &mut diagnostics);
        }
        diagnostics
    }
}

impl MixedModalityRule {
    fn walk(&self, segment: &Segment, diagnostics: &mut Vec<Diagnostic>) {
        match segment {
            Segment::Interval {
                modality,
                rest: Some(rest),
                ..
            } => {
                let rest_modality = rest.effective_modality(*modality);
                let wildcard = self.other_is_wildcard
                    && (*modality == Modality::Other || rest_modality == Modality::Other);
                if rest_modality != *modality && !wildcard {
                    diagnostics.push(Diagnostic::warning(
                        self.id(),
                        rest.span,
                        format!(
                            "interval mixes modalities: {} work with {} rest",
                            modality.label(),
                            rest_modality.label()
                        ),
                    ));
                }
            }
            Segment::Variable { children, .. } => {
                for child in children {
                    self.walk(child, diagnostics);
                }
            }
            Segment::Group { body, .. } => {
                for child in body {
                    self.walk(child, diagnostics);
                }
            }
            Segment::Steady { .. } | Segment::Interval { .. } => {}
        }
    }
}
