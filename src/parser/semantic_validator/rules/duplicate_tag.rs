//! Rule: duplicate_tag
//!
//! A workout has one warmup and one cooldown at most. `[t]` (test) blocks
//! may appear any number of times, so only `[w]` and `[c]` are counted.
//! The diagnostic points at the second occurrence, which is the one the
//! author needs to remove.

use crate::parser::ast::{Segment, Tag, TagKind, Workout};

use super::super::{Diagnostic, ValidationRule};

pub struct DuplicateTagRule;

impl ValidationRule for DuplicateTagRule {
    fn id(&self) -> &'static str {
        "duplicate_tag"
    }

    fn description(&self) -> &'static str {
        "Warmup and cooldown tags may each appear at most once per workout"
    }

    fn check(&self, workout: &Workout) -> Vec<Diagnostic> {
        let mut tags = Vec::new();
        for segment in &workout.segments {
            collect_tags(segment, &mut tags);
        }

        let mut diagnostics = Vec::new();
        for unique in [TagKind::Warmup, TagKind::Cooldown] {
            for tag in tags.iter().filter(|t| t.kind == unique).skip(1) {
                diagnostics.push(Diagnostic::error(
                    self.id(),
                    tag.span,
                    format!("duplicate '{}' tag: at most one per workout", label(unique)),
                ));
            }
        }
        diagnostics
    }
}

fn label(kind: TagKind) -> &'static str {
    match kind {
        TagKind::Warmup => "warmup",
        TagKind::Cooldown => "cooldown",
        TagKind::Test => "test",
    }
}

/// Collect tags in source order, including nested ones.
fn collect_tags<'a>(segment: &'a Segment, tags: &mut Vec<&'a Tag>) {
    if let Some(tag) = segment.tag() {
        tags.push(tag);
    }
    match segment {
        Segment::Variable { children, .. } => {
            for child in children {
                collect_tags(child, tags);
            }
        }
        Segment::Group { body, .. } => {
            for child in body {
                collect_tags(child, tags);
            }
        }
        Segment::Steady { .. } | Segment::Interval { .. } => {}
    }
}
