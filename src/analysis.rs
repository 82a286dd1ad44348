//! Top-level analysis pipeline
//!
//! The single entry point consumers use: raw notation in, structured result
//! out. Lexing and parsing fail fast (malformed input yields no partial
//! result); validation never does: every independent finding is returned
//! together. The whole pipeline is a pure function of the input string:
//! identical input always yields identical output, with no shared state
//! between invocations.

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::canonical::{canonicalize, Canonical};
use crate::parser::ast::Segment;
use crate::parser::guidance::resolve_guidance;
use crate::parser::semantic_validator::{validate_workout, Diagnostic};
use crate::parser::tokenizer::{tokenize, LexError};
use crate::parser::{parse, ParseError};

/// Fatal pipeline failure: the input could not be read at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotationError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl NotationError {
    /// Byte offset to highlight in the source.
    pub fn position(&self) -> usize {
        match self {
            NotationError::Lex(e) => e.position(),
            NotationError::Parse(e) => e.position,
        }
    }
}

/// Structured analysis result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Analysis {
    /// True iff no error-severity diagnostic
    pub valid: bool,
    /// Full AST, for downstream consumers (templates, logging, analytics)
    pub segments: Vec<Segment>,
    /// All validation findings, errors ranked before warnings
    pub diagnostics: Vec<Diagnostic>,
    /// Canonical machine form
    pub canonical_text: String,
    /// Human-readable name
    pub display_name: String,
    /// Estimated total seconds, `None` when not computable
    pub duration_seconds: Option<u32>,
    /// Estimated total work meters, `None` when not computable
    pub work_meters: Option<u32>,
}

/// Analyze a notation string: tokenize, parse, resolve guidance, validate,
/// canonicalize.
pub fn analyze(source: &str) -> Result<Analysis, NotationError> {
    let tokens = tokenize(source)?;
    debug!(tokens = tokens.len(), "tokenized notation");

    let workout = parse(&tokens)?;
    let workout = resolve_guidance(workout);
    let diagnostics = validate_workout(&workout);
    let Canonical {
        text,
        display_name,
        duration_seconds,
        work_meters,
    } = canonicalize(&workout);

    let valid = !diagnostics.iter().any(Diagnostic::is_error);
    debug!(valid, diagnostics = diagnostics.len(), "analyzed notation");

    Ok(Analysis {
        valid,
        segments: workout.segments,
        diagnostics,
        canonical_text: text,
        display_name,
        duration_seconds,
        work_meters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Segment;
    use crate::parser::guidance::GuidanceTarget;

    fn analyzed(source: &str) -> Analysis {
        analyze(source).expect("should analyze")
    }

    #[test]
    fn test_basic_interval_scenario() {
        let a = analyzed("4x500m/1:00r");
        assert!(a.valid);
        assert!(a.diagnostics.is_empty());
        assert_eq!(a.display_name, "4x 500m");
        assert_eq!(a.duration_seconds, None);
    }

    #[test]
    fn test_zone_steady_scenario() {
        let a = analyzed("20:00@UT1");
        assert!(a.valid);
        assert_eq!(a.canonical_text, "20:00 UT1");
        assert_eq!(a.duration_seconds, Some(1200));
    }

    #[test]
    fn test_duplicate_warmup_tag_is_invalid() {
        let a = analyzed("[w]5:00 + [w]5:00");
        assert!(!a.valid);
        let dups: Vec<_> = a
            .diagnostics
            .iter()
            .filter(|d| d.code == "duplicate_tag")
            .collect();
        assert_eq!(dups.len(), 1);
        // The finding points at the second tag.
        assert_eq!(dups[0].span.start, "[w]5:00 + ".len());
    }

    #[test]
    fn test_guidance_collision_is_a_parse_error() {
        let source = "4x500m/1:00r@r20@2:05";
        let err = analyze(source).expect_err("should reject");
        match err {
            NotationError::Parse(e) => {
                // Points at the second '@'.
                assert_eq!(e.position, source.rfind('@').expect("has @"));
            }
            other => panic!("Expected ParseError, got {:?}", other),
        }
    }

    #[test]
    fn test_shorthand_then_explicit_guidance_rejected() {
        let err = analyze("30:00r20@2:05").expect_err("should reject");
        assert_eq!(err.position(), "30:00r20".len());
    }

    #[test]
    fn test_shorthand_and_explicit_rate_agree() {
        let shorthand = analyzed("30:00r20");
        let explicit = analyzed("30:00@r20");
        assert_eq!(shorthand.canonical_text, explicit.canonical_text);
        assert_eq!(shorthand.display_name, explicit.display_name);
        match (&shorthand.segments[0], &explicit.segments[0]) {
            (Segment::Steady { guidance: a, .. }, Segment::Steady { guidance: b, .. }) => {
                assert_eq!(a[0].target, b[0].target);
            }
            other => panic!("Expected two Steady segments, got {:?}", other),
        }
    }

    #[test]
    fn test_canonical_text_is_a_fixed_point() {
        let corpus = [
            "4x500m/1:00r",
            "8x1:00/1:00r",
            "10000m",
            "20:00@UT1",
            "5000m@2k+10",
            "30:00@18..22spm",
            "60:00@2:05..2:10",
            "[w]10:00 + 5x500m/1:00r + [c]5:00",
            "[w]5:00 + 5:00@r20 + 5:00@r22 + 5:00@r24 + 5:00@r22 + [c]5:00",
            "30:00r20",
            "(2000m+1000m+500m)/3:00r",
            "3x(750m/3:00r + 500m/3:00r)",
            "Bike: 15000m",
            "Ski: 8x500m/3:30r",
            "[w]Row: 5:00 + Row: 2000m + Bike: 5000m + Ski: 2000m + [c]Row: 5:00",
            "[w]Row: 10:00 + 3x(Row: 2000m/2:00r + Bike: 5000m/2:00r + Run: 800m/2:00r) + [c]Row: 5:00",
            "#warmup 10:00 + #test 2000m",
            "4x500m/Bike: 1:00r",
        ];
        for source in corpus {
            let once = analyzed(source);
            let twice = analyzed(&once.canonical_text);
            assert_eq!(
                once.canonical_text, twice.canonical_text,
                "canonical form of {:?} is not a fixed point",
                source
            );
        }
    }

    #[test]
    fn test_identical_input_identical_output() {
        let a = analyzed("[w]10:00 + 5x500m/1:00r + [c]5:00");
        let b = analyzed("[w]10:00 + 5x500m/1:00r + [c]5:00");
        assert_eq!(a, b);
    }

    #[test]
    fn test_equal_range_bounds_normalize_to_absolute() {
        let rate = analyzed("30:00@18..18spm");
        match &rate.segments[0] {
            Segment::Steady { guidance, .. } => {
                assert_eq!(guidance[0].target, GuidanceTarget::RateAbsolute { spm: 18 });
            }
            other => panic!("Expected Steady, got {:?}", other),
        }

        let pace = analyzed("2000m@2:05..2:05");
        match &pace.segments[0] {
            Segment::Steady { guidance, .. } => {
                assert_eq!(
                    guidance[0].target,
                    GuidanceTarget::PaceAbsolute { split_seconds: 125 }
                );
            }
            other => panic!("Expected Steady, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_repeat_parses_but_is_invalid() {
        let a = analyzed("0x500m/1:00r");
        assert!(!a.valid);
        assert!(a.diagnostics.iter().any(|d| d.code == "invalid_repeat_count"));
    }

    #[test]
    fn test_grouped_repeat_shape() {
        let a = analyzed("3x(750m/3:00r + 500m/3:00r)");
        assert!(a.valid);
        assert_eq!(a.segments.len(), 1);
        match &a.segments[0] {
            Segment::Group { repeat, body, .. } => {
                assert_eq!(*repeat, 3);
                assert_eq!(body.len(), 2);
                assert!(body
                    .iter()
                    .all(|s| matches!(s, Segment::Interval { repeat: 1, .. })));
            }
            other => panic!("Expected Group, got {:?}", other),
        }
    }

    #[test]
    fn test_errors_rank_before_warnings() {
        // A mixed-modality warning early in the text, a duplicate-tag error
        // later: the error still comes first.
        let a = analyzed("[w]4x500m/Bike: 1:00r + [w]5:00");
        assert!(!a.valid);
        assert!(a.diagnostics.len() >= 2);
        assert!(a.diagnostics[0].is_error());
        assert_eq!(a.diagnostics[0].code, "duplicate_tag");
    }

    #[test]
    fn test_lex_error_reports_offset() {
        let err = analyze("4x500m/1:00r & 5:00").expect_err("should reject");
        match err {
            NotationError::Lex(e) => assert_eq!(e.position(), 13),
            other => panic!("Expected LexError, got {:?}", other),
        }
    }
}
