//! Parser tests - verify tokenization, parsing, and AST structure
//!
//! These tests check the front half of the pipeline only: raw notation to
//! AST. Guidance normalization, validation, and canonicalization are tested
//! next to their own modules.

use super::ast::{Modality, Quantity, Segment, TagKind};
use super::guidance::{GuidanceTarget, Zone};
use super::tokenizer::{tokenize, LexError, Token, TokenKind};
use super::{parse, ParseError};

fn tokens(source: &str) -> Vec<Token> {
    tokenize(source).expect("should tokenize")
}

fn kinds(source: &str) -> Vec<TokenKind> {
    tokens(source).into_iter().map(|t| t.kind).collect()
}

fn first_segment(source: &str) -> Segment {
    let workout = parse(&tokens(source)).expect("should parse");
    workout.segments.into_iter().next().expect("has a segment")
}

/* ===================== Tokenizer Tests ===================== */

#[test]
fn test_tokenize_basic_interval() {
    assert_eq!(
        kinds("4x500m/1:00r"),
        vec![
            TokenKind::Number(4),
            TokenKind::RepeatX,
            TokenKind::Number(500),
            TokenKind::UnitMeters,
            TokenKind::Slash,
            TokenKind::Time(60),
            TokenKind::RestMarker,
        ]
    );
}

#[test]
fn test_tokenize_times() {
    assert_eq!(kinds("2:05"), vec![TokenKind::Time(125)]);
    assert_eq!(kinds("30:00"), vec![TokenKind::Time(1800)]);
    assert_eq!(kinds("1:00:00"), vec![TokenKind::Time(3600)]);
    // 60:00 is valid mm:ss input; canonicalization rewrites it.
    assert_eq!(kinds("60:00"), vec![TokenKind::Time(3600)]);
}

#[test]
fn test_tokenize_rate_forms() {
    assert_eq!(kinds("r20"), vec![TokenKind::Rate(20)]);
    assert_eq!(kinds("22spm"), vec![TokenKind::Rate(22)]);
    assert_eq!(
        kinds("18..22spm"),
        vec![TokenKind::Number(18), TokenKind::Range, TokenKind::Rate(22)]
    );
}

#[test]
fn test_tokenize_rest_marker_vs_rate() {
    // `r` followed by a digit is shorthand; bare `r` terminates a rest.
    assert_eq!(
        kinds("1:00r"),
        vec![TokenKind::Time(60), TokenKind::RestMarker]
    );
    assert_eq!(
        kinds("30:00r20"),
        vec![TokenKind::Time(1800), TokenKind::Rate(20)]
    );
}

#[test]
fn test_tokenize_anchors_and_offsets() {
    assert_eq!(
        kinds("@2k+10"),
        vec![
            TokenKind::At,
            TokenKind::Anchor("2k".to_string()),
            TokenKind::Plus,
            TokenKind::Number(10),
        ]
    );
    assert_eq!(
        kinds("@5k-2"),
        vec![
            TokenKind::At,
            TokenKind::Anchor("5k".to_string()),
            TokenKind::Minus,
            TokenKind::Number(2),
        ]
    );
}

#[test]
fn test_tokenize_zone_labels_case_insensitive() {
    assert_eq!(kinds("UT2"), vec![TokenKind::Zone(Zone::Ut2)]);
    assert_eq!(kinds("ut1"), vec![TokenKind::Zone(Zone::Ut1)]);
    assert_eq!(kinds("at"), vec![TokenKind::Zone(Zone::At)]);
    assert_eq!(kinds("Tr"), vec![TokenKind::Zone(Zone::Tr)]);
    assert_eq!(kinds("AN"), vec![TokenKind::Zone(Zone::An)]);
}

#[test]
fn test_tokenize_modality_prefixes_case_insensitive() {
    assert_eq!(
        kinds("Bike: 500m"),
        vec![
            TokenKind::Modality(Modality::Bike),
            TokenKind::Number(500),
            TokenKind::UnitMeters,
        ]
    );
    assert_eq!(kinds("row:"), vec![TokenKind::Modality(Modality::Row)]);
    assert_eq!(kinds("OTHER:"), vec![TokenKind::Modality(Modality::Other)]);
}

#[test]
fn test_tokenize_tags() {
    assert_eq!(kinds("[w]"), vec![TokenKind::Tag(TagKind::Warmup)]);
    assert_eq!(kinds("[c]"), vec![TokenKind::Tag(TagKind::Cooldown)]);
    assert_eq!(kinds("[t]"), vec![TokenKind::Tag(TagKind::Test)]);
    assert_eq!(kinds("#warmup"), vec![TokenKind::Tag(TagKind::Warmup)]);
    assert_eq!(kinds("#cooldown"), vec![TokenKind::Tag(TagKind::Cooldown)]);
    assert_eq!(kinds("#test"), vec![TokenKind::Tag(TagKind::Test)]);
}

#[test]
fn test_tokenize_bracket_tags_are_case_sensitive() {
    let err = tokenize("[W]5:00").expect_err("should reject");
    assert_eq!(
        err,
        LexError::UnexpectedChar {
            position: 0,
            unexpected: '[',
        }
    );
}

#[test]
fn test_tokenize_calories() {
    assert_eq!(
        kinds("300cal"),
        vec![TokenKind::Number(300), TokenKind::UnitCalories]
    );
}

#[test]
fn test_tokens_carry_source_offsets() {
    let tokens = tokens("4x500m");
    let spans: Vec<(usize, usize)> = tokens.iter().map(|t| (t.span.start, t.span.end)).collect();
    assert_eq!(spans, vec![(0, 1), (1, 2), (2, 5), (5, 6)]);
    assert_eq!(tokens[2].text, "500");
}

#[test]
fn test_tokenize_unexpected_character() {
    let err = tokenize("500m & 2:00").expect_err("should reject");
    assert_eq!(
        err,
        LexError::UnexpectedChar {
            position: 5,
            unexpected: '&',
        }
    );
}

#[test]
fn test_tokenize_malformed_times() {
    assert!(matches!(
        tokenize("1:5"),
        Err(LexError::MalformedTime { position: 0 })
    ));
    assert!(matches!(
        tokenize("1:75"),
        Err(LexError::MalformedTime { position: 0 })
    ));
    assert!(matches!(
        tokenize("1:00:300"),
        Err(LexError::MalformedTime { position: 0 })
    ));
}

#[test]
fn test_tokenize_single_dot_is_rejected() {
    // Longest match: `..` is a range, a lone `.` starts nothing.
    assert!(kinds("2:05..2:10").contains(&TokenKind::Range));
    assert!(matches!(
        tokenize("2:05.2:10"),
        Err(LexError::UnexpectedChar { position: 4, .. })
    ));
}

/* ===================== Parser Tests ===================== */

#[test]
fn test_parse_steady_distance() {
    match first_segment("10000m") {
        Segment::Steady {
            modality,
            quantity,
            tag,
            guidance,
            ..
        } => {
            assert_eq!(modality, Modality::Row);
            assert_eq!(quantity, Quantity::Distance { meters: 10000 });
            assert!(tag.is_none());
            assert!(guidance.is_empty());
        }
        other => panic!("Expected Steady, got {:?}", other),
    }
}

#[test]
fn test_parse_interval() {
    match first_segment("4x500m/1:00r") {
        Segment::Interval {
            work,
            repeat,
            rest,
            ..
        } => {
            assert_eq!(repeat, 4);
            assert_eq!(work, Quantity::Distance { meters: 500 });
            let rest = rest.expect("has rest");
            assert_eq!(rest.quantity, Quantity::Time { seconds: 60 });
            assert!(rest.modality.is_none());
        }
        other => panic!("Expected Interval, got {:?}", other),
    }
}

#[test]
fn test_parse_chain() {
    let workout = parse(&tokens("[w]10:00 + 5x500m/1:00r + [c]5:00")).expect("should parse");
    assert_eq!(workout.segments.len(), 3);
    assert_eq!(
        workout.segments[0].tag().map(|t| t.kind),
        Some(TagKind::Warmup)
    );
    assert!(matches!(workout.segments[1], Segment::Interval { .. }));
    assert_eq!(
        workout.segments[2].tag().map(|t| t.kind),
        Some(TagKind::Cooldown)
    );
}

#[test]
fn test_parse_variable_with_group_rest() {
    match first_segment("(2000m+1000m+500m)/3:00r") {
        Segment::Variable {
            children,
            group_rest,
            ..
        } => {
            assert_eq!(children.len(), 3);
            assert!(children.iter().all(|c| matches!(c, Segment::Steady { .. })));
            let rest = group_rest.expect("has group rest");
            assert_eq!(rest.quantity, Quantity::Time { seconds: 180 });
        }
        other => panic!("Expected Variable, got {:?}", other),
    }
}

#[test]
fn test_parse_grouped_repeat() {
    match first_segment("3x(750m/3:00r + 500m/3:00r)") {
        Segment::Group {
            repeat,
            body,
            group_rest,
            ..
        } => {
            assert_eq!(repeat, 3);
            assert_eq!(body.len(), 2);
            assert!(group_rest.is_none());
        }
        other => panic!("Expected Group, got {:?}", other),
    }
}

#[test]
fn test_parse_group_rest_is_distinct_from_inner_rests() {
    match first_segment("3x(750m/3:00r + 500m)/5:00r") {
        Segment::Group {
            body, group_rest, ..
        } => {
            let rest = group_rest.expect("has group rest");
            assert_eq!(rest.quantity, Quantity::Time { seconds: 300 });
            assert!(matches!(
                body[0],
                Segment::Interval { repeat: 1, rest: Some(_), .. }
            ));
            assert!(matches!(body[1], Segment::Steady { .. }));
        }
        other => panic!("Expected Group, got {:?}", other),
    }
}

#[test]
fn test_repeat_binds_tighter_than_chain() {
    let workout = parse(&tokens("3x(500m/1:00r) + 5:00")).expect("should parse");
    assert_eq!(workout.segments.len(), 2);
    assert!(matches!(workout.segments[0], Segment::Group { repeat: 3, .. }));
    assert!(matches!(workout.segments[1], Segment::Steady { .. }));
}

#[test]
fn test_modality_inherited_through_repeat() {
    match first_segment("Ski: 8x500m/3:30r") {
        Segment::Interval {
            modality, repeat, ..
        } => {
            assert_eq!(modality, Modality::Ski);
            assert_eq!(repeat, 8);
        }
        other => panic!("Expected Interval, got {:?}", other),
    }
}

#[test]
fn test_modality_overridden_inside_group() {
    match first_segment("Bike: 2x(500m + Row: 2:00)") {
        Segment::Group { body, .. } => {
            assert!(
                matches!(body[0], Segment::Steady { modality: Modality::Bike, .. }),
                "unprefixed child inherits the group modality"
            );
            assert!(matches!(
                body[1],
                Segment::Steady { modality: Modality::Row, .. }
            ));
        }
        other => panic!("Expected Group, got {:?}", other),
    }
}

#[test]
fn test_rest_modality_prefix() {
    match first_segment("4x500m/Bike: 1:00r") {
        Segment::Interval { rest, .. } => {
            let rest = rest.expect("has rest");
            assert_eq!(rest.modality, Some(Modality::Bike));
        }
        other => panic!("Expected Interval, got {:?}", other),
    }
}

#[test]
fn test_single_repeat_normalizes_away() {
    assert!(matches!(first_segment("1x500m"), Segment::Steady { .. }));
    assert!(matches!(
        first_segment("1x500m/1:00r"),
        Segment::Interval { repeat: 1, .. }
    ));
    assert!(matches!(
        first_segment("1x(500m + 2:00)"),
        Segment::Variable { .. }
    ));
}

#[test]
fn test_guidance_attaches_to_its_atom_only() {
    let workout = parse(&tokens("5:00@r20 + 5:00")).expect("should parse");
    assert_eq!(workout.segments[0].guidance().len(), 1);
    assert!(
        workout.segments[1].guidance().is_empty(),
        "guidance must not propagate to chain siblings"
    );
}

#[test]
fn test_guidance_forms() {
    let cases = [
        ("2000m@r24", GuidanceTarget::RateAbsolute { spm: 24 }),
        (
            "30:00@18..22spm",
            GuidanceTarget::RateRange { low: 18, high: 22 },
        ),
        (
            "30:00@r18..22",
            GuidanceTarget::RateRange { low: 18, high: 22 },
        ),
        (
            "2000m@2:05",
            GuidanceTarget::PaceAbsolute { split_seconds: 125 },
        ),
        (
            "60:00@2:05..2:10",
            GuidanceTarget::PaceRange {
                low_seconds: 125,
                high_seconds: 130,
            },
        ),
        (
            "5000m@2k+10",
            GuidanceTarget::PaceRelative {
                anchor: "2k".to_string(),
                offset_seconds: 10,
            },
        ),
        (
            "5000m@5k-2",
            GuidanceTarget::PaceRelative {
                anchor: "5k".to_string(),
                offset_seconds: -2,
            },
        ),
        (
            "2000m@6k",
            GuidanceTarget::PaceRelative {
                anchor: "6k".to_string(),
                offset_seconds: 0,
            },
        ),
        (
            "20:00@UT1",
            GuidanceTarget::ZoneLabel { zone: Zone::Ut1 },
        ),
    ];
    for (source, expected) in cases {
        match first_segment(source) {
            Segment::Steady { guidance, .. } => {
                assert_eq!(guidance.len(), 1, "{source}");
                assert_eq!(guidance[0].target, expected, "{source}");
            }
            other => panic!("Expected Steady for {:?}, got {:?}", source, other),
        }
    }
}

#[test]
fn test_interval_guidance_after_rest() {
    match first_segment("4x500m/1:00r@r20") {
        Segment::Interval { guidance, .. } => {
            assert_eq!(guidance.len(), 1);
            assert_eq!(guidance[0].target, GuidanceTarget::RateAbsolute { spm: 20 });
        }
        other => panic!("Expected Interval, got {:?}", other),
    }
}

/* ===================== Parse Error Tests ===================== */

fn parse_err(source: &str) -> ParseError {
    parse(&tokens(source)).expect_err("should reject")
}

#[test]
fn test_empty_input_is_rejected() {
    let err = parse(&[]).expect_err("should reject");
    assert_eq!(err.found, "end of input");
}

#[test]
fn test_empty_group_is_a_parse_error() {
    let err = parse_err("3x()");
    assert_eq!(err.position, 3);
    assert_eq!(err.found, "')'");
}

#[test]
fn test_number_without_unit() {
    let err = parse_err("500 + 2:00");
    assert_eq!(err.expected, "'m' or 'cal' after a number");
}

#[test]
fn test_unclosed_group() {
    let err = parse_err("(500m + 2:00");
    assert_eq!(err.found, "end of input");
}

#[test]
fn test_second_guidance_is_rejected_at_its_introducer() {
    let err = parse_err("500m@r20@2:05");
    assert_eq!(err.position, 8);
    assert_eq!(err.expected, "end of segment");
    assert_eq!(err.found, "'@'");
}

#[test]
fn test_repeated_calories_are_rejected() {
    let err = parse_err("4x300cal/1:00r");
    assert_eq!(err.expected, "a distance or time work quantity");
}

#[test]
fn test_double_tag_is_rejected() {
    let err = parse_err("[w][c]5:00");
    assert_eq!(err.position, 3);
}

#[test]
fn test_missing_rest_marker() {
    let err = parse_err("4x500m/1:00");
    assert_eq!(err.expected, "'r' after the rest duration");
    assert_eq!(err.found, "end of input");
}
