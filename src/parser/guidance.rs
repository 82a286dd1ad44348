//! Pacing, rate, and zone guidance
//!
//! Guidance is attached by the parser to the atom it trails and nothing
//! else: it never propagates to siblings in a chain, and guidance on the
//! work quantity of a repeat applies identically to every repetition.
//!
//! Targets stay symbolic where resolution needs athlete data: zone labels
//! and relative anchors (`2k+10`) are stored as written. Turning them into
//! numeric splits requires the athlete's own baseline times, which is the
//! job of downstream consumers, never this crate.

use serde::{Deserialize, Serialize};

use super::ast::{Segment, Span, Workout};

/// Training-intensity zone label, left unresolved by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Zone {
    #[serde(rename = "UT2")]
    Ut2,
    #[serde(rename = "UT1")]
    Ut1,
    #[serde(rename = "AT")]
    At,
    #[serde(rename = "TR")]
    Tr,
    #[serde(rename = "AN")]
    An,
}

impl Zone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Zone::Ut2 => "UT2",
            Zone::Ut1 => "UT1",
            Zone::At => "AT",
            Zone::Tr => "TR",
            Zone::An => "AN",
        }
    }
}

/// What dimension a guidance constrains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuidanceMode {
    Rate,
    Pace,
    Zone,
}

/// Guidance target, a closed union.
///
/// Pace values are split seconds per 500m. Relative offsets may be negative
/// (`@5k-2` is two seconds under 5k pace).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum GuidanceTarget {
    RateAbsolute { spm: u32 },
    RateRange { low: u32, high: u32 },
    PaceAbsolute { split_seconds: u32 },
    PaceRange { low_seconds: u32, high_seconds: u32 },
    PaceRelative { anchor: String, offset_seconds: i32 },
    ZoneLabel { zone: Zone },
}

impl GuidanceTarget {
    pub fn mode(&self) -> GuidanceMode {
        match self {
            GuidanceTarget::RateAbsolute { .. } | GuidanceTarget::RateRange { .. } => {
                GuidanceMode::Rate
            }
            GuidanceTarget::PaceAbsolute { .. }
            | GuidanceTarget::PaceRange { .. }
            | GuidanceTarget::PaceRelative { .. } => GuidanceMode::Pace,
            GuidanceTarget::ZoneLabel { .. } => GuidanceMode::Zone,
        }
    }
}

/// A guidance annotation with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guidance {
    pub target: GuidanceTarget,
    pub span: Span,
}

impl Guidance {
    pub fn mode(&self) -> GuidanceMode {
        self.target.mode()
    }
}

/// Resolution pass over a parsed workout.
///
/// Rebuilds the tree (nodes are never mutated in place, keeping the
/// pipeline retryable) and normalizes degenerate ranges: a range whose
/// bounds are equal collapses to the absolute target, for both rate and
/// pace. Reversed ranges are left intact for the validator to flag.
pub fn resolve_guidance(workout: Workout) -> Workout {
    let segments = workout
        .segments
        .into_iter()
        .map(resolve_segment)
        .collect();
    Workout {
        segments,
        span: workout.span,
    }
}

fn resolve_segment(segment: Segment) -> Segment {
    match segment {
        Segment::Steady {
            modality,
            quantity,
            tag,
            guidance,
            span,
        } => Segment::Steady {
            modality,
            quantity,
            tag,
            guidance: guidance.into_iter().map(normalize).collect(),
            span,
        },
        Segment::Interval {
            modality,
            work,
            repeat,
            rest,
            tag,
            guidance,
            span,
        } => Segment::Interval {
            modality,
            work,
            repeat,
            rest,
            tag,
            guidance: guidance.into_iter().map(normalize).collect(),
            span,
        },
        Segment::Variable {
            children,
            group_rest,
            tag,
            span,
        } => Segment::Variable {
            children: children.into_iter().map(resolve_segment).collect(),
            group_rest,
            tag,
            span,
        },
        Segment::Group {
            repeat,
            body,
            group_rest,
            tag,
            span,
        } => Segment::Group {
            repeat,
            body: body.into_iter().map(resolve_segment).collect(),
            group_rest,
            tag,
            span,
        },
    }
}

fn normalize(guidance: Guidance) -> Guidance {
    let target = match guidance.target {
        GuidanceTarget::RateRange { low, high } if low == high => {
            GuidanceTarget::RateAbsolute { spm: low }
        }
        GuidanceTarget::PaceRange {
            low_seconds,
            high_seconds,
        } if low_seconds == high_seconds => GuidanceTarget::PaceAbsolute {
            split_seconds: low_seconds,
        },
        other => other,
    };
    Guidance {
        target,
        span: guidance.span,
    }
}
