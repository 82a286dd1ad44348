//! Canonicalization, naming, and estimation
//!
//! Reduces a parsed workout to its canonical textual form, a human-readable
//! display name, and duration/work estimates. Canonical text is the unique
//! machine rendering and a fixed point: parsing it and canonicalizing again
//! yields the same string. This is also the single place legacy syntax
//! (`#warmup`, rate shorthand) is normalized away.
//!
//! Estimates never fabricate totals: if any contained segment's duration is
//! unknown (distance without an absolute pace, calories, unresolved
//! anchors), every ancestor's total is `None`. No partial sums.

use serde::Serialize;

use crate::parser::ast::{Modality, Quantity, Rest, Segment, Tag, TagKind, Workout};
use crate::parser::guidance::{Guidance, GuidanceTarget};

/// Rest placement policy: `n` repetitions incur `n - 1` rests (no rest
/// after the final repetition). Applies to intervals, variable chains, and
/// grouped repeats alike. Flipping this constant changes estimation only,
/// never the grammar.
pub const REST_BETWEEN_REPEATS_ONLY: bool = true;

/// Canonicalization output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Canonical {
    /// Machine form, the unique normalized rendering
    pub text: String,
    /// Human-readable name, e.g. `WU + 5x 500m + CD`
    pub display_name: String,
    /// Total seconds, `None` when any part is not computable
    pub duration_seconds: Option<u32>,
    /// Total work meters, `None` when any work is not distance-measured
    pub work_meters: Option<u32>,
}

/// Canonicalize a resolved workout.
pub fn canonicalize(workout: &Workout) -> Canonical {
    let text = workout
        .segments
        .iter()
        .map(|s| canonical_segment(s, Modality::Row))
        .collect::<Vec<_>>()
        .join(" + ");
    let display_name = workout
        .segments
        .iter()
        .map(|s| display_segment(s, Modality::Row))
        .collect::<Vec<_>>()
        .join(" + ");

    let duration_seconds = workout
        .segments
        .iter()
        .try_fold(0u64, |acc, s| Some(acc + segment_duration(s)?))
        .and_then(|total| u32::try_from(total).ok());
    let work_meters = workout
        .segments
        .iter()
        .try_fold(0u64, |acc, s| Some(acc + segment_meters(s)?))
        .and_then(|total| u32::try_from(total).ok());

    Canonical {
        text,
        display_name,
        duration_seconds,
        work_meters,
    }
}

/* ===================== Canonical text ===================== */

fn canonical_segment(segment: &Segment, inherited: Modality) -> String {
    match segment {
        Segment::Steady {
            modality,
            quantity,
            tag,
            guidance,
            ..
        } => {
            let mut out = String::new();
            push_tag(&mut out, tag);
            push_modality(&mut out, *modality, inherited);
            out.push_str(&canonical_quantity(quantity));
            push_guidance(&mut out, guidance);
            out
        }
        Segment::Interval {
            modality,
            work,
            repeat,
            rest,
            tag,
            guidance,
            ..
        } => {
            let mut out = String::new();
            push_tag(&mut out, tag);
            push_modality(&mut out, *modality, inherited);
            if *repeat != 1 {
                out.push_str(&repeat.to_string());
                out.push('x');
            }
            out.push_str(&canonical_quantity(work));
            if let Some(rest) = rest {
                out.push_str(&canonical_rest(rest, *modality));
            }
            push_guidance(&mut out, guidance);
            out
        }
        Segment::Variable {
            children,
            group_rest,
            tag,
            ..
        } => {
            let mut out = String::new();
            push_tag(&mut out, tag);
            out.push('(');
            out.push_str(&join_canonical(children, inherited));
            out.push(')');
            if let Some(rest) = group_rest {
                out.push_str(&canonical_rest(rest, inherited));
            }
            out
        }
        Segment::Group {
            repeat,
            body,
            group_rest,
            tag,
            ..
        } => {
            let mut out = String::new();
            push_tag(&mut out, tag);
            out.push_str(&repeat.to_string());
            out.push_str("x(");
            out.push_str(&join_canonical(body, inherited));
            out.push(')');
            if let Some(rest) = group_rest {
                out.push_str(&canonical_rest(rest, inherited));
            }
            out
        }
    }
}

fn join_canonical(segments: &[Segment], inherited: Modality) -> String {
    segments
        .iter()
        .map(|s| canonical_segment(s, inherited))
        .collect::<Vec<_>>()
        .join(" + ")
}

fn push_tag(out: &mut String, tag: &Option<Tag>) {
    if let Some(tag) = tag {
        out.push_str(match tag.kind {
            TagKind::Warmup => "[w]",
            TagKind::Cooldown => "[c]",
            TagKind::Test => "[t]",
        });
    }
}

fn push_modality(out: &mut String, modality: Modality, inherited: Modality) {
    if modality != inherited {
        out.push_str(modality.label());
        out.push_str(": ");
    }
}

fn push_guidance(out: &mut String, guidance: &[Guidance]) {
    for g in guidance {
        out.push(' ');
        out.push_str(&canonical_guidance(&g.target));
    }
}

fn canonical_quantity(quantity: &Quantity) -> String {
    match quantity {
        Quantity::Distance { meters } => format!("{meters}m"),
        Quantity::Time { seconds } => format_time(*seconds),
        Quantity::Calories { calories } => format!("{calories}cal"),
    }
}

fn canonical_rest(rest: &Rest, work_modality: Modality) -> String {
    let mut out = String::from("/");
    if let Some(modality) = rest.modality {
        if modality != work_modality {
            out.push_str(modality.label());
            out.push_str(": ");
        }
    }
    out.push_str(&canonical_quantity(&rest.quantity));
    out.push('r');
    out
}

fn canonical_guidance(target: &GuidanceTarget) -> String {
    match target {
        GuidanceTarget::RateAbsolute { spm } => format!("@r{spm}"),
        GuidanceTarget::RateRange { low, high } => format!("@r{low}..{high}"),
        GuidanceTarget::PaceAbsolute { split_seconds } => {
            format!("@{}", format_time(*split_seconds))
        }
        GuidanceTarget::PaceRange {
            low_seconds,
            high_seconds,
        } => format!("@{}..{}", format_time(*low_seconds), format_time(*high_seconds)),
        GuidanceTarget::PaceRelative {
            anchor,
            offset_seconds,
        } => {
            if *offset_seconds > 0 {
                format!("@{anchor}+{offset_seconds}")
            } else if *offset_seconds < 0 {
                format!("@{anchor}-{}", offset_seconds.unsigned_abs())
            } else {
                format!("@{anchor}")
            }
        }
        GuidanceTarget::ZoneLabel { zone } => zone.as_str().to_string(),
    }
}

/// `m:ss`, or `h:mm:ss` from one hour up, zero-padded.
fn format_time(total_seconds: u32) -> String {
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

/* ===================== Display name ===================== */

fn display_segment(segment: &Segment, inherited: Modality) -> String {
    // Warmup/cooldown blocks collapse to their role in the name.
    match segment.tag().map(|t| t.kind) {
        Some(TagKind::Warmup) => return "WU".to_string(),
        Some(TagKind::Cooldown) => return "CD".to_string(),
        Some(TagKind::Test) => return format!("Test {}", display_body(segment, inherited)),
        None => {}
    }
    display_body(segment, inherited)
}

fn display_body(segment: &Segment, inherited: Modality) -> String {
    match segment {
        Segment::Steady {
            modality,
            quantity,
            guidance,
            ..
        } => {
            let mut out = String::new();
            push_display_modality(&mut out, *modality, inherited);
            out.push_str(&display_quantity(quantity));
            for g in guidance {
                out.push_str(&display_guidance(&g.target));
            }
            out
        }
        Segment::Interval {
            modality,
            work,
            repeat,
            guidance,
            ..
        } => {
            let mut out = String::new();
            push_display_modality(&mut out, *modality, inherited);
            if *repeat != 1 {
                out.push_str(&repeat.to_string());
                out.push_str("x ");
            }
            out.push_str(&display_quantity(work));
            for g in guidance {
                out.push_str(&display_guidance(&g.target));
            }
            out
        }
        Segment::Variable { children, .. } => children
            .iter()
            .map(|c| display_segment(c, inherited))
            .collect::<Vec<_>>()
            .join(" + "),
        Segment::Group { repeat, body, .. } => {
            let inner = body
                .iter()
                .map(|c| display_segment(c, inherited))
                .collect::<Vec<_>>()
                .join(" + ");
            format!("{repeat}x ({inner})")
        }
    }
}

fn push_display_modality(out: &mut String, modality: Modality, inherited: Modality) {
    if modality != inherited {
        out.push_str(modality.label());
        out.push(' ');
    }
}

fn display_quantity(quantity: &Quantity) -> String {
    match quantity {
        Quantity::Distance { meters } => format!("{}m", with_thousands(*meters)),
        Quantity::Time { seconds } => format_time(*seconds),
        Quantity::Calories { calories } => format!("{calories}cal"),
    }
}

fn display_guidance(target: &GuidanceTarget) -> String {
    match target {
        GuidanceTarget::RateAbsolute { spm } => format!(" @r{spm}"),
        GuidanceTarget::RateRange { low, high } => format!(" r{low}-{high}"),
        GuidanceTarget::PaceAbsolute { split_seconds } => {
            format!(" @{}", format_time(*split_seconds))
        }
        GuidanceTarget::PaceRange {
            low_seconds,
            high_seconds,
        } => format!(" @{}-{}", format_time(*low_seconds), format_time(*high_seconds)),
        GuidanceTarget::PaceRelative {
            anchor,
            offset_seconds,
        } => {
            if *offset_seconds > 0 {
                format!(" @{anchor}+{offset_seconds}")
            } else if *offset_seconds < 0 {
                format!(" @{anchor}-{}", offset_seconds.unsigned_abs())
            } else {
                format!(" @{anchor}")
            }
        }
        GuidanceTarget::ZoneLabel { zone } => format!(" {}", zone.as_str()),
    }
}

fn with_thousands(value: u32) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/* ===================== Estimation ===================== */

fn segment_duration(segment: &Segment) -> Option<u64> {
    match segment {
        Segment::Steady {
            quantity, guidance, ..
        } => work_duration(quantity, guidance),
        Segment::Interval {
            work,
            repeat,
            rest,
            guidance,
            ..
        } => {
            let work_seconds = work_duration(work, guidance)?;
            let rest_seconds = match rest {
                Some(rest) => rest_duration(rest)?,
                None => 0,
            };
            let repeats = u64::from(*repeat);
            Some(repeats * work_seconds + rest_count(repeats) * rest_seconds)
        }
        Segment::Variable {
            children,
            group_rest,
            ..
        } => {
            let total = children
                .iter()
                .try_fold(0u64, |acc, c| Some(acc + segment_duration(c)?))?;
            let rest_seconds = match group_rest {
                Some(rest) => rest_duration(rest)?,
                None => 0,
            };
            Some(total + rest_count(children.len() as u64) * rest_seconds)
        }
        Segment::Group {
            repeat,
            body,
            group_rest,
            ..
        } => {
            let body_total = body
                .iter()
                .try_fold(0u64, |acc, c| Some(acc + segment_duration(c)?))?;
            let rest_seconds = match group_rest {
                Some(rest) => rest_duration(rest)?,
                None => 0,
            };
            let repeats = u64::from(*repeat);
            Some(repeats * body_total + rest_count(repeats) * rest_seconds)
        }
    }
}

fn rest_count(repeats: u64) -> u64 {
    if REST_BETWEEN_REPEATS_ONLY {
        repeats.saturating_sub(1)
    } else {
        repeats
    }
}

/// Duration of one work quantity. Time is literal; distance is computable
/// only under an absolute pace guidance (split seconds per 500m); ranges,
/// anchors, and zones need athlete data this crate never sees.
fn work_duration(quantity: &Quantity, guidance: &[Guidance]) -> Option<u64> {
    match quantity {
        Quantity::Time { seconds } => Some(u64::from(*seconds)),
        Quantity::Calories { .. } => None,
        Quantity::Distance { meters } => {
            let split = guidance.iter().find_map(|g| match g.target {
                GuidanceTarget::PaceAbsolute { split_seconds } => Some(u64::from(split_seconds)),
                _ => None,
            })?;
            Some((u64::from(*meters) * split + 250) / 500)
        }
    }
}

fn rest_duration(rest: &Rest) -> Option<u64> {
    match rest.quantity {
        Quantity::Time { seconds } => Some(u64::from(seconds)),
        Quantity::Distance { .. } | Quantity::Calories { .. } => None,
    }
}

fn segment_meters(segment: &Segment) -> Option<u64> {
    match segment {
        Segment::Steady { quantity, .. } => quantity_meters(quantity),
        Segment::Interval { work, repeat, .. } => {
            Some(u64::from(*repeat) * quantity_meters(work)?)
        }
        Segment::Variable { children, .. } => children
            .iter()
            .try_fold(0u64, |acc, c| Some(acc + segment_meters(c)?)),
        Segment::Group { repeat, body, .. } => {
            let body_total = body
                .iter()
                .try_fold(0u64, |acc, c| Some(acc + segment_meters(c)?))?;
            Some(u64::from(*repeat) * body_total)
        }
    }
}

fn quantity_meters(quantity: &Quantity) -> Option<u64> {
    match quantity {
        Quantity::Distance { meters } => Some(u64::from(*meters)),
        Quantity::Time { .. } | Quantity::Calories { .. } => None,
    }
}
