//! AST node types for parsed workout notation

use serde::{Deserialize, Serialize};

use super::guidance::Guidance;

/// Source location span for error reporting and playground highlighting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Span {
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a span that covers both self and other
    pub fn merge(&self, other: &Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

/// Equipment modality for a segment.
///
/// Defaults to `Row` when unspecified and is inherited by nested segments
/// unless overridden by an explicit prefix (`Bike: 5000m`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Modality {
    #[default]
    Row,
    Bike,
    Ski,
    Run,
    Other,
}

impl Modality {
    /// Canonical spelling, as used in notation prefixes.
    pub fn label(&self) -> &'static str {
        match self {
            Modality::Row => "Row",
            Modality::Bike => "Bike",
            Modality::Ski => "Ski",
            Modality::Run => "Run",
            Modality::Other => "Other",
        }
    }

    /// Case-insensitive lookup of a modality name.
    pub fn from_name(name: &str) -> Option<Modality> {
        match name.to_ascii_lowercase().as_str() {
            "row" => Some(Modality::Row),
            "bike" => Some(Modality::Bike),
            "ski" => Some(Modality::Ski),
            "run" => Some(Modality::Run),
            "other" => Some(Modality::Other),
            _ => None,
        }
    }
}

/// A measured amount of work or rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Quantity {
    Distance { meters: u32 },
    Time { seconds: u32 },
    Calories { calories: u32 },
}

/// Block tag kind. `[w]`/`[c]`/`[t]` in current notation, `#warmup` etc.
/// in legacy notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    Warmup,
    Cooldown,
    Test,
}

/// A tag attached to a segment, with the source position of the tag itself
/// (duplicate-tag diagnostics point at the offending tag, not the segment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub kind: TagKind,
    pub span: Span,
}

/// Rest portion of an interval or group.
///
/// `modality` is `None` when the rest inherits the work modality; an explicit
/// prefix (`/Bike: 1:00r`) records active recovery on different equipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modality: Option<Modality>,
    pub quantity: Quantity,
    pub span: Span,
}

impl Rest {
    /// The modality this rest is performed on, given the work modality.
    pub fn effective_modality(&self, work: Modality) -> Modality {
        self.modality.unwrap_or(work)
    }
}

/// A workout segment.
///
/// `Steady` and `Interval` are the leaves guidance can attach to. The parser
/// attaches at most one guidance per segment; the vector exists so that
/// programmatically composed workouts (template tooling) can carry more and
/// still be re-validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum Segment {
    /// A single continuous effort with no internal repeats.
    Steady {
        modality: Modality,
        quantity: Quantity,
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<Tag>,
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        guidance: Vec<Guidance>,
        span: Span,
    },
    /// A repeated work/rest pair. `repeat` is 1 for a bare work/rest pair
    /// (`750m/3:00r`); written `1x` repeats are normalized away at parse.
    Interval {
        modality: Modality,
        work: Quantity,
        repeat: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        rest: Option<Rest>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<Tag>,
        #[serde(skip_serializing_if = "Vec::is_empty", default)]
        guidance: Vec<Guidance>,
        span: Span,
    },
    /// A parenthesized chain of heterogeneous segments, optionally wrapped
    /// by a shared rest: `(2000m + 1000m + 500m)/3:00r`.
    Variable {
        children: Vec<Segment>,
        #[serde(skip_serializing_if = "Option::is_none")]
        group_rest: Option<Rest>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<Tag>,
        span: Span,
    },
    /// A chain repeated N times: `3x(750m/3:00r + 500m/3:00r)`. Unrolls
    /// conceptually into N copies joined by `+`, but is never flattened.
    Group {
        repeat: u32,
        body: Vec<Segment>,
        #[serde(skip_serializing_if = "Option::is_none")]
        group_rest: Option<Rest>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tag: Option<Tag>,
        span: Span,
    },
}

impl Segment {
    pub fn span(&self) -> Span {
        match self {
            Segment::Steady { span, .. }
            | Segment::Interval { span, .. }
            | Segment::Variable { span, .. }
            | Segment::Group { span, .. } => *span,
        }
    }

    pub fn tag(&self) -> Option<&Tag> {
        match self {
            Segment::Steady { tag, .. }
            | Segment::Interval { tag, .. }
            | Segment::Variable { tag, .. }
            | Segment::Group { tag, .. } => tag.as_ref(),
        }
    }

    /// Guidance attached to this segment. Empty for `Variable`/`Group`,
    /// which the grammar gives no way to annotate.
    pub fn guidance(&self) -> &[Guidance] {
        match self {
            Segment::Steady { guidance, .. } | Segment::Interval { guidance, .. } => guidance,
            Segment::Variable { .. } | Segment::Group { .. } => &[],
        }
    }
}

/// A parsed workout: the top-level chain of segments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workout {
    pub segments: Vec<Segment>,
    pub span: Span,
}
