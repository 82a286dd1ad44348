//! Built-in validation rules
//!
//! One rule per file. Each rule is self-contained: it walks the AST itself
//! and produces its own diagnostics.

mod conflicting_guidance;
mod duplicate_tag;
mod empty_group;
mod invalid_range;
mod invalid_repeat_count;
mod mixed_modality;

pub use conflicting_guidance::ConflictingGuidanceRule;
pub use duplicate_tag::DuplicateTagRule;
pub use empty_group::EmptyGroupRule;
pub use invalid_range::InvalidRangeRule;
pub use invalid_repeat_count::InvalidRepeatCountRule;
pub use mixed_modality::MixedModalityRule;
