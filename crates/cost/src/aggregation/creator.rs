//! Creator resolution from resource tags.

use std::collections::HashMap;

/// Tag keys that may name a resource's creator, highest priority first.
///
/// Matching is exact and case-sensitive; the case variants are listed
/// explicitly.
pub const CREATOR_TAG_KEYS: [&str; 6] = [
    "CreatedBy",
    "createdBy",
    "Owner",
    "owner",
    "Creator",
    "creator",
];

/// Creator used when no tag identifies one.
pub const UNKNOWN_CREATOR: &str = "Unknown";

/// Resolve the creator of a resource from its tags.
///
/// Returns the trimmed value of the first key in [`CREATOR_TAG_KEYS`] that is
/// present with a non-blank value, or [`UNKNOWN_CREATOR`].
#[must_use]
pub fn resolve_creator(tags: &HashMap<String, String>) -> &str {
    CREATOR_TAG_KEYS
        .iter()
        .filter_map(|key| tags.get(*key))
        .map(|value| value.trim())
        .find(|value| !value.is_empty())
        .unwrap_or(UNKNOWN_CREATOR)
}
