//! Field normalization helpers shared by submission and search.

/// Trim and uppercase a raw acronym for use as a store key.
pub fn normalize_acronym(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Trim a field, returning `None` when nothing remains.
pub fn normalized_field(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trim an optional field, dropping it entirely when blank.
pub fn normalized_optional(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalized_field)
}

/// Case-insensitive substring test.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_uppercase().contains(&needle.to_uppercase())
}

/// Case-insensitive prefix test.
pub fn starts_with_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_uppercase().starts_with(&needle.to_uppercase())
}
