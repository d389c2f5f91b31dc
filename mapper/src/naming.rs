//! Member name matching.
//!
//! Conventional matching compares names case-insensitively and ignores `_`
//! and `-` separators, so `first_name`, `firstName` and `FirstName` are the
//! same member. Flattening splits a destination name into segments at
//! underscores and lower-to-upper case boundaries.

/// Canonical form used for name comparison
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

pub fn names_match(left: &str, right: &str) -> bool {
    left == right || normalize(left) == normalize(right)
}

/// Split a member name into its words: `categoryName` and `category_name`
/// both become `["category", "name"]`.
pub fn split_segments(name: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;

    for c in name.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                segments.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}
