//! Normalization of committer identities before comparison.

/// Punctuation stripped from display names before comparing them.
const IGNORED_NAME_CHARS: &[char] = &['.', ',', ':', ';', '<', '>', '"', '\'', '\\'];

/// Lowercases `name` and removes whitespace and incidental punctuation anywhere in it.
pub fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace() && !IGNORED_NAME_CHARS.contains(c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compares two display names after [`normalize`].
pub fn equals_ignoring_formatting(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Compares two email addresses, ignoring case only.
pub fn emails_match(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
