//! Text cleanup for extracted display names

use crate::utils::normalize_whitespace;

/// Boilerplate stripped from candidate names, applied in this order
pub const NAME_BOILERPLATE: &[&str] = &[
    "Join the beta -",
    "Beta -",
    "TestFlight -",
    "- TestFlight",
    "Beta",
];

/// Clean a candidate display name
///
/// Whitespace is collapsed first so markup line breaks do not hide the
/// boilerplate, then the first occurrence of each fragment in
/// [`NAME_BOILERPLATE`] is removed and the result trimmed.
///
/// # Examples
///
/// ```
/// use slotwatch::parser::sanitize::clean_display_name;
///
/// assert_eq!(clean_display_name("Join the beta - Acme Photo Editor"), "Acme Photo Editor");
/// ```
pub fn clean_display_name(raw: &str) -> String {
    let mut name = normalize_whitespace(raw);

    for fragment in NAME_BOILERPLATE {
        name = name.replacen(fragment, "", 1);
    }

    name.trim().to_string()
}

/// Whether text mentions any of `words`, ignoring case
pub fn mentions_any(text: &str, words: &[&str]) -> bool {
    let lower = text.to_lowercase();
    words.iter().any(|word| lower.contains(word))
}
