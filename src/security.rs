//! SQL identifier sanitation.
//!
//! The analyzers build their SQL by interpolating table and column names into
//! query text, so identifiers must be reduced to a safe character set before
//! they reach any analyzer. The presentation layer is expected to call
//! [`sanitize_identifier`] on user-supplied names; the analyzers additionally
//! reject anything that slips through via [`is_safe_identifier`].

use once_cell::sync::Lazy;
use regex::Regex;

/// Maximum accepted identifier length.
pub const MAX_IDENTIFIER_LENGTH: usize = 128;

static SAFE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern is valid"));

/// Strips an identifier down to `[A-Za-z0-9_]`.
///
/// Mirrors what the HTTP boundary does to path parameters before asking for a
/// profile: everything outside the safe set is removed, not escaped.
pub fn sanitize_identifier(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Whether a name is non-empty, within length bounds, and entirely made of
/// safe identifier characters.
pub fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_IDENTIFIER_LENGTH && SAFE_IDENTIFIER.is_match(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_strips_unsafe_characters() {
        assert_eq!(sanitize_identifier("orders"), "orders");
        assert_eq!(sanitize_identifier("orders; DROP TABLE x--"), "ordersDROPTABLEx");
        assert_eq!(sanitize_identifier("a-b.c d"), "abcd");
        assert_eq!(sanitize_identifier("col_1"), "col_1");
        assert_eq!(sanitize_identifier("'\";"), "");
    }

    #[test]
    fn safe_identifier_checks() {
        assert!(is_safe_identifier("orders"));
        assert!(is_safe_identifier("order_items_2024"));
        assert!(!is_safe_identifier(""));
        assert!(!is_safe_identifier("orders; DROP"));
        assert!(!is_safe_identifier("naïve"));
        assert!(!is_safe_identifier(&"x".repeat(MAX_IDENTIFIER_LENGTH + 1)));
    }
}
