//! Three-word address text handling.
//!
//! Users may type the `///` marker that prefixes three-word addresses
//! in print. It is stripped before the text is queried or resolved, and
//! so is any whitespace: addresses never contain spaces.

use std::sync::LazyLock;

use regex::Regex;

/// Separators accepted between words (ASCII dot plus the full-width and
/// script-specific dots used by non-Latin languages).
const SEPARATORS: &str = "[.｡。･・︒។։။۔።।]";

static THREE_WORD_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    let word = r"[\p{L}\p{M}]+";
    Regex::new(&format!("^{word}{SEPARATORS}{word}{SEPARATORS}{word}$"))
        .expect("three-word address regex is valid")
});

/// Normalise raw field text: drop all whitespace and strip a leading
/// `///` marker.
pub fn normalize(text: &str) -> String {
    let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.strip_prefix("///") {
        Some(rest) => rest.to_string(),
        None => compact,
    }
}

/// Whether `text` has the shape of a complete three-word address.
///
/// Shape only: a match does not mean the address exists.
pub fn is_possible_three_word_address(text: &str) -> bool {
    THREE_WORD_ADDRESS.is_match(&normalize(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_marker_and_whitespace() {
        assert_eq!(normalize("  ///filled.count.soap "), "filled.count.soap");
        assert_eq!(normalize("filled.count"), "filled.count");
        assert_eq!(normalize("///"), "");
        assert_eq!(normalize("   "), "");
    }

    #[test]
    fn normalize_drops_inner_spaces() {
        assert_eq!(normalize("index. home"), "index.home");
        assert_eq!(normalize("/// filled .count.\tsoap"), "filled.count.soap");
        assert!(is_possible_three_word_address("filled. count .soap"));
    }

    #[test]
    fn complete_addresses_match() {
        assert!(is_possible_three_word_address("filled.count.soap"));
        assert!(is_possible_three_word_address("///index.home.raft"));
        assert!(is_possible_three_word_address("école.août.forêt"));
        assert!(is_possible_three_word_address("中文。中文。中文"));
    }

    #[test]
    fn partial_or_noisy_input_does_not_match() {
        assert!(!is_possible_three_word_address(""));
        assert!(!is_possible_three_word_address("filled.count"));
        assert!(!is_possible_three_word_address("filled.count."));
        assert!(!is_possible_three_word_address("filled.count.soap.extra"));
        assert!(!is_possible_three_word_address("filled count soap"));
        assert!(!is_possible_three_word_address("filled.count.s0ap"));
    }
}
