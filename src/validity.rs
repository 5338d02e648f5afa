//! Comment validity heuristics.
//!
//! A comment is worth sending to the classifiers only if it carries some
//! text. Three independent gates reject it:
//!
//! - only decimal digits (`"12345"`)
//! - only non-word characters (`"!!!???"`)
//! - shorter than two characters, or one character repeated (`"a"`, `"aaaa"`)
//!
//! The gates overlap for some inputs (`"!!"` trips both of the last two);
//! each is still checked on its own.

use std::sync::LazyLock;

use regex::Regex;

static ONLY_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("valid digit regex"));

static ONLY_SYMBOLS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\W+$").expect("valid non-word regex"));

/// Whether `text` is analyzable.
pub fn is_valid(text: &str) -> bool {
    !is_only_digits(text) && !is_only_symbols(text) && !is_repeated_char(text)
}

fn is_only_digits(text: &str) -> bool {
    ONLY_DIGITS.is_match(text)
}

fn is_only_symbols(text: &str) -> bool {
    ONLY_SYMBOLS.is_match(text)
}

/// Shorter than two characters, or a single character repeated.
fn is_repeated_char(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return true;
    };
    // A lone character is also "all the same character".
    chars.all(|c| c == first)
}
