//! The normalization pipeline.
//!
//! Steps run in a fixed order because later steps rely on earlier cleanup:
//!
//! 1. missing/empty → [`MISSING_SENTINEL`]
//! 2. trim whitespace
//! 3. remove noise tokens and units
//! 4. canonical rewrites ([`CANONICAL_REWRITES`])
//! 5. drop tokens shorter than three characters
//! 6. strip symbol ranges and `m²`
//! 7. trim `,`/`;` at the ends, drop parentheses, trim whitespace
//!
//! Steps 2–7 repeat until the text no longer changes, so the result is a
//! fixed point: `normalize(normalize(x)) == normalize(x)`.

use onco_model::MISSING_SENTINEL;
use tracing::trace;

use crate::rules::{ATTACHED_UNITS, CANONICAL_REWRITES, NOISE_TOKENS, SYMBOLS};

/// Minimum number of characters a token needs to survive step 5.
const MIN_TOKEN_CHARS: usize = 3;

/// Upper bound on pipeline passes.
const MAX_PASSES: usize = 16;

/// Normalizes one free-text value.
///
/// Empty input, the sentinel itself, and text that cleans down to nothing all
/// yield [`MISSING_SENTINEL`].
pub fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() || trimmed == MISSING_SENTINEL {
        return MISSING_SENTINEL.to_string();
    }

    let mut current = trimmed.to_string();
    for pass in 1..=MAX_PASSES {
        let next = run_pass(&current);
        if next == current {
            break;
        }
        if pass == MAX_PASSES {
            trace!(passes = MAX_PASSES, "normalization did not reach a fixed point");
        }
        current = next;
    }

    if current.is_empty() {
        MISSING_SENTINEL.to_string()
    } else {
        current
    }
}

/// Normalizes an optional value; `None` is treated as missing.
pub fn normalize_optional(text: Option<&str>) -> String {
    normalize(text.unwrap_or_default())
}

fn run_pass(text: &str) -> String {
    let text = text.trim();
    let text = remove_noise_tokens(text);
    let text = apply_canonical_rewrites(&text);
    let text = remove_short_words(&text);
    let text = strip_symbols(&text);
    trim_separators(&text)
}

/// Step 3: removes stoplist words and units attached to numbers.
pub fn remove_noise_tokens(text: &str) -> String {
    let without_words = NOISE_TOKENS.replace_all(text, "");
    ATTACHED_UNITS
        .replace_all(&without_words, "${1}")
        .into_owned()
}

/// Step 4: applies every canonical rewrite in order.
pub fn apply_canonical_rewrites(text: &str) -> String {
    CANONICAL_REWRITES
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Step 5: keeps whitespace-separated tokens of at least three characters.
pub fn remove_short_words(text: &str) -> String {
    text.split_whitespace()
        .filter(|word| word.chars().count() >= MIN_TOKEN_CHARS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Step 6: strips symbol ranges and the squared-meter glyph.
pub fn strip_symbols(text: &str) -> String {
    SYMBOLS.replace_all(text, "").into_owned()
}

/// Step 7: trims separators at the ends and removes parentheses.
pub fn trim_separators(text: &str) -> String {
    text.trim_matches([',', ';'])
        .replace(['(', ')'], "")
        .trim()
        .to_string()
}
