//! Curated rewrite rules for substance free text.
//!
//! The noise stoplist and the canonical rewrites encode domain knowledge from
//! cancer-registry data. Do not add or drop entries without a registry review.

use std::sync::LazyLock;

use regex::Regex;

/// Frequency words, dosage units, administrative qualifiers and short
/// abbreviations removed before matching. Whole words only.
pub(crate) static NOISE_TOKENS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(?:wöchentlich|weekly|woche|allgemein|entsprechend|beendet|zyklus|version|bis|mg|kg|m2|bezeichnet|entfällt)\b|\bo\.n\.a\b\.?|\bi\.v\b\.?",
    )
    .expect("Invalid noise token regex")
});

/// Units glued to a dose (`100mg`); the number is kept.
pub(crate) static ATTACHED_UNITS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d)(?:mg|kg|m2)\b").expect("Invalid attached unit regex")
});

/// Enclosed alphanumerics, letterlike symbols, math operators, technical
/// symbols, dingbats, a few stray arrows/stars, and the squared-meter glyph.
pub(crate) static SYMBOLS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\x{24C0}-\x{24FF}\x{2100}-\x{214F}\x{2200}-\x{22FF}\x{2300}-\x{23FF}\x{2600}-\x{26FF}\x{2700}-\x{27BF}\x{2B50}\x{2B06}]|m²",
    )
    .expect("Invalid symbol regex")
});

/// A case-insensitive pattern rewritten to a fixed canonical spelling.
pub struct RewriteRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub replacement: &'static str,
}

impl RewriteRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("Invalid rewrite rule regex"),
            replacement,
        }
    }

    /// Applies the rule; the replacement is inserted literally.
    pub fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, regex::NoExpand(self.replacement))
            .into_owned()
    }
}

/// Canonical rewrites, applied in this order.
pub static CANONICAL_REWRITES: LazyLock<Vec<RewriteRule>> = LazyLock::new(|| {
    vec![
        // Abbreviations and misspellings of 5-fluorouracil.
        RewriteRule::new(
            "fluorouracil",
            r"(?i)5 fu|5fu|5-fu|5_fu|fluoruracil|flourouracil|5-fluoruuracil|5-fluoro-uracil|5-fluoruracil|floururacil|5-fluorounacil|flourouraci|5-fluourouracil",
            "fluorouracil",
        ),
        RewriteRule::new(
            "gemcitabin",
            r"(?i)gemcibatin(?:e)?(?: mono)?",
            "gemcitabin",
        ),
        // The "nab" qualifier belongs after the substance. The rewritten form
        // matches too, so a second pass leaves repeated mentions alone.
        RewriteRule::new(
            "paclitaxel-nab",
            r"(?i)\b(?:nab[\s\-]?paclitaxel|paclitaxel\s+nab)\b",
            "Paclitaxel nab",
        ),
        RewriteRule::new(
            "calciumfolinat",
            r"(?i)\bcalciumfolinat\b",
            "folinsäure",
        ),
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewrite_rules_are_ordered() {
        let names: Vec<&str> = CANONICAL_REWRITES.iter().map(|rule| rule.name).collect();
        assert_eq!(
            names,
            vec!["fluorouracil", "gemcitabin", "paclitaxel-nab", "calciumfolinat"]
        );
    }

    #[test]
    fn calciumfolinat_needs_word_boundaries() {
        let rule = &CANONICAL_REWRITES[3];
        assert_eq!(rule.apply("Calciumfolinat"), "folinsäure");
        assert_eq!(rule.apply("Calciumfolinathydrat"), "Calciumfolinathydrat");
    }

    #[test]
    fn nab_rewrite_is_stable_on_its_output() {
        let rule = &CANONICAL_REWRITES[2];
        let once = rule.apply("nab-Paclitaxel nab-Paclitaxel");
        assert_eq!(once, "Paclitaxel nab Paclitaxel nab");
        assert_eq!(rule.apply(&once), once);
    }

    #[test]
    fn noise_tokens_match_whole_words() {
        assert!(NOISE_TOKENS.is_match("Cisplatin wöchentlich"));
        assert!(NOISE_TOKENS.is_match("Zyklus 3"));
        assert!(!NOISE_TOKENS.is_match("Bisphosphonat"));
        assert!(NOISE_TOKENS.is_match("Tumor o.n.a."));
    }
}
