//! Free-text normalization for substance and protocol descriptions.
//!
//! [`normalize`] is a pure, deterministic rewrite pipeline; [`prepare_records`]
//! assigns record ids and applies it to a whole input column.

pub mod normalize;
pub mod records;
pub mod rules;

pub use normalize::{
    apply_canonical_rewrites, normalize, normalize_optional, remove_noise_tokens,
    remove_short_words, strip_symbols, trim_separators,
};
pub use records::prepare_records;
pub use rules::{CANONICAL_REWRITES, RewriteRule};
