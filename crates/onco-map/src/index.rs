//! Fuzzy matching capability and the built-in vocabulary index.
//!
//! The engine only talks to [`FuzzyMatcher`]. [`VocabularyIndex`] is the
//! default implementation: it scores token windows of a query against every
//! vocabulary entry with the Indel-normalized ratio and reports the best
//! non-overlapping windows per entry.

use std::collections::HashSet;

use onco_model::{MatcherOptions, Score};
use rapidfuzz::fuzz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::MatchError;

/// Queries with more tokens than this are rejected.
pub const MAX_QUERY_TOKENS: usize = 512;

/// Punctuation that separates tokens in addition to whitespace.
const TOKEN_SEPARATORS: [char; 6] = [',', ';', '/', '+', '(', ')'];

/// One hit reported by a matcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawMatch {
    /// Matched part of the query, verbatim.
    pub span: String,
    /// Vocabulary entry the span resolved to.
    pub entry: String,
    pub score: Score,
}

impl RawMatch {
    pub fn new(span: impl Into<String>, entry: impl Into<String>, score: f64) -> Self {
        Self {
            span: span.into(),
            entry: entry.into(),
            score: Score::new(score),
        }
    }
}

/// A fuzzy matching capability over a fixed vocabulary.
///
/// Implementations are immutable after construction and shared across
/// worker threads. Results carry no ordering guarantee; callers re-sort.
pub trait FuzzyMatcher: Send + Sync {
    /// All hits for `query`.
    fn find(&self, query: &str) -> Result<Vec<RawMatch>, MatchError>;

    /// The single best hit for `query`, first one winning on equal scores.
    fn best_match(&self, query: &str) -> Result<Option<RawMatch>, MatchError> {
        let matches = self.find(query)?;
        Ok(matches.into_iter().fold(None, |best, candidate| match best {
            Some(best) if best.score >= candidate.score => Some(best),
            _ => Some(candidate),
        }))
    }
}

#[derive(Debug, Clone)]
struct IndexedEntry {
    name: String,
    /// Lower-cased tokens joined by single spaces.
    folded: String,
    token_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Token {
    start: usize,
    end: usize,
}

/// A tokenized query.
struct Query<'a> {
    text: &'a str,
    tokens: Vec<Token>,
    folded: Vec<String>,
}

impl<'a> Query<'a> {
    fn new(text: &'a str) -> Self {
        let tokens = tokenize(text);
        let folded = tokens
            .iter()
            .map(|token| text[token.start..token.end].to_lowercase())
            .collect();
        Self {
            text,
            tokens,
            folded,
        }
    }

    fn window_text(&self, first: usize, last: usize) -> String {
        self.folded[first..last].join(" ")
    }

    fn span(&self, first: usize, last: usize) -> &'a str {
        &self.text[self.tokens[first].start..self.tokens[last - 1].end]
    }
}

#[derive(Debug, Clone, Copy)]
struct Window {
    first: usize,
    last: usize,
    score: f64,
}

impl Window {
    fn overlaps(&self, other: &Window) -> bool {
        self.first < other.last && other.first < self.last
    }
}

/// Immutable fuzzy index over a reference vocabulary.
#[derive(Debug, Clone)]
pub struct VocabularyIndex {
    entries: Vec<IndexedEntry>,
    options: MatcherOptions,
}

impl VocabularyIndex {
    /// Builds the index.
    ///
    /// Blank entries are skipped and duplicates are dropped, keeping the first
    /// occurrence. An index without entries is an error.
    pub fn build<I, S>(entries: I, options: &MatcherOptions) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let mut indexed = Vec::new();
        for entry in entries {
            let name = entry.as_ref().trim();
            if name.is_empty() || !seen.insert(name.to_string()) {
                continue;
            }
            let tokens = tokenize(name);
            if tokens.is_empty() {
                continue;
            }
            let folded = tokens
                .iter()
                .map(|token| name[token.start..token.end].to_lowercase())
                .collect::<Vec<_>>()
                .join(" ");
            indexed.push(IndexedEntry {
                name: name.to_string(),
                folded,
                token_count: tokens.len(),
            });
        }

        if indexed.is_empty() {
            return Err(MatchError::EmptyVocabulary);
        }
        debug!(entries = indexed.len(), "built vocabulary index");
        Ok(Self {
            entries: indexed,
            options: options.clone(),
        })
    }

    /// Entries in vocabulary order.
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|entry| entry.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn parse<'a>(&self, query: &'a str) -> Result<Query<'a>, MatchError> {
        let query = Query::new(query);
        if query.tokens.len() > MAX_QUERY_TOKENS {
            return Err(MatchError::QueryTooLong {
                tokens: query.tokens.len(),
                limit: MAX_QUERY_TOKENS,
            });
        }
        Ok(query)
    }

    /// Every window of `entry_tokens ± flex` tokens, scored against `entry`.
    fn scored_windows(&self, entry: &IndexedEntry, query: &Query<'_>) -> Vec<Window> {
        let available = query.tokens.len();
        let smallest = entry.token_count.saturating_sub(self.options.flex).max(1);
        let largest = (entry.token_count + self.options.flex).min(available);

        let mut windows = Vec::new();
        for size in smallest..=largest {
            for first in 0..=(available - size) {
                let last = first + size;
                let text = query.window_text(first, last);
                windows.push(Window {
                    first,
                    last,
                    score: similarity(&text, &entry.folded),
                });
            }
        }
        windows
    }
}

impl FuzzyMatcher for VocabularyIndex {
    /// Best non-overlapping windows per entry that reach the score floor.
    ///
    /// Hits are ordered by their position in the query, then by vocabulary
    /// order.
    fn find(&self, query: &str) -> Result<Vec<RawMatch>, MatchError> {
        let query = self.parse(query)?;
        if query.tokens.is_empty() {
            return Ok(Vec::new());
        }

        let mut found: Vec<(usize, usize, RawMatch)> = Vec::new();
        for (entry_index, entry) in self.entries.iter().enumerate() {
            let mut windows = self.scored_windows(entry, &query);
            windows.retain(|window| window.score >= self.options.min_score);
            windows.sort_by(|a, b| {
                b.score
                    .total_cmp(&a.score)
                    .then(a.first.cmp(&b.first))
                    .then((a.last - a.first).cmp(&(b.last - b.first)))
            });

            let mut taken: Vec<Window> = Vec::new();
            for window in windows {
                if taken.iter().any(|kept| kept.overlaps(&window)) {
                    continue;
                }
                taken.push(window);
                found.push((
                    window.first,
                    entry_index,
                    RawMatch::new(
                        query.span(window.first, window.last),
                        entry.name.as_str(),
                        window.score,
                    ),
                ));
            }
        }

        found.sort_by_key(|(first, entry_index, _)| (*first, *entry_index));
        Ok(found.into_iter().map(|(_, _, hit)| hit).collect())
    }

    /// Best entry for the whole query or any of its windows.
    ///
    /// No score floor applies; callers compare against their own cutoff.
    fn best_match(&self, query: &str) -> Result<Option<RawMatch>, MatchError> {
        let query = self.parse(query)?;
        if query.tokens.is_empty() {
            return Ok(None);
        }

        let whole_text = query.window_text(0, query.tokens.len());
        let whole_span = query.span(0, query.tokens.len());
        let mut best: Option<(f64, &str, &IndexedEntry)> = None;
        for entry in &self.entries {
            let mut score = similarity(&whole_text, &entry.folded);
            let mut span = whole_span;
            for window in self.scored_windows(entry, &query) {
                if window.score > score {
                    score = window.score;
                    span = query.span(window.first, window.last);
                }
            }
            if best.is_none_or(|(best_score, _, _)| score > best_score) {
                best = Some((score, span, entry));
            }
        }

        Ok(best.map(|(score, span, entry)| RawMatch::new(span, entry.name.as_str(), score)))
    }
}

/// Case-folded similarity on the 0–100 scale.
fn similarity(left: &str, right: &str) -> f64 {
    fuzz::ratio(left.chars(), right.chars()) * 100.0
}

fn is_separator(ch: char) -> bool {
    ch.is_whitespace() || TOKEN_SEPARATORS.contains(&ch)
}

fn tokenize(text: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut start = None;
    for (index, ch) in text.char_indices() {
        if is_separator(ch) {
            if let Some(begin) = start.take() {
                tokens.push(Token { start: begin, end: index });
            }
        } else if start.is_none() {
            start = Some(index);
        }
    }
    if let Some(begin) = start {
        tokens.push(Token {
            start: begin,
            end: text.len(),
        });
    }
    tokens
}
