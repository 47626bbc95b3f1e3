//! Fuzzy matching, candidate selection, match collapsing and protocol
//! resolution.
//!
//! All components here are pure with respect to I/O. The matcher and the
//! protocol table are immutable after construction and shared by reference
//! across worker threads.

pub mod collapse;
pub mod error;
pub mod index;
pub mod protocol;
pub mod select;

pub use collapse::{Collapser, TIE_BREAK_ORDER, resolve_tie};
pub use error::MatchError;
pub use index::{FuzzyMatcher, MAX_QUERY_TOKENS, RawMatch, VocabularyIndex};
pub use protocol::{ProtocolResolver, ProtocolTable, ReferenceIssue, ReferenceIssueKind};
pub use select::{filter_threshold, rank_candidates, select_candidates};
