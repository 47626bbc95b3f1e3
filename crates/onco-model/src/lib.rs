//! Data model shared by the oncomatch crates.
//!
//! Records flow through the engine in this order:
//! [`FreeTextRecord`] → [`MatchCandidate`] / [`RankedCandidateSet`] →
//! [`ResolvedSubstanceRecord`], [`CollapsedRecord`] or [`ProtocolRecord`].

pub mod candidate;
pub mod error;
pub mod options;
pub mod protocol;
pub mod record;
pub mod resolved;

pub use candidate::{MatchCandidate, RankedCandidateSet, Score};
pub use error::OptionsError;
pub use options::{
    EngineOptions, MatcherOptions, OutputMode, PROTOCOL_MAX_PER_ENTRY, ProtocolOptions,
    SubstanceOptions,
};
pub use protocol::{ProtocolRecord, ProtocolReferenceEntry, SlotKey};
pub use record::{FreeTextRecord, MISSING_SENTINEL, RecordId};
pub use resolved::{
    CollapsedRecord, JOIN_SEPARATOR, ResolvedSubstanceRecord, SubstanceHit, TieBreakRule,
};
