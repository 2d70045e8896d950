//! `termweight`: term weighting schemes for full-text search.
//!
//! This crate is the scoring core of a search engine's match loop:
//! - each scheme negotiates the statistics it reads ([`stats::StatSet`])
//! - a configured scheme ([`weight::Weight`]) is initialized per query term per shard into an
//!   immutable scorer ([`weight::TermScorer`])
//! - every scorer exposes upper bounds for pruning ([`bounds`])
//!
//! Scope:
//! - BM25 / BM25+, tf-idf with SMART-style normalizations, eight divergence-from-randomness
//!   schemes, four smoothed language models, coordinate matching and the Dice coefficient
//! - Synonym groups scored as a single term ([`synonym`])
//! - Selection by name and parameter string, plus a compact wire format for remote shards
//!   ([`scheme`])
//!
//! Non-goals:
//! - Index storage, postlist decoding, query parsing
//! - The top-k match loop itself (see [`bounds`] for what it may assume)
//!
//! ```
//! use termweight::scheme::Scheme;
//! use termweight::stats::TermStats;
//! use termweight::weight::TermScorer;
//!
//! let scheme = Scheme::create("bm25 1.2 0 1 0.75 0.5").unwrap();
//! let stats = TermStats {
//!     collection_size: 1000,
//!     termfreq: 10,
//!     average_length: 40.0,
//!     doclength_lower_bound: 1,
//!     wdf_upper_bound: 20,
//!     wqf: 1,
//!     ..TermStats::default()
//! };
//! let scorer = scheme.init(&stats, 1.0);
//! let s = scorer.score_term(3, 50, 0, 0);
//! assert!(s > 0.0 && s <= scorer.max_score_term());
//! ```
//!
//! References:
//! - Robertson & Zaragoza (2009): BM25 and beyond
//! - Amati & van Rijsbergen (2002): divergence from randomness
//! - Zhai & Lafferty (2004): smoothing methods for language models

pub mod bm25;
pub mod bounds;
pub mod dfr;
pub mod postlist;
pub mod query_likelihood;
pub mod scheme;
pub mod simple;
pub mod stats;
pub mod synonym;
pub mod tfidf;
pub mod weight;

pub use error::Error;
pub use scheme::{Scheme, Scorer};
pub use stats::{Stat, StatSet, StatsSource, TermStats};
pub use weight::{TermScorer, Weight};

mod error {
    /// Errors for configuring and transporting weighting schemes.
    #[derive(thiserror::Error, Debug, Clone, PartialEq)]
    pub enum Error {
        /// The scheme does not support this operation (e.g. remote serialization).
        #[error("{scheme}: {operation} is not supported")]
        Unsupported {
            /// Scheme name.
            scheme: &'static str,
            /// Operation that was attempted.
            operation: &'static str,
        },
        /// A human parameter string could not be parsed, or named an unknown scheme.
        #[error("{scheme}: invalid parameter {token:?}: {reason}")]
        InvalidParameter {
            /// Scheme name (or the unknown name itself).
            scheme: String,
            /// Offending token.
            token: String,
            /// What was wrong with it.
            reason: &'static str,
        },
        /// Serialized parameters did not decode to exactly one parameter record.
        #[error("{scheme}: malformed serialized parameters: {reason}")]
        MalformedSerialization {
            /// Scheme name.
            scheme: &'static str,
            /// Decoder diagnostic.
            reason: String,
        },
    }
}
