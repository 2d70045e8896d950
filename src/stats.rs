//! Statistics negotiation between weighting schemes and the index layer.
//!
//! A scheme declares, at construction time, the set of [`Stat`]s it reads. The index layer
//! consults that [`StatSet`] and fetches only those values, either into a [`TermStats`]
//! snapshot (via [`TermStats::gather`]) or per document when calling
//! [`TermScorer::score_term`](crate::weight::TermScorer::score_term).
//!
//! Values a scheme did not request are left at zero. A scheme must never rely on a value it
//! did not ask for.

use std::fmt;

/// Count of term occurrences (wdf, document length, unique terms).
pub type TermCount = u32;
/// Count of documents.
pub type DocCount = u32;
/// Sum of document lengths over a collection.
pub type TotalLength = u64;
/// Document identifier.
pub type DocId = u32;

/// A statistic a weighting scheme may request.
///
/// Each variant is independent: no variant implies or aliases another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Stat {
    /// Number of documents in the collection.
    CollectionSize,
    /// Number of documents in the relevance set.
    RsetSize,
    /// Average document length.
    AverageLength,
    /// Number of documents the term occurs in.
    TermFreq,
    /// Number of relevant documents the term occurs in.
    RelTermFreq,
    /// Sum of wqf over all query terms.
    QueryLength,
    /// Within-query frequency of the term.
    Wqf,
    /// Within-document frequency of the term (per document).
    Wdf,
    /// Document length (per document).
    DocLength,
    /// Shard lower bound on document length.
    DocLengthMin,
    /// Shard upper bound on document length.
    DocLengthMax,
    /// Shard upper bound on the term's wdf.
    WdfMax,
    /// Total occurrences of the term in the collection.
    CollectionFreq,
    /// Number of distinct terms in the document (per document).
    UniqueTerms,
    /// Sum of all document lengths.
    TotalLength,
    /// Largest wdf of any term in the document (per document).
    WdfDocMax,
    /// Shard lower bound on unique terms.
    UniqueTermsMin,
    /// Shard upper bound on unique terms.
    UniqueTermsMax,
    /// Database lower bound on document length.
    DbDocLengthMin,
    /// Database upper bound on document length.
    DbDocLengthMax,
    /// Database lower bound on unique terms.
    DbUniqueTermsMin,
    /// Database upper bound on unique terms.
    DbUniqueTermsMax,
    /// Database upper bound on the term's wdf.
    DbWdfMax,
}

impl Stat {
    /// Every statistic, in declaration order.
    pub const ALL: [Stat; 23] = [
        Stat::CollectionSize,
        Stat::RsetSize,
        Stat::AverageLength,
        Stat::TermFreq,
        Stat::RelTermFreq,
        Stat::QueryLength,
        Stat::Wqf,
        Stat::Wdf,
        Stat::DocLength,
        Stat::DocLengthMin,
        Stat::DocLengthMax,
        Stat::WdfMax,
        Stat::CollectionFreq,
        Stat::UniqueTerms,
        Stat::TotalLength,
        Stat::WdfDocMax,
        Stat::UniqueTermsMin,
        Stat::UniqueTermsMax,
        Stat::DbDocLengthMin,
        Stat::DbDocLengthMax,
        Stat::DbUniqueTermsMin,
        Stat::DbUniqueTermsMax,
        Stat::DbWdfMax,
    ];

    /// Snake-case name, used in diagnostics and the CLI.
    pub fn name(self) -> &'static str {
        match self {
            Stat::CollectionSize => "collection_size",
            Stat::RsetSize => "rset_size",
            Stat::AverageLength => "average_length",
            Stat::TermFreq => "termfreq",
            Stat::RelTermFreq => "reltermfreq",
            Stat::QueryLength => "query_length",
            Stat::Wqf => "wqf",
            Stat::Wdf => "wdf",
            Stat::DocLength => "doc_length",
            Stat::DocLengthMin => "doc_length_min",
            Stat::DocLengthMax => "doc_length_max",
            Stat::WdfMax => "wdf_max",
            Stat::CollectionFreq => "collection_freq",
            Stat::UniqueTerms => "unique_terms",
            Stat::TotalLength => "total_length",
            Stat::WdfDocMax => "wdf_doc_max",
            Stat::UniqueTermsMin => "unique_terms_min",
            Stat::UniqueTermsMax => "unique_terms_max",
            Stat::DbDocLengthMin => "db_doc_length_min",
            Stat::DbDocLengthMax => "db_doc_length_max",
            Stat::DbUniqueTermsMin => "db_unique_terms_min",
            Stat::DbUniqueTermsMax => "db_unique_terms_max",
            Stat::DbWdfMax => "db_wdf_max",
        }
    }

    fn mask(self) -> u32 {
        1 << (self as u8)
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of requested statistics.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct StatSet {
    bits: u32,
}

impl StatSet {
    /// The empty set.
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Request `stat`. Requesting the same stat twice is a no-op.
    pub fn insert(&mut self, stat: Stat) {
        self.bits |= stat.mask();
    }

    /// Builder form of [`StatSet::insert`].
    #[must_use]
    pub fn with(mut self, stat: Stat) -> Self {
        self.insert(stat);
        self
    }

    /// Whether `stat` was requested.
    pub fn contains(&self, stat: Stat) -> bool {
        self.bits & stat.mask() != 0
    }

    /// Union of two requests.
    #[must_use]
    pub fn union(self, other: StatSet) -> Self {
        Self {
            bits: self.bits | other.bits,
        }
    }

    /// Number of requested stats.
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Whether nothing was requested.
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Requested stats, in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Stat> + '_ {
        Stat::ALL.into_iter().filter(|s| self.contains(*s))
    }
}

impl FromIterator<Stat> for StatSet {
    fn from_iter<I: IntoIterator<Item = Stat>>(iter: I) -> Self {
        let mut set = StatSet::new();
        for stat in iter {
            set.insert(stat);
        }
        set
    }
}

impl fmt::Debug for StatSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Which population a bound describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// The shard currently being matched. Used for pruning bounds.
    Shard,
    /// Every shard taking part in the search. Used for offsets that must be comparable.
    Database,
}

/// Source of collection and term statistics (the index layer).
pub trait StatsSource {
    /// Number of documents in the collection.
    fn collection_size(&self) -> DocCount;

    /// Number of documents in the relevance set. Defaults to no relevance set.
    fn rset_size(&self) -> DocCount {
        0
    }

    /// Average document length over the collection.
    fn average_length(&self) -> f64;

    /// Sum of all document lengths.
    fn total_length(&self) -> TotalLength;

    /// Number of documents containing `term`.
    fn termfreq(&self, term: &str) -> DocCount;

    /// Number of relevant documents containing `term`.
    fn reltermfreq(&self, _term: &str) -> DocCount {
        0
    }

    /// Total occurrences of `term` in the collection.
    fn collection_freq(&self, term: &str) -> TermCount;

    /// Upper bound on the term's wdf in any document of `scope`.
    fn wdf_upper_bound(&self, term: &str, scope: Scope) -> TermCount;

    /// Lower bound on document length in `scope`.
    fn doclength_lower_bound(&self, scope: Scope) -> TermCount;

    /// Upper bound on document length in `scope`.
    fn doclength_upper_bound(&self, scope: Scope) -> TermCount;

    /// Lower bound on distinct terms per document in `scope`.
    fn unique_terms_lower_bound(&self, scope: Scope) -> TermCount;

    /// Upper bound on distinct terms per document in `scope`.
    fn unique_terms_upper_bound(&self, scope: Scope) -> TermCount;
}

/// Snapshot of the scalar statistics a scheme is initialized from.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TermStats {
    /// Number of documents in the collection.
    pub collection_size: DocCount,
    /// Number of documents in the relevance set.
    pub rset_size: DocCount,
    /// Average document length.
    pub average_length: f64,
    /// Number of documents containing the term.
    pub termfreq: DocCount,
    /// Number of relevant documents containing the term.
    pub reltermfreq: DocCount,
    /// Total occurrences of the term.
    pub collection_freq: TermCount,
    /// Sum of wqf over all query terms.
    pub query_length: TermCount,
    /// Within-query frequency of the term.
    pub wqf: TermCount,
    /// Sum of all document lengths.
    pub total_length: TotalLength,
    /// Shard lower bound on document length.
    pub doclength_lower_bound: TermCount,
    /// Shard upper bound on document length.
    pub doclength_upper_bound: TermCount,
    /// Shard upper bound on the term's wdf.
    pub wdf_upper_bound: TermCount,
    /// Shard lower bound on unique terms.
    pub unique_terms_lower_bound: TermCount,
    /// Shard upper bound on unique terms.
    pub unique_terms_upper_bound: TermCount,
    /// Database lower bound on document length.
    pub db_doclength_lower_bound: TermCount,
    /// Database upper bound on document length.
    pub db_doclength_upper_bound: TermCount,
    /// Database upper bound on the term's wdf.
    pub db_wdf_upper_bound: TermCount,
    /// Database lower bound on unique terms.
    pub db_unique_terms_lower_bound: TermCount,
    /// Database upper bound on unique terms.
    pub db_unique_terms_upper_bound: TermCount,
}

impl TermStats {
    /// Fetch the statistics in `needed` for `term`.
    ///
    /// `query_length` and `wqf` come from the query rather than the index.
    pub fn gather<S: StatsSource + ?Sized>(
        source: &S,
        term: &str,
        query_length: TermCount,
        wqf: TermCount,
        needed: StatSet,
    ) -> Self {
        let mut stats = Self::for_extra(source, query_length, needed);
        if needed.contains(Stat::Wqf) {
            stats.wqf = wqf;
        }
        if needed.contains(Stat::TermFreq) {
            stats.termfreq = source.termfreq(term);
        }
        if needed.contains(Stat::RelTermFreq) {
            stats.reltermfreq = source.reltermfreq(term);
        }
        if needed.contains(Stat::CollectionFreq) {
            stats.collection_freq = source.collection_freq(term);
        }
        if needed.contains(Stat::WdfMax) {
            stats.wdf_upper_bound = source.wdf_upper_bound(term, Scope::Shard);
        }
        if needed.contains(Stat::DbWdfMax) {
            stats.db_wdf_upper_bound = source.wdf_upper_bound(term, Scope::Database);
        }
        stats
    }

    /// Fetch the term-independent statistics in `needed`.
    pub fn for_extra<S: StatsSource + ?Sized>(
        source: &S,
        query_length: TermCount,
        needed: StatSet,
    ) -> Self {
        let mut stats = TermStats::default();
        for stat in needed.iter() {
            match stat {
                Stat::CollectionSize => stats.collection_size = source.collection_size(),
                Stat::RsetSize => stats.rset_size = source.rset_size(),
                Stat::AverageLength => stats.average_length = source.average_length(),
                Stat::QueryLength => stats.query_length = query_length,
                Stat::TotalLength => stats.total_length = source.total_length(),
                Stat::DocLengthMin => {
                    stats.doclength_lower_bound = source.doclength_lower_bound(Scope::Shard)
                }
                Stat::DocLengthMax => {
                    stats.doclength_upper_bound = source.doclength_upper_bound(Scope::Shard)
                }
                Stat::UniqueTermsMin => {
                    stats.unique_terms_lower_bound = source.unique_terms_lower_bound(Scope::Shard)
                }
                Stat::UniqueTermsMax => {
                    stats.unique_terms_upper_bound = source.unique_terms_upper_bound(Scope::Shard)
                }
                Stat::DbDocLengthMin => {
                    stats.db_doclength_lower_bound = source.doclength_lower_bound(Scope::Database)
                }
                Stat::DbDocLengthMax => {
                    stats.db_doclength_upper_bound = source.doclength_upper_bound(Scope::Database)
                }
                Stat::DbUniqueTermsMin => {
                    stats.db_unique_terms_lower_bound =
                        source.unique_terms_lower_bound(Scope::Database)
                }
                Stat::DbUniqueTermsMax => {
                    stats.db_unique_terms_upper_bound =
                        source.unique_terms_upper_bound(Scope::Database)
                }
                // Term-dependent or per-document.
                Stat::TermFreq
                | Stat::RelTermFreq
                | Stat::CollectionFreq
                | Stat::Wqf
                | Stat::WdfMax
                | Stat::DbWdfMax
                | Stat::Wdf
                | Stat::DocLength
                | Stat::UniqueTerms
                | Stat::WdfDocMax => {}
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed;

    impl StatsSource for Fixed {
        fn collection_size(&self) -> DocCount {
            1000
        }
        fn average_length(&self) -> f64 {
            40.0
        }
        fn total_length(&self) -> TotalLength {
            40_000
        }
        fn termfreq(&self, _term: &str) -> DocCount {
            10
        }
        fn collection_freq(&self, _term: &str) -> TermCount {
            25
        }
        fn wdf_upper_bound(&self, _term: &str, scope: Scope) -> TermCount {
            match scope {
                Scope::Shard => 20,
                Scope::Database => 30,
            }
        }
        fn doclength_lower_bound(&self, _scope: Scope) -> TermCount {
            1
        }
        fn doclength_upper_bound(&self, scope: Scope) -> TermCount {
            match scope {
                Scope::Shard => 500,
                Scope::Database => 900,
            }
        }
        fn unique_terms_lower_bound(&self, _scope: Scope) -> TermCount {
            1
        }
        fn unique_terms_upper_bound(&self, _scope: Scope) -> TermCount {
            300
        }
    }

    #[test]
    fn insert_is_idempotent() {
        let mut set = StatSet::new();
        set.insert(Stat::Wdf);
        set.insert(Stat::Wdf);
        assert_eq!(set.len(), 1);
        assert!(set.contains(Stat::Wdf));
        assert!(!set.contains(Stat::DocLength));
    }

    #[test]
    fn stats_are_independent() {
        for a in Stat::ALL {
            let set = StatSet::new().with(a);
            for b in Stat::ALL {
                assert_eq!(set.contains(b), a == b, "{a} vs {b}");
            }
        }
    }

    #[test]
    fn gather_fetches_only_requested() {
        let needed: StatSet = [Stat::TermFreq, Stat::WdfMax, Stat::DbDocLengthMax]
            .into_iter()
            .collect();
        let stats = TermStats::gather(&Fixed, "t", 3, 2, needed);
        assert_eq!(stats.termfreq, 10);
        assert_eq!(stats.wdf_upper_bound, 20);
        assert_eq!(stats.db_doclength_upper_bound, 900);
        assert_eq!(stats.collection_size, 0);
        assert_eq!(stats.query_length, 0);
        assert_eq!(stats.wqf, 0);
        assert_eq!(stats.doclength_upper_bound, 0);
    }

    #[test]
    fn debug_lists_names() {
        let set = StatSet::new().with(Stat::Wqf).with(Stat::CollectionSize);
        assert_eq!(format!("{set:?}"), "{CollectionSize, Wqf}");
    }
}
