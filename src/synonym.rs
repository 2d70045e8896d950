//! Scoring a group of terms as if they were one term.
//!
//! [`SynonymPostList`] wraps the union of the group's postlists (usually an
//! [`OrPostList`](crate::postlist::OrPostList)) and scores each document with a single
//! [`TermScorer`] initialized from the group's combined statistics. The combined wdf is the sum
//! of the member wdfs, so it is an approximation.

use crate::postlist::{DocLengthSource, PostList};
use crate::scheme::Scorer;
use crate::stats::{DocCount, DocId, Stat, StatSet, TermCount};
use crate::weight::TermScorer;

/// A postlist over a synonym group, weighted as a single term.
#[derive(Debug)]
pub struct SynonymPostList<P: PostList, S: TermScorer = Scorer> {
    inner: P,
    scorer: Option<S>,
    want_wdf: bool,
    want_wdf_doc_max: bool,
    /// Clamp the combined wdf to the document length.
    ///
    /// Only worthwhile when the scorer reads both: a scorer that never sees the document
    /// length cannot be relying on `wdf <= doclen`.
    needs_doclen: bool,
}

impl<P: PostList, S: TermScorer> SynonymPostList<P, S> {
    /// Wrap `subtree`. Scores are 0 until [`SynonymPostList::set_weight`] is called.
    pub fn new(subtree: P, needs_doclen: bool) -> Self {
        Self {
            inner: subtree,
            scorer: None,
            want_wdf: false,
            want_wdf_doc_max: false,
            needs_doclen,
        }
    }

    /// Install the scorer, dropping any previous one.
    ///
    /// `stats_needed` is the negotiated set of the scheme `scorer` was initialized from.
    pub fn set_weight(&mut self, scorer: S, stats_needed: StatSet) {
        self.want_wdf = stats_needed.contains(Stat::Wdf);
        self.want_wdf_doc_max = stats_needed.contains(Stat::WdfDocMax);
        self.scorer = Some(scorer);
    }

    /// Advance. The threshold is not passed on: the members of a synonym group have no
    /// individual weight.
    pub fn next(&mut self, _min_weight: f64) {
        self.inner.next(0.0);
    }

    /// Advance to the first document `>= did`. The threshold is not passed down.
    pub fn skip_to(&mut self, did: DocId, _min_weight: f64) {
        self.inner.skip_to(did, 0.0);
    }

    /// Current document, or [`TERMINATED`](crate::postlist::TERMINATED) at the end.
    pub fn doc_id(&self) -> DocId {
        self.inner.doc_id()
    }

    /// Whether the group is exhausted.
    pub fn at_end(&self) -> bool {
        self.inner.at_end()
    }

    /// Combined wdf of the group at the current document.
    pub fn wdf(&self) -> TermCount {
        self.inner.wdf()
    }

    /// Estimated number of matching documents (an overestimate).
    pub fn termfreq_estimate(&self) -> DocCount {
        self.inner.termfreq_estimate()
    }

    /// Weight of the current document.
    ///
    /// The group has no true per-document maximum wdf, so when the scorer wants one the
    /// document length stands in for it. `lengths` is consulted only if that length was not
    /// passed in (`doclen == 0`).
    pub fn weight(
        &self,
        doclen: TermCount,
        unique_terms: TermCount,
        wdf_doc_max: TermCount,
        lengths: &dyn DocLengthSource,
    ) -> f64 {
        let Some(scorer) = &self.scorer else {
            return 0.0;
        };
        let mut doclen = doclen;
        let mut wdf_doc_max = wdf_doc_max;
        let mut wdf = 0;
        if self.want_wdf {
            wdf = self.inner.wdf();
            if self.needs_doclen {
                wdf = wdf.min(doclen);
            }
        }
        if self.want_wdf_doc_max {
            if doclen == 0 {
                doclen = lengths.doc_length(self.inner.doc_id());
            }
            wdf_doc_max = doclen;
        }
        scorer.score_term(wdf, doclen, unique_terms, wdf_doc_max)
    }

    /// Upper bound on [`SynonymPostList::weight`].
    pub fn max_weight(&self) -> f64 {
        self.scorer.as_ref().map_or(0.0, |s| s.max_score_term())
    }

    /// A synonym group counts as one matching subquery.
    pub fn count_matching_subqueries(&self) -> TermCount {
        1
    }

    /// Human-readable description, for debugging.
    pub fn description(&self) -> String {
        format!("SynonymPostList({})", self.inner.description())
    }

    /// Unwrap the member postlist.
    pub fn into_inner(self) -> P {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::postlist::{MemoryPostList, OrPostList};
    use crate::simple::CoordWeight;
    use crate::weight::Weight;
    use std::cell::Cell;

    /// Echoes its inputs so tests can see what the combinator passed.
    #[derive(Debug)]
    struct Echo;

    impl TermScorer for Echo {
        fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, wdm: TermCount) -> f64 {
            f64::from(wdf) * 1e6 + f64::from(len) * 1e3 + f64::from(wdm)
        }

        fn max_score_term(&self) -> f64 {
            42.0
        }
    }

    fn group() -> OrPostList<MemoryPostList> {
        OrPostList::new(vec![
            MemoryPostList::new("car", vec![(1, 3), (4, 2)]),
            MemoryPostList::new("auto", vec![(1, 4), (9, 1)]),
        ])
    }

    fn no_lengths(_: DocId) -> TermCount {
        0
    }

    #[test]
    fn clamps_wdf_to_doclen_when_both_are_used() {
        let mut syn = SynonymPostList::new(group(), true);
        syn.set_weight(Echo, StatSet::new().with(Stat::Wdf).with(Stat::DocLength));
        syn.next(10.0);
        assert_eq!(syn.doc_id(), 1);
        assert_eq!(syn.wdf(), 7);
        assert_eq!(syn.weight(5, 0, 0, &no_lengths), 5e6 + 5e3);
    }

    #[test]
    fn leaves_wdf_alone_without_doclen() {
        let mut syn = SynonymPostList::new(group(), false);
        syn.set_weight(Echo, StatSet::new().with(Stat::Wdf));
        syn.next(0.0);
        assert_eq!(syn.weight(5, 0, 0, &no_lengths), 7e6 + 5e3);
    }

    #[test]
    fn wdf_not_wanted_is_passed_as_zero() {
        let mut syn = SynonymPostList::new(group(), true);
        syn.set_weight(Echo, StatSet::new().with(Stat::DocLength));
        syn.next(0.0);
        assert_eq!(syn.weight(5, 0, 0, &no_lengths), 5e3);
    }

    #[test]
    fn wdf_doc_max_is_replaced_by_doclen() {
        let mut syn = SynonymPostList::new(group(), true);
        syn.set_weight(Echo, StatSet::new().with(Stat::WdfDocMax));
        syn.next(0.0);
        assert_eq!(syn.weight(12, 0, 3, &no_lengths), 12e3 + 12.0);

        let fetched = Cell::new(0);
        let lengths = |did: DocId| {
            fetched.set(fetched.get() + 1);
            did * 20
        };
        syn.skip_to(4, 0.0);
        assert_eq!(syn.weight(0, 0, 0, &lengths), 80e3 + 80.0);
        assert_eq!(fetched.get(), 1);
    }

    #[test]
    fn weight_before_set_weight_is_zero() {
        let mut syn: SynonymPostList<_, Echo> = SynonymPostList::new(group(), true);
        syn.next(0.0);
        assert_eq!(syn.weight(5, 0, 0, &no_lengths), 0.0);
        assert_eq!(syn.max_weight(), 0.0);
    }

    #[test]
    fn passthroughs() {
        let mut syn = SynonymPostList::new(group(), false);
        let coord = CoordWeight;
        let scorer = crate::Scheme::from(coord).init(&Default::default(), 2.0);
        syn.set_weight(scorer, coord.stats_needed());
        assert_eq!(syn.max_weight(), 2.0);
        assert_eq!(syn.count_matching_subqueries(), 1);
        assert_eq!(syn.termfreq_estimate(), 4);
        assert_eq!(
            syn.description(),
            "SynonymPostList(OrPostList(MemoryPostList(car), MemoryPostList(auto)))"
        );
        let mut docs = Vec::new();
        syn.next(0.0);
        while !syn.at_end() {
            docs.push(syn.doc_id());
            syn.next(0.0);
        }
        assert_eq!(docs, vec![1, 4, 9]);
    }
}
