//! Postlist interfaces consumed by the synonym combinator.
//!
//! A postlist is a forward-only cursor over the documents indexing a term, in ascending
//! [`DocId`] order. It starts positioned *before* its first entry: call [`PostList::next`] or
//! [`PostList::skip_to`] before reading [`PostList::doc_id`].
//!
//! The on-disk postlists live in the index layer. [`MemoryPostList`] and [`OrPostList`] are
//! small in-memory implementations for composing synonym groups in tests and tools.

use crate::stats::{DocCount, DocId, TermCount};
use std::collections::{BTreeMap, HashMap};

/// Returned by [`PostList::doc_id`] once a postlist is exhausted.
pub const TERMINATED: DocId = DocId::MAX;

/// Forward-only cursor over `(docid, wdf)` postings.
pub trait PostList {
    /// Current document, or [`TERMINATED`] once [`PostList::at_end`].
    fn doc_id(&self) -> DocId;

    /// Within-document frequency at the current document.
    fn wdf(&self) -> TermCount;

    /// Advance to the next posting.
    ///
    /// `min_weight` is the weight a document must reach to be useful to the caller. It is a
    /// hint: implementations may use it to skip, or ignore it.
    fn next(&mut self, min_weight: f64);

    /// Advance to the first posting with `doc_id >= did`. Never moves backwards.
    fn skip_to(&mut self, did: DocId, min_weight: f64);

    fn at_end(&self) -> bool;

    /// Estimated number of documents in the list.
    fn termfreq_estimate(&self) -> DocCount;

    fn description(&self) -> String;
}

impl<P: PostList + ?Sized> PostList for Box<P> {
    #[inline]
    fn doc_id(&self) -> DocId {
        (**self).doc_id()
    }
    #[inline]
    fn wdf(&self) -> TermCount {
        (**self).wdf()
    }
    #[inline]
    fn next(&mut self, min_weight: f64) {
        (**self).next(min_weight)
    }
    #[inline]
    fn skip_to(&mut self, did: DocId, min_weight: f64) {
        (**self).skip_to(did, min_weight)
    }
    #[inline]
    fn at_end(&self) -> bool {
        (**self).at_end()
    }
    fn termfreq_estimate(&self) -> DocCount {
        (**self).termfreq_estimate()
    }
    fn description(&self) -> String {
        (**self).description()
    }
}

/// Lookup of a document's length, for callers that did not fetch it up front.
pub trait DocLengthSource {
    fn doc_length(&self, did: DocId) -> TermCount;
}

impl<F: Fn(DocId) -> TermCount> DocLengthSource for F {
    fn doc_length(&self, did: DocId) -> TermCount {
        self(did)
    }
}

impl DocLengthSource for HashMap<DocId, TermCount> {
    fn doc_length(&self, did: DocId) -> TermCount {
        self.get(&did).copied().unwrap_or(0)
    }
}

impl DocLengthSource for BTreeMap<DocId, TermCount> {
    fn doc_length(&self, did: DocId) -> TermCount {
        self.get(&did).copied().unwrap_or(0)
    }
}

/// Postlist over a sorted in-memory `(docid, wdf)` vector.
#[derive(Debug, Clone)]
pub struct MemoryPostList {
    term: String,
    postings: Vec<(DocId, TermCount)>,
    /// `None` before the first `next`/`skip_to`.
    pos: Option<usize>,
}

impl MemoryPostList {
    /// Postings are sorted by docid; repeated docids keep the first entry.
    pub fn new(term: impl Into<String>, mut postings: Vec<(DocId, TermCount)>) -> Self {
        postings.sort_by_key(|&(did, _)| did);
        postings.dedup_by_key(|&mut (did, _)| did);
        Self {
            term: term.into(),
            postings,
            pos: None,
        }
    }

    fn current(&self) -> Option<&(DocId, TermCount)> {
        self.pos.and_then(|p| self.postings.get(p))
    }
}

impl PostList for MemoryPostList {
    fn doc_id(&self) -> DocId {
        self.current().map_or(TERMINATED, |&(did, _)| did)
    }

    fn wdf(&self) -> TermCount {
        self.current().map_or(0, |&(_, wdf)| wdf)
    }

    fn next(&mut self, _min_weight: f64) {
        self.pos = Some(match self.pos {
            None => 0,
            Some(p) => (p + 1).min(self.postings.len()),
        });
    }

    fn skip_to(&mut self, did: DocId, _min_weight: f64) {
        let start = self.pos.unwrap_or(0).min(self.postings.len());
        let offset = self.postings[start..].partition_point(|&(d, _)| d < did);
        self.pos = Some(start + offset);
    }

    fn at_end(&self) -> bool {
        matches!(self.pos, Some(p) if p >= self.postings.len())
    }

    fn termfreq_estimate(&self) -> DocCount {
        DocCount::try_from(self.postings.len()).unwrap_or(DocCount::MAX)
    }

    fn description(&self) -> String {
        format!("MemoryPostList({})", self.term)
    }
}

/// Union of several postlists.
///
/// Visits every document any child matches. [`PostList::wdf`] is the sum of the wdfs of the
/// children positioned on the current document.
#[derive(Debug)]
pub struct OrPostList<P: PostList> {
    children: Vec<P>,
    current: Option<DocId>,
    started: bool,
}

impl<P: PostList> OrPostList<P> {
    /// Union of `children`, positioned before the first document.
    pub fn new(children: Vec<P>) -> Self {
        Self {
            children,
            current: None,
            started: false,
        }
    }

    fn settle(&mut self) {
        self.current = self
            .children
            .iter()
            .filter(|c| !c.at_end())
            .map(|c| c.doc_id())
            .min();
    }

    fn on_current(&self) -> impl Iterator<Item = &P> {
        let current = self.current;
        self.children
            .iter()
            .filter(move |c| !c.at_end() && Some(c.doc_id()) == current)
    }
}

impl<P: PostList> PostList for OrPostList<P> {
    fn doc_id(&self) -> DocId {
        self.current.unwrap_or(TERMINATED)
    }

    fn wdf(&self) -> TermCount {
        self.on_current()
            .fold(0, |acc: TermCount, c| acc.saturating_add(c.wdf()))
    }

    fn next(&mut self, min_weight: f64) {
        if !self.started {
            self.started = true;
            for c in &mut self.children {
                c.next(min_weight);
            }
        } else if let Some(current) = self.current {
            for c in &mut self.children {
                if !c.at_end() && c.doc_id() == current {
                    c.next(min_weight);
                }
            }
        }
        self.settle();
    }

    fn skip_to(&mut self, did: DocId, min_weight: f64) {
        let started = std::mem::replace(&mut self.started, true);
        for c in &mut self.children {
            if !started || (!c.at_end() && c.doc_id() < did) {
                c.skip_to(did, min_weight);
            }
        }
        self.settle();
    }

    fn at_end(&self) -> bool {
        self.started && self.current.is_none()
    }

    /// Upper estimate: the children may overlap.
    fn termfreq_estimate(&self) -> DocCount {
        self.children
            .iter()
            .fold(0, |acc: DocCount, c| acc.saturating_add(c.termfreq_estimate()))
    }

    fn description(&self) -> String {
        let inner: Vec<String> = self.children.iter().map(|c| c.description()).collect();
        format!("OrPostList({})", inner.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain<P: PostList>(pl: &mut P) -> Vec<(DocId, TermCount)> {
        let mut out = Vec::new();
        pl.next(0.0);
        while !pl.at_end() {
            out.push((pl.doc_id(), pl.wdf()));
            pl.next(0.0);
        }
        out
    }

    #[test]
    fn memory_postlist_iterates_in_order() {
        let mut pl = MemoryPostList::new("a", vec![(5, 1), (2, 3), (9, 2)]);
        assert!(!pl.at_end());
        assert_eq!(drain(&mut pl), vec![(2, 3), (5, 1), (9, 2)]);
        assert_eq!(pl.doc_id(), TERMINATED);
        assert_eq!(pl.wdf(), 0);
    }

    #[test]
    fn memory_skip_to_never_moves_backwards() {
        let mut pl = MemoryPostList::new("a", vec![(2, 1), (5, 1), (9, 1)]);
        pl.skip_to(4, 0.0);
        assert_eq!(pl.doc_id(), 5);
        pl.skip_to(3, 0.0);
        assert_eq!(pl.doc_id(), 5);
        pl.skip_to(10, 0.0);
        assert!(pl.at_end());
    }

    #[test]
    fn or_postlist_sums_wdf_on_shared_docs() {
        let mut or = OrPostList::new(vec![
            MemoryPostList::new("a", vec![(1, 2), (3, 1)]),
            MemoryPostList::new("b", vec![(3, 4), (7, 1)]),
        ]);
        assert_eq!(drain(&mut or), vec![(1, 2), (3, 5), (7, 1)]);
        assert_eq!(or.termfreq_estimate(), 4);
        assert_eq!(
            or.description(),
            "OrPostList(MemoryPostList(a), MemoryPostList(b))"
        );
    }

    #[test]
    fn or_postlist_skip_to() {
        let mut or = OrPostList::new(vec![
            MemoryPostList::new("a", vec![(1, 1), (6, 1)]),
            MemoryPostList::new("b", vec![(4, 2), (6, 3)]),
        ]);
        or.skip_to(5, 0.0);
        assert_eq!((or.doc_id(), or.wdf()), (6, 4));
        or.next(0.0);
        assert!(or.at_end());
    }

    #[test]
    fn doc_length_sources() {
        let map: HashMap<DocId, TermCount> = [(3, 30)].into_iter().collect();
        assert_eq!(map.doc_length(3), 30);
        assert_eq!(map.doc_length(4), 0);
        let f = |did: DocId| did * 10;
        assert_eq!(f.doc_length(7), 70);
    }
}
