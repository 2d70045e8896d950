//! Upper bounds for pruning.
//!
//! A top-k match loop keeps a running `min_weight`, the score a document must reach to enter
//! the result set, and skips any subtree whose maximum cannot reach it. That is only correct if
//! every bound is sound:
//!
//! - [`TermScorer::max_score_term`] is never exceeded by [`TermScorer::score_term`] for any
//!   document of the shard the scorer was initialized against. Schemes derive it from shard
//!   bounds (`DocLengthMin`, `WdfMax`, `UniqueTermsMin`, ...), and must cover every input
//!   combination those bounds allow, including `wdf == 0`.
//! - [`TermScorer::max_score_extra`] likewise bounds [`TermScorer::score_extra`].
//! - Any constant folded into a returned score (the language models' extra offset) is derived
//!   from database bounds, so scores from different shards stay comparable.
//! - Bounds of combined subtrees add their children's bounds. Overlap between children is never
//!   subtracted.

use crate::weight::TermScorer;

/// Relative slack allowed by [`debug_check_bound`] for rounding.
pub const BOUND_TOLERANCE: f64 = 1e-9;

/// Bound on a disjunction: every child may match the same document.
pub fn disjunction_max<I: IntoIterator<Item = f64>>(maxima: I) -> f64 {
    maxima.into_iter().sum()
}

/// Bound on a conjunction: a document matches every child.
pub fn conjunction_max<I: IntoIterator<Item = f64>>(maxima: I) -> f64 {
    maxima.into_iter().sum()
}

/// Bound on an exclusive-or: a counted document matches exactly one child.
pub fn exclusive_max<I: IntoIterator<Item = f64>>(maxima: I) -> f64 {
    maxima.into_iter().fold(0.0, f64::max)
}

/// Bound on a whole query: the terms' maxima plus the term-independent part.
pub fn query_max<'a, S, I>(terms: I, extra: Option<&S>) -> f64
where
    S: TermScorer + 'a,
    I: IntoIterator<Item = &'a S>,
{
    let terms = disjunction_max(terms.into_iter().map(TermScorer::max_score_term));
    terms + extra.map_or(0.0, TermScorer::max_score_extra)
}

/// Whether a subtree bounded by `max_weight` can be skipped.
///
/// A document scoring exactly `min_weight` is still admitted.
pub fn can_prune(max_weight: f64, min_weight: f64) -> bool {
    max_weight < min_weight
}

/// Whether `score` respects `bound`, allowing [`BOUND_TOLERANCE`] of relative rounding.
pub fn within_bound(score: f64, bound: f64) -> bool {
    score <= bound + BOUND_TOLERANCE * bound.abs().max(1.0)
}

/// Assert, in debug builds, that `score` respects `bound`.
#[inline]
pub fn debug_check_bound(score: f64, bound: f64) {
    debug_assert!(
        within_bound(score, bound),
        "score {score} exceeds upper bound {bound}"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simple::CoordWeight;
    use crate::weight::Weight;

    #[test]
    fn combinators() {
        assert_eq!(disjunction_max([1.0, 2.5, 0.5]), 4.0);
        assert_eq!(conjunction_max([1.0, 2.0]), 3.0);
        assert_eq!(exclusive_max([1.0, 2.5, 0.5]), 2.5);
        assert_eq!(disjunction_max(std::iter::empty()), 0.0);
        assert_eq!(exclusive_max(std::iter::empty()), 0.0);
    }

    #[test]
    fn prune_is_strict() {
        assert!(can_prune(1.0, 1.5));
        assert!(!can_prune(1.5, 1.5));
        assert!(!can_prune(2.0, 1.5));
    }

    #[test]
    fn query_max_adds_extra() {
        let a = CoordWeight.init(&Default::default(), 1.5);
        let b = CoordWeight.init(&Default::default(), 2.0);
        assert_eq!(query_max([&a, &b], None), 3.5);
        assert_eq!(query_max([&a], Some(&b)), 1.5);
    }

    #[test]
    fn tolerance() {
        assert!(within_bound(1.0 + 1e-12, 1.0));
        assert!(!within_bound(1.001, 1.0));
        debug_check_bound(0.5, 1.0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "exceeds upper bound")]
    fn debug_check_panics() {
        debug_check_bound(2.0, 1.0);
    }
}
