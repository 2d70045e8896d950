//! Parameter-free schemes: boolean, coordinate matching and the Dice coefficient.

use crate::stats::{Stat, StatSet, TermCount, TermStats};
use crate::weight::{self, Params, TermScorer, Weight};
use crate::Error;

/// Boolean weighting: every document scores 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoolWeight;

/// Initialized [`BoolWeight`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoolScorer;

impl TermScorer for BoolScorer {
    fn score_term(&self, _: TermCount, _: TermCount, _: TermCount, _: TermCount) -> f64 {
        0.0
    }

    fn max_score_term(&self) -> f64 {
        0.0
    }
}

impl Weight for BoolWeight {
    const NAME: &'static str = "bool";
    type Scorer = BoolScorer;

    fn stats_needed(&self) -> StatSet {
        StatSet::new()
    }

    fn init(&self, _stats: &TermStats, _factor: f64) -> BoolScorer {
        BoolScorer
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        Ok(Vec::new())
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        weight::expect_empty(Self::NAME, bytes)?;
        Ok(Self)
    }

    fn from_parameters(params: &str) -> Result<Self, Error> {
        Params::new(Self::NAME, params).finish()?;
        Ok(Self)
    }
}

/// Coordinate matching: each matching term contributes `factor`.
///
/// Summed over a query this counts matching terms.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CoordWeight;

/// Initialized [`CoordWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordScorer {
    factor: f64,
}

impl TermScorer for CoordScorer {
    fn score_term(&self, _: TermCount, _: TermCount, _: TermCount, _: TermCount) -> f64 {
        self.factor
    }

    fn max_score_term(&self) -> f64 {
        self.factor
    }
}

impl Weight for CoordWeight {
    const NAME: &'static str = "coord";
    type Scorer = CoordScorer;

    fn stats_needed(&self) -> StatSet {
        StatSet::new()
    }

    fn init(&self, _stats: &TermStats, factor: f64) -> CoordScorer {
        CoordScorer { factor }
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        Ok(Vec::new())
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        weight::expect_empty(Self::NAME, bytes)?;
        Ok(Self)
    }

    fn from_parameters(params: &str) -> Result<Self, Error> {
        Params::new(Self::NAME, params).finish()?;
        Ok(Self)
    }
}

/// Dice coefficient: `2 |q ∩ d| / (|q| + |d|)`.
///
/// Each matching term contributes `2 · wqf · factor / (query_length + unique_terms)`; the match
/// loop's summation supplies the intersection. The bound minimises the denominator with the
/// shard's lower bound on unique terms.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiceWeight;

/// Initialized [`DiceWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiceScorer {
    numerator: f64,
    query_length: f64,
    upper_bound: f64,
}

impl TermScorer for DiceScorer {
    fn score_term(&self, _wdf: TermCount, _len: TermCount, uniq: TermCount, _: TermCount) -> f64 {
        let denom = self.query_length + f64::from(uniq);
        if denom <= 0.0 {
            return 0.0;
        }
        self.numerator / denom
    }

    fn max_score_term(&self) -> f64 {
        self.upper_bound
    }
}

impl Weight for DiceWeight {
    const NAME: &'static str = "dice";
    type Scorer = DiceScorer;

    fn stats_needed(&self) -> StatSet {
        StatSet::new()
            .with(Stat::Wqf)
            .with(Stat::QueryLength)
            .with(Stat::UniqueTerms)
            .with(Stat::UniqueTermsMin)
    }

    fn init(&self, stats: &TermStats, factor: f64) -> DiceScorer {
        if factor == 0.0 {
            // Term-independent part is always zero.
            return DiceScorer {
                numerator: 0.0,
                query_length: 0.0,
                upper_bound: 0.0,
            };
        }
        let numerator = 2.0 * f64::from(stats.wqf) * factor;
        let query_length = f64::from(stats.query_length);
        let denom = query_length + f64::from(stats.unique_terms_lower_bound);
        let upper_bound = if denom > 0.0 { numerator / denom } else { 0.0 };
        DiceScorer {
            numerator,
            query_length,
            upper_bound,
        }
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        Ok(Vec::new())
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        weight::expect_empty(Self::NAME, bytes)?;
        Ok(Self)
    }

    fn from_parameters(params: &str) -> Result<Self, Error> {
        Params::new(Self::NAME, params).finish()?;
        Ok(Self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coord_is_constant_factor() {
        let s = CoordWeight.init(&TermStats::default(), 2.5);
        for (wdf, len) in [(0, 0), (1, 10), (7, 7), (100, 5000)] {
            assert_eq!(s.score_term(wdf, len, 3, wdf), 2.5);
        }
        assert_eq!(s.max_score_term(), 2.5);
        assert_eq!(s.score_extra(10, 3, 1), 0.0);
    }

    #[test]
    fn bool_scores_zero() {
        let s = BoolWeight.init(&TermStats::default(), 1.0);
        assert_eq!(s.score_term(3, 10, 3, 3), 0.0);
        assert_eq!(s.max_score_term(), 0.0);
    }

    #[test]
    fn dice_matches_closed_form() {
        let stats = TermStats {
            wqf: 1,
            query_length: 2,
            unique_terms_lower_bound: 1,
            ..TermStats::default()
        };
        let s = DiceWeight.init(&stats, 6.0);
        // 2 * 1 * 6 / (2 + 4)
        assert!((s.score_term(1, 10, 4, 1) - 2.0).abs() < 1e-12);
        assert!((s.max_score_term() - 4.0).abs() < 1e-12);
    }

    #[test]
    fn dice_extra_mode_is_zero() {
        let stats = TermStats {
            wqf: 1,
            query_length: 2,
            ..TermStats::default()
        };
        let s = DiceWeight.init_extra(&stats);
        assert_eq!(s.score_term(1, 10, 4, 1), 0.0);
        assert_eq!(s.max_score_term(), 0.0);
    }

    #[test]
    fn parameterless_schemes_reject_parameters_and_junk() {
        assert!(CoordWeight::from_parameters("").is_ok());
        assert!(CoordWeight::from_parameters("1").is_err());
        assert!(DiceWeight::deserialize_parameters(b"").is_ok());
        assert!(DiceWeight::deserialize_parameters(b"X").is_err());
        assert!(BoolWeight::deserialize_parameters(b"X").is_err());
    }
}
