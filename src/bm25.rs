//! Okapi BM25 and BM25+.
//!
//! Both use the Robertson/Spärck Jones relevance weight for the idf component (with relevance
//! feedback when an RSet is supplied) and a length normalization clamped below by
//! `min_normlen`. The optional `k2` term contributes a document-length-only extra part.
//!
//! References:
//! - Robertson & Walker (1994). "Some simple effective approximations to the 2-Poisson model..."
//! - Robertson & Zaragoza (2009). "The Probabilistic Relevance Framework: BM25 and Beyond."
//! - Lv & Zhai (2011). "Lower-bounding term frequency normalization." (BM25+)

use crate::stats::{Stat, StatSet, TermCount, TermStats};
use crate::weight::{self, Params, TermScorer, Weight};
use crate::Error;
use serde::{Deserialize, Serialize};

/// BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term-frequency saturation. Clamped to `>= 0`.
    pub k1: f64,
    /// Weight of the document-length extra part. Clamped to `>= 0`.
    pub k2: f64,
    /// Within-query frequency saturation. Clamped to `>= 0`.
    pub k3: f64,
    /// Length normalization strength. Clamped to `[0, 1]`.
    pub b: f64,
    /// Floor on the normalized document length. Clamped to `>= 0`.
    pub min_normlen: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: 1.0,
            k2: 0.0,
            k3: 1.0,
            b: 0.5,
            min_normlen: 0.5,
        }
    }
}

impl Bm25Params {
    /// Parameters of the traditional probabilistic formula: `k1 = k`, `b = 1`, no `k2`/`k3`,
    /// no length floor.
    pub fn trad(k: f64) -> Self {
        Self {
            k1: k,
            k2: 0.0,
            k3: 0.0,
            b: 1.0,
            min_normlen: 0.0,
        }
    }

    /// Non-finite fields fall back to their defaults.
    fn clamped(self) -> Self {
        let d = Self::default();
        Self {
            k1: or_default(self.k1, d.k1).max(0.0),
            k2: or_default(self.k2, d.k2).max(0.0),
            k3: or_default(self.k3, d.k3).max(0.0),
            b: or_default(self.b, d.b).clamp(0.0, 1.0),
            min_normlen: or_default(self.min_normlen, d.min_normlen).max(0.0),
        }
    }

    fn fields(&self) -> [f64; 5] {
        [self.k1, self.k2, self.k3, self.b, self.min_normlen]
    }

    fn stats_needed(&self) -> StatSet {
        let mut needed = StatSet::new()
            .with(Stat::CollectionSize)
            .with(Stat::RsetSize)
            .with(Stat::TermFreq)
            .with(Stat::RelTermFreq)
            .with(Stat::Wdf)
            .with(Stat::WdfMax);
        let length_sensitive = self.k1 != 0.0 && self.b != 0.0;
        if self.k2 != 0.0 || length_sensitive {
            needed.insert(Stat::DocLengthMin);
            needed.insert(Stat::AverageLength);
        }
        if length_sensitive {
            needed.insert(Stat::DocLength);
        }
        if self.k2 != 0.0 {
            needed.insert(Stat::DocLength);
            needed.insert(Stat::QueryLength);
        }
        if self.k3 != 0.0 {
            needed.insert(Stat::Wqf);
        }
        needed
    }

    fn parse<'a>(scheme: &'static str, params: &'a str) -> Result<(Self, Params<'a>), Error> {
        let d = Self::default();
        let mut p = Params::new(scheme, params);
        let parsed = Self {
            k1: p.next_f64(d.k1)?,
            k2: p.next_f64(d.k2)?,
            k3: p.next_f64(d.k3)?,
            b: p.next_f64(d.b)?,
            min_normlen: p.next_f64(d.min_normlen)?,
        };
        Ok((parsed, p))
    }

    fn len_factor(&self, average_length: f64) -> f64 {
        if self.k2 == 0.0 && (self.b == 0.0 || self.k1 == 0.0) {
            return 0.0;
        }
        if average_length > 0.0 {
            1.0 / average_length
        } else {
            0.0
        }
    }
}

fn or_default(v: f64, default: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        default
    }
}

/// Robertson/Spärck Jones relevance weight, before the log.
fn rsj_weight(stats: &TermStats) -> f64 {
    let n = f64::from(stats.collection_size);
    let tf = f64::from(stats.termfreq);
    let tw = if stats.rset_size != 0 {
        let r = f64::from(stats.reltermfreq);
        let big_r = f64::from(stats.rset_size);
        let tf_minus_r = tf - r;
        (r + 0.5) / (big_r - r + 0.5) * (n - big_r - tf_minus_r + 0.5) / (tf_minus_r + 0.5)
    } else {
        (n - tf + 0.5) / (tf + 0.5)
    };
    let tw = tw.max(0.0);
    // Keep very common terms from going negative.
    if tw < 2.0 {
        tw * 0.5 + 1.0
    } else {
        tw
    }
}

/// `(k3 + 1) wqf / (k3 + wqf)`, or 1 when `k3 == 0`.
fn wqf_factor(k3: f64, wqf: TermCount) -> f64 {
    if k3 == 0.0 {
        return 1.0;
    }
    let wqf = f64::from(wqf);
    (k3 + 1.0) * wqf / (k3 + wqf)
}

/// Shared per-term state of BM25 and BM25+.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Normalizer {
    k1: f64,
    b: f64,
    min_normlen: f64,
    len_factor: f64,
    /// `2 k2 query_length`.
    extra_numerator: f64,
    doclen_lb: TermCount,
}

impl Normalizer {
    fn new(p: &Bm25Params, stats: &TermStats) -> Self {
        Self {
            k1: p.k1,
            b: p.b,
            min_normlen: p.min_normlen,
            len_factor: p.len_factor(stats.average_length),
            extra_numerator: 2.0 * p.k2 * f64::from(stats.query_length),
            doclen_lb: stats.doclength_lower_bound,
        }
    }

    fn normlen(&self, len: TermCount) -> f64 {
        (f64::from(len) * self.len_factor).max(self.min_normlen)
    }

    /// `wdf / (k1 (normlen b + 1 - b) + wdf)`, or 1 when `k1 == 0`.
    fn saturation(&self, wdf: TermCount, len: TermCount) -> f64 {
        if self.k1 == 0.0 {
            return if wdf == 0 { 0.0 } else { 1.0 };
        }
        let wdf = f64::from(wdf);
        let denom = self.k1 * (self.normlen(len) * self.b + (1.0 - self.b)) + wdf;
        if denom <= 0.0 {
            return 0.0;
        }
        wdf / denom
    }

    fn extra(&self, len: TermCount) -> f64 {
        if self.extra_numerator == 0.0 {
            return 0.0;
        }
        self.extra_numerator / (1.0 + self.normlen(len))
    }
}

/// BM25.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Weight {
    params: Bm25Params,
}

impl Default for Bm25Weight {
    fn default() -> Self {
        Self::new(Bm25Params::default())
    }
}

impl Bm25Weight {
    /// Create BM25 with `params`, clamped to their valid domain.
    pub fn new(params: Bm25Params) -> Self {
        Self {
            params: params.clamped(),
        }
    }

    /// The traditional probabilistic formula with saturation `k`.
    pub fn trad(k: f64) -> Self {
        Self::new(Bm25Params::trad(k))
    }

    /// The clamped parameters.
    pub fn params(&self) -> Bm25Params {
        self.params
    }
}

/// Initialized [`Bm25Weight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Scorer {
    /// `ln(rsj) · factor · wqf_factor · (k1 + 1)`.
    termweight: f64,
    norm: Normalizer,
    wdf_ub: TermCount,
}

impl TermScorer for Bm25Scorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        if self.norm.k1 == 0.0 {
            return self.termweight;
        }
        self.termweight * self.norm.saturation(wdf, len)
    }

    fn max_score_term(&self) -> f64 {
        if self.norm.k1 == 0.0 {
            return self.termweight;
        }
        self.termweight * self.norm.saturation(self.wdf_ub, self.norm.doclen_lb)
    }

    fn score_extra(&self, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        self.norm.extra(len)
    }

    fn max_score_extra(&self) -> f64 {
        self.norm.extra(self.norm.doclen_lb)
    }
}

impl Weight for Bm25Weight {
    const NAME: &'static str = "bm25";
    type Scorer = Bm25Scorer;

    fn stats_needed(&self) -> StatSet {
        self.params.stats_needed()
    }

    fn init(&self, stats: &TermStats, factor: f64) -> Bm25Scorer {
        let p = &self.params;
        let termweight = if factor == 0.0 {
            0.0
        } else {
            rsj_weight(stats).ln() * factor * wqf_factor(p.k3, stats.wqf) * (p.k1 + 1.0)
        };
        tracing::trace!(termweight, termfreq = stats.termfreq, "bm25 init");
        Bm25Scorer {
            termweight,
            norm: Normalizer::new(p, stats),
            wdf_ub: stats.wdf_upper_bound,
        }
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        weight::encode(Self::NAME, &self.params)
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        let params: Bm25Params = weight::decode(Self::NAME, bytes)?;
        weight::expect_finite(Self::NAME, &params.fields())?;
        Ok(Self::new(params))
    }

    /// `k1 k2 k3 b min_normlen`, each optional.
    fn from_parameters(params: &str) -> Result<Self, Error> {
        let (parsed, rest) = Bm25Params::parse(Self::NAME, params)?;
        rest.finish()?;
        Ok(Self::new(parsed))
    }
}

/// BM25+ parameters: BM25 plus a lower bound `delta` on the tf component.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25PlusParams {
    pub bm25: Bm25Params,
    /// Added to the saturated tf component. Clamped to `>= 0`.
    pub delta: f64,
}

impl Default for Bm25PlusParams {
    fn default() -> Self {
        Self {
            bm25: Bm25Params::default(),
            delta: 1.0,
        }
    }
}

/// BM25+.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25PlusWeight {
    params: Bm25PlusParams,
}

impl Default for Bm25PlusWeight {
    fn default() -> Self {
        Self::new(Bm25PlusParams::default())
    }
}

impl Bm25PlusWeight {
    /// Create BM25+ with `params`, clamped like [`Bm25Weight::new`].
    pub fn new(params: Bm25PlusParams) -> Self {
        Self {
            params: Bm25PlusParams {
                bm25: params.bm25.clamped(),
                delta: or_default(params.delta, Bm25PlusParams::default().delta).max(0.0),
            },
        }
    }

    /// The clamped parameters.
    pub fn params(&self) -> Bm25PlusParams {
        self.params
    }
}

/// Initialized [`Bm25PlusWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25PlusScorer {
    /// `ln(idf) · factor · wqf_factor`.
    termweight: f64,
    k1_plus_1: f64,
    delta: f64,
    norm: Normalizer,
    wdf_ub: TermCount,
}

impl Bm25PlusScorer {
    fn tf_part(&self, wdf: TermCount, len: TermCount) -> f64 {
        self.k1_plus_1 * self.norm.saturation(wdf, len) + self.delta
    }
}

impl TermScorer for Bm25PlusScorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        self.termweight * self.tf_part(wdf, len)
    }

    fn max_score_term(&self) -> f64 {
        self.termweight * self.tf_part(self.wdf_ub, self.norm.doclen_lb)
    }

    fn score_extra(&self, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        self.norm.extra(len)
    }

    fn max_score_extra(&self) -> f64 {
        self.norm.extra(self.norm.doclen_lb)
    }
}

impl Weight for Bm25PlusWeight {
    const NAME: &'static str = "bm25+";
    type Scorer = Bm25PlusScorer;

    fn stats_needed(&self) -> StatSet {
        self.params.bm25.stats_needed()
    }

    fn init(&self, stats: &TermStats, factor: f64) -> Bm25PlusScorer {
        let p = &self.params.bm25;
        let termweight = if factor == 0.0 {
            0.0
        } else {
            let tw = if stats.rset_size != 0 {
                rsj_weight(stats)
            } else {
                let tf = f64::from(stats.termfreq.max(1));
                ((f64::from(stats.collection_size) + 1.0) / tf).max(1.0)
            };
            tw.ln() * factor * wqf_factor(p.k3, stats.wqf)
        };
        tracing::trace!(termweight, termfreq = stats.termfreq, "bm25+ init");
        Bm25PlusScorer {
            termweight,
            k1_plus_1: p.k1 + 1.0,
            delta: self.params.delta,
            norm: Normalizer::new(p, stats),
            wdf_ub: stats.wdf_upper_bound,
        }
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        weight::encode(Self::NAME, &self.params)
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        let params: Bm25PlusParams = weight::decode(Self::NAME, bytes)?;
        weight::expect_finite(Self::NAME, &params.bm25.fields())?;
        weight::expect_finite(Self::NAME, &[params.delta])?;
        Ok(Self::new(params))
    }

    /// `k1 k2 k3 b min_normlen delta`, each optional.
    fn from_parameters(params: &str) -> Result<Self, Error> {
        let (bm25, mut rest) = Bm25Params::parse(Self::NAME, params)?;
        let delta = rest.next_f64(Bm25PlusParams::default().delta)?;
        rest.finish()?;
        Ok(Self::new(Bm25PlusParams { bm25, delta }))
    }
}
