//! Query likelihood language models.
//!
//! Ranks documents by \(\log P(Q|D)\) under a smoothed document language model. Each matching
//! term contributes `log(1 + p_seen / (α_d · p_C))`, where `p_C = cf / total_length` is the
//! collection model and `α_d` the document-dependent smoothing mass. The remaining
//! `|Q| · log α_d` does not depend on the term and is reported as the extra part.
//!
//! `log α_d` is negative. The extra part adds a constant offset derived from the database-wide
//! upper bound on document length so that it is non-negative for every document of every
//! shard, and therefore comparable across shards.
//!
//! References:
//! - Ponte & Croft (1998). A language modeling approach to information retrieval.
//! - Zhai & Lafferty (2004). A study of smoothing methods for language models applied to IR.
//! - Lv & Zhai (2011). Lower-bounding term frequency normalization (Dir+).

use crate::stats::{Stat, StatSet, TermCount, TermStats};
use crate::weight::{self, Params, TermScorer, Weight};
use crate::Error;
use serde::{Deserialize, Serialize};

fn invalid(scheme: &'static str, value: f64, reason: &'static str) -> Error {
    Error::InvalidParameter {
        scheme: scheme.to_string(),
        token: value.to_string(),
        reason,
    }
}

fn malformed(scheme: &'static str, e: Error) -> Error {
    Error::MalformedSerialization {
        scheme,
        reason: e.to_string(),
    }
}

/// `total_length / collection_freq`, the inverse of the collection model, or 0 for an absent
/// term.
fn inverse_collection_prob(stats: &TermStats) -> f64 {
    if stats.collection_freq == 0 {
        return 0.0;
    }
    stats.total_length as f64 / f64::from(stats.collection_freq)
}

fn common_stats() -> StatSet {
    [
        Stat::Wqf,
        Stat::QueryLength,
        Stat::DocLength,
        Stat::Wdf,
        Stat::WdfMax,
        Stat::CollectionFreq,
        Stat::TotalLength,
        Stat::DocLengthMin,
    ]
    .into_iter()
    .collect()
}

/// Jelinek-Mercer smoothing: `p = (1 - λ) wdf/doclen + λ p_C`.
///
/// A `lambda` outside `(0, 1)` selects λ from the query length: 0.1 for up to two terms, 0.7
/// for eight or more, and `(|Q| - 1) / 10` in between.
///
/// There is no extra part: the smoothing mass λ is the same for every document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LmJmWeight {
    lambda: f64,
}

impl LmJmWeight {
    /// A non-finite `lambda` selects the query-length rule, like any value outside `(0, 1)`.
    pub fn new(lambda: f64) -> Self {
        Self {
            lambda: if lambda.is_finite() { lambda } else { 0.0 },
        }
    }

    /// The configured λ; `0` means chosen from the query length.
    pub fn lambda(&self) -> f64 {
        self.lambda
    }

    fn effective_lambda(&self, query_length: TermCount) -> f64 {
        if self.lambda > 0.0 && self.lambda < 1.0 {
            return self.lambda;
        }
        match query_length {
            0..=2 => 0.1,
            3..=7 => f64::from(query_length - 1) * 0.1,
            _ => 0.7,
        }
    }
}

/// Initialized [`LmJmWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmJmScorer {
    /// `factor · wqf`.
    scale: f64,
    /// `(1 - λ) · total_length / (λ · cf)`.
    multiplier: f64,
    upper_bound: f64,
}

impl TermScorer for LmJmScorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        if wdf == 0 || len == 0 {
            return 0.0;
        }
        self.scale * (self.multiplier * f64::from(wdf) / f64::from(len)).ln_1p()
    }

    fn max_score_term(&self) -> f64 {
        self.upper_bound
    }
}

impl Weight for LmJmWeight {
    const NAME: &'static str = "lmjm";
    type Scorer = LmJmScorer;

    fn stats_needed(&self) -> StatSet {
        common_stats()
    }

    fn init(&self, stats: &TermStats, factor: f64) -> LmJmScorer {
        let lambda = self.effective_lambda(stats.query_length);
        let multiplier = (1.0 - lambda) * inverse_collection_prob(stats) / lambda;
        let scale = (factor * f64::from(stats.wqf)).max(0.0);
        let max_ratio = (f64::from(stats.wdf_upper_bound)
            / f64::from(stats.doclength_lower_bound.max(1)))
        .min(1.0);
        tracing::trace!(lambda, multiplier, "lmjm init");
        LmJmScorer {
            scale,
            multiplier,
            upper_bound: scale * (multiplier * max_ratio).ln_1p(),
        }
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        weight::encode(Self::NAME, &self.lambda)
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        let lambda: f64 = weight::decode(Self::NAME, bytes)?;
        weight::expect_finite(Self::NAME, &[lambda])?;
        Ok(Self::new(lambda))
    }

    /// `lambda`, optional.
    fn from_parameters(params: &str) -> Result<Self, Error> {
        let mut p = Params::new(Self::NAME, params);
        let lambda = p.next_f64(0.0)?;
        p.finish()?;
        Ok(Self::new(lambda))
    }
}

/// Dirichlet smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirichletParams {
    /// Prior strength, `> 0`.
    pub mu: f64,
    /// Pseudo-frequency added to every matching term (Dir+), `>= 0`.
    pub delta: f64,
}

impl Default for DirichletParams {
    fn default() -> Self {
        Self {
            mu: 2000.0,
            delta: 0.05,
        }
    }
}

/// Dirichlet prior smoothing: `p = (wdf + μ p_C) / (doclen + μ)`, with the Dir+ lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LmDirichletWeight {
    params: DirichletParams,
}

impl LmDirichletWeight {
    /// `mu` must be positive and `delta` non-negative, both finite.
    pub fn new(params: DirichletParams) -> Result<Self, Error> {
        if !(params.mu > 0.0 && params.mu.is_finite()) {
            return Err(invalid(Self::NAME, params.mu, "mu must be positive and finite"));
        }
        if !(params.delta >= 0.0 && params.delta.is_finite()) {
            return Err(invalid(
                Self::NAME,
                params.delta,
                "delta must be non-negative and finite",
            ));
        }
        Ok(Self { params })
    }

    /// The validated parameters.
    pub fn params(&self) -> DirichletParams {
        self.params
    }
}

/// Initialized [`LmDirichletWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmDirichletScorer {
    scale: f64,
    /// `total_length / (μ · cf)`.
    multiplier: f64,
    /// `ln(1 + delta · multiplier)`.
    delta_part: f64,
    mu: f64,
    query_length: f64,
    /// `|Q| · ln((μ + db_doclen_max) / μ)`.
    extra_offset: f64,
    upper_bound: f64,
    doclen_lb: TermCount,
}

impl LmDirichletScorer {
    fn extra(&self, len: TermCount) -> f64 {
        let log_alpha = (self.mu / (f64::from(len) + self.mu)).ln();
        (self.query_length * log_alpha + self.extra_offset).max(0.0)
    }
}

impl TermScorer for LmDirichletScorer {
    fn score_term(&self, wdf: TermCount, _: TermCount, _: TermCount, _: TermCount) -> f64 {
        self.scale * ((f64::from(wdf) * self.multiplier).ln_1p() + self.delta_part)
    }

    fn max_score_term(&self) -> f64 {
        self.upper_bound
    }

    fn score_extra(&self, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        self.extra(len)
    }

    fn max_score_extra(&self) -> f64 {
        self.extra(self.doclen_lb)
    }
}

impl Weight for LmDirichletWeight {
    const NAME: &'static str = "lmdirichlet";
    type Scorer = LmDirichletScorer;

    fn stats_needed(&self) -> StatSet {
        common_stats().with(Stat::DbDocLengthMax)
    }

    fn init(&self, stats: &TermStats, factor: f64) -> LmDirichletScorer {
        let DirichletParams { mu, delta } = self.params;
        let multiplier = inverse_collection_prob(stats) / mu;
        let delta_part = (delta * multiplier).ln_1p();
        let scale = (factor * f64::from(stats.wqf)).max(0.0);
        let query_length = f64::from(stats.query_length);
        let db_len_ub = f64::from(stats.db_doclength_upper_bound);
        LmDirichletScorer {
            scale,
            multiplier,
            delta_part,
            mu,
            query_length,
            extra_offset: query_length * (db_len_ub / mu).ln_1p(),
            upper_bound: scale
                * ((f64::from(stats.wdf_upper_bound) * multiplier).ln_1p() + delta_part),
            doclen_lb: stats.doclength_lower_bound,
        }
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        weight::encode(Self::NAME, &self.params)
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        let params: DirichletParams = weight::decode(Self::NAME, bytes)?;
        Self::new(params).map_err(|e| malformed(Self::NAME, e))
    }

    /// `mu delta`, each optional.
    fn from_parameters(params: &str) -> Result<Self, Error> {
        let d = DirichletParams::default();
        let mut p = Params::new(Self::NAME, params);
        let mu = p.next_f64(d.mu)?;
        let delta = p.next_f64(d.delta)?;
        p.finish()?;
        Self::new(DirichletParams { mu, delta })
    }
}

/// Absolute discounting: `p = max(wdf - δ, 0)/doclen + (δ · unique_terms / doclen) p_C`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmAbsDiscountWeight {
    delta: f64,
}

impl Default for LmAbsDiscountWeight {
    fn default() -> Self {
        Self { delta: 0.7 }
    }
}

impl LmAbsDiscountWeight {
    /// `delta` must lie in `(0, 1)`.
    pub fn new(delta: f64) -> Result<Self, Error> {
        if !(delta > 0.0 && delta < 1.0) {
            return Err(invalid(Self::NAME, delta, "delta must be in (0, 1)"));
        }
        Ok(Self { delta })
    }

    /// The discount.
    pub fn delta(&self) -> f64 {
        self.delta
    }
}

/// Initialized [`LmAbsDiscountWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LmAbsDiscountScorer {
    scale: f64,
    delta: f64,
    /// `total_length / (δ · cf)`.
    multiplier: f64,
    query_length: f64,
    /// `|Q| · ln(db_doclen_max / δ)`.
    extra_offset: f64,
    upper_bound: f64,
}

impl LmAbsDiscountScorer {
    /// `δ · unique_terms / doclen`, with the ratio capped at 1.
    fn log_alpha(&self, len: TermCount, uniq: TermCount) -> f64 {
        let ratio = if len == 0 {
            1.0
        } else {
            (f64::from(uniq.max(1)) / f64::from(len)).min(1.0)
        };
        (self.delta * ratio).ln()
    }
}

impl TermScorer for LmAbsDiscountScorer {
    fn score_term(&self, wdf: TermCount, _: TermCount, uniq: TermCount, _: TermCount) -> f64 {
        let discounted = (f64::from(wdf) - self.delta).max(0.0);
        self.scale * (discounted * self.multiplier / f64::from(uniq.max(1))).ln_1p()
    }

    fn max_score_term(&self) -> f64 {
        self.upper_bound
    }

    fn score_extra(&self, len: TermCount, uniq: TermCount, _: TermCount) -> f64 {
        (self.query_length * self.log_alpha(len, uniq) + self.extra_offset).max(0.0)
    }

    fn max_score_extra(&self) -> f64 {
        (self.query_length * self.delta.ln() + self.extra_offset).max(0.0)
    }
}

impl Weight for LmAbsDiscountWeight {
    const NAME: &'static str = "lmabsdiscount";
    type Scorer = LmAbsDiscountScorer;

    fn stats_needed(&self) -> StatSet {
        common_stats()
            .with(Stat::UniqueTerms)
            .with(Stat::UniqueTermsMin)
            .with(Stat::DbDocLengthMax)
    }

    fn init(&self, stats: &TermStats, factor: f64) -> LmAbsDiscountScorer {
        let delta = self.delta;
        let multiplier = inverse_collection_prob(stats) / delta;
        let scale = (factor * f64::from(stats.wqf)).max(0.0);
        let query_length = f64::from(stats.query_length);
        let db_len_ub = f64::from(stats.db_doclength_upper_bound.max(1));
        let discounted_max = (f64::from(stats.wdf_upper_bound) - delta).max(0.0);
        let uniq_lb = f64::from(stats.unique_terms_lower_bound.max(1));
        LmAbsDiscountScorer {
            scale,
            delta,
            multiplier,
            query_length,
            extra_offset: query_length * (db_len_ub / delta).ln(),
            upper_bound: scale * (discounted_max * multiplier / uniq_lb).ln_1p(),
        }
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        weight::encode(Self::NAME, &self.delta)
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        let delta: f64 = weight::decode(Self::NAME, bytes)?;
        Self::new(delta).map_err(|e| malformed(Self::NAME, e))
    }

    /// `delta`, optional.
    fn from_parameters(params: &str) -> Result<Self, Error> {
        let mut p = Params::new(Self::NAME, params);
        let delta = p.next_f64(0.7)?;
        p.finish()?;
        Self::new(delta)
    }
}

/// Two-stage smoothing parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwoStageParams {
    /// Jelinek-Mercer interpolation weight, in `[0, 1)`.
    pub lambda: f64,
    /// Dirichlet prior strength, `> 0`.
    pub mu: f64,
}

impl Default for TwoStageParams {
    fn default() -> Self {
        Self {
            lambda: 0.7,
            mu: 2000.0,
        }
    }
}

/// Two-stage smoothing: Jelinek-Mercer interpolation over a Dirichlet-smoothed document model.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lm2StageWeight {
    params: TwoStageParams,
}

impl Lm2StageWeight {
    /// `lambda` must lie in `[0, 1)` and `mu` must be positive.
    pub fn new(params: TwoStageParams) -> Result<Self, Error> {
        if !(params.lambda >= 0.0 && params.lambda < 1.0) {
            return Err(invalid(Self::NAME, params.lambda, "lambda must be in [0, 1)"));
        }
        if !(params.mu > 0.0 && params.mu.is_finite()) {
            return Err(invalid(Self::NAME, params.mu, "mu must be positive and finite"));
        }
        Ok(Self { params })
    }

    /// The validated parameters.
    pub fn params(&self) -> TwoStageParams {
        self.params
    }
}

/// Initialized [`Lm2StageWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lm2StageScorer {
    scale: f64,
    lambda: f64,
    mu: f64,
    /// `(1 - λ) · total_length / cf`.
    multiplier: f64,
    query_length: f64,
    /// `-|Q| · ln((μ + λ·db_doclen_max) / (μ + db_doclen_max))`.
    extra_offset: f64,
    upper_bound: f64,
    doclen_lb: TermCount,
}

impl Lm2StageScorer {
    fn extra(&self, len: TermCount) -> f64 {
        let len = f64::from(len);
        let log_alpha = ((self.mu + self.lambda * len) / (self.mu + len)).ln();
        (self.query_length * log_alpha + self.extra_offset).max(0.0)
    }
}

impl TermScorer for Lm2StageScorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        let denom = self.mu + self.lambda * f64::from(len);
        self.scale * (self.multiplier * f64::from(wdf) / denom).ln_1p()
    }

    fn max_score_term(&self) -> f64 {
        self.upper_bound
    }

    fn score_extra(&self, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        self.extra(len)
    }

    fn max_score_extra(&self) -> f64 {
        self.extra(self.doclen_lb)
    }
}

impl Weight for Lm2StageWeight {
    const NAME: &'static str = "lm2stage";
    type Scorer = Lm2StageScorer;

    fn stats_needed(&self) -> StatSet {
        common_stats().with(Stat::DbDocLengthMax)
    }

    fn init(&self, stats: &TermStats, factor: f64) -> Lm2StageScorer {
        let TwoStageParams { lambda, mu } = self.params;
        let multiplier = (1.0 - lambda) * inverse_collection_prob(stats);
        let scale = (factor * f64::from(stats.wqf)).max(0.0);
        let query_length = f64::from(stats.query_length);
        let db_len_ub = f64::from(stats.db_doclength_upper_bound);
        let doclen_lb = stats.doclength_lower_bound;
        let min_denom = mu + lambda * f64::from(doclen_lb);
        Lm2StageScorer {
            scale,
            lambda,
            mu,
            multiplier,
            query_length,
            extra_offset: -query_length * ((mu + lambda * db_len_ub) / (mu + db_len_ub)).ln(),
            upper_bound: scale
                * (multiplier * f64::from(stats.wdf_upper_bound) / min_denom).ln_1p(),
            doclen_lb,
        }
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        weight::encode(Self::NAME, &self.params)
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        let params: TwoStageParams = weight::decode(Self::NAME, bytes)?;
        Self::new(params).map_err(|e| malformed(Self::NAME, e))
    }

    /// `lambda mu`, each optional.
    fn from_parameters(params: &str) -> Result<Self, Error> {
        let d = TwoStageParams::default();
        let mut p = Params::new(Self::NAME, params);
        let lambda = p.next_f64(d.lambda)?;
        let mu = p.next_f64(d.mu)?;
        p.finish()?;
        Self::new(TwoStageParams { lambda, mu })
    }
}
