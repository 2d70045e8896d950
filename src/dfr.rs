//! Divergence-from-randomness (DFR) schemes.
//!
//! A DFR weight is the product of a randomness model (how surprising the term's frequency in
//! the document is under a random distribution) and an aftereffect-of-sampling correction.
//! Most schemes here first normalize wdf for document length with Amati's second
//! normalization (H2):
//!
//! `tfn = wdf · log2(1 + c · avg_len / doclen)`
//!
//! | scheme | randomness model | aftereffect |
//! |---|---|---|
//! | InL2 | inverse document frequency | Laplace |
//! | IfB2 | inverse term frequency | Bernoulli |
//! | IneB2 | inverse expected document frequency | Bernoulli |
//! | BB2 | Bose-Einstein (Stirling approximation) | Bernoulli |
//! | PL2 / PL2+ | Poisson | Laplace |
//! | DLH / DPH | hypergeometric, parameter free | Laplace / Popper |
//!
//! References:
//! - Amati & van Rijsbergen (2002). "Probabilistic models of information retrieval based on
//!   measuring the divergence from randomness."
//! - Amati (2006). "Frequentist and Bayesian approach to information retrieval." (DLH, DPH)
//! - Lv & Zhai (2011). "Lower-bounding term frequency normalization." (PL2+)

use crate::stats::{Stat, StatSet, TermCount, TermStats};
use crate::weight::{self, Params, TermScorer, Weight};
use crate::Error;
use std::f64::consts::{LN_2, PI};

fn check_c(scheme: &'static str, c: f64) -> Result<f64, Error> {
    if c > 0.0 && c.is_finite() {
        Ok(c)
    } else {
        Err(Error::InvalidParameter {
            scheme: scheme.to_string(),
            token: c.to_string(),
            reason: "c must be positive",
        })
    }
}

fn malformed(scheme: &'static str, e: Error) -> Error {
    Error::MalformedSerialization {
        scheme,
        reason: e.to_string(),
    }
}

/// Amati's second wdf normalization, with the range it takes over a shard.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Normalization2 {
    /// `c · avg_len`.
    cl: f64,
    /// Smallest `tfn` of any posting (wdf ≥ 1) in the shard.
    lo: f64,
    /// Largest `tfn` of any posting in the shard.
    hi: f64,
}

impl Normalization2 {
    fn new(c: f64, stats: &TermStats) -> Self {
        let mut norm = Self {
            cl: c * stats.average_length,
            lo: 0.0,
            hi: 0.0,
        };
        if stats.doclength_upper_bound > 0 {
            norm.lo = norm.tfn(1, stats.doclength_upper_bound);
        }
        norm.hi = norm.tfn(stats.wdf_upper_bound, stats.doclength_lower_bound);
        norm
    }

    fn tfn(&self, wdf: TermCount, len: TermCount) -> f64 {
        if wdf == 0 || self.cl <= 0.0 {
            return 0.0;
        }
        f64::from(wdf) * (1.0 + self.cl / f64::from(len.max(1))).log2()
    }
}

macro_rules! c_scheme {
    (
        $(#[$doc:meta])*
        $name:ident, $scorer:ident, $id:literal,
        needs: [$($stat:ident),* $(,)?],
        init: $init:path
    ) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq)]
        pub struct $name {
            c: f64,
        }

        impl Default for $name {
            fn default() -> Self {
                Self { c: 1.0 }
            }
        }

        impl $name {
            /// Create with normalization parameter `c`, which must be positive.
            pub fn new(c: f64) -> Result<Self, Error> {
                Ok(Self {
                    c: check_c($id, c)?,
                })
            }

            /// The normalization parameter.
            pub fn c(&self) -> f64 {
                self.c
            }
        }

        impl Weight for $name {
            const NAME: &'static str = $id;
            type Scorer = $scorer;

            fn stats_needed(&self) -> StatSet {
                [$(Stat::$stat),*].into_iter().collect()
            }

            fn init(&self, stats: &TermStats, factor: f64) -> $scorer {
                $init(self.c, stats, factor)
            }

            fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
                weight::encode(Self::NAME, &self.c)
            }

            fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
                let c: f64 = weight::decode(Self::NAME, bytes)?;
                Self::new(c).map_err(|e| malformed(Self::NAME, e))
            }

            /// `c`, optional.
            fn from_parameters(params: &str) -> Result<Self, Error> {
                let mut p = Params::new(Self::NAME, params);
                let c = p.next_f64(1.0)?;
                p.finish()?;
                Self::new(c)
            }
        }
    };
}

/// Initialized InL2, IfB2 or IneB2: `scale · tfn / (tfn + 1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaturatingScorer {
    scale: f64,
    norm: Normalization2,
}

impl SaturatingScorer {
    fn new(scale: f64, c: f64, stats: &TermStats) -> Self {
        Self {
            scale: scale.max(0.0),
            norm: Normalization2::new(c, stats),
        }
    }

    fn saturate(&self, tfn: f64) -> f64 {
        self.scale * tfn / (tfn + 1.0)
    }
}

impl TermScorer for SaturatingScorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        self.saturate(self.norm.tfn(wdf, len))
    }

    fn max_score_term(&self) -> f64 {
        self.saturate(self.norm.hi)
    }
}

fn init_inl2(c: f64, stats: &TermStats, factor: f64) -> SaturatingScorer {
    let n = f64::from(stats.collection_size);
    let tf = f64::from(stats.termfreq);
    let idf = ((n + 1.0) / (tf + 0.5)).log2();
    SaturatingScorer::new(f64::from(stats.wqf) * factor * idf, c, stats)
}

fn init_ifb2(c: f64, stats: &TermStats, factor: f64) -> SaturatingScorer {
    if stats.termfreq == 0 {
        return SaturatingScorer::new(0.0, c, stats);
    }
    let n = f64::from(stats.collection_size);
    let f = f64::from(stats.collection_freq);
    let idf = ((n + 1.0) / (f + 0.5)).log2().max(0.0);
    let b = (f + 1.0) / f64::from(stats.termfreq);
    SaturatingScorer::new(f64::from(stats.wqf) * factor * idf * b, c, stats)
}

fn init_ineb2(c: f64, stats: &TermStats, factor: f64) -> SaturatingScorer {
    if stats.termfreq == 0 || stats.collection_size == 0 {
        return SaturatingScorer::new(0.0, c, stats);
    }
    let n = f64::from(stats.collection_size);
    let f = f64::from(stats.collection_freq);
    // Expected number of documents containing the term.
    let expected = n * (1.0 - ((n - 1.0) / n).powf(f));
    let idf = ((n + 1.0) / (expected + 0.5)).log2().max(0.0);
    let b = (f + 1.0) / f64::from(stats.termfreq);
    SaturatingScorer::new(f64::from(stats.wqf) * factor * idf * b, c, stats)
}

c_scheme!(
    /// InL2: inverse document frequency with Laplace aftereffect.
    InL2Weight, SaturatingScorer, "inl2",
    needs: [AverageLength, DocLength, DocLengthMin, DocLengthMax, CollectionSize, Wdf, WdfMax, Wqf, TermFreq],
    init: init_inl2
);

c_scheme!(
    /// IfB2: inverse term frequency with Bernoulli aftereffect.
    IfB2Weight, SaturatingScorer, "ifb2",
    needs: [AverageLength, DocLength, DocLengthMin, DocLengthMax, CollectionSize, CollectionFreq, Wdf, WdfMax, Wqf, TermFreq],
    init: init_ifb2
);

c_scheme!(
    /// IneB2: inverse expected document frequency with Bernoulli aftereffect.
    IneB2Weight, SaturatingScorer, "ineb2",
    needs: [AverageLength, DocLength, DocLengthMin, DocLengthMax, CollectionSize, CollectionFreq, Wdf, WdfMax, Wqf, TermFreq],
    init: init_ineb2
);

/// Stirling approximation used by BB2: `(y + 0.5)(k - log2 y) + d·k`.
fn stirling(difference: f64, y: f64, k: f64) -> f64 {
    (y + 0.5) * (k - y.log2()) + difference * k
}

/// Initialized [`Bb2Weight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bb2Scorer {
    /// `wqf · factor · (F + 1) / termfreq`.
    scale: f64,
    n: f64,
    f: f64,
    /// `-1/ln 2 - log2(N - 1)`.
    base: f64,
    /// `log2(N + F - 1)`.
    k1: f64,
    /// `log2(F)`.
    k2: f64,
    norm: Normalization2,
}

impl Bb2Scorer {
    fn clamp_tfn(&self, tfn: f64) -> f64 {
        tfn.min(self.f - 1.0).max(0.0)
    }

    fn stirling_sum(&self, t_hi: f64, t_lo: f64) -> f64 {
        let s1 = stirling(t_hi + 1.0, self.n + self.f - t_hi - 2.0, self.k1);
        let s2 = stirling(t_lo, self.f - t_lo, self.k2);
        self.base + s1 - s2
    }
}

impl TermScorer for Bb2Scorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        if wdf == 0 || self.scale == 0.0 {
            return 0.0;
        }
        let t = self.clamp_tfn(self.norm.tfn(wdf, len));
        (self.scale / (t + 1.0) * self.stirling_sum(t, t)).max(0.0)
    }

    fn max_score_term(&self) -> f64 {
        if self.scale == 0.0 {
            return 0.0;
        }
        // Both Stirling terms increase with tfn while the Bernoulli factor decreases.
        let lo = self.clamp_tfn(self.norm.lo);
        let hi = self.clamp_tfn(self.norm.hi);
        self.scale / (lo + 1.0) * self.stirling_sum(hi, lo).max(0.0)
    }
}

fn init_bb2(c: f64, stats: &TermStats, factor: f64) -> Bb2Scorer {
    let n = f64::from(stats.collection_size.max(2));
    let f = f64::from(stats.collection_freq);
    let scale = if stats.termfreq == 0 || stats.collection_freq == 0 {
        0.0
    } else {
        f64::from(stats.wqf) * factor * (f + 1.0) / f64::from(stats.termfreq)
    };
    Bb2Scorer {
        scale: scale.max(0.0),
        n,
        f,
        base: -1.0 / LN_2 - (n - 1.0).log2(),
        k1: (n + f - 1.0).log2(),
        k2: if f > 0.0 { f.log2() } else { 0.0 },
        norm: Normalization2::new(c, stats),
    }
}

c_scheme!(
    /// BB2: Bose-Einstein randomness with Bernoulli aftereffect.
    Bb2Weight, Bb2Scorer, "bb2",
    needs: [AverageLength, DocLength, DocLengthMin, DocLengthMax, CollectionSize, CollectionFreq, Wdf, WdfMax, Wqf, TermFreq],
    init: init_bb2
);

/// Poisson randomness model shared by PL2 and PL2+.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Poisson {
    p1: f64,
    p2: f64,
}

impl Poisson {
    fn new(stats: &TermStats) -> Option<Self> {
        if stats.collection_size == 0 || stats.collection_freq == 0 {
            return None;
        }
        let mean = f64::from(stats.collection_freq) / f64::from(stats.collection_size);
        Some(Self {
            p1: mean / LN_2 + 0.5 * (2.0 * PI).log2(),
            p2: mean.log2() + 1.0 / LN_2,
        })
    }

    /// Information content of a normalized frequency `t > 0`, Laplace-corrected.
    fn gain(&self, t: f64) -> f64 {
        (self.p1 + (t + 0.5) * t.log2() - self.p2 * t) / (t + 1.0)
    }

    /// Upper bound on [`Poisson::gain`] over `[lo, hi]`, bounding each term separately.
    fn gain_bound(&self, lo: f64, hi: f64) -> f64 {
        let growth = (hi + 0.5) * hi.log2() / (hi + 1.0);
        let linear = if self.p2 >= 0.0 {
            -self.p2 * lo / (lo + 1.0)
        } else {
            -self.p2 * hi / (hi + 1.0)
        };
        self.p1 / (lo + 1.0) + growth + linear
    }
}

/// Initialized [`Pl2Weight`] or [`Pl2PlusWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoissonScorer {
    /// `wqf · factor`, or 0 when the term has no occurrences.
    scale: f64,
    model: Poisson,
    /// Gain of the pseudo-frequency `delta` (0 for PL2).
    delta_gain: f64,
    norm: Normalization2,
}

impl PoissonScorer {
    fn new(c: f64, stats: &TermStats, factor: f64, delta: Option<f64>) -> Self {
        let norm = Normalization2::new(c, stats);
        match Poisson::new(stats) {
            Some(model) => Self {
                scale: (f64::from(stats.wqf) * factor).max(0.0),
                model,
                delta_gain: delta.map_or(0.0, |d| model.gain(d)),
                norm,
            },
            None => Self {
                scale: 0.0,
                model: Poisson { p1: 0.0, p2: 0.0 },
                delta_gain: 0.0,
                norm,
            },
        }
    }
}

impl TermScorer for PoissonScorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        if self.scale == 0.0 {
            return 0.0;
        }
        let t = self.norm.tfn(wdf, len);
        if t <= 0.0 {
            return 0.0;
        }
        ((self.model.gain(t) + self.delta_gain) * self.scale).max(0.0)
    }

    fn max_score_term(&self) -> f64 {
        if self.scale == 0.0 || self.norm.hi <= 0.0 {
            return 0.0;
        }
        let bound = self.model.gain_bound(self.norm.lo, self.norm.hi) + self.delta_gain;
        (bound * self.scale).max(0.0)
    }
}

fn init_pl2(c: f64, stats: &TermStats, factor: f64) -> PoissonScorer {
    PoissonScorer::new(c, stats, factor, None)
}

c_scheme!(
    /// PL2: Poisson randomness with Laplace aftereffect.
    Pl2Weight, PoissonScorer, "pl2",
    needs: [AverageLength, DocLength, DocLengthMin, DocLengthMax, CollectionSize, CollectionFreq, Wdf, WdfMax, Wqf],
    init: init_pl2
);

/// PL2+ parameters.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Pl2PlusParams {
    /// H2 normalization parameter, `> 0`.
    pub c: f64,
    /// Pseudo-frequency whose gain is added to every posting, `> 0`.
    pub delta: f64,
}

impl Default for Pl2PlusParams {
    fn default() -> Self {
        Self { c: 1.0, delta: 0.8 }
    }
}

/// PL2+: PL2 with a lower bound on the gain of any matching posting.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pl2PlusWeight {
    params: Pl2PlusParams,
}

impl Pl2PlusWeight {
    /// `c` and `delta` must both be positive.
    pub fn new(params: Pl2PlusParams) -> Result<Self, Error> {
        check_c(Self::NAME, params.c)?;
        if !(params.delta > 0.0 && params.delta.is_finite()) {
            return Err(Error::InvalidParameter {
                scheme: Self::NAME.to_string(),
                token: params.delta.to_string(),
                reason: "delta must be positive",
            });
        }
        Ok(Self { params })
    }

    /// The validated parameters.
    pub fn params(&self) -> Pl2PlusParams {
        self.params
    }
}

impl Weight for Pl2PlusWeight {
    const NAME: &'static str = "pl2+";
    type Scorer = PoissonScorer;

    fn stats_needed(&self) -> StatSet {
        Pl2Weight::default().stats_needed()
    }

    fn init(&self, stats: &TermStats, factor: f64) -> PoissonScorer {
        PoissonScorer::new(self.params.c, stats, factor, Some(self.params.delta))
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        weight::encode(Self::NAME, &self.params)
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        let params: Pl2PlusParams = weight::decode(Self::NAME, bytes)?;
        Self::new(params).map_err(|e| malformed(Self::NAME, e))
    }

    /// `c delta`, each optional.
    fn from_parameters(params: &str) -> Result<Self, Error> {
        let d = Pl2PlusParams::default();
        let mut p = Params::new(Self::NAME, params);
        let c = p.next_f64(d.c)?;
        let delta = p.next_f64(d.delta)?;
        p.finish()?;
        Self::new(Pl2PlusParams { c, delta })
    }
}

/// Which hypergeometric approximation to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hypergeometric {
    Laplace,
    Popper,
}

/// Initialized [`DlhWeight`] or [`DphWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HypergeometricScorer {
    kind: Hypergeometric,
    /// `wqf · factor`.
    scale: f64,
    /// `total_length / collection_freq`.
    k: f64,
    upper_bound: f64,
}

impl HypergeometricScorer {
    fn new(kind: Hypergeometric, stats: &TermStats, factor: f64) -> Self {
        if stats.collection_freq == 0 || stats.total_length == 0 {
            return Self {
                kind,
                scale: 0.0,
                k: 0.0,
                upper_bound: 0.0,
            };
        }
        let scale = (f64::from(stats.wqf) * factor).max(0.0);
        let k = stats.total_length as f64 / f64::from(stats.collection_freq);
        let len_lb = f64::from(stats.doclength_lower_bound.max(1));
        let max_ratio = (f64::from(stats.wdf_upper_bound) / len_lb).min(1.0);
        // wdf/(wdf+0.5) and (1-r)²·wdf/(wdf+1) are below 1, and the Stirling correction is
        // largest at wdf = 1.
        let info = if max_ratio > 0.0 {
            (max_ratio * k).log2().max(0.0)
        } else {
            0.0
        };
        let correction = match kind {
            Hypergeometric::Laplace => 0.5 * (2.0 * PI).log2() / 1.5,
            Hypergeometric::Popper => 0.5 * (2.0 * PI).log2() / 2.0,
        };
        let upper_bound = if stats.wdf_upper_bound == 0 {
            0.0
        } else {
            scale * (info + correction)
        };
        Self {
            kind,
            scale,
            k,
            upper_bound,
        }
    }
}

impl TermScorer for HypergeometricScorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, _: TermCount, _: TermCount) -> f64 {
        if wdf == 0 || wdf >= len || self.scale == 0.0 {
            return 0.0;
        }
        let w = f64::from(wdf);
        let l = f64::from(len);
        let r = w / l;
        let stirling = 0.5 * (2.0 * PI * w * (1.0 - r)).log2();
        let wt = match self.kind {
            Hypergeometric::Laplace => {
                (w * (r * self.k).log2() + (l - w) * (1.0 - r).log2() + stirling) / (w + 0.5)
            }
            Hypergeometric::Popper => {
                (1.0 - r).powi(2) / (w + 1.0) * (w * (r * self.k).log2() + stirling)
            }
        };
        if wt <= 0.0 {
            return 0.0;
        }
        self.scale * wt
    }

    fn max_score_term(&self) -> f64 {
        self.upper_bound
    }
}

fn hypergeometric_stats() -> StatSet {
    [
        Stat::DocLength,
        Stat::CollectionFreq,
        Stat::Wdf,
        Stat::Wqf,
        Stat::WdfMax,
        Stat::DocLengthMin,
        Stat::DocLengthMax,
        Stat::TotalLength,
    ]
    .into_iter()
    .collect()
}

/// DLH: parameter-free hypergeometric model with Laplace aftereffect.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DlhWeight;

impl Weight for DlhWeight {
    const NAME: &'static str = "dlh";
    type Scorer = HypergeometricScorer;

    fn stats_needed(&self) -> StatSet {
        hypergeometric_stats()
    }

    fn init(&self, stats: &TermStats, factor: f64) -> HypergeometricScorer {
        HypergeometricScorer::new(Hypergeometric::Laplace, stats, factor)
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

/// DPH: parameter-free hypergeometric model with Popper normalization.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DphWeight;

impl Weight for DphWeight {
    const NAME: &'static str = "dph";
    type Scorer = HypergeometricScorer;

    fn stats_needed(&self) -> StatSet {
        hypergeometric_stats()
    }

    fn init(&self, stats: &TermStats, factor: f64) -> HypergeometricScorer {
        HypergeometricScorer::new(Hypergeometric::Popper, stats, factor)
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

    fn stats() -> TermStats {
        TermStats {
            collection_size: 1000,
            termfreq: 10,
            collection_freq: 40,
            total_length: 40_000,
            average_length: 40.0,
            wqf: 1,
            wdf_upper_bound: 20,
            doclength_lower_bound: 5,
            doclength_upper_bound: 400,
            ..TermStats::default()
        }
    }

    fn grid() -> impl Iterator<Item = (TermCount, TermCount)> {
        [5u32, 8, 20, 40, 100, 400]
            .into_iter()
            .flat_map(|len| (0..=20u32.min(len)).map(move |wdf| (wdf, len)))
    }

    fn assert_bounded<S: TermScorer>(name: &str, s: &S) {
        let max = s.max_score_term();
        for (wdf, len) in grid() {
            let v = s.score_term(wdf, len, 0, 0);
            assert!(v.is_finite() && v >= 0.0, "{name}: {v} at ({wdf}, {len})");
            assert!(v <= max + 1e-9, "{name}: {v} > {max} at ({wdf}, {len})");
        }
    }

    #[test]
    fn every_scheme_respects_its_bound() {
        let st = stats();
        assert_bounded("inl2", &InL2Weight::default().init(&st, 1.0));
        assert_bounded("ifb2", &IfB2Weight::default().init(&st, 1.0));
        assert_bounded("ineb2", &IneB2Weight::default().init(&st, 1.0));
        assert_bounded("bb2", &Bb2Weight::default().init(&st, 1.0));
        assert_bounded("pl2", &Pl2Weight::default().init(&st, 1.0));
        assert_bounded("pl2+", &Pl2PlusWeight::default().init(&st, 1.0));
        assert_bounded("dlh", &DlhWeight.init(&st, 1.0));
        assert_bounded("dph", &DphWeight.init(&st, 1.0));
        assert_bounded("inl2 c=7", &InL2Weight::new(7.0).unwrap().init(&st, 2.0));
    }

    #[test]
    fn inl2_closed_form() {
        let s = InL2Weight::default().init(&stats(), 1.0);
        let tfn = 3.0 * (1.0f64 + 40.0 / 50.0).log2();
        let idf = (1001.0f64 / 10.5).log2();
        let expected = idf * tfn / (tfn + 1.0);
        assert!((s.score_term(3, 50, 0, 0) - expected).abs() < 1e-9);
    }

    #[test]
    fn wdf_zero_scores_zero() {
        let st = stats();
        assert_eq!(Pl2Weight::default().init(&st, 1.0).score_term(0, 10, 0, 0), 0.0);
        assert_eq!(Bb2Weight::default().init(&st, 1.0).score_term(0, 10, 0, 0), 0.0);
        assert_eq!(DlhWeight.init(&st, 1.0).score_term(0, 10, 0, 0), 0.0);
    }

    #[test]
    fn hypergeometric_whole_document_scores_zero() {
        let st = stats();
        assert_eq!(DlhWeight.init(&st, 1.0).score_term(7, 7, 0, 0), 0.0);
        assert_eq!(DphWeight.init(&st, 1.0).score_term(7, 7, 0, 0), 0.0);
    }

    #[test]
    fn extra_mode_is_zero() {
        let st = stats();
        assert_eq!(Pl2Weight::default().init_extra(&st).max_score_term(), 0.0);
        assert_eq!(InL2Weight::default().init_extra(&st).score_term(3, 40, 0, 0), 0.0);
    }

    #[test]
    fn non_positive_c_is_rejected() {
        assert!(InL2Weight::new(0.0).is_err());
        assert!(Bb2Weight::from_parameters("-1").is_err());
        assert!(Pl2PlusWeight::from_parameters("1 0").is_err());
        assert!(Pl2Weight::from_parameters("2.5").is_ok());
        match IfB2Weight::from_parameters("x") {
            Err(Error::InvalidParameter { token, .. }) => assert_eq!(token, "x"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn absent_term_scores_zero() {
        let st = TermStats {
            collection_freq: 0,
            termfreq: 0,
            ..stats()
        };
        assert_eq!(Pl2Weight::default().init(&st, 1.0).score_term(2, 40, 0, 0), 0.0);
        assert_eq!(Bb2Weight::default().init(&st, 1.0).max_score_term(), 0.0);
        assert_eq!(DphWeight.init(&st, 1.0).score_term(2, 40, 0, 0), 0.0);
    }
}
