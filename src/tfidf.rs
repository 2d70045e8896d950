//! TF-IDF with SMART-style selectable normalizations.
//!
//! A normalization is chosen for the wdf component, the idf component and the final weight.
//! The classic three-letter notation (`"ntn"`, `"bpn"`, ...) selects the common ones; every
//! variant is also reachable by name (`"tfidf LOG PIVOTED NONE"`).
//!
//! References:
//! - Spärck Jones (1972): term specificity / IDF motivation.
//! - Salton & Buckley (1988): term-weighting approaches in automatic text retrieval.
//! - Singhal, Buckley & Mitra (1996): pivoted document length normalization.

use crate::stats::{Stat, StatSet, TermCount, TermStats};
use crate::weight::{self, Params, TermScorer, Weight};
use crate::Error;
use serde::{Deserialize, Serialize};

/// Within-document frequency normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WdfNorm {
    /// `wdf`.
    None,
    /// 1 if the term occurs, else 0.
    Boolean,
    /// `wdf²`.
    Square,
    /// `1 + ln(wdf)`.
    Log,
    /// `(1 + ln(1 + ln(wdf))) / (1 - slope + slope · doclen / avg) + delta`.
    Pivoted,
    /// `(1 + ln(wdf)) / (1 + ln(doclen / unique_terms))`.
    LogAverage,
    /// `0.2 + 0.8 ln(wdf + 1)`.
    AugLog,
    /// `sqrt(wdf - 0.5) + 1`.
    Sqrt,
    /// `0.9 + 0.1 wdf / (doclen / unique_terms)`.
    AugAverage,
    /// `wdf / wdf_doc_max`.
    Max,
    /// `0.5 + 0.5 wdf / wdf_doc_max`.
    Aug,
}

impl WdfNorm {
    const NAMES: [(WdfNorm, &'static str); 11] = [
        (WdfNorm::None, "NONE"),
        (WdfNorm::Boolean, "BOOLEAN"),
        (WdfNorm::Square, "SQUARE"),
        (WdfNorm::Log, "LOG"),
        (WdfNorm::Pivoted, "PIVOTED"),
        (WdfNorm::LogAverage, "LOG_AVERAGE"),
        (WdfNorm::AugLog, "AUG_LOG"),
        (WdfNorm::Sqrt, "SQRT"),
        (WdfNorm::AugAverage, "AUG_AVERAGE"),
        (WdfNorm::Max, "MAX"),
        (WdfNorm::Aug, "AUG"),
    ];

    /// Parse a SMART letter.
    pub fn from_letter(c: char) -> Option<Self> {
        Some(match c {
            'n' => WdfNorm::None,
            'b' => WdfNorm::Boolean,
            's' => WdfNorm::Square,
            'l' => WdfNorm::Log,
            'P' => WdfNorm::Pivoted,
            'L' => WdfNorm::LogAverage,
            'm' => WdfNorm::Max,
            'a' => WdfNorm::Aug,
            _ => return None,
        })
    }

    /// Parse a full normalization name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES.iter().find(|(_, n)| *n == name).map(|(v, _)| *v)
    }

    /// Full normalization name.
    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(v, _)| *v == self)
            .map_or("NONE", |(_, n)| *n)
    }

    fn stats_needed(self, needed: &mut StatSet) {
        match self {
            WdfNorm::Pivoted => {
                needed.insert(Stat::DocLength);
                needed.insert(Stat::DocLengthMin);
                needed.insert(Stat::AverageLength);
            }
            WdfNorm::LogAverage | WdfNorm::AugAverage => {
                needed.insert(Stat::DocLength);
                needed.insert(Stat::UniqueTerms);
            }
            WdfNorm::Max | WdfNorm::Aug => needed.insert(Stat::WdfDocMax),
            _ => {}
        }
    }
}

/// Inverse document frequency normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IdfNorm {
    /// 1.
    None,
    /// `ln(N / termfreq)`.
    Tfidf,
    /// `ln(N / termfreq)²`.
    Square,
    /// `1 / termfreq`.
    Freq,
    /// `ln((N - termfreq) / termfreq)`, floored at 0.
    Prob,
    /// `ln((N + 1) / termfreq)`.
    Pivoted,
    /// `collection_freq / termfreq`.
    GlobalFreq,
    /// `ln(collection_freq / termfreq + 1)`.
    LogGlobalFreq,
    /// `collection_freq / termfreq + 1`.
    IncrementedGlobalFreq,
    /// `sqrt(collection_freq / termfreq - 0.9)`.
    SqrtGlobalFreq,
}

impl IdfNorm {
    const NAMES: [(IdfNorm, &'static str); 10] = [
        (IdfNorm::None, "NONE"),
        (IdfNorm::Tfidf, "TFIDF"),
        (IdfNorm::Square, "SQUARE"),
        (IdfNorm::Freq, "FREQ"),
        (IdfNorm::Prob, "PROB"),
        (IdfNorm::Pivoted, "PIVOTED"),
        (IdfNorm::GlobalFreq, "GLOBAL_FREQ"),
        (IdfNorm::LogGlobalFreq, "LOG_GLOBAL_FREQ"),
        (IdfNorm::IncrementedGlobalFreq, "INCREMENTED_GLOBAL_FREQ"),
        (IdfNorm::SqrtGlobalFreq, "SQRT_GLOBAL_FREQ"),
    ];

    /// Parse a SMART letter.
    pub fn from_letter(c: char) -> Option<Self> {
        Some(match c {
            'n' => IdfNorm::None,
            't' => IdfNorm::Tfidf,
            's' => IdfNorm::Square,
            'f' => IdfNorm::Freq,
            'p' => IdfNorm::Prob,
            'P' => IdfNorm::Pivoted,
            _ => return None,
        })
    }

    /// Parse a full normalization name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::NAMES.iter().find(|(_, n)| *n == name).map(|(v, _)| *v)
    }

    /// Full normalization name.
    pub fn name(self) -> &'static str {
        Self::NAMES
            .iter()
            .find(|(v, _)| *v == self)
            .map_or("NONE", |(_, n)| *n)
    }

    fn stats_needed(self, needed: &mut StatSet) {
        match self {
            IdfNorm::None => {}
            IdfNorm::Freq => needed.insert(Stat::TermFreq),
            IdfNorm::Tfidf | IdfNorm::Square | IdfNorm::Prob | IdfNorm::Pivoted => {
                needed.insert(Stat::TermFreq);
                needed.insert(Stat::CollectionSize);
            }
            IdfNorm::GlobalFreq
            | IdfNorm::LogGlobalFreq
            | IdfNorm::IncrementedGlobalFreq
            | IdfNorm::SqrtGlobalFreq => {
                needed.insert(Stat::TermFreq);
                needed.insert(Stat::CollectionFreq);
            }
        }
    }

    fn value(self, stats: &TermStats) -> f64 {
        if self == IdfNorm::None {
            return 1.0;
        }
        if stats.termfreq == 0 {
            return 0.0;
        }
        let n = f64::from(stats.collection_size);
        let tf = f64::from(stats.termfreq);
        let cf = f64::from(stats.collection_freq);
        let v = match self {
            IdfNorm::None => 1.0,
            IdfNorm::Tfidf => (n / tf).ln(),
            IdfNorm::Square => (n / tf).ln().powi(2),
            IdfNorm::Freq => 1.0 / tf,
            IdfNorm::Prob => {
                if n <= tf {
                    0.0
                } else {
                    ((n - tf) / tf).ln()
                }
            }
            IdfNorm::Pivoted => ((n + 1.0) / tf).ln(),
            IdfNorm::GlobalFreq => cf / tf,
            IdfNorm::LogGlobalFreq => (cf / tf + 1.0).ln(),
            IdfNorm::IncrementedGlobalFreq => cf / tf + 1.0,
            IdfNorm::SqrtGlobalFreq => (cf / tf - 0.9).max(0.0).sqrt(),
        };
        v.max(0.0)
    }
}

/// Final weight normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WtNorm {
    /// `wdfn · idfn`.
    #[default]
    None,
}

impl WtNorm {
    /// Parse a SMART letter.
    pub fn from_letter(c: char) -> Option<Self> {
        (c == 'n').then_some(WtNorm::None)
    }

    /// Parse a full normalization name.
    pub fn from_name(name: &str) -> Option<Self> {
        (name == "NONE").then_some(WtNorm::None)
    }

    /// Full normalization name.
    pub fn name(self) -> &'static str {
        "NONE"
    }
}

/// TF-IDF parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TfIdfParams {
    /// Within-document frequency normalization.
    pub wdf_norm: WdfNorm,
    /// Collection frequency normalization.
    pub idf_norm: IdfNorm,
    /// Final weight normalization.
    pub wt_norm: WtNorm,
    /// Pivoted wdf normalization slope, in `(0, 1]`.
    pub slope: f64,
    /// Pivoted wdf normalization offset, `> 0`.
    pub delta: f64,
}

impl Default for TfIdfParams {
    fn default() -> Self {
        Self {
            wdf_norm: WdfNorm::None,
            idf_norm: IdfNorm::Tfidf,
            wt_norm: WtNorm::None,
            slope: 0.2,
            delta: 1.0,
        }
    }
}

impl TfIdfParams {
    /// Parse a three-letter SMART string such as `"ntn"`.
    pub fn from_letters(normalizations: &str) -> Result<Self, Error> {
        let invalid = |reason| Error::InvalidParameter {
            scheme: TfIdfWeight::NAME.to_string(),
            token: normalizations.to_string(),
            reason,
        };
        let mut chars = normalizations.chars();
        let (Some(w), Some(i), Some(t), None) =
            (chars.next(), chars.next(), chars.next(), chars.next())
        else {
            return Err(invalid("normalization string must have three letters"));
        };
        Ok(Self {
            wdf_norm: WdfNorm::from_letter(w).ok_or_else(|| invalid("unknown wdf normalization"))?,
            idf_norm: IdfNorm::from_letter(i).ok_or_else(|| invalid("unknown idf normalization"))?,
            wt_norm: WtNorm::from_letter(t).ok_or_else(|| invalid("unknown weight normalization"))?,
            ..Self::default()
        })
    }
}

/// TF-IDF.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfIdfWeight {
    params: TfIdfParams,
}

impl Default for TfIdfWeight {
    fn default() -> Self {
        Self {
            params: TfIdfParams::default(),
        }
    }
}

impl TfIdfWeight {
    /// Create from explicit parameters, validating `slope` and `delta`.
    pub fn new(params: TfIdfParams) -> Result<Self, Error> {
        let invalid = |token: f64, reason| Error::InvalidParameter {
            scheme: Self::NAME.to_string(),
            token: token.to_string(),
            reason,
        };
        if !(params.slope > 0.0 && params.slope <= 1.0) {
            return Err(invalid(params.slope, "slope must be in (0, 1]"));
        }
        if !(params.delta > 0.0 && params.delta.is_finite()) {
            return Err(invalid(params.delta, "delta must be positive and finite"));
        }
        Ok(Self { params })
    }

    /// Create from a SMART string with default slope and delta.
    pub fn with_normalizations(normalizations: &str) -> Result<Self, Error> {
        Self::new(TfIdfParams::from_letters(normalizations)?)
    }

    pub fn params(&self) -> TfIdfParams {
        self.params
    }
}

/// Initialized [`TfIdfWeight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TfIdfScorer {
    wdf_norm: WdfNorm,
    /// `idfn · wqf · factor`.
    scale: f64,
    slope: f64,
    delta: f64,
    average_length: f64,
    upper_bound: f64,
}

impl TfIdfScorer {
    fn pivot(&self, len: TermCount) -> f64 {
        let ratio = if self.average_length > 0.0 {
            f64::from(len.max(1)) / self.average_length
        } else {
            1.0
        };
        1.0 - self.slope + self.slope * ratio
    }

    fn wdfn(&self, wdf: TermCount, len: TermCount, uniq: TermCount, wdf_doc_max: TermCount) -> f64 {
        if wdf == 0 {
            return 0.0;
        }
        let w = f64::from(wdf);
        // Mean wdf of the document's terms.
        let mean_wdf = || {
            if uniq == 0 || len == 0 {
                1.0
            } else {
                (f64::from(len) / f64::from(uniq)).max(1.0)
            }
        };
        let max_wdf = || f64::from(wdf_doc_max.max(wdf));
        match self.wdf_norm {
            WdfNorm::None => w,
            WdfNorm::Boolean => 1.0,
            WdfNorm::Square => w * w,
            WdfNorm::Log => 1.0 + w.ln(),
            WdfNorm::Pivoted => (1.0 + (1.0 + w.ln()).ln()) / self.pivot(len) + self.delta,
            WdfNorm::LogAverage => (1.0 + w.ln()) / (1.0 + mean_wdf().ln()),
            WdfNorm::AugLog => 0.2 + 0.8 * (w + 1.0).ln(),
            WdfNorm::Sqrt => (w - 0.5).sqrt() + 1.0,
            WdfNorm::AugAverage => 0.9 + 0.1 * (w / mean_wdf()),
            WdfNorm::Max => w / max_wdf(),
            WdfNorm::Aug => 0.5 + 0.5 * w / max_wdf(),
        }
    }

    fn wdfn_upper_bound(&self, wdf_ub: TermCount, doclen_lb: TermCount) -> f64 {
        if wdf_ub == 0 {
            return 0.0;
        }
        let w = f64::from(wdf_ub);
        match self.wdf_norm {
            WdfNorm::None => w,
            WdfNorm::Boolean => 1.0,
            WdfNorm::Square => w * w,
            WdfNorm::Log | WdfNorm::LogAverage => 1.0 + w.ln(),
            WdfNorm::Pivoted => (1.0 + (1.0 + w.ln()).ln()) / self.pivot(doclen_lb) + self.delta,
            WdfNorm::AugLog => 0.2 + 0.8 * (w + 1.0).ln(),
            WdfNorm::Sqrt => (w - 0.5).sqrt() + 1.0,
            WdfNorm::AugAverage => 0.9 + 0.1 * w,
            WdfNorm::Max | WdfNorm::Aug => 1.0,
        }
    }
}

impl TermScorer for TfIdfScorer {
    fn score_term(&self, wdf: TermCount, len: TermCount, uniq: TermCount, wdfmax: TermCount) -> f64 {
        self.wdfn(wdf, len, uniq, wdfmax) * self.scale
    }

    fn max_score_term(&self) -> f64 {
        self.upper_bound
    }
}

impl Weight for TfIdfWeight {
    const NAME: &'static str = "tfidf";
    type Scorer = TfIdfScorer;

    fn stats_needed(&self) -> StatSet {
        let mut needed = StatSet::new()
            .with(Stat::Wqf)
            .with(Stat::Wdf)
            .with(Stat::WdfMax);
        self.params.wdf_norm.stats_needed(&mut needed);
        self.params.idf_norm.stats_needed(&mut needed);
        needed
    }

    fn init(&self, stats: &TermStats, factor: f64) -> TfIdfScorer {
        let p = &self.params;
        let scale = if factor == 0.0 {
            0.0
        } else {
            p.idf_norm.value(stats) * f64::from(stats.wqf) * factor
        };
        let mut scorer = TfIdfScorer {
            wdf_norm: p.wdf_norm,
            scale,
            slope: p.slope,
            delta: p.delta,
            average_length: stats.average_length,
            upper_bound: 0.0,
        };
        scorer.upper_bound =
            scorer.wdfn_upper_bound(stats.wdf_upper_bound, stats.doclength_lower_bound) * scale;
        tracing::trace!(scale, upper_bound = scorer.upper_bound, "tfidf init");
        scorer
    }

    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        weight::encode(Self::NAME, &self.params)
    }

    fn deserialize_parameters(bytes: &[u8]) -> Result<Self, Error> {
        let params: TfIdfParams = weight::decode(Self::NAME, bytes)?;
        Self::new(params).map_err(|e| Error::MalformedSerialization {
            scheme: Self::NAME,
            reason: e.to_string(),
        })
    }

    /// Either a SMART string (`"ntn"`) or three normalization names, then optional slope and
    /// delta.
    fn from_parameters(params: &str) -> Result<Self, Error> {
        let mut p = Params::new(Self::NAME, params);
        let Some(first) = p.next_token() else {
            return Ok(Self::default());
        };
        let defaults = TfIdfParams::default();
        let mut parsed = if first.chars().count() == 3 && WdfNorm::from_name(first).is_none() {
            TfIdfParams::from_letters(first)?
        } else {
            let wdf_norm =
                WdfNorm::from_name(first).ok_or_else(|| p.invalid(first, "unknown wdf normalization"))?;
            let tok = p
                .next_token()
                .ok_or_else(|| p.invalid(first, "expected three normalization names"))?;
            let idf_norm =
                IdfNorm::from_name(tok).ok_or_else(|| p.invalid(tok, "unknown idf normalization"))?;
            let tok = p
                .next_token()
                .ok_or_else(|| p.invalid(first, "expected three normalization names"))?;
            let wt_norm =
                WtNorm::from_name(tok).ok_or_else(|| p.invalid(tok, "unknown weight normalization"))?;
            TfIdfParams {
                wdf_norm,
                idf_norm,
                wt_norm,
                ..defaults
            }
        };
        parsed.slope = p.next_f64(defaults.slope)?;
        parsed.delta = p.next_f64(defaults.delta)?;
        p.finish()?;
        Self::new(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> TermStats {
        // 6 documents, term in 2 of them, 9 occurrences overall.
        TermStats {
            collection_size: 6,
            termfreq: 2,
            collection_freq: 9,
            wqf: 1,
            wdf_upper_bound: 8,
            doclength_lower_bound: 1,
            average_length: 10.0,
            ..TermStats::default()
        }
    }

    fn score(norms: &str, wdf: TermCount, len: TermCount, uniq: TermCount, max: TermCount) -> f64 {
        let w = TfIdfWeight::with_normalizations(norms).unwrap();
        w.init(&stats(), 1.0).score_term(wdf, len, uniq, max)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn letter_normalizations() {
        assert!(close(score("ntn", 8, 81, 56, 8), 8.0 * 3f64.ln()));
        assert!(close(score("nfn", 8, 81, 56, 8), 4.0));
        assert!(close(score("nsn", 8, 81, 56, 8), 8.0 * 3f64.ln().powi(2)));
        assert!(close(score("bnn", 8, 81, 56, 8), 1.0));
        assert!(close(score("lnn", 8, 81, 56, 8), 1.0 + 8f64.ln()));
        assert!(close(score("snn", 3, 81, 56, 3), 9.0));
        assert!(close(score("npn", 8, 81, 56, 8), 8.0 * 2f64.ln()));
        assert!(close(score("mnn", 1, 31, 26, 4), 0.25));
        assert!(close(score("ann", 1, 31, 26, 4), 0.5 + 0.5 * 0.25));
        assert!(close(
            score("Lnn", 8, 81, 56, 8),
            (1.0 + 8f64.ln()) / (1.0 + (81.0f64 / 56.0).ln())
        ));
    }

    #[test]
    fn named_normalizations() {
        let w = TfIdfWeight::from_parameters("AUG_LOG NONE NONE").unwrap();
        let s = w.init(&stats(), 1.0);
        assert!(close(s.score_term(8, 81, 56, 8), 0.2 + 0.8 * 9f64.ln()));

        let w = TfIdfWeight::from_parameters("NONE GLOBAL_FREQ NONE").unwrap();
        assert!(close(w.init(&stats(), 1.0).score_term(8, 81, 56, 8), 8.0 * 4.5));

        let w = TfIdfWeight::from_parameters("SQRT NONE NONE").unwrap();
        assert!(close(w.init(&stats(), 1.0).score_term(1, 31, 26, 1), 0.5f64.sqrt() + 1.0));

        let w = TfIdfWeight::from_parameters("NONE SQRT_GLOBAL_FREQ NONE").unwrap();
        assert!(close(w.init(&stats(), 1.0).score_term(1, 31, 26, 1), 3.6f64.sqrt()));

        let w = TfIdfWeight::from_parameters("AUG_AVERAGE NONE NONE").unwrap();
        assert!(close(
            w.init(&stats(), 1.0).score_term(8, 81, 56, 8),
            0.9 + 0.1 * (8.0 / (81.0 / 56.0))
        ));
    }

    #[test]
    fn nnn_is_wdf_times_factor() {
        let w = TfIdfWeight::from_parameters("nnn").unwrap();
        let s = w.init(&stats(), 2.5);
        for wdf in [1, 2, 7] {
            assert!(close(s.score_term(wdf, 50, 10, wdf), f64::from(wdf) * 2.5));
        }
    }

    #[test]
    fn prob_idf_clamps_to_zero_for_common_terms() {
        let w = TfIdfWeight::with_normalizations("npn").unwrap();
        let common = TermStats {
            termfreq: 5,
            ..stats()
        };
        assert_eq!(w.init(&common, 1.0).score_term(3, 10, 5, 3), 0.0);
    }

    #[test]
    fn wdf_zero_is_zero_for_log_forms() {
        for norms in ["lnn", "Lnn", "Pnn"] {
            assert_eq!(score(norms, 0, 10, 5, 1), 0.0, "{norms}");
        }
        let w = TfIdfWeight::from_parameters("SQRT NONE NONE").unwrap();
        assert_eq!(w.init(&stats(), 1.0).score_term(0, 10, 5, 1), 0.0);
    }

    #[test]
    fn pivoted_prefers_shorter_documents() {
        let w = TfIdfWeight::with_normalizations("PPn").unwrap();
        let s = w.init(&stats(), 1.0);
        assert!(s.score_term(2, 5, 5, 2) > s.score_term(2, 50, 5, 2));
        assert!(s.score_term(8, 1, 1, 8) <= s.max_score_term());
    }

    #[test]
    fn invalid_strings_are_rejected() {
        for bad in [
            "JOHN_LENNON",
            "LOL",
            "FUN NONE NONE",
            "NONE FUN NONE",
            "NONE NONE FUN",
            "NONE",
            "NONE NONE",
            "ntn 0",
            "ntn 0.2 -1",
            "ntn 0.2 1 extra",
        ] {
            assert!(TfIdfWeight::from_parameters(bad).is_err(), "{bad}");
        }
    }

    #[test]
    fn default_is_ntn() {
        let a = TfIdfWeight::default();
        let b = TfIdfWeight::from_parameters("ntn").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.params().wdf_norm.name(), "NONE");
        assert_eq!(a.params().idf_norm.name(), "TFIDF");
    }
}
