//! The closed set of weighting schemes, selection by name, and remote transport.
//!
//! [`Scheme`] wraps every configured [`Weight`] and [`Scorer`] every initialized
//! [`TermScorer`], so a match loop can hold either without generics or boxing.
//!
//! Selection strings look like `"bm25 1.2 0 1 0.75 0.5"`: the scheme name followed by
//! whitespace-separated parameters, any trailing subset of which may be omitted. Names are
//! case sensitive. The name-to-constructor table is built once and only read afterwards.

use crate::bm25::{Bm25PlusScorer, Bm25PlusWeight, Bm25Scorer, Bm25Weight};
use crate::dfr::{
    Bb2Scorer, Bb2Weight, DlhWeight, DphWeight, HypergeometricScorer, IfB2Weight, InL2Weight,
    IneB2Weight, Pl2PlusWeight, Pl2Weight, PoissonScorer, SaturatingScorer,
};
use crate::query_likelihood::{
    Lm2StageScorer, Lm2StageWeight, LmAbsDiscountScorer, LmAbsDiscountWeight, LmDirichletScorer,
    LmDirichletWeight, LmJmScorer, LmJmWeight,
};
use crate::simple::{BoolScorer, BoolWeight, CoordScorer, CoordWeight, DiceScorer, DiceWeight};
use crate::stats::{Stat, StatSet, StatsSource, TermCount, TermStats};
use crate::tfidf::{TfIdfScorer, TfIdfWeight};
use crate::weight::{Params, TermScorer, Weight};
use crate::Error;
use std::collections::HashMap;
use std::sync::OnceLock;

type FromParametersFn = fn(&str) -> Result<Scheme, Error>;
type DeserializeFn = fn(&[u8]) -> Result<Scheme, Error>;

#[derive(Clone, Copy)]
struct Entry {
    from_parameters: FromParametersFn,
    deserialize: DeserializeFn,
}

/// Generates [`Scheme`], [`Scorer`], their dispatch, and the registry entries.
///
/// Several schemes share one scorer type, so the two enums are listed separately.
macro_rules! define_schemes {
    (
        schemes {
            $($(#[$sdoc:meta])* $variant:ident($weight:ty) => $scorer_variant:ident,)*
        }
        scorers {
            $($svariant:ident($scorer:ty),)*
        }
    ) => {
        /// A configured weighting scheme.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Scheme {
            $($(#[$sdoc])* $variant($weight),)*
        }

        /// An initialized per-term scorer.
        #[derive(Debug, Clone, PartialEq)]
        pub enum Scorer {
            $($svariant($scorer),)*
        }

        $(
            impl From<$weight> for Scheme {
                fn from(w: $weight) -> Self {
                    Scheme::$variant(w)
                }
            }
        )*

        $(
            impl From<$scorer> for Scorer {
                fn from(s: $scorer) -> Self {
                    Scorer::$svariant(s)
                }
            }
        )*

        const NAMES: &[&str] = &[$(<$weight as Weight>::NAME),*];

        fn builtin_entries() -> impl Iterator<Item = (&'static str, Entry)> {
            [$(
                (
                    <$weight as Weight>::NAME,
                    Entry {
                        from_parameters: |p| <$weight>::from_parameters(p).map(Scheme::$variant),
                        deserialize: |b| <$weight>::deserialize_parameters(b).map(Scheme::$variant),
                    },
                ),
            )*]
            .into_iter()
        }

        impl Scheme {
            /// Lowercase identifier, as used by [`Scheme::create`] and on the wire.
            pub fn name(&self) -> &'static str {
                match self {
                    $(Scheme::$variant(_) => <$weight as Weight>::NAME,)*
                }
            }

            /// Statistics this configuration reads.
            pub fn stats_needed(&self) -> StatSet {
                match self {
                    $(Scheme::$variant(w) => w.stats_needed(),)*
                }
            }

            /// Initialize for one term on one shard. See [`Weight::init`].
            pub fn init(&self, stats: &TermStats, factor: f64) -> Scorer {
                match self {
                    $(Scheme::$variant(w) => Scorer::$scorer_variant(w.init(stats, factor)),)*
                }
            }

            /// Encode the parameters; pair with [`Scheme::name`] for transport.
            pub fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
                match self {
                    $(Scheme::$variant(w) => w.serialize_parameters(),)*
                }
            }
        }

        impl TermScorer for Scorer {
            fn score_term(
                &self,
                wdf: TermCount,
                doclen: TermCount,
                unique_terms: TermCount,
                wdf_doc_max: TermCount,
            ) -> f64 {
                match self {
                    $(Scorer::$svariant(s) => s.score_term(wdf, doclen, unique_terms, wdf_doc_max),)*
                }
            }

            fn max_score_term(&self) -> f64 {
                match self {
                    $(Scorer::$svariant(s) => s.max_score_term(),)*
                }
            }

            fn score_extra(
                &self,
                doclen: TermCount,
                unique_terms: TermCount,
                wdf_doc_max: TermCount,
            ) -> f64 {
                match self {
                    $(Scorer::$svariant(s) => s.score_extra(doclen, unique_terms, wdf_doc_max),)*
                }
            }

            fn max_score_extra(&self) -> f64 {
                match self {
                    $(Scorer::$svariant(s) => s.max_score_extra(),)*
                }
            }
        }
    };
}

define_schemes! {
    schemes {
        Bool(BoolWeight) => Bool,
        Coord(CoordWeight) => Coord,
        Dice(DiceWeight) => Dice,
        TfIdf(TfIdfWeight) => TfIdf,
        Bm25(Bm25Weight) => Bm25,
        Bm25Plus(Bm25PlusWeight) => Bm25Plus,
        InL2(InL2Weight) => Saturating,
        IfB2(IfB2Weight) => Saturating,
        IneB2(IneB2Weight) => Saturating,
        Bb2(Bb2Weight) => Bb2,
        Dlh(DlhWeight) => Hypergeometric,
        Dph(DphWeight) => Hypergeometric,
        Pl2(Pl2Weight) => Poisson,
        Pl2Plus(Pl2PlusWeight) => Poisson,
        LmJm(LmJmWeight) => LmJm,
        LmDirichlet(LmDirichletWeight) => LmDirichlet,
        LmAbsDiscount(LmAbsDiscountWeight) => LmAbsDiscount,
        Lm2Stage(Lm2StageWeight) => Lm2Stage,
    }
    scorers {
        Bool(BoolScorer),
        Coord(CoordScorer),
        Dice(DiceScorer),
        TfIdf(TfIdfScorer),
        Bm25(Bm25Scorer),
        Bm25Plus(Bm25PlusScorer),
        Saturating(SaturatingScorer),
        Bb2(Bb2Scorer),
        Hypergeometric(HypergeometricScorer),
        Poisson(PoissonScorer),
        LmJm(LmJmScorer),
        LmDirichlet(LmDirichletScorer),
        LmAbsDiscount(LmAbsDiscountScorer),
        Lm2Stage(Lm2StageScorer),
    }
}

/// `trad k`: BM25 with `k2 = k3 = 0`, `b = 1` and no minimum normalized length.
fn trad_from_parameters(params: &str) -> Result<Scheme, Error> {
    let mut p = Params::new("trad", params);
    let k = p.next_f64(1.0)?;
    p.finish()?;
    Ok(Scheme::Bm25(Bm25Weight::trad(k)))
}

fn registry() -> &'static HashMap<&'static str, Entry> {
    static REGISTRY: OnceLock<HashMap<&'static str, Entry>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<_, _> = builtin_entries().collect();
        if let Some(dice) = map.get(DiceWeight::NAME).copied() {
            map.insert("dicecoeff", dice);
        }
        map.insert(
            "trad",
            Entry {
                from_parameters: trad_from_parameters,
                deserialize: |b| Bm25Weight::deserialize_parameters(b).map(Scheme::Bm25),
            },
        );
        map
    })
}

fn lookup(name: &str) -> Result<Entry, Error> {
    registry()
        .get(name)
        .copied()
        .ok_or_else(|| Error::InvalidParameter {
            scheme: name.to_string(),
            token: name.to_string(),
            reason: "unknown weighting scheme",
        })
}

impl Scheme {
    /// Build a scheme from `"<name> <param> ..."`.
    pub fn create(text: &str) -> Result<Self, Error> {
        let text = text.trim_start();
        let (name, params) = match text.find(char::is_whitespace) {
            Some(at) => text.split_at(at),
            None => (text, ""),
        };
        if name.is_empty() {
            return Err(Error::InvalidParameter {
                scheme: String::new(),
                token: String::new(),
                reason: "missing weighting scheme name",
            });
        }
        let scheme = Self::from_parameters(name, params)?;
        tracing::debug!(name, params = params.trim(), ?scheme, "created weighting scheme");
        Ok(scheme)
    }

    /// Build the scheme registered as `name` from its parameter string.
    pub fn from_parameters(name: &str, params: &str) -> Result<Self, Error> {
        (lookup(name)?.from_parameters)(params)
    }

    /// Rebuild a scheme from its name and [`Scheme::serialize_parameters`] output.
    pub fn deserialize(name: &str, bytes: &[u8]) -> Result<Self, Error> {
        (lookup(name)?.deserialize)(bytes)
    }

    /// Canonical names of every built-in scheme. Aliases are not listed.
    pub fn names() -> &'static [&'static str] {
        NAMES
    }

    /// Initialize for the term-independent contribution.
    pub fn init_extra(&self, stats: &TermStats) -> Scorer {
        self.init(stats, 0.0)
    }

    /// Gather the negotiated statistics for `term` from `source` and initialize.
    pub fn init_from<S: StatsSource + ?Sized>(
        &self,
        source: &S,
        term: &str,
        query_length: TermCount,
        wqf: TermCount,
        factor: f64,
    ) -> Scorer {
        let stats = TermStats::gather(source, term, query_length, wqf, self.stats_needed());
        self.init(&stats, factor)
    }

    /// Whether the scorer reads per-document wdf.
    pub fn needs_wdf(&self) -> bool {
        self.stats_needed().contains(Stat::Wdf)
    }

    /// Whether the scorer reads per-document length.
    pub fn needs_doclen(&self) -> bool {
        self.stats_needed().contains(Stat::DocLength)
    }

    /// Whether the scorer reads per-document unique terms.
    pub fn needs_unique_terms(&self) -> bool {
        self.stats_needed().contains(Stat::UniqueTerms)
    }

    /// Whether the scorer reads the per-document maximum wdf.
    pub fn needs_wdf_doc_max(&self) -> bool {
        self.stats_needed().contains(Stat::WdfDocMax)
    }

    /// Whether every document scores 0.
    pub fn is_bool(&self) -> bool {
        matches!(self, Scheme::Bool(_))
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Scheme::Bm25(Bm25Weight::default())
    }
}
