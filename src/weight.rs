//! The scoring contract shared by every weighting scheme.
//!
//! A scheme is split in two phases:
//! - a [`Weight`] is immutable configuration: parameters plus the [`StatSet`] it negotiates.
//! - a [`TermScorer`] is what [`Weight::init`] produces once the negotiated statistics for one
//!   query term on one shard are known. It is immutable and never written during scoring.
//!
//! Configuration is `Clone`, so one configured scheme fans out into one scorer per query term
//! per shard.

use crate::stats::{StatSet, TermCount, TermStats};
use crate::Error;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// An initialized per-term scorer.
pub trait TermScorer {
    /// Contribution of one term to one document's score (the "sumpart").
    ///
    /// Arguments the scheme did not negotiate may be passed as 0.
    fn score_term(
        &self,
        wdf: TermCount,
        doclen: TermCount,
        unique_terms: TermCount,
        wdf_doc_max: TermCount,
    ) -> f64;

    /// Upper bound on [`TermScorer::score_term`] for any document in the shard this scorer was
    /// initialized against.
    fn max_score_term(&self) -> f64;

    /// Term-independent contribution (the "sumextra").
    fn score_extra(
        &self,
        _doclen: TermCount,
        _unique_terms: TermCount,
        _wdf_doc_max: TermCount,
    ) -> f64 {
        0.0
    }

    /// Upper bound on [`TermScorer::score_extra`] for any document in the shard.
    fn max_score_extra(&self) -> f64 {
        0.0
    }
}

/// A configured weighting scheme.
pub trait Weight: Clone + fmt::Debug + Sized {
    /// Lowercase identifier used by the factory and on the wire.
    const NAME: &'static str;

    /// The initialized form of this scheme.
    type Scorer: TermScorer + Clone + fmt::Debug;

    /// Statistics this configuration reads. Fixed at construction.
    fn stats_needed(&self) -> StatSet;

    /// Precompute the per-term constants for one term on one shard.
    ///
    /// `factor` scales the term's contribution; `0` selects term-independent mode, in which
    /// only [`TermScorer::score_extra`] is meaningful.
    fn init(&self, stats: &TermStats, factor: f64) -> Self::Scorer;

    /// Initialize for the term-independent contribution.
    fn init_extra(&self, stats: &TermStats) -> Self::Scorer {
        self.init(stats, 0.0)
    }

    /// Encode the parameters for a remote peer.
    fn serialize_parameters(&self) -> Result<Vec<u8>, Error> {
        Err(Error::Unsupported {
            scheme: Self::NAME,
            operation: "serialize_parameters",
        })
    }

    /// Rebuild a configuration from [`Weight::serialize_parameters`] output.
    fn deserialize_parameters(_bytes: &[u8]) -> Result<Self, Error> {
        Err(Error::Unsupported {
            scheme: Self::NAME,
            operation: "deserialize_parameters",
        })
    }

    /// Build from a whitespace-separated human parameter string (without the scheme name).
    fn from_parameters(_params: &str) -> Result<Self, Error> {
        Err(Error::Unsupported {
            scheme: Self::NAME,
            operation: "from_parameters",
        })
    }
}

/// Encode scheme parameters with `postcard`.
pub(crate) fn encode<T: Serialize>(scheme: &'static str, value: &T) -> Result<Vec<u8>, Error> {
    postcard::to_allocvec(value).map_err(|e| Error::MalformedSerialization {
        scheme,
        reason: e.to_string(),
    })
}

/// Decode scheme parameters, rejecting trailing bytes.
pub(crate) fn decode<T: DeserializeOwned>(scheme: &'static str, bytes: &[u8]) -> Result<T, Error> {
    let (value, rest) =
        postcard::take_from_bytes(bytes).map_err(|e| Error::MalformedSerialization {
            scheme,
            reason: e.to_string(),
        })?;
    if !rest.is_empty() {
        return Err(Error::MalformedSerialization {
            scheme,
            reason: format!("{} trailing bytes", rest.len()),
        });
    }
    Ok(value)
}

/// Reject decoded parameters that are NaN or infinite.
pub(crate) fn expect_finite(scheme: &'static str, values: &[f64]) -> Result<(), Error> {
    match values.iter().find(|v| !v.is_finite()) {
        Some(v) => Err(Error::MalformedSerialization {
            scheme,
            reason: format!("non-finite parameter {v}"),
        }),
        None => Ok(()),
    }
}

/// Parameterless schemes serialize to nothing.
pub(crate) fn expect_empty(scheme: &'static str, bytes: &[u8]) -> Result<(), Error> {
    if bytes.is_empty() {
        Ok(())
    } else {
        Err(Error::MalformedSerialization {
            scheme,
            reason: format!("{} trailing bytes", bytes.len()),
        })
    }
}

/// Positional reader over a human parameter string.
pub(crate) struct Params<'a> {
    scheme: &'static str,
    tokens: std::str::SplitWhitespace<'a>,
}

impl<'a> Params<'a> {
    pub(crate) fn new(scheme: &'static str, params: &'a str) -> Self {
        Self {
            scheme,
            tokens: params.split_whitespace(),
        }
    }

    pub(crate) fn invalid(&self, token: &str, reason: &'static str) -> Error {
        Error::InvalidParameter {
            scheme: self.scheme.to_string(),
            token: token.to_string(),
            reason,
        }
    }

    pub(crate) fn next_token(&mut self) -> Option<&'a str> {
        self.tokens.next()
    }

    /// Next numeric parameter, or `default` if the string is exhausted.
    pub(crate) fn next_f64(&mut self, default: f64) -> Result<f64, Error> {
        match self.tokens.next() {
            None => Ok(default),
            Some(tok) => match tok.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(v),
                _ => Err(self.invalid(tok, "expected a number")),
            },
        }
    }

    /// Fail if any tokens remain.
    pub(crate) fn finish(mut self) -> Result<(), Error> {
        match self.tokens.next() {
            None => Ok(()),
            Some(tok) => Err(self.invalid(tok, "unexpected extra parameter")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_rejects_trailing_bytes() {
        let mut bytes = encode("t", &(1.5f64, 2u8)).unwrap();
        assert!(decode::<(f64, u8)>("t", &bytes).is_ok());
        bytes.push(b'X');
        let err = decode::<(f64, u8)>("t", &bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedSerialization { scheme: "t", .. }));
    }

    #[test]
    fn decode_rejects_short_input() {
        let bytes = encode("t", &1.5f64).unwrap();
        assert!(decode::<f64>("t", &bytes[..3]).is_err());
    }

    #[test]
    fn params_reads_defaults_and_rejects_junk() {
        let mut p = Params::new("x", "  1.5 ");
        assert_eq!(p.next_f64(9.0).unwrap(), 1.5);
        assert_eq!(p.next_f64(9.0).unwrap(), 9.0);
        assert!(p.finish().is_ok());

        let mut p = Params::new("x", "1 nope");
        assert_eq!(p.next_f64(0.0).unwrap(), 1.0);
        match p.next_f64(0.0) {
            Err(Error::InvalidParameter { token, .. }) => assert_eq!(token, "nope"),
            other => panic!("unexpected: {other:?}"),
        }

        let p = Params::new("x", "extra");
        assert!(p.finish().is_err());
    }

    #[test]
    fn non_finite_numbers_are_rejected() {
        let mut p = Params::new("x", "NaN");
        assert!(p.next_f64(0.0).is_err());
        let mut p = Params::new("x", "inf");
        assert!(p.next_f64(0.0).is_err());

        assert!(expect_finite("x", &[1.0, 0.0]).is_ok());
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                expect_finite("x", &[1.0, bad]),
                Err(Error::MalformedSerialization { scheme: "x", .. })
            ));
        }
    }
}
