//! End-to-end scenarios: closed forms, wire round trips, synonym groups.

use termweight::bm25::{Bm25Params, Bm25Weight};
use termweight::postlist::{MemoryPostList, OrPostList};
use termweight::query_likelihood::{
    DirichletParams, Lm2StageWeight, LmDirichletWeight, LmJmWeight, TwoStageParams,
};
use termweight::simple::CoordWeight;
use termweight::stats::{DocId, Stat, TermCount};
use termweight::synonym::SynonymPostList;
use termweight::tfidf::{TfIdfParams, TfIdfWeight};
use termweight::{Error, Scheme, TermScorer, TermStats, Weight};

fn collection() -> TermStats {
    TermStats {
        collection_size: 1000,
        termfreq: 10,
        average_length: 40.0,
        collection_freq: 25,
        total_length: 40_000,
        wqf: 1,
        query_length: 2,
        doclength_lower_bound: 1,
        doclength_upper_bound: 200,
        wdf_upper_bound: 20,
        unique_terms_lower_bound: 1,
        unique_terms_upper_bound: 150,
        db_doclength_lower_bound: 1,
        db_doclength_upper_bound: 300,
        db_wdf_upper_bound: 25,
        db_unique_terms_lower_bound: 1,
        db_unique_terms_upper_bound: 200,
        ..TermStats::default()
    }
}

#[test]
fn bm25_matches_closed_form() {
    let scorer = Bm25Weight::default().init(&collection(), 1.0);
    let (k1, b, avg) = (1.0, 0.5, 40.0);
    let idf = ((1000.0f64 - 10.0 + 0.5) / (10.0 + 0.5)).ln();
    let norm = 50.0 / avg;
    let expected = idf * (k1 + 1.0) * 3.0 / (k1 * ((1.0 - b) + b * norm) + 3.0);

    let got = scorer.score_term(3, 50, 0, 0);
    assert!((got - expected).abs() < 1e-9, "{got} vs {expected}");
    assert!(got <= scorer.max_score_term());
}

#[test]
fn bm25_without_saturation_is_constant() {
    let w = Bm25Weight::new(Bm25Params {
        k1: 0.0,
        k2: 0.0,
        k3: 0.0,
        b: 0.7,
        min_normlen: 0.0,
    });
    let s = w.init(&collection(), 1.0);
    let first = s.score_term(1, 1, 1, 1);
    for (wdf, len) in [(1, 10), (5, 5), (20, 200), (2, 3)] {
        assert_eq!(s.score_term(wdf, len, 1, wdf), first);
    }
    assert_eq!(s.max_score_term(), first);
    assert!(!w.stats_needed().contains(Stat::DocLength));
}

#[test]
fn coord_is_the_factor_everywhere() {
    let s = CoordWeight.init(&collection(), 0.75);
    for wdf in [0, 1, 7, 1000] {
        for len in [0, 1, 50, 100_000] {
            assert_eq!(s.score_term(wdf, len, len / 2, wdf), 0.75);
        }
    }
}

#[test]
fn tfidf_nnn_is_raw_wdf() {
    let s = TfIdfWeight::with_normalizations("nnn")
        .unwrap()
        .init(&collection(), 2.0);
    for wdf in [1, 2, 9] {
        assert_eq!(s.score_term(wdf, 50, 10, wdf), f64::from(wdf) * 2.0);
    }
    let named = Scheme::create("tfidf NONE NONE NONE").unwrap();
    assert_eq!(named, Scheme::create("tfidf nnn").unwrap());
}

#[test]
fn wire_round_trip_scores_identically() {
    let specs = [
        "bool",
        "coord",
        "dice",
        "tfidf Lpn 0.3 1.5",
        "bm25 1.3 0.2 2 0.8 0.25",
        "bm25+ 1.1 0 1 0.6 0.5 0.7",
        "inl2 1.5",
        "ifb2 0.7",
        "ineb2 2",
        "bb2 3",
        "dlh",
        "dph",
        "pl2 1.2",
        "pl2+ 1.4 0.6",
        "lmjm 0.4",
        "lmdirichlet 1500 0.1",
        "lmabsdiscount 0.5",
        "lm2stage 0.6 1200",
    ];
    assert_eq!(specs.len(), Scheme::names().len());
    let stats = collection();
    for spec in specs {
        let original = Scheme::create(spec).unwrap();
        let bytes = original.serialize_parameters().unwrap();
        let copy = Scheme::deserialize(original.name(), &bytes).unwrap();
        let (a, b) = (original.init(&stats, 1.0), copy.init(&stats, 1.0));
        let (ea, eb) = (original.init_extra(&stats), copy.init_extra(&stats));
        for (wdf, len, uniq) in [(1, 10, 8), (3, 50, 30), (20, 200, 150), (0, 5, 5)] {
            let (x, y) = (a.score_term(wdf, len, uniq, wdf), b.score_term(wdf, len, uniq, wdf));
            assert!((x - y).abs() <= 1e-9, "{spec}: {x} vs {y}");
            let (x, y) = (ea.score_extra(len, uniq, wdf), eb.score_extra(len, uniq, wdf));
            assert!((x - y).abs() <= 1e-9, "{spec}: extra {x} vs {y}");
        }
    }
}

#[test]
fn corrupt_wire_bytes_are_rejected() {
    let bm25 = Scheme::create("bm25").unwrap();
    let mut bytes = bm25.serialize_parameters().unwrap();
    bytes.push(0);
    assert!(matches!(
        Scheme::deserialize("bm25", &bytes),
        Err(Error::MalformedSerialization { scheme: "bm25", .. })
    ));
    assert!(Scheme::deserialize("bm25", &bytes[..4]).is_err());

    // Valid encoding of an out-of-domain parameter.
    let c = Scheme::create("inl2 1").unwrap().serialize_parameters().unwrap();
    let negative = (-1.0f64).to_le_bytes();
    assert_eq!(c, 1.0f64.to_le_bytes());
    assert!(matches!(
        Scheme::deserialize("inl2", &negative),
        Err(Error::MalformedSerialization { .. })
    ));
}

#[test]
fn non_finite_wire_parameters_are_rejected() {
    // Each spec's float fields are the trailing 8-byte little-endian slots of its encoding.
    let cases = [
        ("bm25", 5),
        ("bm25+", 6),
        ("tfidf Lpn 0.3 1.5", 2),
        ("inl2", 1),
        ("ifb2", 1),
        ("ineb2", 1),
        ("bb2", 1),
        ("pl2", 1),
        ("pl2+", 2),
        ("lmjm 0.4", 1),
        ("lmdirichlet", 2),
        ("lmabsdiscount", 1),
        ("lm2stage", 2),
    ];
    for (spec, floats) in cases {
        let scheme = Scheme::create(spec).unwrap();
        let valid = scheme.serialize_parameters().unwrap();
        assert!(valid.len() >= 8 * floats, "{spec}");
        for slot in 0..floats {
            let at = valid.len() - 8 * (floats - slot);
            for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
                let mut bytes = valid.clone();
                bytes[at..at + 8].copy_from_slice(&bad.to_le_bytes());
                match Scheme::deserialize(scheme.name(), &bytes) {
                    Err(Error::MalformedSerialization { .. }) => {}
                    other => panic!("{spec} slot {slot} = {bad}: unexpected {other:?}"),
                }
            }
        }
    }
}

#[test]
fn non_finite_constructor_parameters_never_reach_scores() {
    let stats = collection();
    let bm25 = Bm25Weight::new(Bm25Params {
        k1: f64::INFINITY,
        b: f64::NAN,
        ..Bm25Params::default()
    });
    assert_eq!(bm25, Bm25Weight::default());
    let s = bm25.init(&stats, 1.0);
    assert!(s.score_term(3, 50, 0, 0).is_finite());
    assert!(s.max_score_term().is_finite());

    assert!(LmDirichletWeight::new(DirichletParams {
        mu: 2000.0,
        delta: f64::INFINITY,
    })
    .is_err());
    assert!(LmDirichletWeight::new(DirichletParams {
        mu: f64::INFINITY,
        delta: 0.05,
    })
    .is_err());
    assert!(Lm2StageWeight::new(TwoStageParams {
        lambda: 0.7,
        mu: f64::INFINITY,
    })
    .is_err());
    assert!(TfIdfWeight::new(TfIdfParams {
        delta: f64::INFINITY,
        ..TfIdfParams::default()
    })
    .is_err());
    assert_eq!(LmJmWeight::new(f64::NAN), LmJmWeight::default());
}

#[test]
fn invalid_parameter_strings() {
    for spec in [
        "bm25 notanumber",
        "bm25 1 0 1 0.5 0.5 extra",
        "tfidf xyz",
        "tfidf nnn 0",
        "tfidf nnn 0.2 0",
        "inl2 0",
        "pl2+ 1 0",
        "lmdirichlet -5",
        "coord 1",
    ] {
        match Scheme::create(spec) {
            Err(Error::InvalidParameter { .. }) => {}
            other => panic!("{spec}: unexpected {other:?}"),
        }
    }
}

#[test]
fn synonym_group_clamps_wdf_to_doclen() {
    let group = OrPostList::new(vec![
        MemoryPostList::new("colour", vec![(7, 5)]),
        MemoryPostList::new("color", vec![(7, 4), (9, 1)]),
        MemoryPostList::new("colr", vec![(2, 1), (7, 3)]),
    ]);
    let scheme = Scheme::create("bm25").unwrap();
    let stats = collection();
    let scorer = scheme.init(&stats, 1.0);
    let reference = scheme.init(&stats, 1.0);

    let mut syn = SynonymPostList::new(group, scheme.needs_doclen());
    syn.set_weight(scorer, scheme.stats_needed());
    syn.skip_to(7, 1.0);
    assert_eq!(syn.doc_id(), 7);
    assert_eq!(syn.wdf(), 12);

    let lengths = |_: DocId| -> TermCount { 10 };
    let w = syn.weight(10, 6, 5, &lengths);
    assert_eq!(w, reference.score_term(10, 10, 6, 5));
    assert!(w < reference.score_term(12, 10, 6, 5));
    assert!(w <= syn.max_weight());
    assert_eq!(syn.count_matching_subqueries(), 1);

    syn.next(0.0);
    assert_eq!(syn.doc_id(), 9);
    assert_eq!(syn.count_matching_subqueries(), 1);
}
