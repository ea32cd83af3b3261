// Regression tests for the documented yaz/dı/lar scenarios.

use std::sync::Arc;

use azmorph_lib::output::to_tagged;
use azmorph_lib::{Analyzer, LexicalFallback, LexiconStore, Provenance, Resolution};

const ROOTS: &str = r#"{"yaz": {"pos": "VERB", "gloss": "write"}}"#;
const AFFIXES: &str = r#"{
    "dı": {"tag": "PAST", "category": "PAST"},
    "lar": {"tag": "PLUR", "category": "PLUR"}
}"#;
const RULES: &str = r#"{"valid_order": ["PLUR", "PAST"]}"#;

fn lexicon() -> Arc<LexiconStore> {
    Arc::new(LexiconStore::load(ROOTS.as_bytes(), AFFIXES.as_bytes(), RULES.as_bytes()).unwrap())
}

fn analyzer() -> Analyzer {
    Analyzer::new(lexicon())
}

#[test]
fn yazdi_is_root_plus_past() {
    let a = analyzer();
    assert_eq!(a.segment("yazdı").len(), 1);
    let c = a.analyze("yazdı");
    assert_eq!(c.root, "yaz");
    assert_eq!(c.tags, vec!["PAST"]);
    assert_eq!(c.segmentation, "yaz+dı");
    assert_eq!(c.provenance, Provenance::Segmented);
    assert_eq!(c.gloss.as_deref(), Some("write"));
}

#[test]
fn yazlardi_plural_then_past() {
    let c = analyzer().analyze("yazlardı");
    assert_eq!(c.root, "yaz");
    assert_eq!(c.tags, vec!["PLUR", "PAST"]);
    assert_eq!(c.segmentation, "yaz+lar+dı");
    assert_eq!(c.provenance, Provenance::Segmented);
}

#[test]
fn yazdilar_reversed_order_falls_back() {
    let a = analyzer();
    assert!(a.segment("yazdılar").is_empty());
    let traced = a.analyze_traced("yazdılar");
    assert_eq!(traced.resolution, Resolution::Fallback);
    assert_eq!(traced.candidate.provenance, Provenance::Unknown);
    assert_eq!(traced.candidate.tags, vec!["UNK"]);
}

#[test]
fn yazdilar_found_in_dictionary() {
    let fallback = LexicalFallback::load(
        r#"{"yazdılar": {"POS": "VERB", "Features": {"Tense": "Past", "Number": "Plur"}}}"#.as_bytes(),
    )
    .unwrap();
    let c = analyzer().with_fallback(fallback).analyze("yazdılar");
    assert_eq!(c.provenance, Provenance::LexicalFallback);
    assert_eq!(c.tags, vec!["VERB", "Tense=Past", "Number=Plur"]);
    assert_eq!(c.root, "yazdılar");
}

#[test]
fn qwzxy_is_unknown() {
    let c = analyzer().analyze("qwzxy");
    assert_eq!(c.provenance, Provenance::Unknown);
    assert_eq!(c.tags, vec!["UNK"]);
    assert_eq!(to_tagged(&c), "qwzxy+UNK");
}

#[test]
fn single_candidate_is_returned_unchanged() {
    let a = analyzer();
    for word in ["yaz", "yazdı", "yazlar", "yazlardı"] {
        let segs = a.segment(word);
        assert_eq!(segs.len(), 1, "{word}");
        let traced = a.analyze_traced(word);
        assert_eq!(traced.resolution, Resolution::Single);
        assert_eq!(traced.candidate, segs[0]);
    }
}

#[test]
fn uppercase_input_is_case_folded() {
    let c = analyzer().analyze("YAZLAR");
    assert_eq!(c.segmentation, "yaz+lar");
}
