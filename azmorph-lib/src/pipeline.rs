// Per-token orchestration: segment, then disambiguate (several candidates),
// pass through (one candidate) or fall back to the dictionary (none).

use std::sync::Arc;

use rayon::prelude::*;

use crate::config::AnalyzerConfig;
use crate::disambiguation::{Disambiguator, ScoringMode, ScoringModel, TagVocabulary};
use crate::errors::Result;
use crate::fallback::LexicalFallback;
use crate::lexicon::{open, LexiconStore};
use crate::normalize::{fold, normalize};
use crate::segmentation::{LexiconSegmenter, Segmenter};
use crate::types::CandidateAnalysis;

/// Which branch produced the final analysis of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Segmentation produced exactly one candidate.
    Single,
    /// Segmentation produced several candidates and the disambiguator chose.
    Disambiguated { candidates: usize, mode: ScoringMode },
    /// Segmentation produced nothing; the dictionary answered.
    Fallback,
}

/// A final analysis together with the branch that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub candidate: CandidateAnalysis,
    pub resolution: Resolution,
}

/// The full analysis pipeline. Immutable once built and safe to share across
/// threads.
pub struct Analyzer {
    segmenter: Box<dyn Segmenter>,
    disambiguator: Disambiguator,
    fallback: LexicalFallback,
}

impl std::fmt::Debug for Analyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Analyzer")
            .field("segmenter", &"<dyn Segmenter>")
            .field("disambiguator", &self.disambiguator.mode())
            .field("fallback_words", &self.fallback.len())
            .finish()
    }
}

impl Analyzer {
    /// Analyzer over `lexicon` with no dictionary and no scoring model.
    pub fn new(lexicon: Arc<LexiconStore>) -> Self {
        Self {
            segmenter: Box::new(LexiconSegmenter::new(lexicon)),
            disambiguator: Disambiguator::first_candidate(),
            fallback: LexicalFallback::empty(),
        }
    }

    /// Load everything named by `cfg`. All I/O happens here.
    pub fn from_config(cfg: &AnalyzerConfig) -> Result<Self> {
        let lexicon = LexiconStore::from_paths(&cfg.roots, &cfg.affixes, &cfg.rules)?;

        let fallback = match &cfg.dictionary {
            Some(path) => LexicalFallback::from_path(path)?,
            None => {
                log::info!("no whole-word dictionary configured");
                LexicalFallback::empty()
            }
        };

        let disambiguator = match (&cfg.model, &cfg.tag_vocab) {
            (Some(model), Some(vocab)) => Disambiguator::from_paths(model, vocab)?,
            (Some(model), None) => {
                ScoringModel::load(open(model)?)?;
                log::warn!("scoring model configured without a tag vocabulary; ignoring it");
                Disambiguator::first_candidate()
            }
            (None, Some(vocab)) => {
                TagVocabulary::load(open(vocab)?)?;
                log::warn!("tag vocabulary configured without a scoring model; ignoring it");
                Disambiguator::first_candidate()
            }
            (None, None) => {
                log::warn!("no scoring model configured; ambiguous tokens resolve to their first candidate");
                Disambiguator::first_candidate()
            }
        };

        Ok(Self::new(Arc::new(lexicon))
            .with_disambiguator(disambiguator)
            .with_fallback(fallback))
    }

    pub fn with_disambiguator(mut self, disambiguator: Disambiguator) -> Self {
        self.disambiguator = disambiguator;
        self
    }

    pub fn with_fallback(mut self, fallback: LexicalFallback) -> Self {
        self.fallback = fallback;
        self
    }

    /// Replace the in-process segmenter with another implementation.
    pub fn with_segmenter<S: Segmenter + 'static>(mut self, segmenter: S) -> Self {
        self.segmenter = Box::new(segmenter);
        self
    }

    pub fn disambiguator(&self) -> &Disambiguator {
        &self.disambiguator
    }

    pub fn fallback(&self) -> &LexicalFallback {
        &self.fallback
    }

    /// All segmentation candidates of `word` (folded first).
    pub fn segment(&self, word: &str) -> Vec<CandidateAnalysis> {
        self.segmenter.segment(&fold(word))
    }

    /// The disambiguator's choice among `candidates`; `None` only when empty.
    pub fn disambiguate<'a>(&self, candidates: &'a [CandidateAnalysis]) -> Option<&'a CandidateAnalysis> {
        self.disambiguator.disambiguate(candidates)
    }

    /// Exactly one analysis for `word`, whatever it is.
    pub fn analyze(&self, word: &str) -> CandidateAnalysis {
        self.analyze_traced(word).candidate
    }

    /// Like [`Analyzer::analyze`], also reporting which branch was taken.
    pub fn analyze_traced(&self, word: &str) -> Analysis {
        let token = fold(word);
        let mut candidates = self.segmenter.segment(&token);

        match candidates.len() {
            0 => {
                log::debug!("{token:?}: no segmentation, falling back to dictionary");
                Analysis {
                    candidate: self.fallback.lookup(&token),
                    resolution: Resolution::Fallback,
                }
            }
            1 => {
                log::debug!("{token:?}: single segmentation");
                Analysis {
                    candidate: candidates.swap_remove(0),
                    resolution: Resolution::Single,
                }
            }
            n => {
                let best = self.disambiguator.select(&candidates).unwrap_or(0);
                log::debug!(
                    "{token:?}: {n} segmentations, chose #{best} ({:?})",
                    self.disambiguator.mode()
                );
                Analysis {
                    candidate: candidates.swap_remove(best),
                    resolution: Resolution::Disambiguated {
                        candidates: n,
                        mode: self.disambiguator.mode(),
                    },
                }
            }
        }
    }

    /// Analyse tokens in parallel; the output is in input order.
    pub fn analyze_many<S>(&self, tokens: &[S]) -> Vec<CandidateAnalysis>
    where
        S: AsRef<str> + Sync,
    {
        tokens.par_iter().map(|t| self.analyze(t.as_ref())).collect()
    }

    /// Tokenize free text and analyse every token, in order.
    pub fn analyze_text(&self, raw: &str) -> Vec<CandidateAnalysis> {
        let tokens: Vec<String> = normalize(raw).collect();
        self.analyze_many(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::disambiguation::{GraphLayer, Projection};
    use crate::types::{Provenance, UNKNOWN_TAG};

    const ROOTS: &str = r#"{
        "yaz": {"pos": "VERB", "gloss": "write"},
        "kitab": {"pos": "NOUN", "gloss": "book"},
        "kitabla": {"pos": "VERB"}
    }"#;
    const AFFIXES: &str = r#"{
        "dı": {"tag": "PAST"},
        "lar": {"tag": "PLUR"},
        "r": {"tag": "AOR"}
    }"#;
    const RULES: &str = r#"{"valid_order": ["PLUR", "PAST", "AOR"]}"#;

    fn lexicon() -> Arc<LexiconStore> {
        Arc::new(LexiconStore::load(ROOTS.as_bytes(), AFFIXES.as_bytes(), RULES.as_bytes()).unwrap())
    }

    fn analyzer() -> Analyzer {
        let fallback = LexicalFallback::load(r#"{"yazdılar": {"POS": "VERB"}}"#.as_bytes()).unwrap();
        Analyzer::new(lexicon()).with_fallback(fallback)
    }

    // Scores PLUR above AOR, so "kitablar" resolves to kitab+lar.
    fn scoring_disambiguator() -> Disambiguator {
        let layer = || GraphLayer {
            self_weight: vec![vec![1.0]],
            neighbor_weight: vec![vec![0.0]],
            bias: vec![0.0],
        };
        let model = ScoringModel {
            hidden_dim: 1,
            embedding: vec![vec![0.0], vec![1.0], vec![3.0]],
            layers: vec![layer(), layer()],
            output: Projection {
                weight: vec![1.0],
                bias: 0.0,
            },
        };
        let vocab = TagVocabulary::from_index(HashMap::from([
            ("AOR".to_string(), 1),
            ("PLUR".to_string(), 2),
        ]))
        .unwrap();
        Disambiguator::new(model, vocab).unwrap()
    }

    #[test]
    fn test_single_candidate_passes_through() {
        let a = analyzer();
        let segmented = a.segment("yazdı");
        let traced = a.analyze_traced("yazdı");
        assert_eq!(traced.resolution, Resolution::Single);
        assert_eq!(traced.candidate, segmented[0]);
    }

    #[test]
    fn test_input_is_folded() {
        let c = analyzer().analyze("YAZDI");
        // Capital I folds to dotted i, so this is not "yazdı".
        assert_eq!(c.token, "yazdi");
        assert_eq!(c.provenance, Provenance::Unknown);
        assert_eq!(analyzer().analyze("Yazdı").segmentation, "yaz+dı");
    }

    #[test]
    fn test_fallback_dictionary_hit() {
        let traced = analyzer().analyze_traced("yazdılar");
        assert_eq!(traced.resolution, Resolution::Fallback);
        assert_eq!(traced.candidate.provenance, Provenance::LexicalFallback);
        assert_eq!(traced.candidate.tags, vec!["VERB"]);
    }

    #[test]
    fn test_unknown_word() {
        let c = analyzer().analyze("qwzxy");
        assert_eq!(c.provenance, Provenance::Unknown);
        assert_eq!(c.tags, vec![UNKNOWN_TAG]);
    }

    #[test]
    fn test_empty_input_is_total() {
        let c = analyzer().analyze("");
        assert_eq!(c.provenance, Provenance::Unknown);
    }

    #[test]
    fn test_ambiguous_without_model_takes_first() {
        let traced = analyzer().analyze_traced("kitablar");
        assert_eq!(
            traced.resolution,
            Resolution::Disambiguated {
                candidates: 2,
                mode: ScoringMode::FirstCandidate
            }
        );
        assert_eq!(traced.candidate.segmentation, "kitabla+r");
    }

    #[test]
    fn test_ambiguous_with_model() {
        let a = analyzer().with_disambiguator(scoring_disambiguator());
        let traced = a.analyze_traced("kitablar");
        assert_eq!(
            traced.resolution,
            Resolution::Disambiguated {
                candidates: 2,
                mode: ScoringMode::Model
            }
        );
        assert_eq!(traced.candidate.segmentation, "kitab+lar");

        let cands = a.segment("kitablar");
        assert_eq!(a.disambiguate(&cands).unwrap().segmentation, "kitab+lar");
    }

    #[test]
    fn test_analyze_many_preserves_order() {
        let words: Vec<String> = ["qwzxy", "yazdı", "kitab", "yaz", "kitablar"]
            .iter()
            .cycle()
            .take(200)
            .map(|s| s.to_string())
            .collect();
        let out = analyzer().analyze_many(&words);
        assert_eq!(out.len(), words.len());
        for (w, c) in words.iter().zip(&out) {
            assert_eq!(&c.token, w);
        }
    }

    #[test]
    fn test_analyze_text() {
        let out = analyzer().analyze_text("Kitab, yazdı!");
        let segs: Vec<&str> = out.iter().map(|c| c.segmentation.as_str()).collect();
        assert_eq!(segs, vec!["kitab", "yaz+dı"]);
    }

    struct CountingSegmenter {
        inner: LexiconSegmenter,
        calls: Arc<AtomicUsize>,
    }

    impl Segmenter for CountingSegmenter {
        fn segment(&self, token: &str) -> Vec<CandidateAnalysis> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.segment(token)
        }
    }

    #[test]
    fn test_custom_segmenter() {
        let calls = Arc::new(AtomicUsize::new(0));
        let a = analyzer().with_segmenter(CountingSegmenter {
            inner: LexiconSegmenter::new(lexicon()),
            calls: Arc::clone(&calls),
        });
        a.analyze("yazdı");
        a.analyze("qwzxy");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
