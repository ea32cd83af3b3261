// Candidate selection for ambiguous tokens.
//
// Sibling candidates form a complete graph. Each node starts from the embedding
// of its primary tag and goes through two rounds of neighbour aggregation:
//
//   h'_i = relu(W_self · h_i + W_neigh · mean_{j != i}(h_j) + b)
//
// followed by a linear projection to a scalar score. Weights are produced
// offline; this module only evaluates them.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, Result};
use crate::lexicon::open;
use crate::types::CandidateAnalysis;

/// Vocabulary index for tags the model has never seen (and for candidates
/// with no tags at all).
pub const UNKNOWN_TAG_INDEX: usize = 0;

/// Number of neighbour-aggregation rounds the model must provide.
pub const ROUNDS: usize = 2;

/// Tag → embedding row mapping.
#[derive(Debug, Clone, Default)]
pub struct TagVocabulary {
    index: HashMap<String, usize>,
}

impl TagVocabulary {
    /// Parse a JSON object of `tag: index` pairs. Index 0 is reserved.
    pub fn load<R: Read>(rdr: R) -> Result<Self> {
        let index: HashMap<String, usize> =
            serde_json::from_reader(rdr).map_err(|e| LoadError::json("tag_vocab", e))?;
        Self::from_index(index)
    }

    pub fn from_index(index: HashMap<String, usize>) -> Result<Self> {
        if let Some((tag, _)) = index.iter().find(|(_, i)| **i == UNKNOWN_TAG_INDEX) {
            return Err(LoadError::invalid_model(format!(
                "tag {tag:?} uses index {UNKNOWN_TAG_INDEX}, which is reserved for unknown tags"
            )));
        }
        Ok(Self { index })
    }

    /// Row for `tag`; unknown or absent tags map to [`UNKNOWN_TAG_INDEX`].
    pub fn index_of(&self, tag: Option<&str>) -> usize {
        tag.and_then(|t| self.index.get(t))
            .copied()
            .unwrap_or(UNKNOWN_TAG_INDEX)
    }

    /// Largest assigned index (0 for an empty vocabulary).
    pub fn max_index(&self) -> usize {
        self.index.values().copied().max().unwrap_or(UNKNOWN_TAG_INDEX)
    }
}

/// One aggregation round.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphLayer {
    /// `hidden_dim` rows of `hidden_dim` weights applied to the node itself.
    pub self_weight: Vec<Vec<f64>>,
    /// `hidden_dim` rows of `hidden_dim` weights applied to the neighbour mean.
    pub neighbor_weight: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

/// Final linear projection to a scalar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projection {
    pub weight: Vec<f64>,
    pub bias: f64,
}

/// Frozen weights of the candidate scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringModel {
    pub hidden_dim: usize,
    /// One row per vocabulary index, row 0 being the unknown tag.
    pub embedding: Vec<Vec<f64>>,
    pub layers: Vec<GraphLayer>,
    pub output: Projection,
}

impl ScoringModel {
    /// Parse and validate a JSON weight blob.
    pub fn load<R: Read>(rdr: R) -> Result<Self> {
        let model: Self = serde_json::from_reader(rdr).map_err(|e| LoadError::json("model", e))?;
        model.validate()?;
        Ok(model)
    }

    /// Check that every matrix has the declared dimensions.
    pub fn validate(&self) -> Result<()> {
        let h = self.hidden_dim;
        if h == 0 {
            return Err(LoadError::invalid_model("hidden_dim must be positive"));
        }
        if self.embedding.is_empty() {
            return Err(LoadError::invalid_model("embedding has no rows"));
        }
        check_matrix("embedding", &self.embedding, self.embedding.len(), h)?;
        if self.layers.len() != ROUNDS {
            return Err(LoadError::invalid_model(format!(
                "expected {ROUNDS} layers, found {}",
                self.layers.len()
            )));
        }
        for layer in &self.layers {
            check_matrix("self_weight", &layer.self_weight, h, h)?;
            check_matrix("neighbor_weight", &layer.neighbor_weight, h, h)?;
            check_len("bias", &layer.bias, h)?;
        }
        check_len("output.weight", &self.output.weight, h)
    }

    /// Score every node of a complete graph whose node features are the given
    /// vocabulary indices. Out-of-range indices fall back to the unknown row.
    pub fn score_nodes(&self, features: &[usize]) -> Vec<f64> {
        let mut h: Vec<Vec<f64>> = features
            .iter()
            .map(|&f| {
                self.embedding
                    .get(f)
                    .unwrap_or(&self.embedding[UNKNOWN_TAG_INDEX])
                    .clone()
            })
            .collect();

        for layer in &self.layers {
            h = self.round(layer, &h);
        }

        h.iter().map(|node| dot(&self.output.weight, node) + self.output.bias).collect()
    }

    fn round(&self, layer: &GraphLayer, h: &[Vec<f64>]) -> Vec<Vec<f64>> {
        let n = h.len();
        let mut total = vec![0.0; self.hidden_dim];
        for node in h {
            add_assign(&mut total, node);
        }

        h.iter()
            .map(|node| {
                // Mean over every other node; a lone node has no neighbours.
                let neighbors: Vec<f64> = if n > 1 {
                    total
                        .iter()
                        .zip(node)
                        .map(|(t, x)| (t - x) / (n - 1) as f64)
                        .collect()
                } else {
                    vec![0.0; self.hidden_dim]
                };
                let mut out = mat_vec(&layer.self_weight, node);
                add_assign(&mut out, &mat_vec(&layer.neighbor_weight, &neighbors));
                add_assign(&mut out, &layer.bias);
                out.iter_mut().for_each(|x| *x = x.max(0.0));
                out
            })
            .collect()
    }
}

/// How the disambiguator picks among candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoringMode {
    /// A scoring model is loaded.
    Model,
    /// No model: the first candidate always wins.
    FirstCandidate,
}

/// Picks the most probable of several sibling candidates.
#[derive(Debug, Clone)]
pub struct Disambiguator {
    scorer: Option<(ScoringModel, TagVocabulary)>,
}

impl Disambiguator {
    /// Pair a model with its vocabulary. Fails if the vocabulary addresses
    /// rows the embedding does not have.
    pub fn new(model: ScoringModel, vocab: TagVocabulary) -> Result<Self> {
        model.validate()?;
        if vocab.max_index() >= model.embedding.len() {
            return Err(LoadError::invalid_model(format!(
                "vocabulary index {} exceeds embedding rows ({})",
                vocab.max_index(),
                model.embedding.len()
            )));
        }
        Ok(Self {
            scorer: Some((model, vocab)),
        })
    }

    /// Load the model weights and vocabulary from files.
    pub fn from_paths(model: &Path, vocab: &Path) -> Result<Self> {
        let model = ScoringModel::load(open(model)?)?;
        let vocab = TagVocabulary::load(open(vocab)?)?;
        Self::new(model, vocab)
    }

    /// Degraded mode used when no model is available.
    pub fn first_candidate() -> Self {
        Self { scorer: None }
    }

    pub fn mode(&self) -> ScoringMode {
        match self.scorer {
            Some(_) => ScoringMode::Model,
            None => ScoringMode::FirstCandidate,
        }
    }

    /// Scores for each candidate, or `None` in [`ScoringMode::FirstCandidate`].
    pub fn scores(&self, candidates: &[CandidateAnalysis]) -> Option<Vec<f64>> {
        let (model, vocab) = self.scorer.as_ref()?;
        let features: Vec<usize> = candidates
            .iter()
            .map(|c| vocab.index_of(c.primary_tag()))
            .collect();
        Some(model.score_nodes(&features))
    }

    /// Index of the winning candidate: the strictly highest score, earliest
    /// candidate on ties. `None` only for an empty slice.
    pub fn select(&self, candidates: &[CandidateAnalysis]) -> Option<usize> {
        if candidates.is_empty() {
            return None;
        }
        let Some(scores) = self.scores(candidates) else {
            return Some(0);
        };
        let mut best = 0;
        for (i, &s) in scores.iter().enumerate().skip(1) {
            if s > scores[best] {
                best = i;
            }
        }
        Some(best)
    }

    /// The winning candidate itself.
    pub fn disambiguate<'a>(&self, candidates: &'a [CandidateAnalysis]) -> Option<&'a CandidateAnalysis> {
        self.select(candidates).map(|i| &candidates[i])
    }
}

fn check_matrix(name: &str, m: &[Vec<f64>], rows: usize, cols: usize) -> Result<()> {
    if m.len() != rows {
        return Err(LoadError::invalid_model(format!(
            "{name}: expected {rows} rows, found {}",
            m.len()
        )));
    }
    for row in m {
        check_len(name, row, cols)?;
    }
    Ok(())
}

fn check_len(name: &str, v: &[f64], len: usize) -> Result<()> {
    if v.len() != len {
        return Err(LoadError::invalid_model(format!(
            "{name}: expected length {len}, found {}",
            v.len()
        )));
    }
    Ok(())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn mat_vec(m: &[Vec<f64>], v: &[f64]) -> Vec<f64> {
    m.iter().map(|row| dot(row, v)).collect()
}

fn add_assign(acc: &mut [f64], v: &[f64]) {
    acc.iter_mut().zip(v).for_each(|(a, b)| *a += b);
}
