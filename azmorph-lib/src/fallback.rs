// Whole-word dictionary used when segmentation finds nothing.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::errors::Result;
use crate::lexicon::{open, read_json, row_label, table_rows};
use crate::normalize::fold;
use crate::types::*;

#[derive(Debug, Deserialize)]
struct WordRow {
    #[serde(default, rename = "POS")]
    pos: Option<String>,
    #[serde(default, rename = "Features")]
    features: serde_json::Map<String, serde_json::Value>,
}

/// A whole-word dictionary entry.
#[derive(Debug, Clone, PartialEq)]
pub struct WordEntry {
    pub pos: String,
    /// `(name, value)` pairs in declaration order.
    pub features: Vec<(String, String)>,
}

impl WordEntry {
    /// `[POS, "name=value", ...]`.
    pub fn tags(&self) -> Vec<String> {
        std::iter::once(self.pos.clone())
            .chain(self.features.iter().map(|(k, v)| format!("{k}={v}")))
            .collect()
    }
}

/// Terminal safety net of the pipeline: always produces a candidate.
#[derive(Debug, Clone, Default)]
pub struct LexicalFallback {
    words: HashMap<String, WordEntry>,
}

impl LexicalFallback {
    /// A fallback with no dictionary; every lookup yields `unknown`.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse a JSON dictionary `{ word: { "POS": ..., "Features": {...} } }`.
    /// Malformed rows are skipped with a warning.
    pub fn load<R: Read>(rdr: R) -> Result<Self> {
        let mut words = HashMap::new();
        for (i, (key, row)) in table_rows("dictionary", read_json("dictionary", rdr)?)?
            .into_iter()
            .enumerate()
        {
            let label = row_label(i, &key);
            let Some(word) = key.map(|k| fold(&k)).filter(|k| !k.is_empty()) else {
                log::warn!("dictionary: skipping row {label}: no word");
                continue;
            };
            if words.contains_key(&word) {
                log::warn!("dictionary: skipping row {label}: duplicate word {word:?}");
                continue;
            }
            let row: WordRow = match serde_json::from_value(row) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("dictionary: skipping row {label}: {e}");
                    continue;
                }
            };
            let features = row
                .features
                .into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect();
            words.insert(
                word,
                WordEntry {
                    pos: row.pos.unwrap_or_else(|| UNKNOWN_TAG.to_string()),
                    features,
                },
            );
        }
        log::info!("dictionary loaded: {} words", words.len());
        Ok(Self { words })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Self::load(open(path)?)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word: &str) -> Option<&WordEntry> {
        self.words.get(&fold(word))
    }

    /// Never fails: a dictionary hit is `lexical-fallback`, a miss is
    /// `unknown` with the single tag `UNK`.
    pub fn lookup(&self, token: &str) -> CandidateAnalysis {
        let token = fold(token);
        match self.words.get(&token) {
            Some(entry) => {
                let mut c = CandidateAnalysis::whole_word(&token, entry.tags(), Provenance::LexicalFallback);
                c.pos = Some(entry.pos.clone());
                c
            }
            None => CandidateAnalysis::whole_word(&token, vec![UNKNOWN_TAG.to_string()], Provenance::Unknown),
        }
    }
}
