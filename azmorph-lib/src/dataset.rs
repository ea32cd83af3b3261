// Training data for the candidate scorer: the full candidate set of each
// ambiguous word plus the position of its gold segmentation.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, Result};
use crate::pipeline::Analyzer;
use crate::types::CandidateAnalysis;

/// A word and its gold segmentation string (e.g. `yaz+dı`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldAnalysis {
    pub word: String,
    pub analysis: String,
}

/// One scorer training example.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub analyses: Vec<CandidateAnalysis>,
    pub gold_idx: usize,
}

/// Parse a JSON array of [`GoldAnalysis`] rows.
pub fn read_gold<R: Read>(rdr: R) -> Result<Vec<GoldAnalysis>> {
    serde_json::from_reader(rdr).map_err(|e| LoadError::json("gold", e))
}

/// Segment every gold word and keep those whose candidates include the gold
/// segmentation.
pub fn prepare_examples<I>(analyzer: &Analyzer, gold: I) -> Vec<TrainingExample>
where
    I: IntoIterator<Item = GoldAnalysis>,
{
    gold.into_iter()
        .filter_map(|g| {
            let analyses = analyzer.segment(&g.word);
            if analyses.is_empty() {
                log::debug!("{:?}: no candidates, skipped", g.word);
                return None;
            }
            let Some(gold_idx) = analyses.iter().position(|c| c.segmentation == g.analysis) else {
                log::debug!("{:?}: gold {:?} not among candidates, skipped", g.word, g.analysis);
                return None;
            };
            Some(TrainingExample { analyses, gold_idx })
        })
        .collect()
}

/// Write one JSON object per line.
pub fn write_jsonl<W: Write>(mut wtr: W, examples: &[TrainingExample]) -> std::io::Result<()> {
    for example in examples {
        serde_json::to_writer(&mut wtr, example)?;
        wtr.write_all(b"\n")?;
    }
    wtr.flush()?;
    log::info!("wrote {} training examples", examples.len());
    Ok(())
}
