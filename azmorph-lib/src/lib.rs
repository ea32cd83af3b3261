pub mod types;
pub mod errors;
pub mod normalize;
pub mod lexicon;
pub mod segmentation;
pub mod disambiguation;
pub mod fallback;
pub mod pipeline;
pub mod config;
pub mod output;
pub mod dataset;

pub use config::AnalyzerConfig;
pub use disambiguation::{Disambiguator, ScoringMode, ScoringModel, TagVocabulary};
pub use errors::{LoadError, Result};
pub use fallback::LexicalFallback;
pub use lexicon::LexiconStore;
pub use pipeline::{Analysis, Analyzer, Resolution};
pub use segmentation::{segment, LexiconSegmenter, Segmenter};
pub use types::{CandidateAnalysis, Provenance};
