use std::io::Read;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{LoadError, Result};
use crate::lexicon::open;

pub const ROOTS_FILE: &str = "roots.json";
pub const AFFIXES_FILE: &str = "affixes.json";
pub const RULES_FILE: &str = "rules.json";
pub const DICTIONARY_FILE: &str = "dictionary.json";
pub const MODEL_FILE: &str = "model.json";
pub const TAG_VOCAB_FILE: &str = "tag_vocab.json";

/// Locations of the analyser's input tables.
///
/// The three lexicon tables are required. The dictionary, model and tag
/// vocabulary are optional; without them the analyser still works, with an
/// empty fallback dictionary or a first-candidate disambiguator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    pub roots: PathBuf,
    pub affixes: PathBuf,
    pub rules: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dictionary: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_vocab: Option<PathBuf>,
}

impl AnalyzerConfig {
    /// Conventional file names inside `dir`. Optional files are only
    /// referenced when they exist.
    pub fn from_data_dir(dir: &Path) -> Self {
        let optional = |name: &str| Some(dir.join(name)).filter(|p| p.is_file());
        Self {
            roots: dir.join(ROOTS_FILE),
            affixes: dir.join(AFFIXES_FILE),
            rules: dir.join(RULES_FILE),
            dictionary: optional(DICTIONARY_FILE),
            model: optional(MODEL_FILE),
            tag_vocab: optional(TAG_VOCAB_FILE),
        }
    }

    /// Parse a JSON config document. Paths are taken as written.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        serde_json::from_reader(rdr).map_err(|e| LoadError::json("config", e))
    }

    /// Parse a JSON config file; relative paths are resolved against the
    /// file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let cfg = Self::from_reader(open(path)?)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(cfg.relative_to(base))
    }

    fn relative_to(self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_absolute() { p } else { base.join(p) };
        Self {
            roots: resolve(self.roots),
            affixes: resolve(self.affixes),
            rules: resolve(self.rules),
            dictionary: self.dictionary.map(resolve),
            model: self.model.map(resolve),
            tag_vocab: self.tag_vocab.map(resolve),
        }
    }
}
