use serde::{Deserialize, Serialize};

/// Delimiter between morphemes in a segmentation string (e.g. `yaz+dı`).
pub const MORPH_DELIMITER: char = '+';

/// Tag carried by candidates that no component could analyse.
pub const UNKNOWN_TAG: &str = "UNK";

/// How a candidate analysis was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    Segmented,
    LexicalFallback,
    Unknown,
}

impl Provenance {
    pub fn as_str(self) -> &'static str {
        match self {
            Provenance::Segmented => "segmented",
            Provenance::LexicalFallback => "lexical-fallback",
            Provenance::Unknown => "unknown",
        }
    }
}

/// A root (stem) entry of the lexicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RootEntry {
    /// Folded surface form; unique within the lexicon.
    pub surface: String,
    /// Lemma identifier. Defaults to the surface form.
    pub lemma: String,
    /// Part of speech (e.g. "VERB", "NOUN").
    pub pos: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gloss: Option<String>,
}

/// An affix entry of the lexicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffixEntry {
    /// Folded surface form. The same surface may occur under several categories.
    pub surface: String,
    /// Grammatical tag (e.g. "PAST").
    pub tag: String,
    /// Category name used by the morphotactic ordering.
    pub category: String,
}

/// One affix as matched inside a segmented token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedAffix {
    pub surface: String,
    pub tag: String,
    /// Position of the affix's category in the rule table.
    pub category_index: usize,
}

/// One proposed analysis of a token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateAnalysis {
    /// The normalized token that was analysed.
    pub token: String,
    /// Matched root surface, or the token itself for fallback candidates.
    pub root: String,
    /// Lemma identifier of the root, or the token itself for fallback candidates.
    pub lemma: String,
    /// Part of speech of the root, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gloss: Option<String>,
    /// Ordered tags. Affix tags for segmented candidates, POS plus features
    /// for dictionary candidates, `UNK` for unknown words.
    pub tags: Vec<String>,
    /// Matched affixes in surface order. Empty unless segmented.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub affixes: Vec<MatchedAffix>,
    /// Root and affixes joined with [`MORPH_DELIMITER`].
    pub segmentation: String,
    pub provenance: Provenance,
}

impl CandidateAnalysis {
    /// Build a segmented candidate from a root and its affix chain.
    pub(crate) fn segmented(token: &str, root: &RootEntry, affixes: Vec<MatchedAffix>) -> Self {
        let mut segmentation = root.surface.clone();
        for affix in &affixes {
            segmentation.push(MORPH_DELIMITER);
            segmentation.push_str(&affix.surface);
        }
        Self {
            token: token.to_string(),
            root: root.surface.clone(),
            lemma: root.lemma.clone(),
            pos: Some(root.pos.clone()),
            gloss: root.gloss.clone(),
            tags: affixes.iter().map(|a| a.tag.clone()).collect(),
            affixes,
            segmentation,
            provenance: Provenance::Segmented,
        }
    }

    /// Build a candidate for a token with no morpheme structure.
    pub(crate) fn whole_word(token: &str, tags: Vec<String>, provenance: Provenance) -> Self {
        Self {
            token: token.to_string(),
            root: token.to_string(),
            lemma: token.to_string(),
            pos: None,
            gloss: None,
            tags,
            affixes: vec![],
            segmentation: token.to_string(),
            provenance,
        }
    }

    /// The first tag, used as the node feature during disambiguation.
    pub fn primary_tag(&self) -> Option<&str> {
        self.tags.first().map(|t| t.as_str())
    }
}
