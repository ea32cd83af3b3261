// Output formatting for analyses.

use serde::{Deserialize, Serialize};

use crate::types::*;

/// Flat export record: everything a downstream annotation format needs,
/// with no knowledge of that format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub token: String,
    pub lemma: String,
    pub root: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pos: Option<String>,
    pub tags: Vec<String>,
    pub segmentation: String,
    pub provenance: Provenance,
}

impl From<&CandidateAnalysis> for AnalysisRecord {
    fn from(c: &CandidateAnalysis) -> Self {
        Self {
            token: c.token.clone(),
            lemma: c.lemma.clone(),
            root: c.root.clone(),
            pos: c.pos.clone(),
            tags: c.tags.clone(),
            segmentation: c.segmentation.clone(),
            provenance: c.provenance,
        }
    }
}

/// Root followed by its tags, e.g. `yaz+PLUR+PAST`.
pub fn to_tagged(c: &CandidateAnalysis) -> String {
    let mut out = c.root.clone();
    for tag in &c.tags {
        out.push(MORPH_DELIMITER);
        out.push_str(tag);
    }
    out
}

/// Tagged forms of a token sequence, space separated.
pub fn sentence_to_tagged(analyses: &[CandidateAnalysis]) -> String {
    analyses
        .iter()
        .map(to_tagged)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yazlardi() -> CandidateAnalysis {
        let root = RootEntry {
            surface: "yaz".to_string(),
            lemma: "yazmaq".to_string(),
            pos: "VERB".to_string(),
            gloss: Some("write".to_string()),
        };
        let affixes = vec![
            MatchedAffix {
                surface: "lar".to_string(),
                tag: "PLUR".to_string(),
                category_index: 0,
            },
            MatchedAffix {
                surface: "dı".to_string(),
                tag: "PAST".to_string(),
                category_index: 1,
            },
        ];
        CandidateAnalysis::segmented("yazlardı", &root, affixes)
    }

    #[test]
    fn test_tagged_segmented() {
        assert_eq!(to_tagged(&yazlardi()), "yaz+PLUR+PAST");
    }

    #[test]
    fn test_tagged_unknown() {
        let c = CandidateAnalysis::whole_word("qwzxy", vec![UNKNOWN_TAG.to_string()], Provenance::Unknown);
        assert_eq!(to_tagged(&c), "qwzxy+UNK");
        assert_eq!(sentence_to_tagged(&[yazlardi(), c]), "yaz+PLUR+PAST qwzxy+UNK");
    }

    #[test]
    fn test_record_json() {
        let record = AnalysisRecord::from(&yazlardi());
        assert_eq!(record.lemma, "yazmaq");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["provenance"], "segmented");
        assert_eq!(json["segmentation"], "yaz+lar+dı");
        assert_eq!(json["tags"], serde_json::json!(["PLUR", "PAST"]));
    }

    #[test]
    fn test_provenance_names() {
        for p in [Provenance::Segmented, Provenance::LexicalFallback, Provenance::Unknown] {
            assert_eq!(serde_json::to_value(p).unwrap(), p.as_str());
        }
    }
}
