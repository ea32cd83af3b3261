// Root + affix-chain segmentation.
//
// Every root that prefix-matches the token opens an independent branch. Within
// a branch the affix chain is greedy: at each step the longest affix (ties by
// declaration order) whose category does not precede the previous affix's
// category is taken, and the branch fails as soon as nothing matches. A branch
// contributes a candidate only if it consumes the whole token.

use std::sync::Arc;

use crate::lexicon::LexiconStore;
use crate::types::*;

/// Anything that can enumerate segmentation candidates for a folded token.
pub trait Segmenter: Send + Sync {
    fn segment(&self, token: &str) -> Vec<CandidateAnalysis>;
}

/// In-process segmenter over a shared [`LexiconStore`].
#[derive(Debug, Clone)]
pub struct LexiconSegmenter {
    lexicon: Arc<LexiconStore>,
}

impl LexiconSegmenter {
    pub fn new(lexicon: Arc<LexiconStore>) -> Self {
        Self { lexicon }
    }
}

impl Segmenter for LexiconSegmenter {
    fn segment(&self, token: &str) -> Vec<CandidateAnalysis> {
        segment(token, &self.lexicon)
    }
}

/// Enumerate one candidate per root that fully segments `token`, longest
/// root first. Returns an empty vector when no root works.
pub fn segment(token: &str, lexicon: &LexiconStore) -> Vec<CandidateAnalysis> {
    lexicon
        .roots_by_prefix(token)
        .into_iter()
        .filter_map(|root| {
            let remainder = &token[root.surface.len()..];
            let affixes = affix_chain(remainder, lexicon)?;
            Some(CandidateAnalysis::segmented(token, root, affixes))
        })
        .collect()
}

/// Greedily consume `remainder` with affixes in non-decreasing category
/// order. `None` if some suffix of it cannot be matched.
fn affix_chain(remainder: &str, lexicon: &LexiconStore) -> Option<Vec<MatchedAffix>> {
    let mut rest = remainder;
    let mut min_category = 0;
    let mut chain = Vec::new();

    while !rest.is_empty() {
        let next = lexicon
            .affixes_by_prefix(rest)
            .into_iter()
            .find(|m| m.category_index >= min_category)?;
        rest = &rest[next.entry.surface.len()..];
        min_category = next.category_index;
        chain.push(MatchedAffix {
            surface: next.entry.surface.clone(),
            tag: next.entry.tag.clone(),
            category_index: next.category_index,
        });
    }

    Some(chain)
}
