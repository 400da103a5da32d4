//! Result ranking.
//!
//! Title hits score by how much of a section title the query covers; term
//! hits score by where the word was found (body or title, exact or partial).

use serde::{Deserialize, Serialize};

/// Configurable weights for each kind of match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Query equal to a whole section title; also the exact title-term score
    #[serde(default = "default_title")]
    pub title: u32,
    /// Stem found inside a longer title key
    #[serde(default = "default_partial_title")]
    pub partial_title: u32,
    /// Stem found as a body key
    #[serde(default = "default_term")]
    pub term: u32,
    /// Stem found inside a longer body key
    #[serde(default = "default_partial_term")]
    pub partial_term: u32,
}

fn default_title() -> u32 {
    15
}

fn default_partial_title() -> u32 {
    7
}

fn default_term() -> u32 {
    5
}

fn default_partial_term() -> u32 {
    2
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            title: default_title(),
            partial_title: default_partial_title(),
            term: default_term(),
            partial_term: default_partial_term(),
        }
    }
}

/// Where a term matched
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Term,
    Title,
    PartialTerm,
    PartialTitle,
}

/// Scorer for search results
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn term_score(&self, kind: MatchKind) -> u32 {
        match kind {
            MatchKind::Term => self.weights.term,
            MatchKind::Title => self.weights.title,
            MatchKind::PartialTerm => self.weights.partial_term,
            MatchKind::PartialTitle => self.weights.partial_title,
        }
    }

    /// Score for a query found inside a section title, or `None` when the
    /// query is too short relative to the title to count.
    ///
    /// Lengths are in characters. Page titles get one extra point.
    pub fn title_score(&self, query: &str, title: &str, is_page_title: bool) -> Option<u32> {
        let query_len = query.chars().count() as u64;
        let title_len = title.chars().count() as u64;

        if query_len == 0 || title_len == 0 || query_len * 2 < title_len {
            return None;
        }
        if !title.to_lowercase().trim().contains(query) {
            return None;
        }

        // round half up, saturating at u32::MAX
        let weighted = u64::from(self.weights.title).saturating_mul(query_len * 2);
        let score = weighted.saturating_add(title_len) / (title_len * 2);
        let score = u32::try_from(score).unwrap_or(u32::MAX);
        Some(score.saturating_add(u32::from(is_page_title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let weights = ScoringWeights::default();
        assert_eq!(
            (weights.title, weights.partial_title, weights.term, weights.partial_term),
            (15, 7, 5, 2)
        );
    }

    #[test]
    fn test_partial_weights_json() {
        let weights: ScoringWeights = serde_json::from_str(r#"{"term": 8}"#).unwrap();
        assert_eq!(weights.term, 8);
        assert_eq!(weights.title, 15);
    }

    #[test]
    fn test_title_score() {
        let scorer = Scorer::default();
        assert_eq!(scorer.title_score("bounding sphere", "Bounding sphere", false), Some(15));
        assert_eq!(scorer.title_score("bounding sphere", "Bounding sphere", true), Some(16));
        // 9 of 18 characters: round(7.5) = 8
        assert_eq!(scorer.title_score("confineme", "Vertex confinement", false), Some(8));
        // under half the title
        assert_eq!(scorer.title_score("vertex", "Vertex confinement", false), None);
        assert_eq!(scorer.title_score("sphere", "Vertex confinement", false), None);
        assert_eq!(scorer.title_score("", "Sections", false), None);
    }

    #[test]
    fn test_title_score_large_weight() {
        let scorer = Scorer::new(ScoringWeights {
            title: u32::MAX,
            ..ScoringWeights::default()
        });
        assert_eq!(scorer.title_score("bounding sphere", "Bounding sphere", false), Some(u32::MAX));
        assert_eq!(scorer.title_score("bounding sphere", "Bounding sphere", true), Some(u32::MAX));
        // 9 of 18 characters halves the weight
        assert_eq!(
            scorer.title_score("confineme", "Vertex confinement", false),
            Some(u32::MAX / 2 + 1)
        );
    }

    #[test]
    fn test_term_scores() {
        let scorer = Scorer::default();
        assert_eq!(scorer.term_score(MatchKind::Title), 15);
        assert_eq!(scorer.term_score(MatchKind::PartialTerm), 2);
    }
}
