use crate::index::reader::IndexReader;
use crate::index::types::DocIndex;
use crate::query::parser::Query;
use crate::query::scorer::{MatchKind, Scorer, ScoringWeights};
use roaring::RoaringBitmap;
use rustc_hash::{FxHashMap, FxHashSet};
use std::cmp::Ordering;

/// How a hit was found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    /// The query text appears in a section title
    Title,
    /// The query words appear in the page
    Text,
}

/// A ranked search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub docname: String,
    pub filename: String,
    /// Page title, or `Page > Section` for section title hits
    pub title: String,
    pub anchor: Option<String>,
    pub score: u32,
    pub kind: HitKind,
}

/// Query executor
pub struct QueryExecutor<'a> {
    reader: &'a IndexReader,
    scorer: Scorer,
}

impl<'a> QueryExecutor<'a> {
    pub fn new(reader: &'a IndexReader) -> Self {
        Self {
            reader,
            scorer: Scorer::default(),
        }
    }

    /// Create executor with custom scoring weights
    pub fn with_scoring_weights(reader: &'a IndexReader, weights: ScoringWeights) -> Self {
        Self {
            reader,
            scorer: Scorer::new(weights),
        }
    }

    /// Execute a query and return ranked hits
    pub fn execute(&self, query: &Query) -> Vec<SearchHit> {
        if query.is_empty() {
            return Vec::new();
        }

        let excluded = self.excluded_docs(query);
        let mut hits = self.title_hits(query, &excluded);
        hits.extend(self.term_hits(query, &excluded));

        let mut results = dedupe(hits);
        results.sort_by(compare_hits);
        results.truncate(query.options.limit);

        tracing::debug!("query {:?}: {} hits", query.text, results.len());
        results
    }

    fn excluded_docs(&self, query: &Query) -> RoaringBitmap {
        let mut docs = RoaringBitmap::new();
        for stem in &query.excluded {
            docs |= self.reader.term_docs(stem);
            docs |= self.reader.title_term_docs(stem);
        }
        docs
    }

    /// Section titles containing the whole query text
    fn title_hits(&self, query: &Query, excluded: &RoaringBitmap) -> Vec<SearchHit> {
        let mut hits = Vec::new();
        if query.text.is_empty() {
            return hits;
        }

        for (title, refs) in self.reader.titles() {
            for (doc, anchor) in refs {
                if excluded.contains(*doc) {
                    continue;
                }
                let Some(document) = self.reader.document(*doc) else {
                    continue;
                };
                let is_page_title = document.title == title;
                let Some(score) = self.scorer.title_score(&query.text, title, is_page_title) else {
                    continue;
                };

                let display = if is_page_title {
                    title.to_string()
                } else {
                    format!("{} > {}", document.title, title)
                };
                hits.push(SearchHit {
                    docname: document.docname.to_string(),
                    filename: document.filename.to_string(),
                    title: display,
                    anchor: anchor.clone(),
                    score,
                    kind: HitKind::Title,
                });
            }
        }
        hits
    }

    /// Pages containing the required words
    fn term_hits(&self, query: &Query, excluded: &RoaringBitmap) -> Vec<SearchHit> {
        if query.required.is_empty() {
            return Vec::new();
        }

        // per query word: document -> best score for that word
        let word_scores: Vec<FxHashMap<DocIndex, u32>> = query
            .required
            .iter()
            .map(|term| self.score_word(&term.stem))
            .collect();

        let long_words: Vec<usize> = query
            .required
            .iter()
            .enumerate()
            .filter(|(_, t)| t.stem.chars().count() > 2)
            .map(|(i, _)| i)
            .collect();

        let candidates: FxHashSet<DocIndex> =
            word_scores.iter().flat_map(|scores| scores.keys().copied()).collect();

        let mut hits = Vec::new();
        for doc in candidates {
            if excluded.contains(doc) {
                continue;
            }

            let all_words = word_scores.iter().all(|s| s.contains_key(&doc));
            let all_long_words =
                !long_words.is_empty() && long_words.iter().all(|&i| word_scores[i].contains_key(&doc));
            if !all_words && !all_long_words {
                continue;
            }

            let score = word_scores
                .iter()
                .filter_map(|s| s.get(&doc).copied())
                .max()
                .unwrap_or_default();

            if let Some(document) = self.reader.document(doc) {
                hits.push(SearchHit {
                    docname: document.docname.to_string(),
                    filename: document.filename.to_string(),
                    title: document.title.to_string(),
                    anchor: None,
                    score,
                    kind: HitKind::Text,
                });
            }
        }
        hits
    }

    fn score_word(&self, stem: &str) -> FxHashMap<DocIndex, u32> {
        let mut scores = FxHashMap::default();
        let mut record = |docs: RoaringBitmap, kind: MatchKind| {
            let score = self.scorer.term_score(kind);
            for doc in docs {
                let entry = scores.entry(doc).or_insert(0);
                *entry = (*entry).max(score);
            }
        };

        record(self.reader.term_docs(stem), MatchKind::Term);
        record(self.reader.title_term_docs(stem), MatchKind::Title);

        if stem.chars().count() > 2 {
            let index = self.reader.index();
            if !index.terms.contains_key(stem) {
                for (_, docs) in self.reader.terms_containing(stem) {
                    record(docs, MatchKind::PartialTerm);
                }
            }
            if !index.titleterms.contains_key(stem) {
                for (_, docs) in self.reader.title_terms_containing(stem) {
                    record(docs, MatchKind::PartialTitle);
                }
            }
        }
        scores
    }
}

/// Keep the best hit per (docname, anchor)
fn dedupe(hits: Vec<SearchHit>) -> Vec<SearchHit> {
    let mut best: FxHashMap<(String, Option<String>), SearchHit> = FxHashMap::default();
    for hit in hits {
        let key = (hit.docname.clone(), hit.anchor.clone());
        match best.get(&key) {
            Some(existing) if existing.score >= hit.score => {}
            _ => {
                best.insert(key, hit);
            }
        }
    }
    best.into_values().collect()
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.docname.cmp(&b.docname))
        .then_with(|| a.anchor.cmp(&b.anchor))
}
