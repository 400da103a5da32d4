use crate::utils::{is_number, is_stopword, split_words, stem};

/// Default number of hits returned
pub const DEFAULT_LIMIT: usize = 20;

/// Parsed query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    /// Lowercased text of the non-excluded words, matched against section titles
    pub text: String,
    /// Words every hit must contain, in query order, without duplicates
    pub required: Vec<QueryTerm>,
    /// Stems no hit may contain
    pub excluded: Vec<String>,
    pub options: QueryOptions,
}

/// A search word and its stem
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTerm {
    pub word: String,
    pub stem: String,
}

/// Query options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryOptions {
    /// Maximum results
    pub limit: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Query {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.text.is_empty()
    }

    /// Number of required stems longer than two characters
    pub fn long_term_count(&self) -> usize {
        self.required
            .iter()
            .filter(|t| t.stem.chars().count() > 2)
            .count()
    }
}

/// Parse a query string.
///
/// Whitespace-separated tokens starting with `-` exclude their words; all
/// other words are required. Stopwords and pure numbers are dropped before
/// stemming.
pub fn parse_query(input: &str) -> Query {
    let mut required: Vec<QueryTerm> = Vec::new();
    let mut excluded: Vec<String> = Vec::new();
    let mut text_tokens: Vec<String> = Vec::new();

    for token in input.split_whitespace() {
        let (negated, body) = match token.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, token),
        };
        if !negated {
            text_tokens.push(body.to_lowercase());
        }

        for word in split_words(body) {
            let lower = word.to_lowercase();
            if is_stopword(&lower) || is_number(&lower) {
                continue;
            }
            let stemmed = stem(&lower);
            if stemmed.is_empty() {
                continue;
            }

            if negated {
                if !excluded.contains(&stemmed) {
                    excluded.push(stemmed);
                }
            } else if !required.iter().any(|t| t.stem == stemmed) {
                required.push(QueryTerm {
                    word: lower,
                    stem: stemmed,
                });
            }
        }
    }

    Query {
        text: text_tokens.join(" "),
        required,
        excluded,
        options: QueryOptions::default(),
    }
}
