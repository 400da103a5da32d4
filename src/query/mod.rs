//! Full-text search over a loaded index, ranked the way the documentation
//! site's search page ranks results.

pub mod executor;
pub mod parser;
pub mod scorer;

pub use executor::{HitKind, QueryExecutor, SearchHit};
pub use parser::{parse_query, Query, QueryOptions, QueryTerm, DEFAULT_LIMIT};
pub use scorer::{MatchKind, Scorer, ScoringWeights};

use crate::index::reader::IndexReader;

/// Parse and run `input` against `reader`
pub fn search(reader: &IndexReader, input: &str, weights: ScoringWeights, limit: usize) -> Vec<SearchHit> {
    let mut query = parse_query(input);
    query.options.limit = limit;
    QueryExecutor::with_scoring_weights(reader, weights).execute(&query)
}
