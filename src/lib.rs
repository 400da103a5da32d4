//! # sphindex - Sphinx search index toolkit
//!
//! Generates, reads, validates and queries the `searchindex.js` file that a
//! Sphinx HTML build ships for its client-side search page.
//!
//! ## Architecture
//!
//! - [`index`] - data model, byte-exact codec, writer, reader, validation, build pipeline
//! - [`source`] - Markdown and reStructuredText page parsers
//! - [`query`] - query parsing and ranking
//! - [`output`] - terminal rendering
//! - [`utils`] - tokenizer, stemmer, anchors, configuration, logging
//! - [`error`] - library error type
//!
//! ## Quick Start
//!
//! ```no_run
//! use sphindex::index::IndexReader;
//! use sphindex::query::{parse_query, QueryExecutor};
//! use std::path::Path;
//!
//! let reader = IndexReader::open_validated(Path::new("_build/html/searchindex.js")).unwrap();
//! let hits = QueryExecutor::new(&reader).execute(&parse_query("vertex confinement"));
//!
//! for hit in hits {
//!     println!("{} {} ({})", hit.docname, hit.title, hit.score);
//! }
//! ```

pub mod error;
pub mod index;
pub mod output;
pub mod query;
pub mod source;
pub mod utils;

pub use error::{IndexError, Result};
