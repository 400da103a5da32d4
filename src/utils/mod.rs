//! Shared helpers.
//!
//! - [`tokenizer`] - word splitting, stopwords, indexability
//! - [`stemmer`] - Porter stemmer used for index keys and queries
//! - [`anchor`] - section ids for `alltitles`
//! - [`app_data`] - configuration and the user data directory
//! - [`progress`] - build progress bars
//! - [`logging`] - `tracing` subscriber setup
//!
//! ```
//! use sphindex::utils::{split_words, stem};
//!
//! let stems: Vec<String> = split_words("Vertex confinement").map(stem).collect();
//! assert_eq!(stems, vec!["vertex", "confin"]);
//! ```

pub mod anchor;
pub mod app_data;
pub mod logging;
pub mod progress;
pub mod stemmer;
pub mod tokenizer;

pub use anchor::*;
pub use app_data::*;
pub use logging::*;
pub use stemmer::*;
pub use tokenizer::*;
